use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventstay_core::repository::BookingRepository;
use eventstay_core::{StoreError, StoreResult};
use eventstay_shared::{Booking, BookingWithRoom, Room};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use crate::hotel_repo::RoomRow;

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i32,
    user_id: i32,
    room_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            room_id: row.room_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRoomRow {
    booking_id: i32,
    #[sqlx(flatten)]
    room: RoomRow,
}

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locks the room row for the rest of `tx` and fails unless a slot is free.
    ///
    /// Every writer that adds a booking to a room goes through this lock, so
    /// the count below cannot go stale before the transaction commits.
    async fn lock_vacant_room(
        tx: &mut Transaction<'_, Postgres>,
        room_id: i32,
    ) -> StoreResult<()> {
        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT capacity FROM rooms WHERE id = $1 FOR UPDATE")
                .bind(room_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(StoreError::backend)?;

        let capacity = capacity.ok_or_else(|| StoreError::NotFound(format!("room {}", room_id)))?;

        let occupancy: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(StoreError::backend)?;

        if occupancy >= i64::from(capacity) {
            warn!(room_id, capacity, occupancy, "Room filled concurrently");
            return Err(StoreError::RoomFull { room_id });
        }
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn find_by_user(&self, user_id: i32) -> StoreResult<Option<BookingWithRoom>> {
        let row = sqlx::query_as::<_, BookingRoomRow>(
            r#"
            SELECT b.id AS booking_id,
                   r.id, r.hotel_id, r.name, r.capacity, r.created_at, r.updated_at
            FROM bookings b
            JOIN rooms r ON r.id = b.room_id
            WHERE b.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|row| BookingWithRoom {
            id: row.booking_id,
            room: Room::from(row.room),
        }))
    }

    async fn create(&self, user_id: i32, room_id: i32) -> StoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        Self::lock_vacant_room(&mut tx, room_id).await?;

        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings (user_id, room_id)
            VALUES ($1, $2)
            RETURNING id, user_id, room_id, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(room_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyBooked { user_id }
            } else {
                StoreError::backend(e)
            }
        })?;

        tx.commit().await.map_err(StoreError::backend)?;

        Ok(Booking::from(row))
    }

    async fn update_room(&self, booking_id: i32, room_id: i32) -> StoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        Self::lock_vacant_room(&mut tx, room_id).await?;

        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            UPDATE bookings SET room_id = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, user_id, room_id, created_at, updated_at
            "#,
        )
        .bind(room_id)
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::backend)?
        .ok_or_else(|| StoreError::NotFound(format!("booking {}", booking_id)))?;

        tx.commit().await.map_err(StoreError::backend)?;

        Ok(Booking::from(row))
    }

    async fn delete(&self, booking_id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("booking {}", booking_id)));
        }
        Ok(())
    }
}

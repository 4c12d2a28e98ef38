use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventstay_core::repository::{HotelRepository, RoomRepository};
use eventstay_core::{StoreError, StoreResult};
use eventstay_shared::{Hotel, HotelWithRooms, Room, RoomOccupancy};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: i32,
    name: String,
    image: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RoomRow {
    id: i32,
    hotel_id: i32,
    name: String,
    capacity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            hotel_id: row.hotel_id,
            name: row.name,
            capacity: row.capacity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoomOccupancyRow {
    #[sqlx(flatten)]
    room: RoomRow,
    occupancy: i64,
}

pub struct PgHotelRepository {
    pool: PgPool,
}

impl PgHotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HotelRepository for PgHotelRepository {
    async fn list_all(&self) -> StoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(
            "SELECT id, name, image, created_at, updated_at FROM hotels ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(rows.into_iter().map(Hotel::from).collect())
    }

    async fn find_with_rooms(&self, hotel_id: i32) -> StoreResult<Option<HotelWithRooms>> {
        let hotel = sqlx::query_as::<_, HotelRow>(
            "SELECT id, name, image, created_at, updated_at FROM hotels WHERE id = $1",
        )
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let hotel = match hotel {
            Some(row) => Hotel::from(row),
            None => return Ok(None),
        };

        let rooms = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, hotel_id, name, capacity, created_at, updated_at
            FROM rooms
            WHERE hotel_id = $1
            ORDER BY id
            "#,
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Some(HotelWithRooms {
            hotel,
            rooms: rooms.into_iter().map(Room::from).collect(),
        }))
    }
}

pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn find_with_occupancy(&self, room_id: i32) -> StoreResult<Option<RoomOccupancy>> {
        let row = sqlx::query_as::<_, RoomOccupancyRow>(
            r#"
            SELECT r.id, r.hotel_id, r.name, r.capacity, r.created_at, r.updated_at,
                   (SELECT COUNT(*) FROM bookings b WHERE b.room_id = r.id) AS occupancy
            FROM rooms r
            WHERE r.id = $1
            "#,
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|row| RoomOccupancy {
            room: Room::from(row.room),
            occupancy: row.occupancy,
        }))
    }
}

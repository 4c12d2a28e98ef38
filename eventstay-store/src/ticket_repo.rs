use async_trait::async_trait;
use eventstay_core::repository::TicketRepository;
use eventstay_core::{StoreError, StoreResult};
use eventstay_shared::{TicketStatus, TicketType, TicketWithType};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i32,
    enrollment_id: i32,
    ticket_type_id: i32,
    status: String,
    type_name: String,
    price: i32,
    is_remote: bool,
    includes_hotel: bool,
}

impl TryFrom<TicketRow> for TicketWithType {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status: TicketStatus = row
            .status
            .parse()
            .map_err(|e: String| StoreError::Backend(e.into()))?;

        Ok(TicketWithType {
            id: row.id,
            enrollment_id: row.enrollment_id,
            ticket_type_id: row.ticket_type_id,
            status,
            ticket_type: TicketType {
                id: row.ticket_type_id,
                name: row.type_name,
                price: row.price,
                is_remote: row.is_remote,
                includes_hotel: row.includes_hotel,
            },
        })
    }
}

pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn find_by_user(&self, user_id: i32) -> StoreResult<Option<TicketWithType>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT t.id, t.enrollment_id, t.ticket_type_id, t.status,
                   tt.name AS type_name, tt.price, tt.is_remote, tt.includes_hotel
            FROM tickets t
            JOIN enrollments e ON e.id = t.enrollment_id
            JOIN ticket_types tt ON tt.id = t.ticket_type_id
            WHERE e.user_id = $1
            ORDER BY t.id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(TicketWithType::try_from).transpose()
    }
}

pub mod booking;
pub mod hotel;
pub mod memory;
pub mod repository;

pub use booking::BookingService;
pub use hotel::HotelService;
pub use memory::MemoryStore;

/// Failures raised by a repository implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Room {room_id} is fully booked")]
    RoomFull { room_id: i32 },
    #[error("User {user_id} already holds a booking")]
    AlreadyBooked { user_id: i32 },
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

/// Outcomes of the booking and hotel operations, each mapped to one HTTP status at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Payment required: {0}")]
    PaymentRequired(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type ServiceResult<T> = Result<T, ServiceError>;

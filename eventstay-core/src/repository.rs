use async_trait::async_trait;
use eventstay_shared::{
    Booking, BookingWithRoom, Hotel, HotelWithRooms, RoomOccupancy, Session, TicketWithType,
};

use crate::StoreResult;

/// Ticket lookups, resolved through the user's enrollment.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find_by_user(&self, user_id: i32) -> StoreResult<Option<TicketWithType>>;
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_with_occupancy(&self, room_id: i32) -> StoreResult<Option<RoomOccupancy>>;
}

#[async_trait]
pub trait HotelRepository: Send + Sync {
    async fn list_all(&self) -> StoreResult<Vec<Hotel>>;

    async fn find_with_rooms(&self, hotel_id: i32) -> StoreResult<Option<HotelWithRooms>>;
}

/// Booking persistence.
///
/// `create` and `update_room` re-check the target room's occupancy atomically with the
/// write and return [`StoreError::RoomFull`](crate::StoreError::RoomFull) instead of
/// overfilling it.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_user(&self, user_id: i32) -> StoreResult<Option<BookingWithRoom>>;

    async fn create(&self, user_id: i32, room_id: i32) -> StoreResult<Booking>;

    async fn update_room(&self, booking_id: i32, room_id: i32) -> StoreResult<Booking>;

    async fn delete(&self, booking_id: i32) -> StoreResult<()>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>>;
}

use std::sync::Arc;

use eventstay_shared::{Booking, BookingWithRoom, RoomOccupancy};
use tracing::{debug, info, instrument, warn};

use crate::repository::{BookingRepository, RoomRepository, TicketRepository};
use crate::{ServiceError, ServiceResult, StoreError};

/// Reserves, changes and cancels a ticket holder's hotel room.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    rooms: Arc<dyn RoomRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        rooms: Arc<dyn RoomRepository>,
        tickets: Arc<dyn TicketRepository>,
    ) -> Self {
        Self {
            bookings,
            rooms,
            tickets,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_booking(&self, user_id: i32) -> ServiceResult<BookingWithRoom> {
        self.bookings
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No booking for this user".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create_booking(&self, user_id: i32, room_id: i32) -> ServiceResult<Booking> {
        self.ensure_eligible_ticket(user_id).await?;
        self.ensure_vacancy(room_id).await?;

        if self.bookings.find_by_user(user_id).await?.is_some() {
            warn!(user_id, "Refusing second booking for user");
            return Err(ServiceError::Forbidden("User already has a booking".to_string()));
        }

        let booking = self
            .bookings
            .create(user_id, room_id)
            .await
            .map_err(reject_race_loser)?;

        info!(booking_id = booking.id, user_id, room_id, "Booking created");
        Ok(booking)
    }

    #[instrument(skip(self))]
    pub async fn update_booking(
        &self,
        user_id: i32,
        booking_id: i32,
        room_id: i32,
    ) -> ServiceResult<Booking> {
        self.ensure_eligible_ticket(user_id).await?;
        self.ensure_vacancy(room_id).await?;

        let current = self
            .bookings
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("User has no booking to change".to_string()))?;

        if current.id != booking_id {
            warn!(user_id, booking_id, "Booking does not belong to user");
            return Err(ServiceError::Forbidden("Booking does not belong to user".to_string()));
        }

        let booking = self
            .bookings
            .update_room(current.id, room_id)
            .await
            .map_err(reject_race_loser)?;

        info!(
            booking_id = booking.id,
            user_id,
            from_room = current.room.id,
            to_room = room_id,
            "Booking moved"
        );
        Ok(booking)
    }

    #[instrument(skip(self))]
    pub async fn cancel_booking(&self, user_id: i32, booking_id: i32) -> ServiceResult<i32> {
        let current = self
            .bookings
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No booking for this user".to_string()))?;

        if current.id != booking_id {
            return Err(ServiceError::Forbidden("Booking does not belong to user".to_string()));
        }

        self.bookings.delete(booking_id).await?;

        info!(booking_id, user_id, room_id = current.room.id, "Booking cancelled");
        Ok(booking_id)
    }

    async fn ensure_eligible_ticket(&self, user_id: i32) -> ServiceResult<()> {
        match self.tickets.find_by_user(user_id).await? {
            Some(ticket) if ticket.grants_hotel_stay() => Ok(()),
            Some(ticket) => {
                warn!(
                    user_id,
                    ticket_id = ticket.id,
                    status = %ticket.status,
                    "Ticket does not grant a hotel stay"
                );
                Err(ServiceError::Forbidden("Ticket does not include a hotel stay".to_string()))
            }
            None => Err(ServiceError::Forbidden("User has no ticket".to_string())),
        }
    }

    async fn ensure_vacancy(&self, room_id: i32) -> ServiceResult<RoomOccupancy> {
        let room = self
            .rooms
            .find_with_occupancy(room_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Room {} not found", room_id)))?;

        if !room.has_vacancy() {
            warn!(room_id, capacity = room.room.capacity, "Room is full");
            return Err(ServiceError::Forbidden("Room has no vacancy".to_string()));
        }
        debug!(room_id, vacancies = room.vacancies(), "Room has vacancy");
        Ok(room)
    }
}

/// Maps the store's atomic re-check failures onto the same outcomes the pre-checks report.
fn reject_race_loser(err: StoreError) -> ServiceError {
    match err {
        StoreError::RoomFull { .. } => ServiceError::Forbidden("Room has no vacancy".to_string()),
        StoreError::AlreadyBooked { .. } => {
            ServiceError::Forbidden("User already has a booking".to_string())
        }
        StoreError::NotFound(what) => ServiceError::NotFound(what),
        other => ServiceError::Store(other),
    }
}

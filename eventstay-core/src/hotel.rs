use std::num::IntErrorKind;
use std::sync::Arc;

use eventstay_shared::{Hotel, HotelWithRooms};
use tracing::{instrument, warn};

use crate::repository::{HotelRepository, TicketRepository};
use crate::{ServiceError, ServiceResult};

/// Hotel catalog, visible only to holders of a ticket that includes a stay.
pub struct HotelService {
    hotels: Arc<dyn HotelRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl HotelService {
    pub fn new(hotels: Arc<dyn HotelRepository>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self { hotels, tickets }
    }

    #[instrument(skip(self))]
    pub async fn get_hotels(&self, user_id: i32) -> ServiceResult<Vec<Hotel>> {
        self.validate_access(user_id, None).await?;

        let hotels = self.hotels.list_all().await?;
        if hotels.is_empty() {
            return Err(ServiceError::NotFound("No hotels available".to_string()));
        }
        Ok(hotels)
    }

    /// `raw_hotel_id` is the unparsed path segment; a non-integer is rejected before any lookup.
    #[instrument(skip(self))]
    pub async fn get_hotel_by_id(
        &self,
        user_id: i32,
        raw_hotel_id: &str,
    ) -> ServiceResult<HotelWithRooms> {
        let hotel_id = parse_hotel_id(raw_hotel_id)?;

        self.validate_access(user_id, Some(hotel_id)).await?;

        self.hotels
            .find_with_rooms(hotel_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Hotel {} not found", hotel_id)))
    }

    // Ticket presence, then hotel existence, then ticket eligibility.
    async fn validate_access(&self, user_id: i32, hotel_id: Option<i32>) -> ServiceResult<()> {
        let ticket = self
            .tickets
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("No enrollment or ticket for this user".to_string())
            })?;

        if let Some(hotel_id) = hotel_id {
            if self.hotels.find_with_rooms(hotel_id).await?.is_none() {
                return Err(ServiceError::NotFound(format!("Hotel {} not found", hotel_id)));
            }
        }

        if !ticket.grants_hotel_stay() {
            warn!(
                user_id,
                ticket_id = ticket.id,
                "Hotel access requires a paid in-person ticket with hotel"
            );
            return Err(ServiceError::PaymentRequired(
                "Ticket must be paid, in-person and include a hotel".to_string(),
            ));
        }
        Ok(())
    }
}

/// An integer too large for a hotel id cannot name an existing hotel, so it is
/// reported as not found rather than malformed.
fn parse_hotel_id(raw: &str) -> ServiceResult<i32> {
    raw.trim().parse::<i32>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ServiceError::NotFound(format!("Hotel {} not found", raw))
        }
        _ => ServiceError::BadRequest(format!("Invalid hotel id: {}", raw)),
    })
}

use std::sync::Arc;

use eventstay_core::repository::{
    BookingRepository, HotelRepository, RoomRepository, SessionRepository, TicketRepository,
};
use eventstay_core::{BookingService, HotelService};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<BookingService>,
    pub hotels: Arc<HotelService>,
    pub sessions: Arc<dyn SessionRepository>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        rooms: Arc<dyn RoomRepository>,
        hotels: Arc<dyn HotelRepository>,
        tickets: Arc<dyn TicketRepository>,
        sessions: Arc<dyn SessionRepository>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            bookings: Arc::new(BookingService::new(bookings, rooms, tickets.clone())),
            hotels: Arc::new(HotelService::new(hotels, tickets)),
            sessions,
            auth,
        }
    }
}

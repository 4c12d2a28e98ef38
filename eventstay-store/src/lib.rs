pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod hotel_repo;
pub mod session_repo;
pub mod ticket_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use hotel_repo::{PgHotelRepository, PgRoomRepository};
pub use session_repo::PgSessionRepository;
pub use ticket_repo::PgTicketRepository;

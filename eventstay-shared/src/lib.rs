pub mod models;

pub use models::booking::{Booking, BookingWithRoom};
pub use models::hotel::{Hotel, HotelWithRooms, Room, RoomOccupancy};
pub use models::session::Session;
pub use models::ticket::{TicketStatus, TicketType, TicketWithType};

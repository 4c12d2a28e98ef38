use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use eventstay_shared::{
    Booking, BookingWithRoom, Hotel, HotelWithRooms, Room, RoomOccupancy, Session, TicketStatus,
    TicketType, TicketWithType,
};
use tokio::sync::RwLock;

use crate::repository::{
    BookingRepository, HotelRepository, RoomRepository, SessionRepository, TicketRepository,
};
use crate::{StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    next_id: i32,
    hotels: BTreeMap<i32, Hotel>,
    rooms: BTreeMap<i32, Room>,
    bookings: BTreeMap<i32, Booking>,
    // keyed by user id; one enrollment (and so one ticket) per user
    tickets: HashMap<i32, TicketWithType>,
    sessions: Vec<Session>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn occupancy(&self, room_id: i32) -> i64 {
        self.bookings.values().filter(|b| b.room_id == room_id).count() as i64
    }

    fn ensure_vacancy(&self, room_id: i32) -> StoreResult<()> {
        let room = self
            .rooms
            .get(&room_id)
            .ok_or_else(|| StoreError::NotFound(format!("room {}", room_id)))?;

        if self.occupancy(room_id) >= i64::from(room.capacity) {
            return Err(StoreError::RoomFull { room_id });
        }
        Ok(())
    }
}

/// Process-local store implementing every repository trait.
///
/// All writes happen under a single write lock, so the capacity re-check in
/// `create`/`update_room` is atomic with the write, the same guarantee the
/// PostgreSQL store gets from `SELECT ... FOR UPDATE`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_hotel(&self, name: &str, image: &str) -> Hotel {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let hotel = Hotel {
            id: tables.next_id(),
            name: name.to_string(),
            image: image.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.hotels.insert(hotel.id, hotel.clone());
        hotel
    }

    pub async fn add_room(&self, hotel_id: i32, name: &str, capacity: i32) -> Room {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let room = Room {
            id: tables.next_id(),
            hotel_id,
            name: name.to_string(),
            capacity,
            created_at: now,
            updated_at: now,
        };
        tables.rooms.insert(room.id, room.clone());
        room
    }

    /// Enrolls `user_id` and issues a ticket of a fresh type with the given flags.
    pub async fn add_ticket(
        &self,
        user_id: i32,
        status: TicketStatus,
        is_remote: bool,
        includes_hotel: bool,
    ) -> TicketWithType {
        let mut tables = self.tables.write().await;
        let ticket_type_id = tables.next_id();
        let ticket = TicketWithType {
            id: tables.next_id(),
            enrollment_id: tables.next_id(),
            ticket_type_id,
            status,
            ticket_type: TicketType {
                id: ticket_type_id,
                name: format!("ticket-type-{}", ticket_type_id),
                price: 250,
                is_remote,
                includes_hotel,
            },
        };
        tables.tickets.insert(user_id, ticket.clone());
        ticket
    }

    pub async fn add_session(&self, user_id: i32, token: &str) -> Session {
        let mut tables = self.tables.write().await;
        let session = Session {
            id: tables.next_id(),
            user_id,
            token: token.to_string(),
        };
        tables.sessions.push(session.clone());
        session
    }

    /// Inserts a booking without any capacity or uniqueness check, for fixtures.
    pub async fn insert_booking(&self, user_id: i32, room_id: i32) -> Booking {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let booking = Booking {
            id: tables.next_id(),
            user_id,
            room_id,
            created_at: now,
            updated_at: now,
        };
        tables.bookings.insert(booking.id, booking.clone());
        booking
    }

    pub async fn room_occupancy(&self, room_id: i32) -> i64 {
        self.tables.read().await.occupancy(room_id)
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn find_by_user(&self, user_id: i32) -> StoreResult<Option<TicketWithType>> {
        Ok(self.tables.read().await.tickets.get(&user_id).cloned())
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn find_with_occupancy(&self, room_id: i32) -> StoreResult<Option<RoomOccupancy>> {
        let tables = self.tables.read().await;
        Ok(tables.rooms.get(&room_id).map(|room| RoomOccupancy {
            room: room.clone(),
            occupancy: tables.occupancy(room_id),
        }))
    }
}

#[async_trait]
impl HotelRepository for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<Hotel>> {
        Ok(self.tables.read().await.hotels.values().cloned().collect())
    }

    async fn find_with_rooms(&self, hotel_id: i32) -> StoreResult<Option<HotelWithRooms>> {
        let tables = self.tables.read().await;
        Ok(tables.hotels.get(&hotel_id).map(|hotel| HotelWithRooms {
            hotel: hotel.clone(),
            rooms: tables
                .rooms
                .values()
                .filter(|room| room.hotel_id == hotel_id)
                .cloned()
                .collect(),
        }))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn find_by_user(&self, user_id: i32) -> StoreResult<Option<BookingWithRoom>> {
        let tables = self.tables.read().await;
        let booking = match tables.bookings.values().find(|b| b.user_id == user_id) {
            Some(b) => b,
            None => return Ok(None),
        };
        let room = tables
            .rooms
            .get(&booking.room_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("room {}", booking.room_id)))?;

        Ok(Some(BookingWithRoom { id: booking.id, room }))
    }

    async fn create(&self, user_id: i32, room_id: i32) -> StoreResult<Booking> {
        let mut tables = self.tables.write().await;

        if tables.bookings.values().any(|b| b.user_id == user_id) {
            return Err(StoreError::AlreadyBooked { user_id });
        }
        tables.ensure_vacancy(room_id)?;

        let now = Utc::now();
        let booking = Booking {
            id: tables.next_id(),
            user_id,
            room_id,
            created_at: now,
            updated_at: now,
        };
        tables.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_room(&self, booking_id: i32, room_id: i32) -> StoreResult<Booking> {
        let mut tables = self.tables.write().await;

        if !tables.bookings.contains_key(&booking_id) {
            return Err(StoreError::NotFound(format!("booking {}", booking_id)));
        }
        tables.ensure_vacancy(room_id)?;

        let booking = tables
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| StoreError::NotFound(format!("booking {}", booking_id)))?;
        booking.room_id = room_id;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn delete(&self, booking_id: i32) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .bookings
            .remove(&booking_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("booking {}", booking_id)))
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.token == token).cloned())
    }
}

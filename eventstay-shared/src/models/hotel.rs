use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i32,
    pub hotel_id: i32,
    pub name: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelWithRooms {
    #[serde(flatten)]
    pub hotel: Hotel,
    #[serde(rename = "Rooms")]
    pub rooms: Vec<Room>,
}

/// A room together with the number of bookings currently holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomOccupancy {
    pub room: Room,
    pub occupancy: i64,
}

impl RoomOccupancy {
    pub fn has_vacancy(&self) -> bool {
        self.occupancy < i64::from(self.room.capacity)
    }

    pub fn vacancies(&self) -> i64 {
        (i64::from(self.room.capacity) - self.occupancy).max(0)
    }
}

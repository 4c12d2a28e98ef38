use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hotel::Room;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub room_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's booking as returned by `GET /booking`: the id plus the booked room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingWithRoom {
    pub id: i32,
    #[serde(rename = "Room")]
    pub room: Room,
}

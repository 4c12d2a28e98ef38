use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Reserved,
    Paid,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Reserved => write!(f, "RESERVED"),
            TicketStatus::Paid => write!(f, "PAID"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RESERVED" => Ok(TicketStatus::Reserved),
            "PAID" => Ok(TicketStatus::Paid),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    pub id: i32,
    pub name: String,
    pub price: i32,
    pub is_remote: bool,
    pub includes_hotel: bool,
}

/// A user's ticket joined with its type, as the hotel and booking checks need it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketWithType {
    pub id: i32,
    pub enrollment_id: i32,
    pub ticket_type_id: i32,
    pub status: TicketStatus,
    #[serde(rename = "TicketType")]
    pub ticket_type: TicketType,
}

impl TicketWithType {
    /// Paid, in-person, and the ticket type bundles a hotel stay.
    pub fn grants_hotel_stay(&self) -> bool {
        self.status == TicketStatus::Paid
            && !self.ticket_type.is_remote
            && self.ticket_type.includes_hotel
    }
}

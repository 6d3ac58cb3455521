use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{MovieId, SeatId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Sold,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Sold => "sold",
        }
    }
}

/// Status record for one seat of a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub seat: SeatId,
    pub status: SeatStatus,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn available(seat: SeatId, now: DateTime<Utc>) -> Self {
        Self {
            seat,
            status: SeatStatus::Available,
            updated_at: now,
        }
    }
}

/// A sold ticket together with the movie it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoldTicket {
    pub movie_id: MovieId,
    pub title: String,
    pub seat: SeatId,
    pub sold_at: DateTime<Utc>,
}

/// Returns the first seat that appears more than once.
pub fn first_repeated(seats: &[SeatId]) -> Option<&SeatId> {
    let mut seen = HashSet::with_capacity(seats.len());
    seats.iter().find(|seat| !seen.insert(seat.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(raw: &[&str]) -> Vec<SeatId> {
        raw.iter().map(|s| SeatId::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SeatStatus::Available).unwrap(),
            "\"available\""
        );
        assert_eq!(serde_json::to_string(&SeatStatus::Sold).unwrap(), "\"sold\"");
        assert_eq!(SeatStatus::Sold.as_str(), "sold");
    }

    #[test]
    fn test_ticket_json_shape() {
        let ticket = Ticket::available(SeatId::parse("A1").unwrap(), Utc::now());
        let value = serde_json::to_value(&ticket).unwrap();
        assert_eq!(value["seat"], "A1");
        assert_eq!(value["status"], "available");

        let back: Ticket = serde_json::from_value(value).unwrap();
        assert_eq!(back, ticket);
    }

    #[test]
    fn test_ticket_accepts_offset_timestamps() {
        let ticket: Ticket = serde_json::from_str(
            r#"{"seat":"C3","status":"sold","updated_at":"2024-03-01T18:30:00.123456+02:00"}"#,
        )
        .unwrap();
        assert_eq!(ticket.status, SeatStatus::Sold);
        assert_eq!(ticket.updated_at.to_rfc3339(), "2024-03-01T16:30:00.123456+00:00");
    }

    #[test]
    fn test_first_repeated() {
        assert_eq!(first_repeated(&seats(&["A1", "A2", "A3"])), None);
        assert_eq!(
            first_repeated(&seats(&["A1", "A2", "A1", "A2"])).map(SeatId::as_str),
            Some("A1")
        );
        assert_eq!(first_repeated(&[]), None);
    }
}

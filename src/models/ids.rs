use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Input rejected before it reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidInput(pub String);

impl InvalidInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(Uuid);

impl MovieId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MovieId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MovieId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for MovieId {
    type Err = InvalidInput;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| InvalidInput::new(format!("'{}' is not a valid movie id", raw)))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Seat label, unique within one movie's ticket collection.
///
/// Surrounding whitespace is trimmed; the remainder must be non-empty, at
/// most [`SeatId::MAX_LEN`] characters and free of whitespace or control
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId(String);

impl SeatId {
    pub const MAX_LEN: usize = 32;

    pub fn parse(raw: &str) -> Result<Self, InvalidInput> {
        let seat = raw.trim();
        if seat.is_empty() {
            return Err(InvalidInput::new("seat must not be empty"));
        }
        if seat.chars().count() > Self::MAX_LEN {
            return Err(InvalidInput::new(format!(
                "seat must be at most {} characters",
                Self::MAX_LEN
            )));
        }
        if seat.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidInput::new(format!(
                "seat '{}' contains whitespace or control characters",
                seat.escape_debug()
            )));
        }
        Ok(Self(seat.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SeatId {
    type Err = InvalidInput;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for SeatId {
    type Error = InvalidInput;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_id_parses_uuid() {
        let id = MovieId::new();
        let parsed: MovieId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_movie_id_rejects_garbage() {
        let err = "65a1f0c2e4b0a1b2c3d4e5f6".parse::<MovieId>().unwrap_err();
        assert!(err.0.contains("not a valid movie id"));
        assert!("".parse::<MovieId>().is_err());
    }

    #[test]
    fn test_seat_id_trims_and_validates() {
        assert_eq!(SeatId::parse("  A12 ").unwrap().as_str(), "A12");
        assert!(SeatId::parse("   ").is_err());
        assert!(SeatId::parse("A 12").is_err());
        assert!(SeatId::parse("A\u{0}1").is_err());
        assert!(SeatId::parse(&"x".repeat(SeatId::MAX_LEN)).is_ok());
        assert!(SeatId::parse(&"x".repeat(SeatId::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_seat_id_deserialization_validates() {
        let seat: SeatId = serde_json::from_str("\"B7\"").unwrap();
        assert_eq!(seat.as_str(), "B7");
        assert!(serde_json::from_str::<SeatId>("\"\"").is_err());
    }
}

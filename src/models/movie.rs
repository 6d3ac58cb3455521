use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{InvalidInput, MovieId, SeatId};
use super::ticket::Ticket;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_GENRE_LEN: usize = 64;
pub const MAX_RATING: i16 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub genre: String,
    pub rating: i16,
    pub tickets: Vec<Ticket>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    pub fn ticket(&self, seat: &SeatId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| &ticket.seat == seat)
    }
}

/// Validated input for adding a movie to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub genre: String,
    pub rating: i16,
    /// Seats to open for sale, all starting out available.
    pub seats: Vec<SeatId>,
}

impl NewMovie {
    pub fn new(
        title: &str,
        genre: &str,
        rating: i64,
        seats: Vec<SeatId>,
    ) -> Result<Self, InvalidInput> {
        Ok(Self {
            title: validate_title(title)?,
            genre: validate_genre(genre)?,
            rating: validate_rating(rating)?,
            seats,
        })
    }
}

/// Validated replacement of a movie's descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieUpdate {
    pub title: String,
    pub genre: String,
    pub rating: i16,
}

impl MovieUpdate {
    pub fn new(title: &str, genre: &str, rating: i64) -> Result<Self, InvalidInput> {
        Ok(Self {
            title: validate_title(title)?,
            genre: validate_genre(genre)?,
            rating: validate_rating(rating)?,
        })
    }
}

fn validate_title(title: &str) -> Result<String, InvalidInput> {
    bounded_text("title", title, MAX_TITLE_LEN)
}

pub fn validate_genre(genre: &str) -> Result<String, InvalidInput> {
    bounded_text("genre", genre, MAX_GENRE_LEN)
}

fn validate_rating(rating: i64) -> Result<i16, InvalidInput> {
    match i16::try_from(rating) {
        Ok(rating) if (0..=MAX_RATING).contains(&rating) => Ok(rating),
        _ => Err(InvalidInput::new(format!(
            "rating must be between 0 and {}",
            MAX_RATING
        ))),
    }
}

fn bounded_text(field: &str, value: &str, max_len: usize) -> Result<String, InvalidInput> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InvalidInput::new(format!("{} must not be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(InvalidInput::new(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatStatus;

    #[test]
    fn test_new_movie_trims_fields() {
        let movie = NewMovie::new("  Dune ", " sci-fi", 8, Vec::new()).unwrap();
        assert_eq!(movie.title, "Dune");
        assert_eq!(movie.genre, "sci-fi");
        assert_eq!(movie.rating, 8);
    }

    #[test]
    fn test_new_movie_rejects_blank_title() {
        let err = NewMovie::new("   ", "drama", 5, Vec::new()).unwrap_err();
        assert_eq!(err.0, "title must not be empty");
    }

    #[test]
    fn test_rating_bounds() {
        assert!(MovieUpdate::new("Heat", "crime", 0).is_ok());
        assert!(MovieUpdate::new("Heat", "crime", 10).is_ok());
        assert!(MovieUpdate::new("Heat", "crime", 11).is_err());
        assert!(MovieUpdate::new("Heat", "crime", -1).is_err());
        assert!(MovieUpdate::new("Heat", "crime", i64::MAX).is_err());
    }

    #[test]
    fn test_long_genre_rejected() {
        let genre = "g".repeat(MAX_GENRE_LEN + 1);
        assert!(validate_genre(&genre).is_err());
    }

    #[test]
    fn test_ticket_lookup_by_seat() {
        let now = Utc::now();
        let mut sold = Ticket::available(SeatId::parse("A2").unwrap(), now);
        sold.status = SeatStatus::Sold;
        let movie = Movie {
            id: MovieId::new(),
            title: "Alien".into(),
            genre: "horror".into(),
            rating: 9,
            tickets: vec![Ticket::available(SeatId::parse("A1").unwrap(), now), sold],
            created_at: now,
            updated_at: now,
        };

        assert_eq!(
            movie.ticket(&SeatId::parse("A2").unwrap()).map(|t| t.status),
            Some(SeatStatus::Sold)
        );
        assert!(movie.ticket(&SeatId::parse("Z9").unwrap()).is_none());
    }
}

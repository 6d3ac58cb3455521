//! Movie catalog and seat ledger storage.
//!
//! Both traits are implemented by [`PgStore`] for production and by
//! [`MemoryStore`] for tests and local development.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{InvalidInput, Movie, MovieId, MovieUpdate, NewMovie, SeatId, SoldTicket, Ticket};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("movie {0} not found")]
    NotFound(MovieId),

    #[error("a movie titled '{0}' already exists")]
    Duplicate(String),

    #[error("seat '{0}' already exists")]
    DuplicateSeat(SeatId),

    /// Zero records matched: the movie or seat is missing, or the seat is already sold.
    #[error("seat '{seat}' is not available for movie {movie}")]
    SeatUnavailable { movie: MovieId, seat: SeatId },

    /// Zero records matched: the movie or seat is missing, or the seat is not sold.
    #[error("seat '{seat}' has not been sold for movie {movie}")]
    SeatNotSold { movie: MovieId, seat: SeatId },

    /// The movie row changed between two statements of one operation.
    #[error("movie {0} was modified concurrently, retry the request")]
    ConcurrentUpdate(MovieId),

    #[error(transparent)]
    Invalid(#[from] InvalidInput),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// Administrative operations on the movie catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Add a movie. Fails with [`StoreError::Duplicate`] if the title is taken.
    async fn create(&self, movie: NewMovie) -> Result<Movie, StoreError>;

    /// Replace title, genre and rating. Tickets are left untouched.
    async fn update(&self, id: MovieId, update: MovieUpdate) -> Result<Movie, StoreError>;

    /// Remove a movie together with its tickets.
    async fn delete(&self, id: MovieId) -> Result<(), StoreError>;

    async fn get(&self, id: MovieId) -> Result<Movie, StoreError>;

    /// Most recently created movies first, at most `limit` of them.
    async fn latest(&self, limit: u32) -> Result<Vec<Movie>, StoreError>;

    /// Movies of one genre, most recently created first.
    async fn by_genre(&self, genre: &str) -> Result<Vec<Movie>, StoreError>;
}

/// Seat state per movie.
///
/// `reserve` and `release` are each a single conditional write in the
/// underlying store, so concurrent callers racing on one seat see exactly
/// one success.
#[async_trait]
pub trait SeatLedger: Send + Sync {
    /// Mark an available seat as sold.
    async fn reserve(&self, movie: MovieId, seat: &SeatId) -> Result<Ticket, StoreError>;

    /// Mark a sold seat as available again.
    async fn release(&self, movie: MovieId, seat: &SeatId) -> Result<Ticket, StoreError>;

    /// The movie's seats in the order they were added.
    async fn tickets(&self, movie: MovieId) -> Result<Vec<Ticket>, StoreError>;

    /// Every sold seat across the catalog.
    async fn sold_tickets(&self) -> Result<Vec<SoldTicket>, StoreError>;

    /// Open new seats for sale. Returns the tickets that were added.
    async fn add_seats(&self, movie: MovieId, seats: Vec<SeatId>)
        -> Result<Vec<Ticket>, StoreError>;
}

fn check_new_seats(seats: &[SeatId]) -> Result<(), StoreError> {
    if seats.is_empty() {
        return Err(InvalidInput::new("at least one seat is required").into());
    }
    check_repeats(seats)
}

fn check_repeats(seats: &[SeatId]) -> Result<(), StoreError> {
    match crate::models::ticket::first_repeated(seats) {
        Some(seat) => Err(StoreError::DuplicateSeat(seat.clone())),
        None => Ok(()),
    }
}

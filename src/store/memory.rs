use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{check_new_seats, check_repeats, Catalog, SeatLedger, StoreError};
use crate::models::{
    Movie, MovieId, MovieUpdate, NewMovie, SeatId, SeatStatus, SoldTicket, Ticket,
};

/// In-process store. Every mutation holds the write lock for its whole
/// match-and-mutate step, which gives the same per-seat atomicity as the
/// PostgreSQL conditional update.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    movies: HashMap<MovieId, Entry>,
    next_seq: u64,
}

struct Entry {
    seq: u64,
    movie: Movie,
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<MovieId>) -> bool {
        self.movies
            .values()
            .any(|entry| entry.movie.title == title && Some(entry.movie.id) != except)
    }

    /// Movies matching `filter`, newest first. Insertion order breaks timestamp ties.
    fn newest_first(&self, filter: impl Fn(&Movie) -> bool) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self
            .movies
            .values()
            .filter(|entry| filter(&entry.movie))
            .collect();
        entries.sort_by(|a, b| {
            b.movie
                .created_at
                .cmp(&a.movie.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries
    }

    fn transition(
        &mut self,
        movie: MovieId,
        seat: &SeatId,
        from: SeatStatus,
        to: SeatStatus,
    ) -> Option<Ticket> {
        let ticket = self
            .movies
            .get_mut(&movie)?
            .movie
            .tickets
            .iter_mut()
            .find(|ticket| &ticket.seat == seat && ticket.status == from)?;
        ticket.status = to;
        ticket.updated_at = Utc::now();
        Some(ticket.clone())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn create(&self, movie: NewMovie) -> Result<Movie, StoreError> {
        check_repeats(&movie.seats)?;

        let mut inner = self.inner.write().await;
        if inner.title_taken(&movie.title, None) {
            return Err(StoreError::Duplicate(movie.title));
        }

        let now = Utc::now();
        let created = Movie {
            id: MovieId::new(),
            title: movie.title,
            genre: movie.genre,
            rating: movie.rating,
            tickets: movie
                .seats
                .into_iter()
                .map(|seat| Ticket::available(seat, now))
                .collect(),
            created_at: now,
            updated_at: now,
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.movies.insert(
            created.id,
            Entry {
                seq,
                movie: created.clone(),
            },
        );
        Ok(created)
    }

    async fn update(&self, id: MovieId, update: MovieUpdate) -> Result<Movie, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.movies.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if inner.title_taken(&update.title, Some(id)) {
            return Err(StoreError::Duplicate(update.title));
        }

        let entry = inner.movies.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        entry.movie.title = update.title;
        entry.movie.genre = update.genre;
        entry.movie.rating = update.rating;
        entry.movie.updated_at = Utc::now();
        Ok(entry.movie.clone())
    }

    async fn delete(&self, id: MovieId) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .movies
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn get(&self, id: MovieId) -> Result<Movie, StoreError> {
        self.inner
            .read()
            .await
            .movies
            .get(&id)
            .map(|entry| entry.movie.clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn latest(&self, limit: u32) -> Result<Vec<Movie>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .newest_first(|_| true)
            .into_iter()
            .take(limit as usize)
            .map(|entry| entry.movie.clone())
            .collect())
    }

    async fn by_genre(&self, genre: &str) -> Result<Vec<Movie>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .newest_first(|movie| movie.genre == genre)
            .into_iter()
            .map(|entry| entry.movie.clone())
            .collect())
    }
}

#[async_trait]
impl SeatLedger for MemoryStore {
    async fn reserve(&self, movie: MovieId, seat: &SeatId) -> Result<Ticket, StoreError> {
        self.inner
            .write()
            .await
            .transition(movie, seat, SeatStatus::Available, SeatStatus::Sold)
            .ok_or_else(|| StoreError::SeatUnavailable {
                movie,
                seat: seat.clone(),
            })
    }

    async fn release(&self, movie: MovieId, seat: &SeatId) -> Result<Ticket, StoreError> {
        self.inner
            .write()
            .await
            .transition(movie, seat, SeatStatus::Sold, SeatStatus::Available)
            .ok_or_else(|| StoreError::SeatNotSold {
                movie,
                seat: seat.clone(),
            })
    }

    async fn tickets(&self, movie: MovieId) -> Result<Vec<Ticket>, StoreError> {
        self.inner
            .read()
            .await
            .movies
            .get(&movie)
            .map(|entry| entry.movie.tickets.clone())
            .ok_or(StoreError::NotFound(movie))
    }

    async fn sold_tickets(&self) -> Result<Vec<SoldTicket>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .newest_first(|_| true)
            .into_iter()
            .flat_map(|entry| {
                let movie = &entry.movie;
                movie
                    .tickets
                    .iter()
                    .filter(|ticket| ticket.status == SeatStatus::Sold)
                    .map(move |ticket| SoldTicket {
                        movie_id: movie.id,
                        title: movie.title.clone(),
                        seat: ticket.seat.clone(),
                        sold_at: ticket.updated_at,
                    })
            })
            .collect())
    }

    async fn add_seats(
        &self,
        movie: MovieId,
        seats: Vec<SeatId>,
    ) -> Result<Vec<Ticket>, StoreError> {
        check_new_seats(&seats)?;

        let mut inner = self.inner.write().await;
        let entry = inner
            .movies
            .get_mut(&movie)
            .ok_or(StoreError::NotFound(movie))?;
        if let Some(existing) = seats.iter().find(|seat| entry.movie.ticket(seat).is_some()) {
            return Err(StoreError::DuplicateSeat(existing.clone()));
        }

        let now = Utc::now();
        let added: Vec<Ticket> = seats
            .into_iter()
            .map(|seat| Ticket::available(seat, now))
            .collect();
        entry.movie.tickets.extend(added.iter().cloned());
        Ok(added)
    }
}

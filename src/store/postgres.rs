use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::{check_new_seats, check_repeats, Catalog, SeatLedger, StoreError};
use crate::config::Config;
use crate::models::{
    Movie, MovieId, MovieUpdate, NewMovie, SeatId, SeatStatus, SoldTicket, Ticket,
};

const MOVIE_COLUMNS: &str = "id, title, genre, rating, tickets, created_at, updated_at";

/// Flips one embedded ticket from `$3` to `$4`. The status match lives in the
/// WHERE clause, so PostgreSQL re-checks it under the row lock and a
/// concurrent writer that lost the race matches zero rows.
const TRANSITION_SQL: &str = r#"
UPDATE movies
SET tickets = (
    SELECT jsonb_agg(
        CASE WHEN t.elem->>'seat' = $2
             THEN t.elem || jsonb_build_object('status', $4::text, 'updated_at', $5::timestamptz)
             ELSE t.elem
        END
        ORDER BY t.ord)
    FROM jsonb_array_elements(movies.tickets) WITH ORDINALITY AS t(elem, ord)
)
WHERE id = $1
  AND tickets @> jsonb_build_array(jsonb_build_object('seat', $2::text, 'status', $3::text))
RETURNING (
    SELECT t.elem
    FROM jsonb_array_elements(movies.tickets) AS t(elem)
    WHERE t.elem->>'seat' = $2
    LIMIT 1
)
"#;

const ADD_SEATS_SQL: &str = r#"
UPDATE movies
SET tickets = tickets || $2
WHERE id = $1
  AND NOT EXISTS (
      SELECT 1
      FROM jsonb_array_elements(movies.tickets) AS t(elem)
      WHERE t.elem->>'seat' = ANY($3)
  )
RETURNING id
"#;

const SOLD_TICKETS_SQL: &str = r#"
SELECT m.id, m.title, t.elem AS ticket
FROM movies m
CROSS JOIN LATERAL jsonb_array_elements(m.tickets) WITH ORDINALITY AS t(elem, ord)
WHERE t.elem->>'status' = 'sold'
ORDER BY m.created_at DESC, m.id, t.ord
"#;

#[derive(FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    genre: String,
    rating: i16,
    tickets: Json<Vec<Ticket>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id.into(),
            title: row.title,
            genre: row.genre,
            rating: row.rating,
            tickets: row.tickets.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SoldRow {
    id: Uuid,
    title: String,
    ticket: Json<Ticket>,
}

impl From<SoldRow> for SoldTicket {
    fn from(row: SoldRow) -> Self {
        let ticket = row.ticket.0;
        Self {
            movie_id: row.id.into(),
            title: row.title,
            seat: ticket.seat,
            sold_at: ticket.updated_at,
        }
    }
}

/// PostgreSQL-backed store. Each movie is one row; its tickets are an
/// embedded JSONB array.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn transition(
        &self,
        movie: MovieId,
        seat: &SeatId,
        from: SeatStatus,
        to: SeatStatus,
    ) -> Result<Option<Ticket>, StoreError> {
        let ticket: Option<Json<Ticket>> = sqlx::query_scalar(TRANSITION_SQL)
            .bind(movie.as_uuid())
            .bind(seat.as_str())
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket.map(|Json(ticket)| ticket))
    }

    async fn fetch_tickets(&self, movie: MovieId) -> Result<Option<Vec<Ticket>>, StoreError> {
        let tickets: Option<Json<Vec<Ticket>>> =
            sqlx::query_scalar("SELECT tickets FROM movies WHERE id = $1")
                .bind(movie.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        Ok(tickets.map(|Json(tickets)| tickets))
    }
}

/// Unique violations on `movies` can only come from the title index.
fn title_conflict(err: sqlx::Error, title: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Duplicate(title.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl Catalog for PgStore {
    async fn create(&self, movie: NewMovie) -> Result<Movie, StoreError> {
        check_repeats(&movie.seats)?;

        let now = Utc::now();
        let tickets: Vec<Ticket> = movie
            .seats
            .iter()
            .cloned()
            .map(|seat| Ticket::available(seat, now))
            .collect();

        let sql = format!(
            "INSERT INTO movies ({MOVIE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {MOVIE_COLUMNS}"
        );
        let row: MovieRow = sqlx::query_as(&sql)
            .bind(MovieId::new().as_uuid())
            .bind(&movie.title)
            .bind(&movie.genre)
            .bind(movie.rating)
            .bind(Json(tickets))
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| title_conflict(e, &movie.title))?;

        tracing::info!(movie_id = %row.id, title = %row.title, "Movie created");
        Ok(row.into())
    }

    async fn update(&self, id: MovieId, update: MovieUpdate) -> Result<Movie, StoreError> {
        let sql = format!(
            "UPDATE movies SET title = $2, genre = $3, rating = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {MOVIE_COLUMNS}"
        );
        let row: Option<MovieRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(&update.title)
            .bind(&update.genre)
            .bind(update.rating)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| title_conflict(e, &update.title))?;

        row.map(Movie::from).ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: MovieId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(movie_id = %id, "Movie deleted");
        Ok(())
    }

    async fn get(&self, id: MovieId) -> Result<Movie, StoreError> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1");
        let row: Option<MovieRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Movie::from).ok_or(StoreError::NotFound(id))
    }

    async fn latest(&self, limit: u32) -> Result<Vec<Movie>, StoreError> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        let rows: Vec<MovieRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn by_genre(&self, genre: &str) -> Result<Vec<Movie>, StoreError> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE genre = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows: Vec<MovieRow> = sqlx::query_as(&sql)
            .bind(genre)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }
}

#[async_trait]
impl SeatLedger for PgStore {
    async fn reserve(&self, movie: MovieId, seat: &SeatId) -> Result<Ticket, StoreError> {
        self.transition(movie, seat, SeatStatus::Available, SeatStatus::Sold)
            .await?
            .ok_or_else(|| StoreError::SeatUnavailable {
                movie,
                seat: seat.clone(),
            })
    }

    async fn release(&self, movie: MovieId, seat: &SeatId) -> Result<Ticket, StoreError> {
        self.transition(movie, seat, SeatStatus::Sold, SeatStatus::Available)
            .await?
            .ok_or_else(|| StoreError::SeatNotSold {
                movie,
                seat: seat.clone(),
            })
    }

    async fn tickets(&self, movie: MovieId) -> Result<Vec<Ticket>, StoreError> {
        self.fetch_tickets(movie)
            .await?
            .ok_or(StoreError::NotFound(movie))
    }

    async fn sold_tickets(&self) -> Result<Vec<SoldTicket>, StoreError> {
        let rows: Vec<SoldRow> = sqlx::query_as(SOLD_TICKETS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SoldTicket::from).collect())
    }

    async fn add_seats(
        &self,
        movie: MovieId,
        seats: Vec<SeatId>,
    ) -> Result<Vec<Ticket>, StoreError> {
        check_new_seats(&seats)?;

        let now = Utc::now();
        let labels: Vec<String> = seats.iter().map(|seat| seat.as_str().to_string()).collect();
        let added: Vec<Ticket> = seats
            .into_iter()
            .map(|seat| Ticket::available(seat, now))
            .collect();

        let updated: Option<Uuid> = sqlx::query_scalar(ADD_SEATS_SQL)
            .bind(movie.as_uuid())
            .bind(Json(&added))
            .bind(&labels)
            .fetch_optional(&self.pool)
            .await?;
        if updated.is_some() {
            return Ok(added);
        }

        // Zero rows: either the movie is gone or one of the seats exists.
        let existing = self
            .fetch_tickets(movie)
            .await?
            .ok_or(StoreError::NotFound(movie))?;
        Err(rejected_seats(movie, &added, &existing))
    }
}

/// Explains a zero-row add-seats update once the movie is known to exist.
/// With no clash left to point at, the row changed between the two statements.
fn rejected_seats(movie: MovieId, added: &[Ticket], existing: &[Ticket]) -> StoreError {
    added
        .iter()
        .find(|new| existing.iter().any(|ticket| ticket.seat == new.seat))
        .map(|ticket| StoreError::DuplicateSeat(ticket.seat.clone()))
        .unwrap_or(StoreError::ConcurrentUpdate(movie))
}

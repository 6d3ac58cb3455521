//! Catalog handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use super::{parse_movie_id, parse_seat};
use crate::models::movie::validate_genre;
use crate::models::{MovieUpdate, NewMovie, SeatId};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateMovieBody {
    pub title: String,
    pub genre: String,
    pub rating: i64,
    #[serde(default)]
    pub seats: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMovieBody {
    pub title: String,
    pub genre: String,
    pub rating: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListMoviesParams {
    pub limit: Option<u32>,
    pub genre: Option<String>,
}

/// Latest movies, or all movies of one genre when `genre` is given.
/// `limit` only bounds the latest listing and is rejected alongside `genre`.
pub async fn list_movies(
    State(state): State<AppState>,
    params: Result<Query<ListMoviesParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params?;

    let movies = match params.genre {
        Some(_) if params.limit.is_some() => {
            return Err(AppError::ValidationError(
                "limit cannot be combined with genre".to_string(),
            ));
        }
        Some(genre) => {
            let genre = validate_genre(&genre)?;
            state.catalog.by_genre(&genre).await?
        }
        None => {
            let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
            if limit == 0 || limit > MAX_LIMIT {
                return Err(AppError::ValidationError(format!(
                    "limit must be between 1 and {}",
                    MAX_LIMIT
                )));
            }
            state.catalog.latest(limit).await?
        }
    };

    Ok(success(movies, "Movies retrieved"))
}

pub async fn create_movie(
    State(state): State<AppState>,
    payload: Result<Json<CreateMovieBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let seats = body
        .seats
        .iter()
        .map(|seat| parse_seat(seat))
        .collect::<Result<Vec<SeatId>, _>>()?;
    let movie = NewMovie::new(&body.title, &body.genre, body.rating, seats)?;

    let movie = state.catalog.create(movie).await?;
    Ok(created(movie, "Movie created"))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_movie_id(&id)?;
    let movie = state.catalog.get(id).await?;
    Ok(success(movie, "Movie retrieved"))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMovieBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = parse_movie_id(&id)?;
    let Json(body) = payload?;
    let update = MovieUpdate::new(&body.title, &body.genre, body.rating)?;

    let movie = state.catalog.update(id, update).await?;
    Ok(success(movie, "Movie updated"))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_movie_id(&id)?;
    state.catalog.delete(id).await?;
    Ok(empty_success("Movie deleted"))
}

use axum::response::Response;
use serde::Serialize;

use crate::models::{MovieId, SeatId};
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod movies;
pub mod tickets;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "cinema-api",
    };

    success(payload, "Health check successful")
}

fn parse_movie_id(raw: &str) -> Result<MovieId, AppError> {
    Ok(raw.parse::<MovieId>()?)
}

fn parse_seat(raw: &str) -> Result<SeatId, AppError> {
    Ok(SeatId::parse(raw)?)
}

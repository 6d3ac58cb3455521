//! Seat ledger handlers: buying and returning tickets.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use super::{parse_movie_id, parse_seat};
use crate::models::SeatId;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct AddSeatsBody {
    pub seats: Vec<String>,
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_movie_id(&id)?;
    let tickets = state.ledger.tickets(id).await?;
    Ok(success(tickets, "Tickets retrieved"))
}

pub async fn add_seats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AddSeatsBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = parse_movie_id(&id)?;
    let Json(body) = payload?;
    let seats = body
        .seats
        .iter()
        .map(|seat| parse_seat(seat))
        .collect::<Result<Vec<SeatId>, _>>()?;

    let added = state.ledger.add_seats(id, seats).await?;
    tracing::info!(movie_id = %id, count = added.len(), "Seats added");
    Ok(created(added, "Seats added"))
}

pub async fn buy_ticket(
    State(state): State<AppState>,
    Path((id, seat)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let id = parse_movie_id(&id)?;
    let seat = parse_seat(&seat)?;

    let ticket = state.ledger.reserve(id, &seat).await?;
    tracing::info!(movie_id = %id, seat = %seat, "Ticket sold");
    Ok(success(ticket, "Ticket purchased"))
}

pub async fn return_ticket(
    State(state): State<AppState>,
    Path((id, seat)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let id = parse_movie_id(&id)?;
    let seat = parse_seat(&seat)?;

    let ticket = state.ledger.release(id, &seat).await?;
    tracing::info!(movie_id = %id, seat = %seat, "Ticket returned");
    Ok(success(ticket, "Ticket returned"))
}

pub async fn sold_tickets(State(state): State<AppState>) -> Result<Response, AppError> {
    let tickets = state.ledger.sold_tickets().await?;
    Ok(success(tickets, "Sold tickets retrieved"))
}

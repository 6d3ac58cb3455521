use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, Config, SecurityHeaders};
use crate::handlers::{health_check, movies, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/movies", get(movies::list_movies).post(movies::create_movie))
        .route(
            "/movies/:id",
            get(movies::get_movie)
                .put(movies::update_movie)
                .delete(movies::delete_movie),
        )
        .route("/movies/:id/tickets", get(tickets::list_tickets))
        .route("/movies/:id/seats", post(tickets::add_seats))
        .route("/movies/:id/tickets/:seat/buy", post(tickets::buy_ticket))
        .route("/movies/:id/tickets/:seat/return", post(tickets::return_ticket))
        .route("/tickets/sold", get(tickets::sold_tickets))
        .with_state(state);

    SecurityHeaders::from_config(config)
        .apply(router)
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

use std::time::Duration;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_paste_handler, create_url_handler, delete_paste_handler, get_paste_handler,
    get_url_handler, health_handler, recent_pastes_handler, redirect_handler,
};
use crate::middleware::deadline;
use crate::state::AppState;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Self::router_with_timeout(state, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/s/{code}", get(redirect_handler))
            .route("/p/{id}", get(get_paste_handler))
            .nest(
                "/v1",
                Router::new()
                    .route("/shorten", post(create_url_handler))
                    .route("/shorten/{code}", get(get_url_handler))
                    .route("/paste", post(create_paste_handler))
                    .route("/paste/recent", get(recent_pastes_handler))
                    .route("/paste/{id}", axum::routing::delete(delete_paste_handler)),
            )
            .with_state(state)
            .layer(middleware::from_fn_with_state(request_timeout, deadline))
            .layer(TraceLayer::new_for_http())
    }
}

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::AppError;

/// Fails the request with 504 once `deadline` elapses.
///
/// The handler future is dropped on elapse, which cancels whatever store
/// call it was awaiting. Nothing is retried.
pub async fn deadline(
    State(deadline): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%method, %uri, ?deadline, "request deadline elapsed");
            AppError::DeadlineElapsed.into_response()
        }
    }
}

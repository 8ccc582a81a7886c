use crate::error::Result;
use crate::extract::ClickContext;
use crate::model::{CreateUrlRequest, ShortUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mayfly_core::ShortCode;
use tracing::instrument;

#[instrument(skip_all)]
pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    let params = request.validate()?;

    let record = state.shortener.create(params).await?;
    let body = ShortUrlResponse::new(record, state.base_url());

    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn get_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShortUrlResponse>> {
    let record = state
        .shortener
        .get_by_code(&ShortCode::new_unchecked(code))
        .await?;
    Ok(Json(ShortUrlResponse::new(record, state.base_url())))
}

#[instrument(skip(state, click))]
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ClickContext(click): ClickContext,
) -> Result<Response> {
    let target = state
        .shortener
        .redirect(&ShortCode::new_unchecked(code), click)
        .await?;

    Ok((StatusCode::FOUND, [(LOCATION, target)]).into_response())
}

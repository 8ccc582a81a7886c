use crate::error::Result;
use crate::model::{CreatePasteRequest, RecentPastesQuery};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mayfly_core::{Paste, PasteId};
use tracing::instrument;

#[instrument(skip_all)]
pub async fn create_paste_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePasteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Paste>)> {
    let Json(request) = payload?;
    let paste = state.pastebin.create(request.validate()?).await?;
    Ok((StatusCode::CREATED, Json(paste)))
}

pub async fn get_paste_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Paste>> {
    let paste = state.pastebin.get(&PasteId::new(id)).await?;
    Ok(Json(paste))
}

pub async fn delete_paste_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    state.pastebin.delete(&PasteId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn recent_pastes_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<RecentPastesQuery>, QueryRejection>,
) -> Result<Json<Vec<Paste>>> {
    let Query(query) = query?;
    let pastes = state.pastebin.list_recent(query.limit()).await?;
    Ok(Json(pastes))
}

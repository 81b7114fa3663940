use super::{AppState, ApiError, ValidJson};
pub use crate::tables::{CreateTagRequest, Tag};
use crate::TAGS_API;
use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

pub fn create_router() -> Router<AppState> {
    Router::new().route(
        format!("/{TAGS_API}").as_str(),
        get(list_tags).post(create_tag),
    )
}

async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let store = state.store()?;
    Ok(Json(store.tags().to_vec()))
}

/// Stores the tag but replies with the request body, which has no id.
async fn create_tag(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateTagRequest>,
) -> Result<Json<CreateTagRequest>, ApiError> {
    let tag = state.store()?.create_tag(payload.name.clone());
    info!("Created tag {} ({})", tag.id, tag.name);
    Ok(Json(payload))
}

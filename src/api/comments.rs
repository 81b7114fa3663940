use super::{parse_id, AppState, ApiError, Reply, ValidJson};
pub use crate::tables::{Comment, CreateCommentRequest, InfoMessage};
use crate::store::{NoteStore, StoreError};
use crate::NOTES_API;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, warn};

pub const NO_COMMENTS: &str = "No comments";
pub const COMMENT_NOT_FOUND: &str = "Not found";

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            format!("/{NOTES_API}/:id/comments").as_str(),
            get(list_comments).post(create_comment),
        )
        .route(
            format!("/{NOTES_API}/:id/comments/:comment_id").as_str(),
            delete(delete_comment),
        )
        .route(
            format!("/{NOTES_API}/:id/comments/:comment_id/like").as_str(),
            post(like_comment),
        )
        .route(
            format!("/{NOTES_API}/:id/comments/:comment_id/unlike").as_str(),
            post(unlike_comment),
        )
}

/// Resolves both path ids, checking the note before the comment.
fn resolve_ids(
    store: &NoteStore,
    note_id: &str,
    comment_id: &str,
) -> Result<(i32, i32), StoreError> {
    let note_id = parse_id(note_id).ok_or(StoreError::NoteNotFound(0))?;
    store.note(note_id)?;
    let comment_id = parse_id(comment_id).ok_or(StoreError::CommentNotFound {
        note_id,
        comment_id: 0,
    })?;
    Ok((note_id, comment_id))
}

async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<ValidJson<CreateCommentRequest>, ApiError>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let note_id = parse_id(&id).ok_or(ApiError::NoteNotFound)?;
    let mut store = state.store()?;
    store.note(note_id)?;
    let ValidJson(payload) = payload?;

    let comment = store.add_comment(note_id, payload)?;
    info!("Added comment {} to note {}", comment.id, note_id);
    Ok((StatusCode::CREATED, Json(comment)))
}

/// A missing note yields an informational message rather than a 404.
async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Reply<Vec<Comment>>>, ApiError> {
    let store = state.store()?;
    let reply = match parse_id(&id).map(|note_id| store.comments_for_note(note_id)) {
        Some(Ok(comments)) => Reply::Data(comments),
        Some(Err(StoreError::NoteNotFound(_))) | None => {
            Reply::Info(InfoMessage::new(NO_COMMENTS))
        }
        Some(Err(e)) => return Err(e.into()),
    };
    Ok(Json(reply))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path((note_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let mut store = state.store()?;
    let (note_id, comment_id) = resolve_ids(&store, &note_id, &comment_id)?;

    let comment = store.delete_comment(note_id, comment_id)?;
    info!("Deleted comment {} from note {}", comment.id, note_id);
    Ok(Json(vec![comment]))
}

// Like and unlike report a missing note as 404 but a missing comment as a
// 200 informational message.
fn soft_not_found(result: Result<Comment, StoreError>) -> Result<Json<Reply<Comment>>, ApiError> {
    match result {
        Ok(comment) => Ok(Json(Reply::Data(comment))),
        Err(StoreError::CommentNotFound {
            note_id,
            comment_id,
        }) => {
            warn!("Comment {} not found on note {}", comment_id, note_id);
            Ok(Json(Reply::Info(InfoMessage::new(COMMENT_NOT_FOUND))))
        }
        Err(e) => Err(e.into()),
    }
}

async fn like_comment(
    State(state): State<AppState>,
    Path((note_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Reply<Comment>>, ApiError> {
    let mut store = state.store()?;
    let result = resolve_ids(&store, &note_id, &comment_id)
        .and_then(|(note_id, comment_id)| store.like_comment(note_id, comment_id));
    soft_not_found(result)
}

async fn unlike_comment(
    State(state): State<AppState>,
    Path((note_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Reply<Comment>>, ApiError> {
    let mut store = state.store()?;
    let result = resolve_ids(&store, &note_id, &comment_id)
        .and_then(|(note_id, comment_id)| store.unlike_comment(note_id, comment_id));
    soft_not_found(result)
}

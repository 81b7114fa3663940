pub mod comments;
mod state;
pub mod tags;
#[cfg(test)]
mod test_utils;

pub use crate::tables::{
    Comment, CreateCommentRequest, CreateNoteRequest, CreateTagRequest, InfoMessage, Note, Tag,
    UpdateNoteRequest,
};
use crate::store::{parse_tag_list, NoteStore, SortKey, SortOrder, StoreError};
use crate::tables::integral_id;
use crate::NOTES_API;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
pub use state::AppState;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub const QUERY_REQUIRED_Q: &str = "Query parameter q is required";
pub const QUERY_REQUIRED_TAGS: &str = "Query parameter required";
pub const QUERY_REQUIRED_BY: &str = "Query parameter required 'by'";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Note not found")]
    NoteNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("{0}")]
    MissingQuery(&'static str),

    #[error("Internal server error")]
    InternalServerError,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NoteNotFound(_) => ApiError::NoteNotFound,
            StoreError::CommentNotFound { .. } => ApiError::CommentNotFound,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match self {
            ApiError::NoteNotFound | ApiError::CommentNotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(_) | ApiError::MissingQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ApiError::InvalidBody(details) => {
                warn!("Rejected request body: {}", details);
                json!({ "message": self.to_string(), "details": details })
            }
            _ => json!(InfoMessage::new(self.to_string())),
        };

        (status_code, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections are reported as [`ApiError::InvalidBody`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidJson<T>(pub T);

/// Either the requested data or a 200 informational message.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum Reply<T> {
    Data(T),
    Info(InfoMessage),
}

/// Reads a path id the way a JavaScript `Number()` conversion would for the
/// integral cases: `1`, ` 1 `, `1.0`, `1e0`, `0x1`, `0o1`, `0b1`. Anything
/// else, fractions included, never matches an id.
pub(crate) fn parse_id(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(id) = raw.parse::<i32>() {
        return Some(id);
    }

    let lower = raw.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &lower[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        return i32::from_str_radix(digits, radix).ok();
    }

    // Rust also accepts `inf`/`nan` spellings; those are not finite and drop out.
    raw.parse::<f64>().ok().and_then(integral_id)
}

#[derive(Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct FilterQuery {
    pub tags: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct SortQuery {
    pub by: Option<String>,
    pub order: Option<String>,
}

pub fn create_router(store: NoteStore) -> Router {
    let state = AppState::new(store);

    Router::new()
        .route(
            format!("/{NOTES_API}").as_str(),
            get(list_notes).post(create_note),
        )
        .route(format!("/{NOTES_API}/search").as_str(), get(search_notes))
        .route(format!("/{NOTES_API}/filter").as_str(), get(filter_notes))
        .route(format!("/{NOTES_API}/sort").as_str(), get(sort_notes))
        .route(
            format!("/{NOTES_API}/:id").as_str(),
            get(get_note).patch(update_note).delete(delete_note),
        )
        .merge(tags::create_router())
        .merge(comments::create_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let store = state.store()?;
    Ok(Json(store.notes().to_vec()))
}

async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let note_id = parse_id(&id).ok_or(ApiError::NoteNotFound)?;
    let store = state.store()?;
    Ok(Json(store.note(note_id)?.clone()))
}

async fn create_note(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = state.store()?.create_note(payload);
    info!("Created note {} with {} tags", note.id, note.tags.len());
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<ValidJson<UpdateNoteRequest>, ApiError>,
) -> Result<Json<Note>, ApiError> {
    let note_id = parse_id(&id).ok_or(ApiError::NoteNotFound)?;
    let mut store = state.store()?;
    // A missing note is reported before a malformed body.
    store.note(note_id)?;
    let ValidJson(payload) = payload?;

    let note = store.update_note(note_id, payload)?;
    info!("Updated note {}", note.id);
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let note_id = parse_id(&id).ok_or(ApiError::NoteNotFound)?;
    let note = state.store()?.delete_note(note_id)?;
    info!("Deleted note {}", note.id);
    Ok(Json(vec![note]))
}

async fn search_notes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let keyword = query
        .q
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::MissingQuery(QUERY_REQUIRED_Q))?;

    let results = state.store()?.search(&keyword);
    debug!("Search for {:?} matched {} notes", keyword, results.len());
    Ok(Json(results))
}

async fn filter_notes(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let raw = query
        .tags
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingQuery(QUERY_REQUIRED_TAGS))?;

    let requested = parse_tag_list(&raw);
    let results = state.store()?.filter_by_tags(&requested);
    debug!("Tag filter {:?} matched {} notes", requested, results.len());
    Ok(Json(results))
}

async fn sort_notes(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let key: SortKey = query
        .by
        .as_deref()
        .and_then(|by| by.parse().ok())
        .ok_or(ApiError::MissingQuery(QUERY_REQUIRED_BY))?;
    let order = SortOrder::from_param(query.order.as_deref());

    Ok(Json(state.store()?.sorted(key, order)))
}

#[cfg(test)]
mod tests {
    use super::test_utils::setup_test_state;
    use super::*;

    #[tokio::test]
    async fn test_note_crud() {
        let state = setup_test_state();

        // Test create
        let (status, Json(created)) = create_note(
            State(state.clone()),
            ValidJson(CreateNoteRequest {
                title: "Test Note".to_string(),
                content: "This is a test note".to_string(),
                tag_ids: vec![2],
            }),
        )
        .await
        .expect("Failed to create note");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id, 3);
        assert_eq!(created.tags[0].name, "personal");

        // Test get
        let Json(fetched) = get_note(State(state.clone()), Path("3".to_string()))
            .await
            .expect("Failed to get note");
        assert_eq!(fetched, created);

        // Test update
        let Json(updated) = update_note(
            State(state.clone()),
            Path("3".to_string()),
            Ok(ValidJson(UpdateNoteRequest {
                title: Some("Updated Note".to_string()),
                ..Default::default()
            })),
        )
        .await
        .expect("Failed to update note");
        assert_eq!(updated.title, "Updated Note");
        assert_eq!(updated.content, "This is a test note");

        // Test delete
        let Json(deleted) = delete_note(State(state.clone()), Path("3".to_string()))
            .await
            .expect("Failed to delete note");
        assert_eq!(deleted.len(), 1);

        // Verify deletion
        let get_result = get_note(State(state), Path("3".to_string())).await;
        assert!(matches!(get_result, Err(ApiError::NoteNotFound)));
    }

    #[tokio::test]
    async fn test_update_missing_note_wins_over_bad_body() {
        let state = setup_test_state();
        let result = update_note(
            State(state),
            Path("99".to_string()),
            Err(ApiError::InvalidBody("missing field".to_string())),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NoteNotFound)));
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let state = setup_test_state();
        let result = get_note(State(state), Path("abc".to_string())).await;
        assert!(matches!(result, Err(ApiError::NoteNotFound)));
    }

    #[tokio::test]
    async fn test_query_parameters_required() {
        let state = setup_test_state();

        let search = search_notes(State(state.clone()), Query(SearchQuery { q: None })).await;
        assert!(matches!(search, Err(ApiError::MissingQuery(QUERY_REQUIRED_Q))));

        let empty = search_notes(
            State(state.clone()),
            Query(SearchQuery {
                q: Some(String::new()),
            }),
        )
        .await;
        assert!(empty.is_err());

        let filter = filter_notes(State(state.clone()), Query(FilterQuery::default())).await;
        assert!(matches!(filter, Err(ApiError::MissingQuery(QUERY_REQUIRED_TAGS))));

        let sort = sort_notes(
            State(state),
            Query(SortQuery {
                by: Some("id".to_string()),
                order: None,
            }),
        )
        .await;
        assert!(matches!(sort, Err(ApiError::MissingQuery(QUERY_REQUIRED_BY))));
    }

    #[tokio::test]
    async fn test_sort_order_defaults_to_ascending() {
        let state = setup_test_state();
        let Json(sorted) = sort_notes(
            State(state),
            Query(SortQuery {
                by: Some("title".to_string()),
                order: Some("sideways".to_string()),
            }),
        )
        .await
        .expect("Failed to sort notes");
        let titles: Vec<_> = sorted.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Buy groceries", "Finish report"]);
    }

    #[test]
    fn test_parse_id_follows_number_conversion() {
        for raw in ["1", " 1 ", "1.0", "1e0", "+1", "0x1", "0X1", "0o1", "0b1", "1."] {
            assert_eq!(parse_id(raw), Some(1), "{raw}");
        }
        for raw in ["", "abc", "1.5", "0x", "0x-1", "1_0", "Infinity", "NaN", "1e10"] {
            assert_eq!(parse_id(raw), None, "{raw}");
        }
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::NoteNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidBody(String::new()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InternalServerError.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

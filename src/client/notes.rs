use super::{read_json, ClientError};
pub use crate::tables::{CreateNoteRequest, Note, UpdateNoteRequest};
use crate::NOTES_API;

// * Client ...................................................................
// ** Create ..................................................................

pub async fn create_note(base_url: &str, note: &CreateNoteRequest) -> Result<Note, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{}/{NOTES_API}", base_url);
    let response = client.post(&url).json(note).send().await?;
    read_json(response).await
}

// ** Read ....................................................................

pub async fn fetch_notes(base_url: &str) -> Result<Vec<Note>, ClientError> {
    let url = format!("{}/{NOTES_API}", base_url);
    let response = reqwest::get(url).await?;
    read_json(response).await
}

pub async fn fetch_note(base_url: &str, id: i32) -> Result<Note, ClientError> {
    let url = format!("{}/{NOTES_API}/{}", base_url, id);
    let response = reqwest::get(url).await?;
    read_json(response).await
}

// ** Update ..................................................................

pub async fn update_note(
    base_url: &str,
    id: i32,
    note: &UpdateNoteRequest,
) -> Result<Note, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{}/{NOTES_API}/{}", base_url, id);
    let response = client.patch(&url).json(note).send().await?;
    read_json(response).await
}

// ** Delete ..................................................................

pub async fn delete_note(base_url: &str, id: i32) -> Result<Note, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{}/{NOTES_API}/{}", base_url, id);
    let response = client.delete(&url).send().await?;
    let deleted: Vec<Note> = read_json(response).await?;
    deleted
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::NotFound(format!("Note {} not deleted", id)))
}

// ** Queries .................................................................

pub async fn search_notes(base_url: &str, keyword: &str) -> Result<Vec<Note>, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{}/{NOTES_API}/search", base_url);
    let response = client.get(&url).query(&[("q", keyword)]).send().await?;
    read_json(response).await
}

/// Notes carrying every tag in `tags`.
pub async fn filter_notes(base_url: &str, tags: &[&str]) -> Result<Vec<Note>, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{}/{NOTES_API}/filter", base_url);
    let response = client
        .get(&url)
        .query(&[("tags", tags.join(","))])
        .send()
        .await?;
    read_json(response).await
}

/// `by` is `title` or `createdAt`; `order` is `asc` or `desc`.
pub async fn sort_notes(
    base_url: &str,
    by: &str,
    order: Option<&str>,
) -> Result<Vec<Note>, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{}/{NOTES_API}/sort", base_url);
    let mut request = client.get(&url).query(&[("by", by)]);
    if let Some(order) = order {
        request = request.query(&[("order", order)]);
    }
    read_json(request.send().await?).await
}

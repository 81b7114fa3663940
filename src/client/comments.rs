use super::{read_json, read_reply, ClientError};
pub use crate::tables::{Comment, CreateCommentRequest};
use crate::NOTES_API;

fn comments_url(base_url: &str, note_id: i32) -> String {
    format!("{}/{NOTES_API}/{}/comments", base_url, note_id)
}

pub async fn create_comment(
    base_url: &str,
    note_id: i32,
    comment: &CreateCommentRequest,
) -> Result<Comment, ClientError> {
    let client = reqwest::Client::new();
    let response = client
        .post(comments_url(base_url, note_id))
        .json(comment)
        .send()
        .await?;
    read_json(response).await
}

pub async fn fetch_comments(base_url: &str, note_id: i32) -> Result<Vec<Comment>, ClientError> {
    let response = reqwest::get(comments_url(base_url, note_id)).await?;
    read_reply(response).await
}

pub async fn delete_comment(
    base_url: &str,
    note_id: i32,
    comment_id: i32,
) -> Result<Comment, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{}/{}", comments_url(base_url, note_id), comment_id);
    let deleted: Vec<Comment> = read_json(client.delete(&url).send().await?).await?;
    deleted
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::NotFound(format!("Comment {} not deleted", comment_id)))
}

async fn vote(
    base_url: &str,
    note_id: i32,
    comment_id: i32,
    action: &str,
) -> Result<Comment, ClientError> {
    let client = reqwest::Client::new();
    let url = format!(
        "{}/{}/{}",
        comments_url(base_url, note_id),
        comment_id,
        action
    );
    read_reply(client.post(&url).send().await?).await
}

pub async fn like_comment(
    base_url: &str,
    note_id: i32,
    comment_id: i32,
) -> Result<Comment, ClientError> {
    vote(base_url, note_id, comment_id, "like").await
}

pub async fn unlike_comment(
    base_url: &str,
    note_id: i32,
    comment_id: i32,
) -> Result<Comment, ClientError> {
    vote(base_url, note_id, comment_id, "unlike").await
}

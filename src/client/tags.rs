use super::{read_json, ClientError};
pub use crate::tables::{CreateTagRequest, Tag};
use crate::TAGS_API;

pub async fn fetch_tags(base_url: &str) -> Result<Vec<Tag>, ClientError> {
    let url = format!("{}/{TAGS_API}", base_url);
    let response = reqwest::get(url).await?;
    read_json(response).await
}

/// The server echoes the request rather than returning the stored tag.
pub async fn create_tag(
    base_url: &str,
    tag: &CreateTagRequest,
) -> Result<CreateTagRequest, ClientError> {
    let client = reqwest::Client::new();
    let url = format!("{}/{TAGS_API}", base_url);
    let response = client.post(&url).json(tag).send().await?;
    read_json(response).await
}

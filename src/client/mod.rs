pub mod comments;
pub mod notes;
pub mod tags;

pub use crate::api::Reply;
pub use crate::tables::InfoMessage;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

// Re-export the modules
pub use comments::*;
pub use notes::*;
pub use tags::*;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unexpected server error ({0}): {1}")]
    ServerError(StatusCode, String),
}

// The server puts a human readable reason under "message".
async fn error_message(response: Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    serde_json::from_str::<InfoMessage>(&text)
        .map(|info| info.message)
        .unwrap_or(text)
}

/// Maps error statuses to [`ClientError`] and decodes a successful body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(error_message(response).await));
    }
    if status == StatusCode::BAD_REQUEST {
        return Err(ClientError::BadRequest(error_message(response).await));
    }
    if !status.is_success() {
        return Err(ClientError::ServerError(status, error_message(response).await));
    }

    Ok(response.json::<T>().await?)
}

/// Like [`read_json`], but a 200 informational reply counts as not found.
pub(crate) async fn read_reply<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    match read_json::<Reply<T>>(response).await? {
        Reply::Data(data) => Ok(data),
        Reply::Info(info) => Err(ClientError::NotFound(info.message)),
    }
}

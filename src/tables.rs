use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Accepts any JSON number as an id; only whole numbers in range can match.
pub(crate) fn integral_id(value: f64) -> Option<i32> {
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    (value.fract() == 0.0 && in_range).then_some(value as i32)
}

fn deserialize_tag_ids<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<f64>::deserialize(deserializer)?;
    Ok(raw.into_iter().filter_map(integral_id).collect())
}

fn deserialize_optional_tag_ids<'de, D>(deserializer: D) -> Result<Option<Vec<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<f64>>::deserialize(deserializer)?;
    Ok(raw.map(|ids| ids.into_iter().filter_map(integral_id).collect()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// A note carries copies of its tags taken when the note was last written,
/// not references into the tag collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub note_id: i32,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub likes: u32,
}

// Request payloads

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_tag_ids")]
    pub tag_ids: Vec<i32>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_tag_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
    pub author: String,
}

/// Body of every plain-message reply, error or informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoMessage {
    pub message: String,
}

impl InfoMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_ids_accept_whole_floats() {
        let request: CreateNoteRequest = serde_json::from_value(json!({
            "title": "t",
            "content": "c",
            "tagIds": [1.0, 2.5, 3, 1e10]
        }))
        .unwrap();
        assert_eq!(request.tag_ids, vec![1, 3]);

        let patch: UpdateNoteRequest =
            serde_json::from_value(json!({ "tagIds": [2.0] })).unwrap();
        assert_eq!(patch.tag_ids, Some(vec![2]));

        let empty: UpdateNoteRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.tag_ids, None);
    }

    #[test]
    fn test_tag_ids_reject_non_numbers() {
        let result = serde_json::from_value::<UpdateNoteRequest>(json!({ "tagIds": "x" }));
        assert!(result.is_err());
        let result = serde_json::from_value::<CreateNoteRequest>(json!({
            "title": "t",
            "content": "c",
            "tagIds": ["1"]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_integral_id() {
        assert_eq!(integral_id(4.0), Some(4));
        assert_eq!(integral_id(-0.0), Some(0));
        assert_eq!(integral_id(0.5), None);
        assert_eq!(integral_id(f64::NAN), None);
        assert_eq!(integral_id(f64::INFINITY), None);
    }
}

use crate::tables::{Comment, CreateCommentRequest, CreateNoteRequest, Note, Tag, UpdateNoteRequest};
use chrono::Utc;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Note not found")]
    NoteNotFound(i32),

    #[error("Comment not found")]
    CommentNotFound { note_id: i32, comment_id: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    CreatedAt,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort key: {0}")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortKey::Title),
            "createdAt" => Ok(SortKey::CreatedAt),
            other => Err(UnknownSortKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only an exact `desc` selects descending order.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Splits a comma separated tag list into trimmed, lowercased names.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|t| t.trim().to_lowercase()).collect()
}

// Base letters only: decomposed, accents stripped, lowercased.
fn primary_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn accent_key(title: &str) -> String {
    title.nfd().flat_map(char::to_lowercase).collect()
}

/// Collation-style title order: base letters first, then unaccented before
/// accented, then lowercase before uppercase.
fn compare_titles(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| b.cmp(a))
}

/// In-memory owner of tags, notes and comments.
///
/// New ids are `collection length + 1`, so an id freed by a deletion can be
/// handed out again.
#[derive(Debug, Default, Clone)]
pub struct NoteStore {
    tags: Vec<Tag>,
    notes: Vec<Note>,
    comments: Vec<Comment>,
}

impl NoteStore {
    /// Startup state: three tags and two notes, no comments.
    pub fn seeded() -> Self {
        let tags = vec![
            Tag {
                id: 1,
                name: "work".to_string(),
            },
            Tag {
                id: 2,
                name: "personal".to_string(),
            },
            Tag {
                id: 3,
                name: "urgent".to_string(),
            },
        ];

        let notes = vec![
            Note {
                id: 1,
                title: "Finish report".to_string(),
                content: "Complete report by Friday".to_string(),
                tags: vec![tags[0].clone(), tags[2].clone()],
                created_at: Utc::now(),
            },
            Note {
                id: 2,
                title: "Buy groceries".to_string(),
                content: "Milk, bread, eggs".to_string(),
                tags: vec![tags[1].clone()],
                created_at: Utc::now(),
            },
        ];

        Self {
            tags,
            notes,
            comments: Vec::new(),
        }
    }

    fn next_id(len: usize) -> i32 {
        i32::try_from(len).map_or(i32::MAX, |n| n.saturating_add(1))
    }

    /// Tags whose id appears in `tag_ids`, in tag collection order.
    /// Unknown ids are dropped.
    fn resolve_tags(&self, tag_ids: &[i32]) -> Vec<Tag> {
        self.tags
            .iter()
            .filter(|t| tag_ids.contains(&t.id))
            .cloned()
            .collect()
    }

    fn note_index(&self, note_id: i32) -> Result<usize, StoreError> {
        self.notes
            .iter()
            .position(|n| n.id == note_id)
            .ok_or(StoreError::NoteNotFound(note_id))
    }

    fn comment_index(&self, note_id: i32, comment_id: i32) -> Result<usize, StoreError> {
        self.note_index(note_id)?;
        self.comments
            .iter()
            .position(|c| c.id == comment_id && c.note_id == note_id)
            .ok_or(StoreError::CommentNotFound {
                note_id,
                comment_id,
            })
    }

    // * Notes ................................................................

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, note_id: i32) -> Result<&Note, StoreError> {
        let idx = self.note_index(note_id)?;
        Ok(&self.notes[idx])
    }

    pub fn create_note(&mut self, request: CreateNoteRequest) -> Note {
        let note = Note {
            id: Self::next_id(self.notes.len()),
            title: request.title,
            content: request.content,
            tags: self.resolve_tags(&request.tag_ids),
            created_at: Utc::now(),
        };
        self.notes.push(note.clone());
        note
    }

    /// Applies only the supplied fields. `tag_ids`, when present, replaces
    /// the whole tag set.
    pub fn update_note(
        &mut self,
        note_id: i32,
        request: UpdateNoteRequest,
    ) -> Result<Note, StoreError> {
        let idx = self.note_index(note_id)?;
        let tags = request.tag_ids.as_deref().map(|ids| self.resolve_tags(ids));

        let note = &mut self.notes[idx];
        if let Some(title) = request.title {
            note.title = title;
        }
        if let Some(content) = request.content {
            note.content = content;
        }
        if let Some(tags) = tags {
            note.tags = tags;
        }
        Ok(note.clone())
    }

    pub fn delete_note(&mut self, note_id: i32) -> Result<Note, StoreError> {
        let idx = self.note_index(note_id)?;
        Ok(self.notes.remove(idx))
    }

    // * Tags .................................................................

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn create_tag(&mut self, name: String) -> Tag {
        let tag = Tag {
            id: Self::next_id(self.tags.len()),
            name,
        };
        self.tags.push(tag.clone());
        tag
    }

    // * Comments .............................................................

    pub fn add_comment(
        &mut self,
        note_id: i32,
        request: CreateCommentRequest,
    ) -> Result<Comment, StoreError> {
        self.note_index(note_id)?;
        let comment = Comment {
            id: Self::next_id(self.comments.len()),
            note_id,
            text: request.text,
            author: request.author,
            created_at: Utc::now(),
            likes: 0,
        };
        self.comments.push(comment.clone());
        Ok(comment)
    }

    pub fn comments_for_note(&self, note_id: i32) -> Result<Vec<Comment>, StoreError> {
        self.note_index(note_id)?;
        Ok(self
            .comments
            .iter()
            .filter(|c| c.note_id == note_id)
            .cloned()
            .collect())
    }

    pub fn delete_comment(&mut self, note_id: i32, comment_id: i32) -> Result<Comment, StoreError> {
        let idx = self.comment_index(note_id, comment_id)?;
        Ok(self.comments.remove(idx))
    }

    pub fn like_comment(&mut self, note_id: i32, comment_id: i32) -> Result<Comment, StoreError> {
        let idx = self.comment_index(note_id, comment_id)?;
        let comment = &mut self.comments[idx];
        comment.likes = comment.likes.saturating_add(1);
        Ok(comment.clone())
    }

    /// Never takes `likes` below zero.
    pub fn unlike_comment(&mut self, note_id: i32, comment_id: i32) -> Result<Comment, StoreError> {
        let idx = self.comment_index(note_id, comment_id)?;
        let comment = &mut self.comments[idx];
        comment.likes = comment.likes.saturating_sub(1);
        Ok(comment.clone())
    }

    // * Queries ..............................................................

    /// Case-insensitive substring match on title or content.
    pub fn search(&self, keyword: &str) -> Vec<Note> {
        let keyword = keyword.to_lowercase();
        self.notes
            .iter()
            .filter(|n| {
                n.title.to_lowercase().contains(&keyword)
                    || n.content.to_lowercase().contains(&keyword)
            })
            .cloned()
            .collect()
    }

    /// Notes carrying every one of `names`. Names are expected to be
    /// normalised with [`parse_tag_list`].
    pub fn filter_by_tags(&self, names: &[String]) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|n| {
                names.iter().all(|name| {
                    n.tags
                        .iter()
                        .any(|t| t.name.trim().to_lowercase() == *name)
                })
            })
            .cloned()
            .collect()
    }

    /// A sorted copy of all notes; the stored order is untouched.
    ///
    /// Descending is an ascending stable sort followed by a reverse, so
    /// notes with equal keys come out in reverse insertion order.
    pub fn sorted(&self, key: SortKey, order: SortOrder) -> Vec<Note> {
        let mut sorted = self.notes.clone();
        match key {
            SortKey::Title => sorted.sort_by(|a, b| compare_titles(&a.title, &b.title)),
            SortKey::CreatedAt => sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        if order == SortOrder::Desc {
            sorted.reverse();
        }
        sorted
    }
}

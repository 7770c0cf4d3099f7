use serde::{Deserialize, Serialize};

/// User-visible fields stored alongside a point's vector.
///
/// `content` is the text the embedding was derived from; `category` is an
/// optional tag used for filtered search and stats bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
}

impl DocumentPayload {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category,
        }
    }
}

/// A stored document: one point in the vector store, addressed by a
/// caller-assigned integer id. Create and update share upsert semantics;
/// an existing id is replaced wholesale, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub payload: DocumentPayload,
}

impl Document {
    pub fn new(id: u64, payload: DocumentPayload) -> Self {
        Self { id, payload }
    }
}

/// A similarity match. Higher score is better under cosine distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: u64,
    pub score: f32,
    pub payload: DocumentPayload,
}

/// One page of a scan. `next_offset` is an opaque cursor to pass back
/// verbatim; `None` means the scan is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPage {
    pub documents: Vec<Document>,
    pub next_offset: Option<u64>,
}

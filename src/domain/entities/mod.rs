mod document;
mod embedding;

pub use document::{Document, DocumentPage, DocumentPayload, SearchHit};
pub use embedding::Embedding;

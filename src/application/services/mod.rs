mod documents;

pub use documents::{CollectionStats, DocumentService};

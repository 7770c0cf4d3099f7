//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! infrastructure, so every use-case is testable against in-memory doubles.

pub mod services;

pub use services::{CollectionStats, DocumentService};

pub mod config;
pub mod embedding;
pub mod vector_store;

pub use config::{Config, CorsConfig, EmbeddingConfig, QdrantConfig, ServerConfig};
pub use embedding::TextEmbedding;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};

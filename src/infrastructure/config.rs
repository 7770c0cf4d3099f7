use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub qdrant: QdrantConfig,
    pub embedding: EmbeddingConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    /// Collection vector size. Fixed at startup rather than queried from
    /// the provider per request, so a provider swap cannot silently change
    /// the dimensionality an existing collection was created with.
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port: u16 = env_or("SERVER_PORT", "8000").parse()?;
        let dimension: usize = env_or("EMBEDDING_DIMENSION", "1536").parse()?;

        let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            qdrant: QdrantConfig {
                url: env_or("QDRANT_URL", "http://localhost:6334"),
            },
            embedding: EmbeddingConfig {
                model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
                dimension,
            },
            server: ServerConfig {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port,
            },
            cors: CorsConfig { allowed_origins },
            collection: env_or("KB_COLLECTION", "kb_embedded"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant: QdrantConfig {
                url: "http://localhost:6334".to_string(),
            },
            embedding: EmbeddingConfig {
                model: "text-embedding-3-small".to_string(),
                dimension: 1536,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            cors: CorsConfig::default(),
            collection: "kb_embedded".to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

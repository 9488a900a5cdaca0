use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Axiom server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the Qdrant instance that stores document chunks.
    pub qdrant_url: String,
    /// Name of the Qdrant collection used for document storage.
    pub qdrant_collection_name: String,
    /// Optional API key required to access Qdrant.
    pub qdrant_api_key: Option<String>,
    /// Embedding backend used to generate vector representations.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Base URL of the Ollama runtime, when that provider is selected.
    pub ollama_url: Option<String>,
    /// Window size used by the character chunker.
    pub chunk_size: usize,
    /// Overlap between adjacent chunk windows, in characters.
    pub chunk_overlap: usize,
    /// Result count applied when a search request omits `top_k`.
    pub search_default_top_k: usize,
    /// Hard cap applied to any requested `top_k`.
    pub search_max_top_k: usize,
    /// Minimum similarity accepted from the store (0.0 disables the floor).
    pub search_score_floor: f32,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported embedding backends for the ingestion pipeline.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Deterministic byte-folding embedder, useful offline and in tests.
    Hash,
}

const DEFAULT_CHUNK_SIZE: usize = 1000;
const DEFAULT_CHUNK_OVERLAP: usize = 200;
const DEFAULT_TOP_K: usize = 5;
const DEFAULT_MAX_TOP_K: usize = 50;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            qdrant_url: load_env("QDRANT_URL")?,
            qdrant_collection_name: load_env("QDRANT_COLLECTION_NAME")?,
            qdrant_api_key: load_env_optional("QDRANT_API_KEY"),
            embedding_provider: load_env("EMBEDDING_PROVIDER")?.parse().map_err(|()| {
                ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string())
            })?,
            embedding_model: load_env("EMBEDDING_MODEL")?,
            embedding_dimension: load_env("EMBEDDING_DIMENSION")?
                .parse()
                .map_err(|_| ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()))?,
            ollama_url: load_env_optional("OLLAMA_URL"),
            chunk_size: parse_optional("CHUNK_SIZE")?.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: parse_optional("CHUNK_OVERLAP")?.unwrap_or(DEFAULT_CHUNK_OVERLAP),
            search_default_top_k: parse_optional("SEARCH_DEFAULT_TOP_K")?.unwrap_or(DEFAULT_TOP_K),
            search_max_top_k: parse_optional("SEARCH_MAX_TOP_K")?.unwrap_or(DEFAULT_MAX_TOP_K),
            search_score_floor: parse_optional("SEARCH_SCORE_FLOOR")?.unwrap_or(0.0),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hash" => Ok(Self::Hash),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        qdrant_url = %config.qdrant_url,
        collection = %config.qdrant_collection_name,
        embedding_provider = ?config.embedding_provider,
        embedding_dimension = config.embedding_dimension,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a Q&A assistant. Your goal is to answer questions \
based on the text given. You'll also provide the previous chat history if there is any so answer \
to the last question asked.";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub chat: ChatConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub context_window: usize,
    pub max_new_tokens: usize,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub history_window: usize,
    pub chunk_size: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 7000,
            },
            llm: LlmConfig {
                model: "claude-3-opus-20240229".to_string(),
                context_window: 4096,
                max_new_tokens: 1024,
                system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            },
            embedding: EmbeddingConfig {
                model: "text-embedding-3-small".to_string(),
                dimension: 1536,
            },
            chat: ChatConfig {
                history_window: 10,
                chunk_size: 1024,
                top_k: 5,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploaded_files"),
            },
        }
    }
}

impl Config {
    /// Defaults overridden by environment variables where present. Call after
    /// `dotenvy::dotenv()` so `.env` entries are visible.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SERVER_HOST") {
            config.server.host = host;
        }
        if let Some(port) = env_parse("SERVER_PORT") {
            config.server.port = port;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.llm.model = model;
        }
        if let Some(window) = env_parse("CONTEXT_WINDOW") {
            config.llm.context_window = window;
        }
        if let Some(tokens) = env_parse("MAX_NEW_TOKENS") {
            config.llm.max_new_tokens = tokens;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Some(dimension) = env_parse("EMBEDDING_DIMENSION") {
            config.embedding.dimension = dimension;
        }
        if let Some(window) = env_parse("HISTORY_WINDOW") {
            config.chat.history_window = window;
        }
        if let Some(size) = env_parse("CHUNK_SIZE") {
            config.chat.chunk_size = size;
        }
        if let Some(top_k) = env_parse("TOP_K") {
            config.chat.top_k = top_k;
        }
        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            config.storage.upload_dir = PathBuf::from(dir);
        }

        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_deployment() {
        let config = Config::default();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.chat.history_window, 10);
        assert_eq!(config.chat.chunk_size, 1024);
        assert_eq!(config.llm.context_window, 4096);
        assert_eq!(config.llm.max_new_tokens, 1024);
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploaded_files"));
    }
}

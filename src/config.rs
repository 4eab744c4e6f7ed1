use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_SECRETS_PATH: &str = ".study-mode/secrets.toml";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

/// Credential names accepted from the secrets file and the environment, in lookup order.
const API_KEY_NAMES: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    /// Idle sessions are dropped after this many seconds; 0 keeps them forever.
    pub session_ttl_secs: u64,
}

#[derive(Clone, Deserialize)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LLMConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LLMConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load configuration from `.env`, the process environment and the secrets file.
    /// `secrets_path` overrides `STUDY_MODE_SECRETS`.
    pub fn load(secrets_path: Option<PathBuf>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(secrets_path, |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(secrets_path: Option<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets_path = secrets_path
            .or_else(|| lookup("STUDY_MODE_SECRETS").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_PATH));

        Ok(Self {
            server: ServerConfig {
                port: lookup("PORT")
                    .unwrap_or_else(|| "8501".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                cors_allowed_origins: lookup("ALLOWED_ORIGINS")
                    .unwrap_or_else(|| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|| (20 * 1024 * 1024).to_string())
                    .parse()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                session_ttl_secs: lookup("SESSION_TTL_SECS")
                    .map(|v| v.parse())
                    .transpose()
                    .context("SESSION_TTL_SECS must be a number of seconds")?
                    .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            },
            llm: LLMConfig {
                api_key: resolve_api_key(&secrets_path, &lookup),
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_base: lookup("GEMINI_API_BASE")
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                max_tokens: lookup("LLM_MAX_TOKENS")
                    .map(|v| v.parse())
                    .transpose()
                    .context("LLM_MAX_TOKENS must be an integer")?,
                temperature: lookup("LLM_TEMPERATURE")
                    .map(|v| v.parse())
                    .transpose()
                    .context("LLM_TEMPERATURE must be a number")?,
            },
            logging: LoggingConfig {
                filter: lookup("RUST_LOG")
                    .unwrap_or_else(|| "study_mode=debug,tower_http=debug".to_string()),
                log_dir: lookup("LOG_DIR").map(PathBuf::from),
            },
        })
    }
}

/// Find the generation service credential.
///
/// The secrets file wins over the environment; within each source the names in
/// `API_KEY_NAMES` are tried in order. Blank values are treated as absent.
pub fn resolve_api_key<F>(secrets_path: &Path, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = read_secrets_file(secrets_path) {
        debug!(path = %secrets_path.display(), "API key loaded from secrets file");
        return Some(key);
    }

    API_KEY_NAMES
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn read_secrets_file(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }

    let settings = match config::Config::builder()
        .add_source(
            config::File::from(path.to_path_buf())
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .build()
    {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), "Failed to read secrets file: {}", e);
            return None;
        }
    };

    // Older `config` releases lowercase keys, so accept both spellings.
    API_KEY_NAMES
        .iter()
        .flat_map(|name| [name.to_string(), name.to_lowercase()])
        .filter_map(|name| settings.get_string(&name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_lookup(
            Some(temp_dir.path().join("missing.toml")),
            lookup_from(&[]),
        )
        .unwrap();

        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.cors_allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.server.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.api_base, DEFAULT_API_BASE);
        assert!(!config.llm.has_api_key());
        assert!(config.llm.max_tokens.is_none());
    }

    #[test]
    fn test_gemini_key_preferred_over_google_key() {
        let temp_dir = TempDir::new().unwrap();
        let lookup = lookup_from(&[("GEMINI_API_KEY", "gemini"), ("GOOGLE_API_KEY", "google")]);
        let key = resolve_api_key(&temp_dir.path().join("none.toml"), &lookup);
        assert_eq!(key.as_deref(), Some("gemini"));
    }

    #[test]
    fn test_google_key_fallback_and_blank_values() {
        let temp_dir = TempDir::new().unwrap();
        let lookup = lookup_from(&[("GEMINI_API_KEY", "   "), ("GOOGLE_API_KEY", "google")]);
        let key = resolve_api_key(&temp_dir.path().join("none.toml"), &lookup);
        assert_eq!(key.as_deref(), Some("google"));

        let lookup = lookup_from(&[("GEMINI_API_KEY", "")]);
        assert!(resolve_api_key(&temp_dir.path().join("none.toml"), &lookup).is_none());
    }

    #[test]
    fn test_secrets_file_wins() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secrets.toml");
        std::fs::write(&path, "GEMINI_API_KEY = \"from-file\"\n").unwrap();

        let lookup = lookup_from(&[("GEMINI_API_KEY", "from-env")]);
        let key = resolve_api_key(&path, &lookup);
        assert_eq!(key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::from_lookup(
            Some(temp_dir.path().join("missing.toml")),
            lookup_from(&[("PORT", "not-a-port")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_session_ttl_override() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_lookup(
            Some(temp_dir.path().join("missing.toml")),
            lookup_from(&[("SESSION_TTL_SECS", "0")]),
        )
        .unwrap();
        assert_eq!(config.server.session_ttl_secs, 0);

        let result = Config::from_lookup(
            Some(temp_dir.path().join("missing.toml")),
            lookup_from(&[("SESSION_TTL_SECS", "an hour")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_masks_api_key() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_lookup(
            Some(temp_dir.path().join("missing.toml")),
            lookup_from(&[("GEMINI_API_KEY", "super-secret")]),
        )
        .unwrap();
        let rendered = format!("{:?}", config.llm);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }
}

use anyhow::Result;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SONGS_DIR: &str = "songs";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PLAYLIST_SIZE: usize = 20;
pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 20;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub songs_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub public_base_url: Option<String>, // defaults to http://localhost:<port>
    pub playlist_size: usize,
    pub llm: Option<LlmConfig>, // None: keyword matching only
}

/// Language model endpoint used for mood prompts
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Values given on the command line win over the environment
#[derive(Debug, Default)]
pub struct Overrides {
    pub songs_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub public_base_url: Option<String>,
    pub playlist_size: Option<usize>,
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {key}: '{raw}' ({e})")),
        _ => Ok(default),
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    /// Build configuration from any variable lookup (the process environment
    /// in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let songs_dir = non_empty(&lookup, "SONGS_DIR").unwrap_or_else(|| DEFAULT_SONGS_DIR.to_string());
        let host = non_empty(&lookup, "HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let playlist_size = parse_var(&lookup, "PLAYLIST_SIZE", DEFAULT_PLAYLIST_SIZE)?;

        let llm = match non_empty(&lookup, "LLM_API_KEY") {
            Some(api_key) => Some(LlmConfig {
                api_url: non_empty(&lookup, "LLM_API_URL")
                    .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
                api_key,
                model: non_empty(&lookup, "LLM_MODEL")
                    .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                timeout: Duration::from_secs(parse_var(
                    &lookup,
                    "LLM_TIMEOUT_SECS",
                    DEFAULT_LLM_TIMEOUT_SECS,
                )?),
            }),
            None => None,
        };

        let config = Config {
            songs_dir: PathBuf::from(songs_dir),
            host,
            port,
            public_base_url: non_empty(&lookup, "PUBLIC_BASE_URL"),
            playlist_size,
            llm,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Config> {
        if let Some(songs_dir) = overrides.songs_dir {
            self.songs_dir = songs_dir;
        }
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(public_base_url) = overrides.public_base_url {
            self.public_base_url = Some(public_base_url);
        }
        if let Some(playlist_size) = overrides.playlist_size {
            self.playlist_size = playlist_size;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.playlist_size == 0 {
            anyhow::bail!("PLAYLIST_SIZE must be at least 1");
        }
        Ok(())
    }

    /// Base URL the browser uses to reach this server
    pub fn public_base_url(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
            .trim_end_matches('/')
            .to_string()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    Config::from_lookup(|key| std::env::var(key).ok())
}

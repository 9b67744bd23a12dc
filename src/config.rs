//! Configuration management for nowplaylist.
//!
//! Values come from environment variables, optionally seeded from `.env` files.
//! They are resolved exactly once at startup into a typed [`Settings`] value
//! which is then handed to the components that need it; nothing reads the
//! environment after that point.
//!
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the local data directory (`nowplaylist/.env`)
//! 3. `.env` in the working directory
//! 4. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_NOW_PLAYING_URL: &str = "https://radio.streemlion.com:2405/status-json.xsl";

/// Upper bound for a single request task.
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Loads environment variables from `.env` files.
///
/// Creates the local data directory if needed and reads
/// `nowplaylist/.env` from it, then a `.env` in the current working
/// directory. Variables that are already set are never overwritten, and a
/// missing file is not an error.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/nowplaylist/.env`
/// - macOS: `~/Library/Application Support/nowplaylist/.env`
/// - Windows: `%LOCALAPPDATA%/nowplaylist/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created.
pub async fn load_env() -> Result<(), String> {
    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    let _ = dotenv::from_path(&path);
    let _ = dotenv::dotenv();
    Ok(())
}

fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("nowplaylist/.env");
    path
}

/// Which kind of now-playing endpoint `NOW_PLAYING_URL` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Icecast,
    Widget,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "icecast" => Ok(SourceKind::Icecast),
            "widget" => Ok(SourceKind::Widget),
            other => Err(format!("unknown now-playing source {other}")),
        }
    }
}

/// Typed application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
    pub playlist_id: Option<String>,

    pub api_url: String,
    pub token_url: String,
    pub auth_url: String,

    pub concurrency: usize,
    pub max_retries: u32,
    pub request_interval: Duration,
    pub request_timeout: Duration,
    pub page_delay: Duration,
    pub poll_interval: Duration,

    pub source_kind: SourceKind,
    pub source_url: String,

    pub songs_log: PathBuf,
    pub mystery_log: PathBuf,

    pub server_addr: SocketAddr,
    pub redirect_uri: String,
    pub log_level: String,
}

impl Settings {
    /// Resolves settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves settings from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset. Durations are given in milliseconds,
    /// and `REQUEST_TIMEOUT` is clamped to [`MAX_REQUEST_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] when the client credentials are absent and
    /// [`ConfigError::Invalid`] when a numeric or enumerated value does not parse,
    /// or when `SPOTIFY_CONCURRENCY` or `INTERVAL` is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let client_id = get("SPOTIFY_CLIENT_ID").ok_or(ConfigError::Missing("SPOTIFY_CLIENT_ID"))?;
        let client_secret =
            get("SPOTIFY_CLIENT_SECRET").ok_or(ConfigError::Missing("SPOTIFY_CLIENT_SECRET"))?;

        let server_addr: SocketAddr =
            parse_or(&get, "SERVER_ADDRESS", SocketAddr::from(([127, 0, 0, 1], 8675)))?;
        let redirect_uri = get("SPOTIFY_REDIRECT_URI")
            .unwrap_or_else(|| format!("http://{server_addr}/authorize"));

        let concurrency: usize = parse_or(&get, "SPOTIFY_CONCURRENCY", 1)?;
        if concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "SPOTIFY_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        let request_timeout = millis_or(&get, "REQUEST_TIMEOUT", 10_000)?.min(MAX_REQUEST_TIMEOUT);

        let poll_interval = millis_or(&get, "INTERVAL", 60_000)?;
        if poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                key: "INTERVAL",
                value: get("INTERVAL").unwrap_or_default(),
            });
        }

        Ok(Self {
            client_id,
            client_secret,
            refresh_token: get("SPOTIFY_REFRESH_TOKEN"),
            playlist_id: get("SPOTIFY_PLAYLIST_ID"),
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            token_url: get("SPOTIFY_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            auth_url: get("SPOTIFY_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            concurrency,
            max_retries: parse_or(&get, "MAX_RETRIES", 3)?,
            request_interval: millis_or(&get, "REQUEST_INTERVAL", 500)?,
            request_timeout,
            page_delay: millis_or(&get, "PAGE_DELAY", 1_000)?,
            poll_interval,
            source_kind: parse_or(&get, "NOW_PLAYING_SOURCE", SourceKind::Icecast)?,
            source_url: get("NOW_PLAYING_URL").unwrap_or_else(|| DEFAULT_NOW_PLAYING_URL.to_string()),
            songs_log: get("SONGS_TXT_FN")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("songs.txt")),
            mystery_log: get("MYSTERY_SONGS_TXT_FN")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("mystery-songs.txt")),
            server_addr,
            redirect_uri,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The long-lived refresh credential, required by every provider call.
    pub fn require_refresh_token(&self) -> Result<&str, ConfigError> {
        self.refresh_token
            .as_deref()
            .ok_or(ConfigError::Missing("SPOTIFY_REFRESH_TOKEN"))
    }

    /// The managed playlist, required by `run`, `playlist` and `import`.
    pub fn require_playlist_id(&self) -> Result<&str, ConfigError> {
        self.playlist_id
            .as_deref()
            .ok_or(ConfigError::Missing("SPOTIFY_PLAYLIST_ID"))
    }
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(raw) => {
            let parsed = raw.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::Invalid { key, value: raw })
        }
        None => Ok(default),
    }
}

fn millis_or<G>(get: &G, key: &'static str, default_ms: u64) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    parse_or(get, key, default_ms).map(Duration::from_millis)
}

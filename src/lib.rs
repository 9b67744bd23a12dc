//! Radio now-playing to Spotify playlist mirror.
//!
//! This library polls a station's "now playing" feed, resolves each song
//! against the Spotify catalog and appends new matches to a managed playlist.
//! Songs the catalog does not know are written to a mystery log instead.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local authorization callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration loading and typed settings
//! - `error` - Error types for provider calls, sources and cycles
//! - `logging` - `tracing` subscriber setup
//! - `management` - Dedup set and append-only song logs
//! - `normalize` - Artist and title clean-up before searching
//! - `pipeline` - The periodic scrape, search, append and record cycle
//! - `scrape` - Now-playing sources
//! - `server` - Local HTTP server for the authorization callback
//! - `spotify` - Resilient Spotify Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use nowplaylist::{config, pipeline::PollingPipeline, scrape, spotify::SpotifyClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     config::load_env().await.map_err(anyhow::Error::msg)?;
//!     let settings = config::Settings::from_env()?;
//!     let client = SpotifyClient::from_settings(&settings)?;
//!     // Build a PollingPipeline and run it...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod normalize;
pub mod pipeline;
pub mod scrape;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used by the one-shot commands; the
/// polling loop reports through `tracing` instead.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Waiting for the authorization callback...");
/// info!("Found {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Imported {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// error!("Invalid settings: {}", err);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser");
/// warning!("Token exchange failed: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

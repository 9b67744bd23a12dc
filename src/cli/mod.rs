//! # CLI Module
//!
//! The command-line layer of nowplaylist. Each command resolves what it needs
//! from the startup [`Settings`](crate::config::Settings), builds a
//! [`SpotifyClient`](crate::spotify::SpotifyClient) session and delegates to
//! the library.
//!
//! ## Commands
//!
//! ### Polling
//!
//! - [`run`] - Polls the now-playing source forever, mirroring new songs into
//!   the configured playlist. Stops on Ctrl-C between cycles.
//! - [`import`] - Runs a single cycle over a newline-delimited JSON file of
//!   songs, for backfilling a playlist.
//!
//! ### Authentication
//!
//! - [`auth`] - One-time authorization-code flow that prints the refresh
//!   credential to store in `.env`.
//!
//! ### Information Commands
//!
//! - [`whoami`] - The user the refresh credential belongs to
//! - [`playlists`] - The user's playlists, to find the playlist id
//! - [`playlist`] - Track ids currently in the configured playlist
//!
//! ## Output
//!
//! One-shot commands print coloured status lines through the crate's
//! `info!`/`success!`/`warning!` macros and tables through `tabled`. The
//! polling loop logs through `tracing` only.

mod auth;
mod import;
mod info;
mod run;

pub use auth::auth;
pub use import::import;
pub use info::{playlist, playlists, whoami};
pub use run::run;

//! # Spotify Integration Module
//!
//! Typed access to the Spotify Web API, built from a small set of resilient
//! pieces that every call goes through:
//!
//! ```text
//! Pipeline / CLI
//!          ↓
//! SpotifyClient (session: search, playlists, user)
//!     ├── Paginator            cursor walk with inter-page delay
//!     └── RequestExecutor      bearer token, JSON, retry policy
//!              ├── TokenManager          cached token, single-flight refresh
//!              └── RateLimitedScheduler  concurrency, spacing, pause window
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Failure handling
//!
//! A request is attempted at most `max_retries + 1` times. A 429 pauses the
//! whole scheduler for the `Retry-After` seconds (3 when absent) and the
//! paused attempt still counts against the budget. Transport and decode
//! failures are retried like any other error; only a rejected token exchange
//! is returned immediately.
//!
//! ## Authorization
//!
//! [`auth`] implements the one-time authorization-code flow that produces the
//! refresh credential the session later exchanges for access tokens.

pub mod auth;
mod client;
mod executor;
mod pagination;
mod playlist;
mod scheduler;
mod search;
mod token;
mod user;

pub use client::SpotifyClient;
pub use executor::{ApiRequest, DEFAULT_RETRY_AFTER_SECS, RequestExecutor};
pub use pagination::Paginator;
pub use scheduler::RateLimitedScheduler;
pub use search::track_search_params;
pub use token::{AccessToken, Credentials, TokenManager};

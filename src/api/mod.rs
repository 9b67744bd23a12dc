//! # API Module
//!
//! HTTP endpoints of the short-lived local server used by `nowplaylist auth`.
//!
//! ## Endpoints
//!
//! - [`callback`] (`/authorize`) - Receives the provider redirect after the
//!   user granted access, verifies the `state` value and exchanges the
//!   authorization code for tokens.
//! - [`health`] (`/health`) - Reports that the server is up, with the crate
//!   name and version.
//!
//! The server is started by [`crate::server::start_api_server`] and torn down
//! as soon as the authorization flow has a token or gives up.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;

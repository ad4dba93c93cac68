//! Client-side access token guard.
//!
//! Hides the page until a valid access token is confirmed, refreshes expired
//! tokens with the stored refresh token, and provides a request wrapper that
//! attaches the token and retries once on 401.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod host;

pub use api::{AuthClient, Body, FormField, RequestOptions};
pub use auth::{FileStore, KeyringStore, MemoryStore, TokenStore};
pub use config::GuardConfig;
pub use error::{GuardError, StoreError};
pub use guard::{Guard, GuardState};
pub use host::{HeadlessHost, Host, Navigation};

//! Guarded HTTP access.
//!
//! `AuthClient` attaches the stored access token to every request,
//! refreshes it through the refresh endpoint when it has lapsed, and sends
//! the user back to the login page when no valid token can be obtained.

pub mod client;
pub mod request;

pub use client::AuthClient;
pub use request::{Body, FormField, RequestOptions};

//! Token handling for the guard.
//!
//! This module provides:
//! - `token`: decoding of access token claims and expiry checks
//! - `TokenStore`: the key-value surface tokens are persisted in, with
//!   in-memory, file-backed and OS keychain implementations

pub mod keychain;
pub mod store;
pub mod token;

pub use keychain::KeyringStore;
pub use store::{FileStore, MemoryStore, TokenStore};
pub use token::{decode, is_expired, is_expired_at, Claims, DEFAULT_SKEW_SECONDS};

#![allow(dead_code)]

use std::sync::Arc;

use authguard_core::{AuthClient, GuardConfig, HeadlessHost, MemoryStore};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use serde_json::json;

pub const LOGIN_URL: &str = "/api/auth/jwt-login/";

/// Unsigned token whose `exp` is `offset_secs` from now
pub fn token_expiring_in(offset_secs: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({"exp": Utc::now().timestamp() + offset_secs, "user_id": 1});
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.sig", header, payload)
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub host: Arc<HeadlessHost>,
    pub client: AuthClient,
}

pub fn harness(base_url: &str, tokens: &[(&str, &str)]) -> Harness {
    harness_with(GuardConfig::with_base_url(base_url), tokens)
}

pub fn harness_with(config: GuardConfig, tokens: &[(&str, &str)]) -> Harness {
    let store = Arc::new(MemoryStore::with_values(tokens.iter().copied()));
    let host = Arc::new(HeadlessHost::new());
    let client = AuthClient::new(config, store.clone(), host.clone()).unwrap();
    Harness {
        store,
        host,
        client,
    }
}

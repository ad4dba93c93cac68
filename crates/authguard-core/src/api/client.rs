//! Token-aware HTTP client.
//!
//! `AuthClient` owns the refresh flow and the guarded request wrapper: every
//! request carries the current access token, an expired token is refreshed
//! before sending, and a 401 triggers one refresh and one retry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{token, TokenStore};
use crate::config::GuardConfig;
use crate::error::{GuardError, StoreError};
use crate::host::Host;

use super::RequestOptions;

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// Refresh endpoint response. Fields other than `access` are ignored.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}

/// Clone is cheap - the HTTP client, store and host are all shared.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    config: Arc<GuardConfig>,
    base_url: Url,
    store: Arc<dyn TokenStore>,
    host: Arc<dyn Host>,
    refresh_lock: Arc<Mutex<()>>,
}

impl AuthClient {
    pub fn new(
        config: GuardConfig,
        store: Arc<dyn TokenStore>,
        host: Arc<dyn Host>,
    ) -> Result<Self, GuardError> {
        let base_url = Url::parse(&config.base_url)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            config: Arc::new(config),
            base_url,
            store,
            host,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Resolve `url` against the configured base URL. Absolute URLs pass
    /// through unchanged.
    pub fn resolve(&self, url: &str) -> Result<Url, GuardError> {
        Ok(self.base_url.join(url)?)
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_token(&self.config.access_key)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_token(&self.config.refresh_key)
    }

    /// Store a freshly issued token pair (after a login elsewhere)
    pub fn store_tokens(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        self.store.set(&self.config.access_key, access)?;
        self.store.set(&self.config.refresh_key, refresh)?;
        Ok(())
    }

    /// Expiry check with the configured skew
    pub fn is_expired(&self, access: &str) -> bool {
        token::is_expired(access, self.config.skew_seconds)
    }

    /// Empty values count as missing; a failing store reads as missing too.
    fn read_token(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read token from store");
                None
            }
        }
    }

    pub(crate) fn clear_tokens(&self) {
        for key in [&self.config.access_key, &self.config.refresh_key] {
            if let Err(e) = self.store.remove(key) {
                warn!(key = %key, error = %e, "Failed to remove token from store");
            }
        }
    }

    pub(crate) fn redirect_to_login(&self) {
        info!(location = %self.config.login_url, "Redirecting to login");
        self.host.replace_location(&self.config.login_url);
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Returns false without touching storage when there is no refresh token,
    /// the request fails, or the response carries no access token.
    pub async fn refresh(&self) -> bool {
        if !self.config.coalesce_refresh {
            return self.refresh_once().await;
        }

        let seen = self.access_token();
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(current) = self.access_token() {
            if seen.as_deref() != Some(current.as_str()) && !self.is_expired(&current) {
                debug!("Access token already refreshed by a concurrent caller");
                return true;
            }
        }

        self.refresh_once().await
    }

    async fn refresh_once(&self) -> bool {
        let Some(refresh) = self.refresh_token() else {
            debug!("No refresh token stored, skipping refresh");
            return false;
        };

        let url = match self.resolve(&self.config.refresh_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Invalid refresh URL");
                return false;
            }
        };

        debug!(url = %url, "Refreshing access token");
        let response = match self
            .client
            .post(url)
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh request failed");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Token refresh rejected");
            return false;
        }

        let access = match response.json::<RefreshResponse>().await {
            Ok(RefreshResponse {
                access: Some(access),
            }) if !access.is_empty() => access,
            Ok(_) => {
                warn!("Token refresh response has no access token");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse token refresh response");
                return false;
            }
        };

        if let Err(e) = self.store.set(&self.config.access_key, &access) {
            warn!(error = %e, "Failed to store refreshed access token");
            return false;
        }

        info!("Access token refreshed");
        true
    }

    /// Send a guarded request.
    pub async fn send(&self, url: &str, options: RequestOptions) -> Result<Response, GuardError> {
        self.request(url, &options, true).await
    }

    /// Guarded GET
    pub async fn get(&self, url: &str) -> Result<Response, GuardError> {
        self.send(url, RequestOptions::get()).await
    }

    /// Guarded POST with a JSON body
    pub async fn post_json(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<Response, GuardError> {
        self.send(url, RequestOptions::post().json(body)).await
    }

    /// Send `options` to `url` with the access token attached.
    ///
    /// A 401 is retried once after a successful refresh when `allow_retry` is
    /// set; a second 401 is returned to the caller. Other statuses are never
    /// interpreted. Transport errors propagate unchanged.
    pub async fn request(
        &self,
        url: &str,
        options: &RequestOptions,
        allow_retry: bool,
    ) -> Result<Response, GuardError> {
        let target = self.resolve(url)?;
        let mut allow_retry = allow_retry;

        loop {
            let access = self.ensure_access().await?;

            let builder = self
                .client
                .request(options.method.clone(), target.clone())
                .headers(options.headers_with_token(&access)?);
            let response = options.apply_body(builder)?.send().await?;

            if response.status() != StatusCode::UNAUTHORIZED || !allow_retry {
                return Ok(response);
            }

            debug!(url = %target, "Request unauthorized, refreshing token");
            if !self.refresh().await {
                self.clear_tokens();
                self.redirect_to_login();
                return Err(GuardError::SessionExpired);
            }
            allow_retry = false;
        }
    }

    /// Current access token, refreshed first if missing or expired.
    async fn ensure_access(&self) -> Result<String, GuardError> {
        if let Some(access) = self.access_token() {
            if !self.is_expired(&access) {
                return Ok(access);
            }
        }

        if self.refresh().await {
            if let Some(access) = self.access_token() {
                return Ok(access);
            }
        }

        self.redirect_to_login();
        Err(GuardError::NotAuthenticated)
    }

    /// Clear both tokens and go to the login page. No network call.
    pub fn logout(&self) {
        self.clear_tokens();
        self.redirect_to_login();
    }
}

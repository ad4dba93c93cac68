//! Page load guard.
//!
//! The page is hidden before anything else happens and only shown once a
//! usable access token is confirmed, possibly after a refresh. Otherwise the
//! user is sent to the login page and the page stays hidden.

use tokio::sync::watch;
use tracing::{debug, info};

use crate::api::AuthClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unchecked,
    Checking,
    Authorized,
    Redirecting,
}

impl GuardState {
    /// Authorized and Redirecting are final
    pub fn is_settled(self) -> bool {
        matches!(self, GuardState::Authorized | GuardState::Redirecting)
    }
}

/// Runs the load-time check once and remembers its outcome.
pub struct Guard {
    client: AuthClient,
    state: watch::Sender<GuardState>,
}

impl Guard {
    pub fn new(client: AuthClient) -> Self {
        let (state, _) = watch::channel(GuardState::Unchecked);
        Self { client, state }
    }

    /// The request wrapper sharing this guard's store and host
    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    /// Run the check. Only the first call does any work; later calls wait for
    /// and return the settled state.
    pub async fn check(&self) -> GuardState {
        let started = self.state.send_if_modified(|state| {
            if *state == GuardState::Unchecked {
                *state = GuardState::Checking;
                true
            } else {
                false
            }
        });
        if !started {
            return self.settled().await;
        }

        self.client.host().hide_page();

        let outcome = self.authorize().await;
        self.state.send_replace(outcome);
        outcome
    }

    async fn authorize(&self) -> GuardState {
        let (Some(access), Some(_refresh)) =
            (self.client.access_token(), self.client.refresh_token())
        else {
            debug!("Missing access or refresh token");
            self.client.redirect_to_login();
            return GuardState::Redirecting;
        };

        if self.client.is_expired(&access) {
            debug!("Access token expired, refreshing");
            if !self.client.refresh().await {
                self.client.clear_tokens();
                self.client.redirect_to_login();
                return GuardState::Redirecting;
            }
        }

        info!("Access token confirmed, showing page");
        self.client.host().show_page();
        GuardState::Authorized
    }

    /// Wait until the guard has settled.
    ///
    /// Wrapper calls are not ordered after the guard on their own; callers
    /// that need that ordering await this first. Never resolves if `check`
    /// is never called.
    pub async fn settled(&self) -> GuardState {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(|state| state.is_settled()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        settled
    }
}

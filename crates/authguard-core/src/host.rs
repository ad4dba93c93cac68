//! The environment the guard runs in.
//!
//! In a browser this is the document (visibility) and `window.location`
//! (navigation). Anything else implements [`Host`] itself or uses
//! [`HeadlessHost`], which records what happened.

use std::sync::Mutex;

use tracing::info;

/// Page visibility and navigation, as seen by the guard.
pub trait Host: Send + Sync {
    fn hide_page(&self);

    fn show_page(&self);

    /// Navigate to `location`, replacing the current history entry.
    fn replace_location(&self, location: &str);
}

/// A recorded navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub location: String,
    /// Whether the current history entry was replaced rather than pushed
    pub replace: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    visible: bool,
    navigations: Vec<Navigation>,
}

/// In-process host. Starts visible, like a page before any guard runs.
#[derive(Debug)]
pub struct HeadlessHost {
    state: Mutex<HeadlessState>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self {
            state: Mutex::new(HeadlessState {
                visible: true,
                navigations: Vec::new(),
            }),
        }
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    pub fn navigations(&self) -> Vec<Navigation> {
        self.lock().navigations.clone()
    }

    /// The most recent navigation target, if any
    pub fn location(&self) -> Option<String> {
        self.lock().navigations.last().map(|n| n.location.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Host for HeadlessHost {
    fn hide_page(&self) {
        self.lock().visible = false;
    }

    fn show_page(&self) {
        self.lock().visible = true;
    }

    fn replace_location(&self, location: &str) {
        info!(location, "Navigating");
        self.lock().navigations.push(Navigation {
            location: location.to_string(),
            replace: true,
        });
    }
}

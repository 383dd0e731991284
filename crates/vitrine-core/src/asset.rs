//! Asynchronous asset load tracking
//!
//! A load attempt reports any number of progress events and then exactly one
//! terminal event. [`LoadTracker`] enforces that contract regardless of what
//! the underlying fetch delivers: progress never moves backwards and anything
//! after the terminal event is dropped.

use tracing::{debug, error, info};

use crate::error::AssetLoadError;

/// Raw notification from an in-flight fetch
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Progress { loaded: u64, total: Option<u64> },
    Succeeded,
    Failed(AssetLoadError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    pub fn percent(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some(self.loaded.min(total) as f32 / total as f32 * 100.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Pending,
    Succeeded,
    Failed(AssetLoadError),
}

impl LoadStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadStatus::Pending)
    }
}

/// What the consumer should react to after feeding an event
#[derive(Debug, Clone, PartialEq)]
pub enum LoadUpdate {
    Progress(LoadProgress),
    Succeeded,
    Failed(AssetLoadError),
    /// Duplicate or late event; nothing to do
    Ignored,
}

/// State of one load attempt
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTracker {
    url: String,
    status: LoadStatus,
    progress: LoadProgress,
}

impl LoadTracker {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        info!(url = %url, "Starting asset load");
        Self {
            url,
            status: LoadStatus::Pending,
            progress: LoadProgress::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn observe(&mut self, event: LoadEvent) -> LoadUpdate {
        if self.status.is_terminal() {
            debug!(url = %self.url, ?event, "Ignoring event after load finished");
            return LoadUpdate::Ignored;
        }

        match event {
            LoadEvent::Progress { loaded, total } => {
                let loaded = loaded.max(self.progress.loaded);
                let total = total.or(self.progress.total);
                let next = LoadProgress { loaded, total };
                if next == self.progress {
                    return LoadUpdate::Ignored;
                }
                self.progress = next;
                match next.percent() {
                    Some(percent) => debug!(url = %self.url, "{:.0}% loaded", percent),
                    None => debug!(url = %self.url, loaded, "Loaded {} units", loaded),
                }
                LoadUpdate::Progress(next)
            }
            LoadEvent::Succeeded => {
                info!(url = %self.url, "Asset loaded");
                self.status = LoadStatus::Succeeded;
                LoadUpdate::Succeeded
            }
            LoadEvent::Failed(err) => {
                error!(url = %self.url, "An error occurred loading the asset: {}", err);
                self.status = LoadStatus::Failed(err.clone());
                LoadUpdate::Failed(err)
            }
        }
    }
}

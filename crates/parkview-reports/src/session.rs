//! Latest-request-wins bookkeeping for interactive report views.
//!
//! A view issues a token before every query and hands the result back with
//! that token. Only the answer to the most recent request is displayed;
//! earlier answers arriving late are dropped, and failures keep whatever was
//! shown before.

use parking_lot::Mutex;
use parkview_common::ParkError;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Identifies one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Issues strictly increasing request tokens
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token that supersedes every earlier one
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// A token is current until a later one has been issued
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// What [`ReportPanel::complete`] did with a result
#[derive(Debug)]
pub enum PanelUpdate {
    /// The value is now displayed
    Applied,
    /// A newer request was issued; the result was dropped
    Stale,
    /// The request failed; the displayed value is unchanged
    Failed(ParkError),
}

impl PanelUpdate {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Caller-owned holder of the last successfully displayed report
#[derive(Debug)]
pub struct ReportPanel<T> {
    sequencer: RequestSequencer,
    displayed: Mutex<Option<T>>,
}

impl<T> Default for ReportPanel<T> {
    fn default() -> Self {
        Self {
            sequencer: RequestSequencer::new(),
            displayed: Mutex::new(None),
        }
    }
}

impl<T> ReportPanel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any still in flight
    pub fn begin(&self) -> RequestToken {
        self.sequencer.issue()
    }

    /// Hand back the result of the request identified by `token`
    pub fn complete(&self, token: RequestToken, result: Result<T, ParkError>) -> PanelUpdate {
        // Held across the currency check so a superseded writer cannot land after a newer one
        let mut displayed = self.displayed.lock();
        if !self.sequencer.is_current(token) {
            debug!(token = token.sequence(), "Discarding superseded report");
            return PanelUpdate::Stale;
        }

        match result {
            Ok(value) => {
                *displayed = Some(value);
                PanelUpdate::Applied
            }
            Err(err) => {
                debug!(token = token.sequence(), error = %err, "Report request failed, keeping displayed data");
                PanelUpdate::Failed(err)
            }
        }
    }

    pub fn has_value(&self) -> bool {
        self.displayed.lock().is_some()
    }
}

impl<T: Clone> ReportPanel<T> {
    /// Snapshot of the displayed value
    pub fn current(&self) -> Option<T> {
        self.displayed.lock().clone()
    }
}

//! Save coalescing. Bursts of small edits collapse into a single persisted
//! write per quiet period: every `schedule` re-arms one pending timer, the
//! latest call's reason and silent flag win, and the write that eventually
//! fires covers the entire in-memory state at that moment.

use std::time::{Duration, Instant};
use tracing::debug;

/// Default quiet period before a scheduled save fires.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(600);

/// Metadata of the save that will fire, carried for observability and for
/// deciding whether the outcome is user-visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub reason: String,
    pub silent: bool,
}

#[derive(Debug)]
struct Pending {
    due: Instant,
    request: SaveRequest,
}

/// Two-state debounce machine: Idle, or exactly one PendingWrite. Never
/// more than one outstanding write decision, so persists cannot race.
#[derive(Debug)]
pub struct SaveCoordinator {
    window: Duration,
    pending: Option<Pending>,
}

impl Default for SaveCoordinator {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl SaveCoordinator {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    /// Arm (or re-arm) the pending write. A call while a write is pending
    /// cancels the old timer and restarts the window; the new reason and
    /// silent flag replace the old ones.
    pub fn schedule(&mut self, reason: &str, silent: bool) {
        debug!(reason, silent, "scheduling coalesced save");
        self.pending = Some(Pending {
            due: Instant::now() + self.window,
            request: SaveRequest { reason: reason.to_string(), silent },
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_reason(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.request.reason.as_str())
    }

    /// If the quiet period has elapsed, transition back to Idle and hand
    /// the caller the one write decision. Otherwise leave the timer armed.
    pub fn take_due(&mut self) -> Option<SaveRequest> {
        let due = self.pending.as_ref().is_some_and(|p| Instant::now() >= p.due);
        if due {
            self.pending.take().map(|p| p.request)
        } else {
            None
        }
    }

    /// Fire the pending write immediately, ignoring the remaining window.
    /// Used on shutdown so no scheduled write is ever lost.
    pub fn flush(&mut self) -> Option<SaveRequest> {
        self.pending.take().map(|p| p.request)
    }
}

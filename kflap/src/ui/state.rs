//! State owned by the event loop.

use chrono::{DateTime, Local};

use crate::{
    monitor::{MonitorState, ObjectRecord},
    scheduler::{PollOutcome, PollTracker},
};

/// What the screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// No poll result applied yet.
    #[default]
    Loading,
    Ready,
    /// The last applied poll failed as a whole.
    Failed(String),
}

/// The version table plus everything needed to render it.
///
/// Only the event loop mutates this; the view reads `snapshot`, a copy taken
/// after each merge.
#[derive(Debug, Default)]
pub struct FlapState {
    monitor: MonitorState,
    tracker: PollTracker,
    phase: Phase,
    snapshot: Vec<ObjectRecord>,
    last_poll: Option<DateTime<Local>>,
}

impl FlapState {
    /// Merges a poll result. Returns `true` when the screen needs a redraw,
    /// `false` when the result was stale and dropped.
    pub fn apply(&mut self, outcome: PollOutcome) -> bool {
        if !self.tracker.accept(outcome.seq) {
            return false;
        }

        match outcome.result {
            Ok(observations) => {
                self.monitor.apply(&observations);
                self.snapshot = self.monitor.snapshot();
                self.phase = Phase::Ready;
                self.last_poll = Some(Local::now());
                tracing::debug!(
                    seq = outcome.seq,
                    observed = observations.len(),
                    tracked = self.snapshot.len(),
                    "applied poll"
                );
            }
            Err(e) => {
                tracing::warn!(seq = outcome.seq, "poll failed: {e}");
                self.phase = Phase::Failed(e.to_string());
            }
        }
        true
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn snapshot(&self) -> &[ObjectRecord] {
        &self.snapshot
    }

    pub fn last_poll(&self) -> Option<DateTime<Local>> {
        self.last_poll
    }
}

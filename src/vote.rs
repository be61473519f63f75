// Optimistic vote toggling.
//
// The toggle state machine is a pure function; VoteController wraps it
// with the optimistic flow: apply the transition locally, cast the vote
// over the network, and restore the exact pre-event snapshot if the cast
// fails. The controller is bound to one report and shared by reference —
// interior mutability via a mutex that is only held for synchronous
// snapshot reads and writes, never across the network await. An
// in-flight flag drops events that arrive while a cast is unresolved, so
// two casts can never interleave their rollback snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::api::dto::VoteKind;
use crate::api::traits::RepNetApi;
use crate::report::model::{ResolvedReport, VoteState};

/// Apply one vote event to the current state.
///
/// Returns the next state and the score delta. Voting the same way
/// twice cancels the vote; switching sides moves the score by two.
pub fn transition(current: VoteState, event: VoteKind) -> (VoteState, i64) {
    match (current, event) {
        (VoteState::None, VoteKind::Upvote) => (VoteState::Upvoted, 1),
        (VoteState::Upvoted, VoteKind::Upvote) => (VoteState::None, -1),
        (VoteState::Downvoted, VoteKind::Upvote) => (VoteState::Upvoted, 2),
        (VoteState::None, VoteKind::Downvote) => (VoteState::Downvoted, -1),
        (VoteState::Downvoted, VoteKind::Downvote) => (VoteState::None, 1),
        (VoteState::Upvoted, VoteKind::Downvote) => (VoteState::Downvoted, -2),
    }
}

/// The locally visible vote standing for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteSnapshot {
    pub state: VoteState,
    pub score: i64,
}

/// Optimistic vote controller bound to a single report.
pub struct VoteController {
    api: Arc<dyn RepNetApi>,
    report_id: i64,
    local: Mutex<VoteSnapshot>,
    in_flight: AtomicBool,
}

impl VoteController {
    /// Bind a controller to a resolved report's vote state and score.
    pub fn new(api: Arc<dyn RepNetApi>, report: &ResolvedReport) -> Self {
        Self::from_parts(api, report.id, report.caller_vote, report.vote_score)
    }

    /// Bind a controller from explicit parts.
    pub fn from_parts(
        api: Arc<dyn RepNetApi>,
        report_id: i64,
        state: VoteState,
        score: i64,
    ) -> Self {
        Self {
            api,
            report_id,
            local: Mutex::new(VoteSnapshot { state, score }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The currently visible snapshot.
    pub fn snapshot(&self) -> VoteSnapshot {
        *self.local.lock().unwrap()
    }

    /// Handle one vote event.
    ///
    /// The transition is applied locally before any suspension point, so
    /// a reader sees the new state immediately. The cast carries the
    /// event's own direction, not the resulting state. On any failure
    /// the pre-event snapshot is restored exactly — state and score
    /// together, under the lock — and the failure stays silent beyond a
    /// warning log; the reverted state is the caller's only signal.
    ///
    /// Returns false when the event was dropped because a cast is
    /// already in flight.
    pub async fn vote(&self, event: VoteKind) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!(
                report_id = self.report_id,
                "Vote already in flight, dropping event"
            );
            return false;
        }

        // Snapshot and apply while holding the lock, then drop it before
        // the await.
        let before = {
            let mut local = self.local.lock().unwrap();
            let before = *local;
            let (next, delta) = transition(local.state, event);
            local.state = next;
            local.score += delta;
            before
        };

        if let Err(err) = self.api.cast_vote(self.report_id, event).await {
            warn!(
                report_id = self.report_id,
                error = %err,
                "Vote cast failed, reverting optimistic update"
            );
            let mut local = self.local.lock().unwrap();
            *local = before;
        }

        self.in_flight.store(false, Ordering::SeqCst);
        true
    }
}

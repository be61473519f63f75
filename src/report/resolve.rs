// Report reconciliation — raw wire payloads into display-ready models.
//
// A pure function of (raw reports, lookup cache, caller id). The report
// service and the taxonomy service are not always in sync, so an
// unresolvable tag or impact reference gets a placeholder label instead
// of failing the batch. Output preserves input order; sorting belongs to
// the filter engine.

use thiserror::Error;
use tracing::warn;

use crate::api::dto::{RawReport, VoteKind};
use crate::lookups::LookupCache;
use crate::report::model::{ReportStatus, ResolvedReport, SeverityBucket, VoteState};

/// Placeholder label for a tag id missing from the lookup cache.
pub const UNKNOWN_CATEGORY: &str = "unknown category";

/// Placeholder label for an impact id missing from the lookup cache.
pub const UNKNOWN_IMPACT: &str = "unknown impact";

/// Category label for a report that carries no tags at all.
pub const GENERAL_CATEGORY: &str = "general";

/// Author shown when the payload has no user object.
pub const ANONYMOUS_AUTHOR: &str = "anonymous";

/// Reconciliation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Reconciliation was attempted before the lookup cache loaded.
    /// Resolving against empty maps would label everything as unknown,
    /// so we refuse instead of guessing.
    #[error("tag and impact lookups are not loaded")]
    LookupsNotReady,
}

/// Resolve a batch of raw reports against the lookup cache.
///
/// `caller` is the signed-in user's id; pass `None` in anonymous
/// contexts, which forces every `caller_vote` to `VoteState::None`
/// regardless of the vote lists.
pub fn resolve(
    raw: &[RawReport],
    lookups: &LookupCache,
    caller: Option<i64>,
) -> Result<Vec<ResolvedReport>, ResolveError> {
    if !lookups.is_ready() {
        return Err(ResolveError::LookupsNotReady);
    }

    Ok(raw
        .iter()
        .map(|report| resolve_one(report, lookups, caller))
        .collect())
}

/// Resolve a single raw report. Infallible once the cache is ready.
fn resolve_one(raw: &RawReport, lookups: &LookupCache, caller: Option<i64>) -> ResolvedReport {
    let category_names: Vec<String> = raw
        .tags
        .iter()
        .map(|t| match lookups.tag_name(t.tag_id) {
            Some(name) => name.to_string(),
            None => {
                warn!(
                    report_id = raw.id,
                    tag_id = t.tag_id,
                    "Unresolved tag reference"
                );
                UNKNOWN_CATEGORY.to_string()
            }
        })
        .collect();

    let impact_names: Vec<String> = raw
        .impacts
        .iter()
        .map(|i| match lookups.impact_name(i.impact_id) {
            Some(name) => name.to_string(),
            None => {
                warn!(
                    report_id = raw.id,
                    impact_id = i.impact_id,
                    "Unresolved impact reference"
                );
                UNKNOWN_IMPACT.to_string()
            }
        })
        .collect();

    let category_label = if category_names.is_empty() {
        GENERAL_CATEGORY.to_string()
    } else {
        category_names.join(", ")
    };

    // One pass over the votes: tally the score and spot the caller's own
    // vote at the same time.
    let mut vote_score = 0i64;
    let mut caller_vote = VoteState::None;
    for vote in &raw.votes {
        match vote.vote_type {
            VoteKind::Upvote => vote_score += 1,
            VoteKind::Downvote => vote_score -= 1,
        }
        if caller == Some(vote.user_id) {
            caller_vote = match vote.vote_type {
                VoteKind::Upvote => VoteState::Upvoted,
                VoteKind::Downvote => VoteState::Downvoted,
            };
        }
    }

    let author = raw
        .user
        .as_ref()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());

    ResolvedReport {
        id: raw.id,
        title: raw.report_title.clone(),
        url: raw.report_url.clone(),
        description: raw.report_description.clone(),
        status: ReportStatus::from_wire(&raw.report_status),
        severity_raw: raw.severity,
        severity_bucket: SeverityBucket::from_raw(raw.severity),
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        admin_feedback: raw.admin_feedback.clone(),
        site_id: raw.site_id,
        author_user_id: raw.user_id,
        author,
        category_names,
        impact_names,
        category_label,
        vote_score,
        caller_vote,
        evidences: raw.evidences.clone(),
    }
}

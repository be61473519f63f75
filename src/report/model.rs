// Domain model for resolved reports.
//
// These are the types the filter engine, vote controller, and display
// code work with. They're separate from the wire DTOs so nothing past
// the reconciler ever touches raw payload shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::Evidence;

/// Coarse four-level classification of a report's 0-100 severity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityBucket {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityBucket {
    /// Determine the bucket from a raw severity score (0-100).
    ///
    /// Boundaries are inclusive on the upper end of each bucket: 25 is
    /// still Low, 75 is still High.
    pub fn from_raw(severity: u8) -> Self {
        match severity {
            s if s >= 76 => SeverityBucket::Critical,
            s if s >= 51 => SeverityBucket::High,
            s if s >= 26 => SeverityBucket::Medium,
            _ => SeverityBucket::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityBucket::Low => "low",
            SeverityBucket::Medium => "medium",
            SeverityBucket::High => "high",
            SeverityBucket::Critical => "critical",
        }
    }
}

impl std::fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Moderation status, normalized from the mixed vocabulary the server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
    /// A wire value outside the known vocabulary. Kept rather than
    /// rejected so one odd report never fails a whole batch.
    Unknown,
}

impl ReportStatus {
    /// Normalize a wire status string, case-insensitively.
    ///
    /// The backend emits a mix of English and Spanish labels; every
    /// synonym observed in the wild collapses here.
    pub fn from_wire(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "pending" | "revision" | "pendiente" => ReportStatus::Pending,
            "approved" | "accepted" | "aprobado" | "aceptado" => ReportStatus::Approved,
            "rejected" | "rechazado" => ReportStatus::Rejected,
            _ => ReportStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The caller's standing vote on one report.
///
/// Initialized from the raw vote list at resolution time; mutated only
/// by the vote controller; never persisted — a refetch from the server
/// always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoteState {
    #[default]
    None,
    Upvoted,
    Downvoted,
}

impl VoteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteState::None => "none",
            VoteState::Upvoted => "upvoted",
            VoteState::Downvoted => "downvoted",
        }
    }
}

impl std::fmt::Display for VoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A report after reconciliation: id references resolved to names, votes
/// tallied, display fields derived.
///
/// Pure data — recomputing it from the same raw report, lookup cache,
/// and caller id always produces the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReport {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub status: ReportStatus,
    pub severity_raw: u8,
    pub severity_bucket: SeverityBucket,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub admin_feedback: Option<String>,
    pub site_id: i64,
    pub author_user_id: i64,
    /// Author username, or the anonymous placeholder.
    pub author: String,
    /// Tag names in payload order; misses become the placeholder label.
    pub category_names: Vec<String>,
    /// Impact names in payload order, same placeholder policy.
    pub impact_names: Vec<String>,
    /// Joined category names for display and substring filtering.
    pub category_label: String,
    /// Upvotes minus downvotes over the raw vote list.
    pub vote_score: i64,
    pub caller_vote: VoteState,
    pub evidences: Vec<Evidence>,
}

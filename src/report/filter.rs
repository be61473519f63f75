// Client-side filtering and sorting over resolved reports.
//
// Pure functions, cheap enough to re-run on every filter change. The
// trending window slides from evaluation time — re-running the same
// filter later over unchanged input may change trending membership,
// which is intentional feed freshness, not a bug. Sorting runs after
// filtering and is stable, so equal keys keep their input order.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::report::model::{ReportStatus, ResolvedReport};

/// A report must score strictly above this to count as trending.
pub const TRENDING_MIN_SCORE: i64 = 50;

/// Width of the sliding trending window, in days.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

/// Filter label that bypasses status filtering entirely.
pub const ALL_STATUSES_LABEL: &str = "Todos";

/// Status axis of a filter: everything, or one normalized status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReportStatus),
}

impl StatusFilter {
    /// Parse a client-facing filter label.
    ///
    /// "Todos" keeps the axis unfiltered. Wire statuses pass through;
    /// the Spanish display labels translate via a fixed table that is
    /// knowingly asymmetric — "Aceptados" has no singular counterpart
    /// and "Pendientes"/"Aprobados" are absent. An unmapped label is a
    /// data-integrity gap: it logs a warning and disables the axis
    /// rather than guessing a mapping.
    pub fn parse(label: &str) -> Self {
        if label.eq_ignore_ascii_case(ALL_STATUSES_LABEL) {
            return StatusFilter::All;
        }

        let status = match label.to_lowercase().as_str() {
            "pending" => Some(ReportStatus::Pending),
            "approved" | "accepted" => Some(ReportStatus::Approved),
            "rejected" => Some(ReportStatus::Rejected),
            "pendiente" => Some(ReportStatus::Pending),
            "aprobado" | "aceptados" => Some(ReportStatus::Approved),
            "rechazado" | "rechazados" => Some(ReportStatus::Rejected),
            _ => None,
        };

        match status {
            Some(status) => StatusFilter::Only(status),
            None => {
                warn!(label, "Unmapped status filter label, leaving axis unfiltered");
                StatusFilter::All
            }
        }
    }

    /// The single status this filter narrows to; `All` has none.
    ///
    /// This is how a parsed label reaches server-side query parameters:
    /// the wire only understands concrete statuses, never "everything".
    pub fn only(&self) -> Option<ReportStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }

    /// Whether a report's normalized status passes this filter.
    pub fn matches(&self, status: ReportStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == *wanted,
        }
    }
}

/// Collection ordering, applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Preserve the working-set order.
    #[default]
    None,
    /// Highest raw severity first.
    Severity,
    /// Newest first.
    Date,
}

/// The full client-side filter selection.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub status: StatusFilter,
    /// Case-insensitive substring matched against the joined category label.
    pub category: Option<String>,
    pub sort: SortKey,
    /// Keep only high-score reports from the sliding window.
    pub trending: bool,
}

/// Filter and sort a resolved working set against the current time.
pub fn apply(reports: &[ResolvedReport], filter: &FilterState) -> Vec<ResolvedReport> {
    apply_at(reports, filter, Utc::now())
}

/// Filter and sort with an explicit evaluation time for the trending window.
pub fn apply_at(
    reports: &[ResolvedReport],
    filter: &FilterState,
    now: DateTime<Utc>,
) -> Vec<ResolvedReport> {
    let needle = filter.category.as_ref().map(|c| c.to_lowercase());

    let mut kept: Vec<ResolvedReport> = reports
        .iter()
        .filter(|r| filter.status.matches(r.status))
        .filter(|r| match &needle {
            Some(needle) => r.category_label.to_lowercase().contains(needle),
            None => true,
        })
        .filter(|r| !filter.trending || is_trending(r, now))
        .cloned()
        .collect();

    // Vec::sort_by is stable, so ties preserve the filtered order.
    match filter.sort {
        SortKey::None => {}
        SortKey::Severity => kept.sort_by(|a, b| b.severity_raw.cmp(&a.severity_raw)),
        SortKey::Date => kept.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }

    kept
}

/// Trending means a strong score and recent creation: vote score above
/// [`TRENDING_MIN_SCORE`] and created inside the window ending at `now`.
pub fn is_trending(report: &ResolvedReport, now: DateTime<Utc>) -> bool {
    let cutoff = now - Duration::days(TRENDING_WINDOW_DAYS);
    report.vote_score > TRENDING_MIN_SCORE && report.created_at >= cutoff
}

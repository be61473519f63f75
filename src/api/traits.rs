// The API seam.
//
// Feed orchestration and the vote controller hold an `Arc<dyn RepNetApi>`
// rather than the concrete HTTP client, so tests substitute mocks with
// canned payloads and injected failures.

use async_trait::async_trait;

use crate::api::dto::{Evidence, Impact, RawReport, ReportQuery, Site, Tag, VoteKind};
use crate::api::error::ApiError;

/// Client surface for the RepNet HTTP API.
///
/// Implementations must be Send + Sync because feeds and controllers
/// share them across tasks behind an Arc.
#[async_trait]
pub trait RepNetApi: Send + Sync {
    /// Fetch the full tag taxonomy.
    async fn fetch_tags(&self) -> Result<Vec<Tag>, ApiError>;

    /// Fetch the full impact taxonomy.
    async fn fetch_impacts(&self) -> Result<Vec<Impact>, ApiError>;

    /// Fetch reports, optionally narrowed by server-side query parameters.
    async fn fetch_reports(&self, query: &ReportQuery) -> Result<Vec<RawReport>, ApiError>;

    /// Fetch a single report by id.
    async fn fetch_report(&self, id: i64) -> Result<RawReport, ApiError>;

    /// Search a site by domain, one page at a time (pages are 1-based).
    ///
    /// The server answers with at most one site; an unknown domain is
    /// `None`, not an error.
    async fn search_sites(&self, domain: &str, page: u32) -> Result<Option<Site>, ApiError>;

    /// Toggle the caller's vote on a report. Requires authentication.
    async fn cast_vote(&self, report_id: i64, kind: VoteKind) -> Result<(), ApiError>;

    /// List a report's evidence attachments.
    async fn fetch_evidences(&self, report_id: i64) -> Result<Vec<Evidence>, ApiError>;

    /// Upload one evidence image for a report. Requires authentication.
    async fn upload_evidence(
        &self,
        report_id: i64,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Evidence, ApiError>;

    /// Delete one of a report's evidence attachments. Requires
    /// authentication.
    async fn delete_evidence(&self, report_id: i64, evidence_id: i64) -> Result<(), ApiError>;
}

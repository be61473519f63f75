// Wire types for the RepNet JSON API.
//
// Field names follow the server's camelCase JSON. The report feed and
// the site search return reports in two different shapes, so each shape
// gets its own type instead of one struct with everything optional.
// Timestamps decode strictly — a malformed createdAt is a decoding
// error at the fetch boundary, never a silently substituted current
// time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A report as returned by `GET /reports` and `GET /reports/{id}`.
///
/// The four list fields are always present on these payloads; only the
/// author, site, and feedback may be null or absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    pub id: i64,
    pub report_title: String,
    pub report_url: String,
    pub report_description: String,
    /// Raw status string; normalized by the reconciler, not here.
    pub report_status: String,
    /// Severity score 0-100 as computed by the admin backend.
    pub severity: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub admin_feedback: Option<String>,
    pub site_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user: Option<ReportAuthor>,
    #[serde(default)]
    pub site: Option<SiteSummary>,
    pub tags: Vec<TagRef>,
    pub impacts: Vec<ImpactRef>,
    pub votes: Vec<WireVote>,
    pub evidences: Vec<Evidence>,
}

/// The reporting user, when the payload includes it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportAuthor {
    pub username: String,
}

/// The site a report refers to, as embedded in report payloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub id: i64,
    pub site_domain: String,
    #[serde(default)]
    pub site_reputation: Option<i64>,
}

/// A site search result from `GET /sites`.
///
/// The server answers a search with one site object (or 404), and its
/// embedded reports come in the search shape, not the feed shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i64,
    pub site_domain: String,
    pub site_reputation: i64,
    pub reports: Vec<SearchReport>,
}

/// A report as embedded in a site search result.
///
/// Different shape from [`RawReport`]: no updatedAt or siteId, the vote
/// and evidence lists may be absent, and tags and impacts arrive as
/// name wrappers instead of id references, so no lookup pass is needed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub id: i64,
    pub report_title: String,
    pub report_url: String,
    pub report_description: String,
    pub report_status: String,
    pub severity: u8,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub admin_feedback: Option<String>,
    #[serde(default)]
    pub user: Option<ReportAuthor>,
    #[serde(default)]
    pub votes: Option<Vec<WireVote>>,
    #[serde(default)]
    pub evidences: Option<Vec<Evidence>>,
    pub tags: Vec<SearchTagRef>,
    pub impacts: Vec<SearchImpactRef>,
}

impl SearchReport {
    /// Signed vote score over the embedded votes; a missing list is 0.
    pub fn vote_score(&self) -> i64 {
        self.votes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|vote| match vote.vote_type {
                VoteKind::Upvote => 1,
                VoteKind::Downvote => -1,
            })
            .sum()
    }

    /// Tag names in payload order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.tag.tag_name.as_str()).collect()
    }
}

/// Tag entry as the search payload nests it: the name, wrapped.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchTagRef {
    pub tag: TagLabel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagLabel {
    pub tag_name: String,
}

/// Impact entry as the search payload nests it.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchImpactRef {
    pub impact: ImpactLabel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactLabel {
    pub impact_name: String,
}

/// Reference to a tag by id; the name lives in the lookup cache.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRef {
    pub tag_id: i64,
}

/// Reference to an impact by id; the name lives in the lookup cache.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRef {
    pub impact_id: i64,
}

/// A category tag from the reference taxonomy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i64,
    pub tag_name: String,
    #[serde(default)]
    pub tag_score: Option<i64>,
    #[serde(default)]
    pub tag_description: Option<String>,
}

/// An impact entry from the reference taxonomy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impact {
    pub id: i64,
    pub impact_name: String,
    #[serde(default)]
    pub impact_score: Option<i64>,
    #[serde(default)]
    pub impact_description: Option<String>,
}

/// One vote entry embedded in a report payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVote {
    pub user_id: i64,
    pub vote_type: VoteKind,
}

/// The two vote directions the wire knows about.
///
/// Doubles as the event type for the optimistic vote controller — a
/// cast carries the event's own direction, never the resulting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvote",
            VoteKind::Downvote => "downvote",
        }
    }
}

/// An evidence attachment on a report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: i64,
    pub evidence_type: String,
    #[serde(default)]
    pub evidence_key: Option<String>,
    #[serde(default)]
    pub evidence_file_url: Option<String>,
}

/// Body for `POST /reports/{id}/toggleVote`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    pub vote_type: VoteKind,
}

/// The server's structured error body on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ServerMessage {
    pub message: String,
}

/// Optional server-side query parameters for `GET /reports`.
///
/// These narrow the payload; client-side predicates are still applied
/// on top of whatever comes back.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub user_id: Option<i64>,
    pub status: Option<String>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
}

impl ReportQuery {
    /// Render the set parameters as query-string pairs, omitting unset ones.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.user_id {
            params.push(("userId", id.to_string()));
        }
        if let Some(ref status) = self.status {
            params.push(("status", status.clone()));
        }
        if let Some(ref tag) = self.tag {
            params.push(("tag", tag.clone()));
        }
        if let Some(ref sort) = self.sort_by {
            params.push(("sortBy", sort.clone()));
        }
        params
    }
}

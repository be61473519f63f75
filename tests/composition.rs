// Composition tests — the feed and vote flows wired over a mock API.
//
// A canned-data mock stands in for the RepNet server so these cover the
// full chain: lookup load -> fetch -> reconcile -> filter, plus the
// optimistic vote round trip, failure injection, and the busy guards.
// No network access.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use repnet::api::dto::{
    Evidence, Impact, ImpactRef, RawReport, ReportQuery, Site, Tag, TagRef, VoteKind, WireVote,
};
use repnet::api::error::ApiError;
use repnet::api::traits::RepNetApi;
use repnet::credentials::{Anonymous, StaticCredentials};
use repnet::feed::ReportsFeed;
use repnet::report::filter::{FilterState, SortKey};
use repnet::report::model::{ReportStatus, VoteState};
use repnet::vote::{VoteController, VoteSnapshot};

// ============================================================
// Mock server
// ============================================================

struct MockApi {
    tags: Vec<Tag>,
    impacts: Vec<Impact>,
    reports: Vec<RawReport>,
    fail_lookups: AtomicBool,
    fail_reports: AtomicBool,
    fail_votes: AtomicBool,
    lookup_fetches: AtomicU32,
    queries: Mutex<Vec<ReportQuery>>,
    casts: Mutex<Vec<(i64, VoteKind)>>,
    fetch_gate: Option<Semaphore>,
}

fn tag(id: i64, name: &str) -> Tag {
    Tag {
        id,
        tag_name: name.to_string(),
        tag_score: None,
        tag_description: None,
    }
}

fn impact(id: i64, name: &str) -> Impact {
    Impact {
        id,
        impact_name: name.to_string(),
        impact_score: None,
        impact_description: None,
    }
}

fn raw_report(id: i64, status: &str, severity: u8, author_id: i64) -> RawReport {
    RawReport {
        id,
        report_title: format!("Report {id}"),
        report_url: format!("https://site-{id}.example"),
        report_description: "Suspicious site".to_string(),
        report_status: status.to_string(),
        severity,
        created_at: "2026-08-20T12:00:00Z".parse().unwrap(),
        updated_at: "2026-08-20T12:00:00Z".parse().unwrap(),
        admin_feedback: None,
        site_id: id,
        user_id: author_id,
        user: None,
        site: None,
        tags: vec![],
        impacts: vec![],
        votes: vec![],
        evidences: vec![],
    }
}

impl MockApi {
    /// The standard dataset shared by most tests:
    /// two approved reports (1 and 3), one pending (2), one rejected
    /// in Spanish wire vocabulary (4). Reports 2 and 3 belong to user 42.
    fn canned() -> Arc<Self> {
        let mut phishing = raw_report(1, "approved", 80, 10);
        phishing.tags = vec![TagRef { tag_id: 1 }];
        phishing.impacts = vec![ImpactRef { impact_id: 1 }];
        phishing.votes = vec![
            WireVote {
                user_id: 5,
                vote_type: VoteKind::Upvote,
            },
            WireVote {
                user_id: 6,
                vote_type: VoteKind::Upvote,
            },
            WireVote {
                user_id: 7,
                vote_type: VoteKind::Downvote,
            },
        ];

        let mut malware = raw_report(2, "pending", 30, 42);
        malware.tags = vec![TagRef { tag_id: 2 }];

        let mut fraud = raw_report(3, "approved", 55, 42);
        fraud.tags = vec![TagRef { tag_id: 3 }, TagRef { tag_id: 1 }];
        fraud.votes = vec![WireVote {
            user_id: 42,
            vote_type: VoteKind::Downvote,
        }];

        let rejected = raw_report(4, "rechazado", 10, 10);

        Arc::new(Self {
            tags: vec![tag(1, "Phishing"), tag(2, "Malware"), tag(3, "Fraud")],
            impacts: vec![impact(1, "Credential theft"), impact(2, "Financial loss")],
            reports: vec![phishing, malware, fraud, rejected],
            fail_lookups: AtomicBool::new(false),
            fail_reports: AtomicBool::new(false),
            fail_votes: AtomicBool::new(false),
            lookup_fetches: AtomicU32::new(0),
            queries: Mutex::new(Vec::new()),
            casts: Mutex::new(Vec::new()),
            fetch_gate: None,
        })
    }

    /// Like `canned`, but report fetches park until `release` is called.
    fn gated() -> Arc<Self> {
        let canned = Self::canned();
        Arc::new(Self {
            tags: canned.tags.clone(),
            impacts: canned.impacts.clone(),
            reports: canned.reports.clone(),
            fail_lookups: AtomicBool::new(false),
            fail_reports: AtomicBool::new(false),
            fail_votes: AtomicBool::new(false),
            lookup_fetches: AtomicU32::new(0),
            queries: Mutex::new(Vec::new()),
            casts: Mutex::new(Vec::new()),
            fetch_gate: Some(Semaphore::new(0)),
        })
    }

    fn release_fetch(&self) {
        self.fetch_gate.as_ref().unwrap().add_permits(1);
    }

    fn casts(&self) -> Vec<(i64, VoteKind)> {
        self.casts.lock().unwrap().clone()
    }

    fn queries(&self) -> Vec<ReportQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepNetApi for MockApi {
    async fn fetch_tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.lookup_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(ApiError::InvalidResponse(503));
        }
        Ok(self.tags.clone())
    }

    async fn fetch_impacts(&self) -> Result<Vec<Impact>, ApiError> {
        self.lookup_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(ApiError::InvalidResponse(503));
        }
        Ok(self.impacts.clone())
    }

    async fn fetch_reports(&self, query: &ReportQuery) -> Result<Vec<RawReport>, ApiError> {
        if let Some(gate) = &self.fetch_gate {
            let _permit = gate.acquire().await.unwrap();
        }
        self.queries.lock().unwrap().push(query.clone());
        if self.fail_reports.load(Ordering::SeqCst) {
            return Err(ApiError::Server("reports are on fire".to_string()));
        }
        // The mock deliberately ignores the query: the feed re-applies
        // its predicates client-side and must not trust the server.
        Ok(self.reports.clone())
    }

    async fn fetch_report(&self, id: i64) -> Result<RawReport, ApiError> {
        self.reports
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(ApiError::InvalidResponse(404))
    }

    async fn search_sites(&self, _domain: &str, _page: u32) -> Result<Option<Site>, ApiError> {
        Err(ApiError::InvalidResponse(501))
    }

    async fn cast_vote(&self, report_id: i64, kind: VoteKind) -> Result<(), ApiError> {
        if self.fail_votes.load(Ordering::SeqCst) {
            return Err(ApiError::Server("vote rejected".to_string()));
        }
        self.casts.lock().unwrap().push((report_id, kind));
        Ok(())
    }

    async fn fetch_evidences(&self, _report_id: i64) -> Result<Vec<Evidence>, ApiError> {
        Err(ApiError::InvalidResponse(501))
    }

    async fn upload_evidence(
        &self,
        _report_id: i64,
        _filename: &str,
        _bytes: Vec<u8>,
    ) -> Result<Evidence, ApiError> {
        Err(ApiError::InvalidResponse(501))
    }

    async fn delete_evidence(&self, _report_id: i64, _evidence_id: i64) -> Result<(), ApiError> {
        Err(ApiError::InvalidResponse(501))
    }
}

fn public_feed(api: &Arc<MockApi>) -> ReportsFeed {
    ReportsFeed::new(Arc::clone(api) as Arc<dyn RepNetApi>, Arc::new(Anonymous))
}

fn signed_in_feed(api: &Arc<MockApi>, user_id: i64) -> ReportsFeed {
    ReportsFeed::new(
        Arc::clone(api) as Arc<dyn RepNetApi>,
        Arc::new(StaticCredentials::new(Some("token".to_string()), Some(user_id))),
    )
}

// ============================================================
// Public feed
// ============================================================

#[tokio::test]
async fn public_feed_keeps_only_approved_reports() {
    let api = MockApi::canned();
    let feed = public_feed(&api);

    assert!(feed.refresh_public().await);

    let reports = feed.reports();
    let ids: Vec<i64> = reports.iter().map(|r| r.id).collect();
    // Pending (2) and rejected-in-Spanish (4) are filtered out
    assert_eq!(ids, vec![1, 3]);
    assert!(feed.error().is_none());
}

#[tokio::test]
async fn public_feed_resolves_names_and_scores() {
    let api = MockApi::canned();
    let feed = public_feed(&api);
    feed.refresh_public().await;

    let reports = feed.reports();
    assert_eq!(reports[0].category_label, "Phishing");
    assert_eq!(reports[0].vote_score, 1);
    assert_eq!(reports[1].category_label, "Fraud, Phishing");
    assert_eq!(reports[1].vote_score, -1);
}

#[tokio::test]
async fn public_feed_is_anonymous_even_with_votes_present() {
    let api = MockApi::canned();
    let feed = public_feed(&api);
    feed.refresh_public().await;

    // Report 1 carries votes from users 5, 6, 7 — none of them surface
    // as a caller vote in the public view.
    for report in feed.reports() {
        assert_eq!(report.caller_vote, VoteState::None);
    }
}

#[tokio::test]
async fn lookups_load_once_across_refreshes() {
    let api = MockApi::canned();
    let feed = public_feed(&api);

    feed.refresh_public().await;
    feed.refresh_public().await;

    // One tags fetch plus one impacts fetch, reused by the second refresh
    assert_eq!(api.lookup_fetches.load(Ordering::SeqCst), 2);
}

// ============================================================
// Failure paths — message capture, stale list preserved
// ============================================================

#[tokio::test]
async fn lookup_failure_surfaces_one_message() {
    let api = MockApi::canned();
    api.fail_lookups.store(true, Ordering::SeqCst);
    let feed = public_feed(&api);

    feed.refresh_public().await;

    let message = feed.error().unwrap();
    assert!(
        message.contains("Could not load categories"),
        "unexpected message: {message}"
    );
    assert!(feed.reports().is_empty());
}

#[tokio::test]
async fn report_failure_keeps_the_previous_working_set() {
    let api = MockApi::canned();
    let feed = public_feed(&api);

    feed.refresh_public().await;
    assert_eq!(feed.reports().len(), 2);

    api.fail_reports.store(true, Ordering::SeqCst);
    feed.refresh_public().await;

    // The error is captured and the stale list stays readable
    let message = feed.error().unwrap();
    assert!(message.contains("Could not load reports"));
    assert!(message.contains("reports are on fire"));
    assert_eq!(feed.reports().len(), 2);
}

#[tokio::test]
async fn next_successful_refresh_clears_the_error() {
    let api = MockApi::canned();
    let feed = public_feed(&api);

    api.fail_reports.store(true, Ordering::SeqCst);
    feed.refresh_public().await;
    assert!(feed.error().is_some());

    api.fail_reports.store(false, Ordering::SeqCst);
    feed.refresh_public().await;
    assert!(feed.error().is_none());
    assert_eq!(feed.reports().len(), 2);
}

// ============================================================
// Own-reports feed
// ============================================================

#[tokio::test]
async fn own_feed_requires_a_signed_in_caller() {
    let api = MockApi::canned();
    let feed = public_feed(&api);

    feed.refresh_mine(None).await;

    assert_eq!(feed.error().unwrap(), "Sign in to see your reports");
    assert!(feed.reports().is_empty());
}

#[tokio::test]
async fn own_feed_narrows_to_the_callers_reports() {
    let api = MockApi::canned();
    let feed = signed_in_feed(&api, 42);

    feed.refresh_mine(None).await;

    // The mock returned all four reports; the author predicate is
    // re-applied client-side.
    let ids: Vec<i64> = feed.reports().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 3]);

    // The server-side narrowing was still requested
    let queries = api.queries();
    assert_eq!(queries[0].user_id, Some(42));
    assert!(queries[0].status.is_none());
}

#[tokio::test]
async fn own_feed_sees_the_callers_own_votes() {
    let api = MockApi::canned();
    let feed = signed_in_feed(&api, 42);

    feed.refresh_mine(None).await;

    let reports = feed.reports();
    let fraud = reports.iter().find(|r| r.id == 3).unwrap();
    assert_eq!(fraud.caller_vote, VoteState::Downvoted);
}

#[tokio::test]
async fn own_feed_status_filter_applies_both_sides() {
    let api = MockApi::canned();
    let feed = signed_in_feed(&api, 42);

    feed.refresh_mine(Some(ReportStatus::Pending)).await;

    let ids: Vec<i64> = feed.reports().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2]);

    // The wire query asked the server for the same narrowing
    assert_eq!(api.queries()[0].status.as_deref(), Some("pending"));
}

// ============================================================
// Filters over the working set
// ============================================================

#[tokio::test]
async fn feed_filter_by_category_and_severity() {
    let api = MockApi::canned();
    let feed = public_feed(&api);
    feed.refresh_public().await;

    let filter = FilterState {
        category: Some("phish".to_string()),
        sort: SortKey::Severity,
        ..FilterState::default()
    };
    let filtered = feed.apply_filter(&filter);

    // Both approved reports carry the Phishing tag; severity descending
    let ids: Vec<i64> = filtered.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);

    let fraud_only = FilterState {
        category: Some("fraud".to_string()),
        ..FilterState::default()
    };
    assert_eq!(feed.apply_filter(&fraud_only).len(), 1);
}

#[tokio::test]
async fn feed_filter_does_not_mutate_the_working_set() {
    let api = MockApi::canned();
    let feed = public_feed(&api);
    feed.refresh_public().await;

    let narrow = FilterState {
        category: Some("fraud".to_string()),
        ..FilterState::default()
    };
    assert_eq!(feed.apply_filter(&narrow).len(), 1);
    assert_eq!(feed.reports().len(), 2);
}

// ============================================================
// Busy guard — overlapping refreshes are dropped
// ============================================================

#[tokio::test]
async fn overlapping_refresh_is_dropped() {
    let api = MockApi::gated();
    let feed = Arc::new(public_feed(&api));

    let pending = {
        let feed = Arc::clone(&feed);
        tokio::spawn(async move { feed.refresh_public().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(feed.is_loading());

    // Second refresh while the first is parked on the fetch: dropped
    assert!(!feed.refresh_public().await);

    api.release_fetch();
    assert!(pending.await.unwrap());
    assert!(!feed.is_loading());
    assert_eq!(feed.reports().len(), 2);

    // Only one fetch ever reached the mock
    assert_eq!(api.queries().len(), 1);
}

// ============================================================
// Vote round trip from a resolved report
// ============================================================

#[tokio::test]
async fn vote_flow_from_feed_to_controller() {
    let api = MockApi::canned();
    let feed = signed_in_feed(&api, 42);
    feed.refresh_mine(None).await;

    let reports = feed.reports();
    let fraud = reports.iter().find(|r| r.id == 3).unwrap();
    let controller = VoteController::new(Arc::clone(&api) as Arc<dyn RepNetApi>, fraud);

    // The controller starts from the resolved report's standing
    assert_eq!(
        controller.snapshot(),
        VoteSnapshot {
            state: VoteState::Downvoted,
            score: -1
        }
    );

    // Flip to an upvote: +2, and the cast carries the event direction
    controller.vote(VoteKind::Upvote).await;
    assert_eq!(
        controller.snapshot(),
        VoteSnapshot {
            state: VoteState::Upvoted,
            score: 1
        }
    );
    assert_eq!(api.casts(), vec![(3, VoteKind::Upvote)]);
}

#[tokio::test]
async fn failed_vote_reverts_and_later_retry_succeeds() {
    let api = MockApi::canned();
    let feed = signed_in_feed(&api, 42);
    feed.refresh_mine(None).await;

    let reports = feed.reports();
    let fraud = reports.iter().find(|r| r.id == 3).unwrap();
    let controller = VoteController::new(Arc::clone(&api) as Arc<dyn RepNetApi>, fraud);

    api.fail_votes.store(true, Ordering::SeqCst);
    controller.vote(VoteKind::Upvote).await;

    // Exact revert to the resolved standing; nothing reached the wire
    assert_eq!(
        controller.snapshot(),
        VoteSnapshot {
            state: VoteState::Downvoted,
            score: -1
        }
    );
    assert!(api.casts().is_empty());

    // The user re-triggers once the server recovers
    api.fail_votes.store(false, Ordering::SeqCst);
    controller.vote(VoteKind::Upvote).await;
    assert_eq!(
        controller.snapshot(),
        VoteSnapshot {
            state: VoteState::Upvoted,
            score: 1
        }
    );
}

// ============================================================
// Single-report fetch through the same resolution path
// ============================================================

#[tokio::test]
async fn single_report_resolves_like_the_feed() {
    use repnet::lookups::LookupCache;
    use repnet::report::resolve::resolve;

    let api = MockApi::canned();
    let lookups = LookupCache::load(api.as_ref()).await.unwrap();

    let raw = api.fetch_report(3).await.unwrap();
    let resolved = resolve(std::slice::from_ref(&raw), &lookups, Some(42)).unwrap();

    assert_eq!(resolved[0].category_label, "Fraud, Phishing");
    assert_eq!(resolved[0].caller_vote, VoteState::Downvoted);
}

#[tokio::test]
async fn missing_report_is_a_404() {
    let api = MockApi::canned();
    let err = api.fetch_report(999).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(404)));
}

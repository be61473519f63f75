// Feed orchestration — the headless counterpart of the report list
// screens.
//
// Owns the lookup cache, the resolved working set, and the user-facing
// error message. A refresh runs in strict order: lookups first, then
// reports, then reconciliation. Failures at any stage collapse into the
// message and leave the previous working set untouched — the reader sees
// a stale list, never a partially overwritten one. An atomic loading
// flag drops overlapping refresh attempts instead of letting them race.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::api::dto::ReportQuery;
use crate::api::error::ApiError;
use crate::api::traits::RepNetApi;
use crate::credentials::CredentialProvider;
use crate::lookups::LookupCache;
use crate::report::filter::{self, FilterState};
use crate::report::model::{ReportStatus, ResolvedReport};
use crate::report::resolve;

/// Interior state guarded by the feed mutex.
#[derive(Default)]
struct FeedState {
    lookups: LookupCache,
    reports: Vec<ResolvedReport>,
    error: Option<String>,
}

/// Shared report feed with busy-guarded refreshes.
pub struct ReportsFeed {
    api: Arc<dyn RepNetApi>,
    credentials: Arc<dyn CredentialProvider>,
    state: Mutex<FeedState>,
    loading: AtomicBool,
}

impl ReportsFeed {
    pub fn new(api: Arc<dyn RepNetApi>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            api,
            credentials,
            state: Mutex::new(FeedState::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// The current working set.
    pub fn reports(&self) -> Vec<ResolvedReport> {
        self.state.lock().unwrap().reports.clone()
    }

    /// The last refresh failure, cleared by the next successful refresh.
    pub fn error(&self) -> Option<String> {
        self.state.lock().unwrap().error.clone()
    }

    /// Whether a refresh is currently running.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Filter and sort the current working set without mutating it.
    pub fn apply_filter(&self, filter: &FilterState) -> Vec<ResolvedReport> {
        let state = self.state.lock().unwrap();
        filter::apply(&state.reports, filter)
    }

    /// Refresh the public feed: approved reports only, anonymous caller.
    ///
    /// Resolution runs with no caller id even when credentials are
    /// configured, so public views never show a caller vote. Returns
    /// false when dropped by the busy guard.
    pub async fn refresh_public(&self) -> bool {
        if self.loading.swap(true, Ordering::SeqCst) {
            debug!("Fetch already in progress, skipping refresh");
            return false;
        }

        let result = self.fetch_and_resolve(ReportQuery::default(), None).await;

        {
            let mut state = self.state.lock().unwrap();
            match result {
                Ok(mut resolved) => {
                    resolved.retain(|r| r.status == ReportStatus::Approved);
                    info!(count = resolved.len(), "Public feed refreshed");
                    state.reports = resolved;
                    state.error = None;
                }
                Err(message) => {
                    warn!(error = %message, "Public feed refresh failed");
                    state.error = Some(message);
                }
            }
        }

        self.loading.store(false, Ordering::SeqCst);
        true
    }

    /// Refresh the caller's own reports, optionally narrowed to one status.
    ///
    /// Requires a signed-in caller. The server-side query narrows the
    /// payload, but the author and status predicates are re-applied here
    /// rather than trusted. Returns false when dropped by the busy guard.
    pub async fn refresh_mine(&self, status: Option<ReportStatus>) -> bool {
        if self.loading.swap(true, Ordering::SeqCst) {
            debug!("Fetch already in progress, skipping refresh");
            return false;
        }

        let caller = self.credentials.user_id();
        let result = match caller {
            Some(user_id) => {
                let query = ReportQuery {
                    user_id: Some(user_id),
                    status: status.map(|s| s.as_str().to_string()),
                    ..ReportQuery::default()
                };
                self.fetch_and_resolve(query, Some(user_id)).await
            }
            None => Err("Sign in to see your reports".to_string()),
        };

        {
            let mut state = self.state.lock().unwrap();
            match result {
                Ok(mut resolved) => {
                    if let Some(user_id) = caller {
                        resolved.retain(|r| r.author_user_id == user_id);
                    }
                    if let Some(status) = status {
                        resolved.retain(|r| r.status == status);
                    }
                    info!(count = resolved.len(), "Own-reports feed refreshed");
                    state.reports = resolved;
                    state.error = None;
                }
                Err(message) => {
                    warn!(error = %message, "Own-reports refresh failed");
                    state.error = Some(message);
                }
            }
        }

        self.loading.store(false, Ordering::SeqCst);
        true
    }

    /// Load lookups if needed, fetch reports, and reconcile.
    ///
    /// Every failure collapses into the user-facing message; the caller
    /// commits or discards the result.
    async fn fetch_and_resolve(
        &self,
        query: ReportQuery,
        caller: Option<i64>,
    ) -> Result<Vec<ResolvedReport>, String> {
        let lookups = match self.ensure_lookups().await {
            Ok(lookups) => lookups,
            Err(err) => return Err(format!("Could not load categories: {err}")),
        };

        let raw = match self.api.fetch_reports(&query).await {
            Ok(raw) => raw,
            Err(err) => return Err(format!("Could not load reports: {err}")),
        };

        resolve::resolve(&raw, &lookups, caller)
            .map_err(|err| format!("Could not display reports: {err}"))
    }

    /// Return the loaded lookup cache, loading it first if necessary.
    ///
    /// Checked and stored under the lock; the load itself runs without
    /// it. Refreshes are serialized by the loading flag, so the cache is
    /// loaded at most once per session in practice.
    async fn ensure_lookups(&self) -> Result<LookupCache, ApiError> {
        {
            let state = self.state.lock().unwrap();
            if state.lookups.is_ready() {
                return Ok(state.lookups.clone());
            }
        }

        let loaded = LookupCache::load(self.api.as_ref()).await?;

        let mut state = self.state.lock().unwrap();
        state.lookups = loaded.clone();
        Ok(loaded)
    }
}

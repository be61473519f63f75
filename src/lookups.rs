// Tag and impact lookup cache.
//
// Reports reference tags and impacts by id only; the names live in two
// separate taxonomy endpoints. Both lists are fetched concurrently and
// joined here. Either failure fails the whole load — the cache is never
// partial. No eviction or expiry: a cache lives as long as the session
// that loaded it, and fresher data means calling load() again.

use std::collections::HashMap;

use tracing::info;

use crate::api::dto::{Impact, Tag};
use crate::api::error::ApiError;
use crate::api::traits::RepNetApi;

/// Immutable id → entity dictionaries for tags and impacts.
#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    tags: HashMap<i64, Tag>,
    impacts: HashMap<i64, Impact>,
}

impl LookupCache {
    /// Fetch both taxonomies and build the cache.
    ///
    /// The two fetches are launched before either is awaited and joined,
    /// so the load costs one round trip, not two.
    pub async fn load(api: &dyn RepNetApi) -> Result<Self, ApiError> {
        let (tags, impacts) = tokio::try_join!(api.fetch_tags(), api.fetch_impacts())?;

        info!(
            tags = tags.len(),
            impacts = impacts.len(),
            "Lookup cache loaded"
        );

        Ok(Self::from_parts(tags, impacts))
    }

    /// Build a cache from already-fetched taxonomies.
    pub fn from_parts(tags: Vec<Tag>, impacts: Vec<Impact>) -> Self {
        Self {
            tags: tags.into_iter().map(|t| (t.id, t)).collect(),
            impacts: impacts.into_iter().map(|i| (i.id, i)).collect(),
        }
    }

    /// Whether both taxonomies are present. Reconciliation refuses to
    /// run against a cache that is not ready.
    pub fn is_ready(&self) -> bool {
        !self.tags.is_empty() && !self.impacts.is_empty()
    }

    /// Resolve a tag id to its display name.
    pub fn tag_name(&self, id: i64) -> Option<&str> {
        self.tags.get(&id).map(|t| t.tag_name.as_str())
    }

    /// Resolve an impact id to its display name.
    pub fn impact_name(&self, id: i64) -> Option<&str> {
        self.impacts.get(&id).map(|i| i.impact_name.as_str())
    }
}

//! Infinite-scroll trigger.

use tracing::debug;

use crate::cache::{CacheError, FetchOutcome, PageCache};
use crate::query::QueryIdentity;
use crate::record::Record;
use crate::source::RemoteSource;

/// Decides when a sentinel's visibility should pull the next page.
///
/// The trigger fires `fetch_next_page` whenever the sentinel is visible,
/// more pages exist, and no fetch is outstanding. Deduplication comes from
/// the cache's in-flight gate rather than from visibility-edge tracking:
/// rapid flicker during a fetch observes `is_fetching` and does nothing,
/// while a sentinel still visible after a short first page fires again
/// without needing an intermediate not-visible transition.
pub struct ScrollTrigger<R: Record, S> {
    cache: PageCache<R, S>,
    query: QueryIdentity,
}

impl<R: Record, S> Clone for ScrollTrigger<R, S> {
    fn clone(&self) -> Self {
        ScrollTrigger {
            cache: self.cache.clone(),
            query: self.query.clone(),
        }
    }
}

impl<R: Record, S: RemoteSource<R>> ScrollTrigger<R, S> {
    pub fn new(cache: PageCache<R, S>, query: QueryIdentity) -> Self {
        ScrollTrigger { cache, query }
    }

    pub fn query(&self) -> &QueryIdentity {
        &self.query
    }

    /// The gate: fetch only while visible, continuable, and not already
    /// fetching.
    pub fn should_fetch(visible: bool, has_next_page: bool, is_fetching: bool) -> bool {
        visible && has_next_page && !is_fetching
    }

    /// Report the sentinel's current visibility.
    ///
    /// Returns `Some(outcome)` when a fetch was attempted, `None` when the
    /// gate held it back.
    pub async fn observe(&self, visible: bool) -> Result<Option<FetchOutcome>, CacheError> {
        let fire = Self::should_fetch(
            visible,
            self.cache.has_next_page(&self.query)?,
            self.cache.is_fetching(&self.query)?,
        );
        if !fire {
            return Ok(None);
        }
        debug!(kind = ?self.query.kind, "sentinel visible, pulling next page");
        Ok(Some(self.cache.fetch_next_page(&self.query).await?))
    }
}

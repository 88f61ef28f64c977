//! PageCache - process-wide store of paginated collection entries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::entry::CollectionEntry;
use super::error::CacheError;
use crate::query::{CollectionKind, QueryIdentity};
use crate::record::Record;
use crate::search;
use crate::source::RemoteSource;

/// Outcome of a [`PageCache::fetch_next_page`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and appended; holds the appended record count.
    Fetched(usize),
    /// A fetch for this identity was already outstanding; no request issued.
    InFlight,
    /// The server reported no more pages; no request issued.
    Exhausted,
    /// The entry was invalidated while the fetch was in flight; the result
    /// was discarded.
    Stale,
}

/// Shared cache of fetched pages, keyed by query identity.
///
/// Clone-friendly via `Arc`: every clone observes the same entries, and
/// repeated [`PageCache::get_or_create`] calls for one identity return the
/// same entry. Entries are mutated only through cache operations.
pub struct PageCache<R: Record, S> {
    entries: Arc<Mutex<HashMap<QueryIdentity, Arc<Mutex<CollectionEntry<R>>>>>>,
    source: Arc<S>,
}

impl<R: Record, S> Clone for PageCache<R, S> {
    fn clone(&self) -> Self {
        PageCache {
            entries: Arc::clone(&self.entries),
            source: Arc::clone(&self.source),
        }
    }
}

impl<R: Record, S: RemoteSource<R>> PageCache<R, S> {
    pub fn new(source: S) -> Self {
        PageCache {
            entries: Arc::new(Mutex::new(HashMap::new())),
            source: Arc::new(source),
        }
    }

    /// The remote collaborator this cache fetches from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the entry for `query`, creating an empty one (no pages,
    /// `has_next_page = true`) on first access.
    pub fn get_or_create(
        &self,
        query: &QueryIdentity,
    ) -> Result<Arc<Mutex<CollectionEntry<R>>>, CacheError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::LockPoisoned("entry map"))?;
        Ok(entries
            .entry(query.clone())
            .or_insert_with(|| Arc::new(Mutex::new(CollectionEntry::new())))
            .clone())
    }

    /// Fetch the next page for `query` and append it.
    ///
    /// At most one fetch per identity is in flight: concurrent calls observe
    /// the gate and return [`FetchOutcome::InFlight`] without issuing a
    /// request, so pages are always appended in fetch-request order. A
    /// failed fetch appends nothing, leaves `has_next_page` unchanged, and
    /// records a retryable error state on the entry.
    pub async fn fetch_next_page(
        &self,
        query: &QueryIdentity,
    ) -> Result<FetchOutcome, CacheError> {
        let entry = self.get_or_create(query)?;

        // Claim the in-flight gate and capture the continuation cursor.
        // The entry lock is never held across the fetch await.
        let (cursor, generation) = {
            let mut entry = entry
                .lock()
                .map_err(|_| CacheError::LockPoisoned("entry"))?;
            if entry.is_fetching() {
                return Ok(FetchOutcome::InFlight);
            }
            if !entry.has_next_page() {
                return Ok(FetchOutcome::Exhausted);
            }
            entry.set_fetching(true);
            (entry.next_cursor(), entry.generation())
        };

        debug!(kind = ?query.kind, cursor = cursor.as_deref(), "fetching next page");
        let fetched = self.source.fetch_page(query, cursor.as_deref()).await;

        let mut entry = entry
            .lock()
            .map_err(|_| CacheError::LockPoisoned("entry"))?;

        if entry.generation() != generation {
            // The entry was invalidated or refetched while this fetch was in
            // flight; its result no longer belongs to the cached sequence,
            // and the in-flight flag now belongs to the newer fetch cycle.
            debug!(kind = ?query.kind, "dropping stale page fetch");
            return Ok(FetchOutcome::Stale);
        }
        entry.set_fetching(false);

        match fetched {
            Ok(page) => {
                let count = page.records.len();
                entry.append_page(cursor, page);
                debug!(
                    kind = ?query.kind,
                    count,
                    has_next_page = entry.has_next_page(),
                    "page appended"
                );
                Ok(FetchOutcome::Fetched(count))
            }
            Err(err) => {
                warn!(kind = ?query.kind, error = %err, "page fetch failed");
                entry.set_error(Some(err.to_string()));
                Err(CacheError::Fetch(err))
            }
        }
    }

    /// Discard the entry for `query`, forcing the next access to refetch
    /// from scratch. An in-flight fetch's result is dropped when it lands.
    pub fn invalidate(&self, query: &QueryIdentity) -> Result<(), CacheError> {
        let removed = {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| CacheError::LockPoisoned("entry map"))?;
            entries.remove(query)
        };
        if let Some(entry) = removed {
            let mut entry = entry
                .lock()
                .map_err(|_| CacheError::LockPoisoned("entry"))?;
            entry.reset();
        }
        Ok(())
    }

    /// Replace the entry's pages wholesale with freshly fetched data.
    ///
    /// This is the reconciliation primitive used after failed mutations:
    /// no inverse patch, one fresh first page from the server.
    pub async fn refetch(&self, query: &QueryIdentity) -> Result<FetchOutcome, CacheError> {
        let entry = self.get_or_create(query)?;
        {
            let mut entry = entry
                .lock()
                .map_err(|_| CacheError::LockPoisoned("entry"))?;
            entry.reset();
        }
        self.fetch_next_page(query).await
    }

    /// Flattened records for `query`; empty when nothing has been fetched.
    pub fn records(&self, query: &QueryIdentity) -> Result<Vec<R>, CacheError> {
        self.with_entry(query, Vec::new(), |entry| entry.records())
    }

    /// Filter the cached records for `query` by a free-text search. Purely
    /// client-side: only already-fetched records are searched.
    pub fn search(&self, query: &QueryIdentity, text: &str) -> Result<Vec<R>, CacheError> {
        Ok(search::filter(&self.records(query)?, text))
    }

    pub fn len(&self, query: &QueryIdentity) -> Result<usize, CacheError> {
        self.with_entry(query, 0, CollectionEntry::len)
    }

    pub fn is_empty(&self, query: &QueryIdentity) -> Result<bool, CacheError> {
        self.with_entry(query, true, CollectionEntry::is_empty)
    }

    pub fn has_next_page(&self, query: &QueryIdentity) -> Result<bool, CacheError> {
        self.with_entry(query, true, CollectionEntry::has_next_page)
    }

    pub fn is_fetching(&self, query: &QueryIdentity) -> Result<bool, CacheError> {
        self.with_entry(query, false, CollectionEntry::is_fetching)
    }

    /// Message from the entry's most recent failed fetch, if any.
    pub fn last_error(&self, query: &QueryIdentity) -> Result<Option<String>, CacheError> {
        self.with_entry(query, None, |entry| {
            entry.last_error().map(str::to_string)
        })
    }

    /// Every identity with an entry for `kind`, across owners. The mutation
    /// broker uses this to enumerate affected entries explicitly instead of
    /// matching on key names.
    pub fn identities_for_kind(
        &self,
        kind: CollectionKind,
    ) -> Result<Vec<QueryIdentity>, CacheError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::LockPoisoned("entry map"))?;
        Ok(entries
            .keys()
            .filter(|query| query.kind == kind)
            .cloned()
            .collect())
    }

    /// Remove `record_id` from every page of the entry for `query`. Returns
    /// whether anything was removed; an absent entry or id is a no-op.
    pub fn remove_record(
        &self,
        query: &QueryIdentity,
        record_id: &str,
    ) -> Result<bool, CacheError> {
        let entry = {
            let entries = self
                .entries
                .lock()
                .map_err(|_| CacheError::LockPoisoned("entry map"))?;
            entries.get(query).cloned()
        };
        match entry {
            Some(entry) => {
                let mut entry = entry
                    .lock()
                    .map_err(|_| CacheError::LockPoisoned("entry"))?;
                Ok(entry.remove_record(record_id))
            }
            None => Ok(false),
        }
    }

    /// Append a locally synthesized record to the entry for `query`,
    /// creating the entry if needed. Ids already cached are skipped.
    pub fn push_record(&self, query: &QueryIdentity, record: R) -> Result<bool, CacheError> {
        let entry = self.get_or_create(query)?;
        let mut entry = entry
            .lock()
            .map_err(|_| CacheError::LockPoisoned("entry"))?;
        Ok(entry.push_record(record))
    }

    fn with_entry<T>(
        &self,
        query: &QueryIdentity,
        default: T,
        f: impl FnOnce(&CollectionEntry<R>) -> T,
    ) -> Result<T, CacheError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::LockPoisoned("entry map"))?;
        match entries.get(query) {
            Some(entry) => {
                let entry = entry
                    .lock()
                    .map_err(|_| CacheError::LockPoisoned("entry"))?;
                Ok(f(&entry))
            }
            None => Ok(default),
        }
    }
}

//! CollectionEntry - the cached state for one query identity.

use crate::query::Page;
use crate::record::Record;

/// Ordered pages fetched for one query identity, plus the cursors they were
/// fetched from and the flags gating further fetches.
///
/// Entries are owned by the [`crate::PageCache`] and mutated only through
/// the operations below; pages are never edited in place by readers.
#[derive(Debug, Clone)]
pub struct CollectionEntry<R> {
    pages: Vec<Page<R>>,
    cursors: Vec<Option<String>>,
    has_next_page: bool,
    is_fetching: bool,
    last_error: Option<String>,
    generation: u64,
}

impl<R: Record> CollectionEntry<R> {
    pub(crate) fn new() -> Self {
        CollectionEntry {
            pages: Vec::new(),
            cursors: Vec::new(),
            has_next_page: true,
            is_fetching: false,
            last_error: None,
            generation: 0,
        }
    }

    /// Pages in fetch order; the first fetched page is at index 0.
    pub fn pages(&self) -> &[Page<R>] {
        &self.pages
    }

    /// Cursors each page was fetched from, parallel to `pages()`.
    pub fn cursors(&self) -> &[Option<String>] {
        &self.cursors
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    /// Message from the most recent failed fetch, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Cursor the next fetch should continue from.
    pub fn next_cursor(&self) -> Option<String> {
        self.pages
            .last()
            .and_then(|page| page.next_cursor().map(str::to_string))
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_fetching(&mut self, fetching: bool) {
        self.is_fetching = fetching;
    }

    pub(crate) fn set_error(&mut self, message: Option<String>) {
        self.last_error = message;
    }

    /// Append a freshly fetched page and adopt its continuation state.
    ///
    /// Records whose id is already cached are dropped so the flattened
    /// record list stays free of duplicates.
    pub(crate) fn append_page(&mut self, fetched_from: Option<String>, mut page: Page<R>) {
        page.records
            .retain(|record| !self.contains(record.record_id()));
        self.has_next_page = page.has_more;
        self.last_error = None;
        self.cursors.push(fetched_from);
        self.pages.push(page);
    }

    /// Flattened records across all pages, in fetch order.
    pub fn records(&self) -> Vec<R> {
        self.pages
            .iter()
            .flat_map(|page| page.records.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(|page| page.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, record_id: &str) -> bool {
        self.pages
            .iter()
            .any(|page| page.records.iter().any(|r| r.record_id() == record_id))
    }

    /// Filter a record out of every page. Idempotent: removing an absent id
    /// leaves the entry unchanged and returns `false`.
    pub(crate) fn remove_record(&mut self, record_id: &str) -> bool {
        let before = self.len();
        for page in &mut self.pages {
            page.records.retain(|record| record.record_id() != record_id);
        }
        self.len() != before
    }

    /// Append a locally synthesized record, creating a local page when the
    /// entry has none. Ids already present are skipped. Does not touch
    /// `has_next_page`; the record is local, not a server page.
    pub(crate) fn push_record(&mut self, record: R) -> bool {
        if self.contains(record.record_id()) {
            return false;
        }
        match self.pages.last_mut() {
            Some(page) => page.records.push(record),
            None => {
                self.cursors.push(None);
                self.pages.push(Page::new(vec![record], None, false));
            }
        }
        true
    }

    /// Discard all cached pages and rearm the entry for a fresh first fetch.
    /// Bumps the generation so an in-flight fetch's result is not applied.
    pub(crate) fn reset(&mut self) {
        self.pages.clear();
        self.cursors.clear();
        self.has_next_page = true;
        self.is_fetching = false;
        self.last_error = None;
        self.generation += 1;
    }
}

//! Client-side search over already-fetched records.

mod debounce;

pub use debounce::{DebouncedQuery, SearchState, DEFAULT_DEBOUNCE};

use crate::record::Record;

/// Case-insensitive substring filter over cached records.
///
/// Pure over its input: no network calls, no cache writes. An empty (or
/// all-whitespace) query returns every record it was given - which is the
/// currently cached set, not the full server-side collection. Queries
/// narrow monotonically: a superstring query matches a subset of what its
/// prefix matched.
pub fn filter<R: Record>(records: &[R], query: &str) -> Vec<R> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| record.search_text().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

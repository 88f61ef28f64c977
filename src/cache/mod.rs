mod entry;
mod error;
mod page_cache;

pub use entry::CollectionEntry;
pub use error::CacheError;
pub use page_cache::{FetchOutcome, PageCache};

use std::fmt;

use crate::source::SourceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    LockPoisoned(&'static str),
    Fetch(SourceError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::LockPoisoned(operation) => {
                write!(f, "collection cache lock poisoned during {}", operation)
            }
            CacheError::Fetch(err) => write!(f, "page fetch failed: {}", err),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<SourceError> for CacheError {
    fn from(err: SourceError) -> Self {
        CacheError::Fetch(err)
    }
}

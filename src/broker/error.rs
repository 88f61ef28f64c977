use std::fmt;

use crate::cache::CacheError;
use crate::source::SourceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// The local cache could not be read or written.
    Cache(CacheError),
    /// The remote mutation failed. The affected entries have already been
    /// refetched and the user notified by the time this surfaces.
    Remote(SourceError),
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::Cache(err) => write!(f, "mutation cache update failed: {}", err),
            MutationError::Remote(err) => write!(f, "remote mutation failed: {}", err),
        }
    }
}

impl std::error::Error for MutationError {}

impl From<CacheError> for MutationError {
    fn from(err: CacheError) -> Self {
        MutationError::Cache(err)
    }
}

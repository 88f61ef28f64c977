//! Seam to the externally-owned wallet/API layer.

use std::fmt;

use async_trait::async_trait;

use crate::query::{Page, QueryIdentity};

/// Errors surfaced by the external data-access layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Transport-level failure; the request may never have reached the server.
    Network(String),
    /// The server received the request and refused it.
    Rejected(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Network(message) => write!(f, "network error: {}", message),
            SourceError::Rejected(message) => write!(f, "request rejected: {}", message),
        }
    }
}

impl std::error::Error for SourceError {}

/// The remote collaborator the cache and broker call into.
///
/// `fetch_page` covers every paginated list endpoint, dispatching on
/// `query.kind`; `query.options.limit` bounds the page size. The mutation
/// methods mirror the profile endpoints one to one.
#[async_trait]
pub trait RemoteSource<R>: Send + Sync {
    /// Fetch one page of `query.kind`, continuing from `cursor` (`None`
    /// fetches from the start).
    async fn fetch_page(
        &self,
        query: &QueryIdentity,
        cursor: Option<&str>,
    ) -> Result<Page<R>, SourceError>;

    async fn block_profile(&self, profile_id: &str) -> Result<(), SourceError>;

    async fn disconnect(&self, profile_id: &str) -> Result<(), SourceError>;

    async fn cancel_connection_request(&self, profile_id: &str) -> Result<(), SourceError>;

    async fn accept_connection_request(&self, profile_id: &str) -> Result<(), SourceError>;
}

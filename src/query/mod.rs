//! Query identities and fetched pages.

use serde::{Deserialize, Serialize};

use crate::record::{Profile, Recipient};

/// The server-side collections the cache fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Connections,
    PendingConnections,
    ConnectionRequests,
    BlockedProfiles,
    ManagedBoosts,
}

/// Pagination options that form part of a query identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageOptions {
    pub limit: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        PageOptions { limit: 10 }
    }
}

/// Identifies one logical paginated collection.
///
/// Two identical identities share the same cache entry. The `owner` scope
/// keeps collections fetched for different active profiles apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryIdentity {
    pub kind: CollectionKind,
    pub owner: String,
    pub options: PageOptions,
}

impl QueryIdentity {
    pub fn new(kind: CollectionKind, owner: impl Into<String>) -> Self {
        QueryIdentity {
            kind,
            owner: owner.into(),
            options: PageOptions::default(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.options.limit = limit;
        self
    }
}

/// One fetched page of records plus its continuation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<R> {
    pub records: Vec<R>,
    pub cursor: Option<String>,
    pub has_more: bool,
}

impl<R> Page<R> {
    pub fn new(records: Vec<R>, cursor: Option<String>, has_more: bool) -> Self {
        Page {
            records,
            cursor,
            has_more,
        }
    }

    /// Cursor to continue from, present only when the server reported more
    /// records past this page.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_more {
            self.cursor.as_deref()
        } else {
            None
        }
    }

    pub fn map<T>(self, f: impl FnMut(R) -> T) -> Page<T> {
        Page {
            records: self.records.into_iter().map(f).collect(),
            cursor: self.cursor,
            has_more: self.has_more,
        }
    }
}

impl Page<Recipient> {
    /// Normalize a connection-request page to plain profiles. Source
    /// implementations fronting request endpoints are expected to call
    /// this before returning pages, so caches of profiles never see the
    /// wrapper shape.
    pub fn normalize(self) -> Page<Profile> {
        self.map(Recipient::into_profile)
    }
}

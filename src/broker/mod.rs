//! Optimistic mutation broker.
//!
//! Applies block/disconnect/cancel/accept actions to the page cache
//! synchronously, then calls the remote endpoint and reconciles. Failures
//! are reconciled by refetching the affected entries, not by inverse
//! patches; every failure also surfaces an error toast. The collections a
//! mutation touches are declared in [`MutationKind`], never inferred from
//! key naming.

mod error;

pub use error::MutationError;

use tracing::{debug, warn};

use crate::cache::PageCache;
use crate::query::{CollectionKind, QueryIdentity};
use crate::record::Profile;
use crate::source::{RemoteSource, SourceError};
use crate::toast::{ToastKind, ToastSink};

/// The local actions the broker knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Block,
    Disconnect,
    CancelRequest,
    AcceptRequest,
}

impl MutationKind {
    /// Every collection whose cached entries this mutation can leave wrong,
    /// and therefore the refetch set after a remote failure.
    pub fn affected_collections(self) -> &'static [CollectionKind] {
        match self {
            MutationKind::Block => &[
                CollectionKind::Connections,
                CollectionKind::PendingConnections,
                CollectionKind::ConnectionRequests,
                CollectionKind::BlockedProfiles,
            ],
            MutationKind::Disconnect => &[CollectionKind::Connections],
            MutationKind::CancelRequest => &[CollectionKind::ConnectionRequests],
            MutationKind::AcceptRequest => &[
                CollectionKind::ConnectionRequests,
                CollectionKind::Connections,
            ],
        }
    }

    /// Collections the record is optimistically removed from.
    fn removal_targets(self) -> &'static [CollectionKind] {
        match self {
            MutationKind::Block => &[
                CollectionKind::Connections,
                CollectionKind::PendingConnections,
                CollectionKind::ConnectionRequests,
            ],
            MutationKind::Disconnect => &[CollectionKind::Connections],
            MutationKind::CancelRequest | MutationKind::AcceptRequest => {
                &[CollectionKind::ConnectionRequests]
            }
        }
    }
}

/// Applies profile mutations optimistically and reconciles with the server.
///
/// The caller is expected to disable the triggering control while a
/// mutation for a record is in flight; the broker does not queue divergent
/// mutations on the same record.
pub struct MutationBroker<S, T> {
    cache: PageCache<Profile, S>,
    toasts: T,
}

impl<S: RemoteSource<Profile>, T: ToastSink> MutationBroker<S, T> {
    pub fn new(cache: PageCache<Profile, S>, toasts: T) -> Self {
        MutationBroker { cache, toasts }
    }

    pub fn cache(&self) -> &PageCache<Profile, S> {
        &self.cache
    }

    /// Remove a connection. Optimistic state is final on success; failure
    /// refetches the connection entries.
    pub async fn disconnect(&self, owner: &str, profile_id: &str) -> Result<(), MutationError> {
        self.apply_optimistic_removal(MutationKind::Disconnect, owner, profile_id)?;
        let result = self.cache.source().disconnect(profile_id).await;
        self.settle(
            MutationKind::Disconnect,
            owner,
            result,
            "An error occurred, unable to remove contact",
        )
        .await
    }

    /// Block a profile: drop it from connection and request entries and add
    /// a minimal placeholder to blocked entries, all before the remote call
    /// resolves.
    pub async fn block(&self, owner: &str, profile_id: &str) -> Result<(), MutationError> {
        self.apply_optimistic_removal(MutationKind::Block, owner, profile_id)?;
        for query in self.identities(CollectionKind::BlockedProfiles, owner)? {
            self.cache
                .push_record(&query, Profile::placeholder(profile_id))?;
        }
        let result = self.cache.source().block_profile(profile_id).await;
        self.settle(
            MutationKind::Block,
            owner,
            result,
            "An error occurred, unable to block user",
        )
        .await
    }

    /// Withdraw an outgoing connection request.
    pub async fn cancel_request(&self, owner: &str, profile_id: &str) -> Result<(), MutationError> {
        self.apply_optimistic_removal(MutationKind::CancelRequest, owner, profile_id)?;
        let result = self
            .cache
            .source()
            .cancel_connection_request(profile_id)
            .await;
        self.settle(
            MutationKind::CancelRequest,
            owner,
            result,
            "An error occurred, unable to cancel request",
        )
        .await
    }

    /// Accept an incoming connection request. The new connection is not
    /// synthesized locally: on success the connection entries are refetched
    /// so the server's version of the record appears.
    pub async fn accept_request(&self, owner: &str, profile_id: &str) -> Result<(), MutationError> {
        self.apply_optimistic_removal(MutationKind::AcceptRequest, owner, profile_id)?;
        match self
            .cache
            .source()
            .accept_connection_request(profile_id)
            .await
        {
            Ok(()) => {
                debug!(profile_id, "connection request accepted");
                self.toasts
                    .present(ToastKind::Success, "Connection request accepted");
                self.refetch_entries(CollectionKind::Connections, owner).await?;
                Ok(())
            }
            Err(err) => {
                self.settle(
                    MutationKind::AcceptRequest,
                    owner,
                    Err(err),
                    "An error occurred, unable to accept request",
                )
                .await
            }
        }
    }

    /// Synchronously filter the record out of every entry the mutation
    /// removes from, for the given owner scope. Runs before the remote call
    /// suspends so the UI reflects the action immediately.
    fn apply_optimistic_removal(
        &self,
        kind: MutationKind,
        owner: &str,
        profile_id: &str,
    ) -> Result<(), MutationError> {
        for collection in kind.removal_targets() {
            for query in self.identities(*collection, owner)? {
                self.cache.remove_record(&query, profile_id)?;
            }
        }
        debug!(?kind, profile_id, "optimistic removal applied");
        Ok(())
    }

    /// Reconcile a settled remote call. Success keeps the optimistic state;
    /// failure toasts and refetches every affected entry so the cache never
    /// silently diverges from the server beyond one refetch cycle.
    async fn settle(
        &self,
        kind: MutationKind,
        owner: &str,
        result: Result<(), SourceError>,
        failure_message: &str,
    ) -> Result<(), MutationError> {
        match result {
            Ok(()) => {
                debug!(?kind, "mutation confirmed");
                Ok(())
            }
            Err(err) => {
                warn!(?kind, error = %err, "mutation failed, refetching affected entries");
                self.toasts.present(ToastKind::Error, failure_message);
                for collection in kind.affected_collections() {
                    self.refetch_entries(*collection, owner).await?;
                }
                Err(MutationError::Remote(err))
            }
        }
    }

    async fn refetch_entries(
        &self,
        collection: CollectionKind,
        owner: &str,
    ) -> Result<(), MutationError> {
        for query in self.identities(collection, owner)? {
            if let Err(err) = self.cache.refetch(&query).await {
                // The entry keeps its error state and stays retryable; the
                // primary mutation error is what the caller sees.
                warn!(?collection, error = %err, "refetch after mutation failed");
            }
        }
        Ok(())
    }

    fn identities(
        &self,
        collection: CollectionKind,
        owner: &str,
    ) -> Result<Vec<QueryIdentity>, MutationError> {
        Ok(self
            .cache
            .identities_for_kind(collection)?
            .into_iter()
            .filter(|query| query.owner == owner)
            .collect())
    }
}

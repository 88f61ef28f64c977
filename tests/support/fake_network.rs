//! Scripted stand-in for the wallet/API layer.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use collection_cache::{
    CollectionKind, Page, Profile, QueryIdentity, RemoteSource, SourceError,
};

/// Parks a call until the test releases it, so fetches and mutations can be
/// held "in flight" while the test pokes at the cache.
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    fn new() -> Self {
        Gate {
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Wait until a gated call has started and parked.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the parked call proceed.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Scripted remote source.
///
/// Page results are queued per collection kind and popped in order; an
/// exhausted script serves empty final pages. Mutation results share one
/// queue across endpoints, defaulting to success. Optional gates park
/// fetches or mutations until released.
pub struct FakeNetwork {
    pages: Mutex<HashMap<CollectionKind, VecDeque<Result<Page<Profile>, SourceError>>>>,
    fetch_calls: AtomicUsize,
    cursors_seen: Mutex<Vec<(CollectionKind, Option<String>)>>,
    mutation_results: Mutex<VecDeque<Result<(), SourceError>>>,
    mutation_calls: Mutex<Vec<(&'static str, String)>>,
    fetch_gate: Mutex<Option<Arc<Gate>>>,
    mutation_gate: Mutex<Option<Arc<Gate>>>,
}

impl Default for FakeNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeNetwork {
    pub fn new() -> Self {
        FakeNetwork {
            pages: Mutex::new(HashMap::new()),
            fetch_calls: AtomicUsize::new(0),
            cursors_seen: Mutex::new(Vec::new()),
            mutation_results: Mutex::new(VecDeque::new()),
            mutation_calls: Mutex::new(Vec::new()),
            fetch_gate: Mutex::new(None),
            mutation_gate: Mutex::new(None),
        }
    }

    pub fn script_page(&self, kind: CollectionKind, page: Page<Profile>) {
        self.pages
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(Ok(page));
    }

    pub fn script_fetch_error(&self, kind: CollectionKind, err: SourceError) {
        self.pages
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(Err(err));
    }

    pub fn script_mutation(&self, result: Result<(), SourceError>) {
        self.mutation_results.lock().unwrap().push_back(result);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn cursors_seen(&self) -> Vec<(CollectionKind, Option<String>)> {
        self.cursors_seen.lock().unwrap().clone()
    }

    pub fn mutation_calls(&self) -> Vec<(&'static str, String)> {
        self.mutation_calls.lock().unwrap().clone()
    }

    /// Park every subsequent fetch behind the returned gate.
    pub fn gate_fetches(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::new());
        *self.fetch_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn ungate_fetches(&self) {
        *self.fetch_gate.lock().unwrap() = None;
    }

    /// Park every subsequent mutation behind the returned gate.
    pub fn gate_mutations(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::new());
        *self.mutation_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    async fn mutate(&self, endpoint: &'static str, profile_id: &str) -> Result<(), SourceError> {
        let gate = self.mutation_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.mutation_calls
            .lock()
            .unwrap()
            .push((endpoint, profile_id.to_string()));
        self.mutation_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Profile with a display name derived from its id.
pub fn profile(id: &str) -> Profile {
    let mut name = id.to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    Profile::new(id, name)
}

pub fn page(ids: &[&str], cursor: Option<&str>, has_more: bool) -> Page<Profile> {
    Page::new(
        ids.iter().map(|id| profile(id)).collect(),
        cursor.map(str::to_string),
        has_more,
    )
}

pub fn connections(owner: &str) -> QueryIdentity {
    QueryIdentity::new(CollectionKind::Connections, owner)
}

pub fn pending(owner: &str) -> QueryIdentity {
    QueryIdentity::new(CollectionKind::PendingConnections, owner)
}

pub fn blocked(owner: &str) -> QueryIdentity {
    QueryIdentity::new(CollectionKind::BlockedProfiles, owner)
}

pub fn requests(owner: &str) -> QueryIdentity {
    QueryIdentity::new(CollectionKind::ConnectionRequests, owner)
}

pub fn record_ids(records: &[Profile]) -> Vec<String> {
    records.iter().map(|p| p.profile_id.clone()).collect()
}

#[async_trait]
impl RemoteSource<Profile> for FakeNetwork {
    async fn fetch_page(
        &self,
        query: &QueryIdentity,
        cursor: Option<&str>,
    ) -> Result<Page<Profile>, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.cursors_seen
            .lock()
            .unwrap()
            .push((query.kind, cursor.map(str::to_string)));

        let gate = self.fetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.pages
            .lock()
            .unwrap()
            .entry(query.kind)
            .or_default()
            .pop_front()
            .unwrap_or_else(|| Ok(Page::new(vec![], None, false)))
    }

    async fn block_profile(&self, profile_id: &str) -> Result<(), SourceError> {
        self.mutate("blockProfile", profile_id).await
    }

    async fn disconnect(&self, profile_id: &str) -> Result<(), SourceError> {
        self.mutate("disconnect", profile_id).await
    }

    async fn cancel_connection_request(&self, profile_id: &str) -> Result<(), SourceError> {
        self.mutate("cancelConnectionRequest", profile_id).await
    }

    async fn accept_connection_request(&self, profile_id: &str) -> Result<(), SourceError> {
        self.mutate("acceptConnectionRequest", profile_id).await
    }
}

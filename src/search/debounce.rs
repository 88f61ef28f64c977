//! Debounced query value shared between an input handler and a view task.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Default quiet interval before a typed query is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Where a debounced query is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing typed, or the field was cleared and applied.
    Idle,
    /// Keystrokes have arrived and the quiet interval has not elapsed.
    Typing,
    /// The quiet interval elapsed; the effective query is current.
    Applied,
}

struct Inner {
    raw: String,
    applied: String,
    last_edit: Option<Instant>,
    epoch: u64,
    state: SearchState,
}

/// Debounced text query.
///
/// Keystrokes land via [`set`](DebouncedQuery::set) and are immediately
/// visible through [`raw`](DebouncedQuery::raw), so the text field stays
/// responsive. The derived view awaits [`settled`](DebouncedQuery::settled),
/// which resolves with the effective query only after no keystroke has
/// arrived for the window; every keystroke restarts the wait. Bursts inside
/// one window therefore collapse to a single application carrying the final
/// text.
#[derive(Clone)]
pub struct DebouncedQuery {
    inner: Arc<Mutex<Inner>>,
    window: Duration,
}

impl Default for DebouncedQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl DebouncedQuery {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_DEBOUNCE)
    }

    pub fn with_window(window: Duration) -> Self {
        DebouncedQuery {
            inner: Arc::new(Mutex::new(Inner {
                raw: String::new(),
                applied: String::new(),
                last_edit: None,
                epoch: 0,
                state: SearchState::Idle,
            })),
            window,
        }
    }

    /// Record a keystroke. Restarts the quiet-interval timer.
    pub fn set(&self, text: impl Into<String>) {
        let mut inner = self.lock();
        inner.raw = text.into();
        inner.last_edit = Some(Instant::now());
        inner.epoch += 1;
        inner.state = SearchState::Typing;
    }

    /// Clear the field. The empty query still debounces before applying.
    pub fn clear(&self) {
        self.set("");
    }

    /// The text as typed, reflected immediately.
    pub fn raw(&self) -> String {
        self.lock().raw.clone()
    }

    /// The effective query the derived view was last recomputed from.
    pub fn applied(&self) -> String {
        self.lock().applied.clone()
    }

    pub fn state(&self) -> SearchState {
        self.lock().state
    }

    /// Resolve with the effective query once typing has paused for the
    /// window. Keystrokes that land mid-wait restart it; the value applied
    /// is whatever was typed last. Resolves immediately when no keystroke
    /// is pending.
    pub async fn settled(&self) -> String {
        loop {
            let (deadline, epoch) = {
                let inner = self.lock();
                match inner.last_edit {
                    Some(at) => (at + self.window, inner.epoch),
                    None => return inner.applied.clone(),
                }
            };

            sleep_until(deadline).await;

            let mut inner = self.lock();
            if inner.epoch == epoch {
                inner.applied = inner.raw.clone();
                inner.last_edit = None;
                inner.state = if inner.applied.is_empty() {
                    SearchState::Idle
                } else {
                    SearchState::Applied
                };
                return inner.applied.clone();
            }
            // Another keystroke landed while sleeping; wait again.
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

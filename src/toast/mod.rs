//! User-facing notification surface.

use std::sync::{Arc, Mutex};

use tracing::{error, info};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Fire-and-forget surface for user-visible messages. The host UI supplies
/// the real implementation; the broker only ever calls `present`.
pub trait ToastSink: Send + Sync {
    fn present(&self, kind: ToastKind, message: &str);
}

/// Default sink: logs toasts via `tracing`, or records them in a shared
/// buffer so tests can assert on what the user would have seen.
pub struct BufferedToasts {
    buffer: Option<Arc<Mutex<Vec<(ToastKind, String)>>>>,
}

impl Default for BufferedToasts {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferedToasts {
    pub fn new() -> Self {
        BufferedToasts { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<(ToastKind, String)>>>) -> Self {
        BufferedToasts {
            buffer: Some(buffer),
        }
    }
}

impl ToastSink for BufferedToasts {
    fn present(&self, kind: ToastKind, message: &str) {
        if let Some(buffer) = &self.buffer {
            let mut buffer = match buffer.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            buffer.push((kind, message.to_string()));
        } else {
            match kind {
                ToastKind::Success => info!(toast = message, "presenting toast"),
                ToastKind::Error => error!(toast = message, "presenting toast"),
            }
        }
    }
}

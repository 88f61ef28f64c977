//! Paginated, cached, searchable collection core for wallet-style clients.
//!
//! Four cooperating pieces sit between UI event handlers and an
//! externally-owned API client:
//!
//! - [`PageCache`] stores fetched pages per [`QueryIdentity`] with
//!   cursor-based, at-most-one-in-flight `fetch_next_page` semantics.
//! - [`ScrollTrigger`] turns sentinel visibility into idempotent
//!   next-page fetches.
//! - [`filter`] and [`DebouncedQuery`] derive a filtered view of
//!   already-fetched records without touching the network.
//! - [`MutationBroker`] applies block/disconnect/cancel/accept actions to
//!   the cache immediately and reconciles remote failures by refetching.

mod broker;
mod cache;
mod query;
mod record;
mod scroll;
mod search;
mod source;
mod toast;

pub use broker::{MutationBroker, MutationError, MutationKind};
pub use cache::{CacheError, CollectionEntry, FetchOutcome, PageCache};
pub use query::{CollectionKind, Page, PageOptions, QueryIdentity};
pub use record::{BoostSummary, Profile, Recipient, Record};
pub use scroll::ScrollTrigger;
pub use search::{filter, DebouncedQuery, SearchState, DEFAULT_DEBOUNCE};
pub use source::{RemoteSource, SourceError};
pub use toast::{BufferedToasts, ToastKind, ToastSink};

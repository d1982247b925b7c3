//! Citation core: the in-memory multi-index citation store.
//!
//! Records live in a generational [`RecordArena`]; the [`UrlIndex`], the
//! [`PendingQueue`], the transient [`OrderedIndex`] and the
//! [`ProcessedStack`] only hold handles into it. [`CitationStore`] is the
//! single entry point that moves handles between them.
mod arena;
mod collab;
mod config;
mod error;
mod import;
mod ordered_index;
mod pending_queue;
mod processed_stack;
mod record;
mod store;
mod url_index;

pub use arena::{Handle, Location, RecordArena};
pub use collab::{BibliographyWriter, Enricher};
pub use config::{DateSource, StoreConfig};
pub use error::{InvariantViolation, StoreError, WriterError};
pub use import::{is_valid_url, ImportSummary};
pub use ordered_index::OrderedIndex;
pub use pending_queue::PendingQueue;
pub use processed_stack::ProcessedStack;
pub use record::{trim_url, MissingFields, PartialRecord, Record};
pub use store::{BatchPlan, CitationStore, EnrichSummary, ExportSummary, ProcessSummary};
pub use url_index::{djb2, UrlIndex, DEFAULT_BUCKET_COUNT};

//! Citation engine: web enrichment and bibliography output.
mod decode;
mod enrich;
mod export;
mod extract;
mod fetch;
mod persist;
mod types;

pub use decode::{decode_page, DecodedPage};
pub use enrich::WebEnricher;
pub use export::{
    bib_path_for_stem, render_bibliography, render_entry, BibFileWriter, EntryLayout,
    ExportError, ExportOptions, BIB_EXTENSION,
};
pub use extract::{json_ld_fields, HtmlMetadataExtractor, MetadataExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, BROWSER_USER_AGENT};
pub use persist::{ensure_output_dir, write_atomically, PersistError};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};

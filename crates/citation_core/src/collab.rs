//! Seams to the collaborators the store drives but does not implement.

use crate::error::WriterError;
use crate::record::{PartialRecord, Record};

/// Looks up metadata for a URL.
///
/// Implementations must not fail: on any network or parse problem they
/// return an empty [`PartialRecord`].
pub trait Enricher {
    fn enrich(&self, url: &str) -> PartialRecord;
}

/// Serializes a completed set of records.
///
/// Records arrive in export order; entry `i` of the slice gets cite key
/// suffix `i`.
pub trait BibliographyWriter {
    fn write_bibliography(&mut self, records: &[&Record]) -> Result<(), WriterError>;
}

impl<F> Enricher for F
where
    F: Fn(&str) -> PartialRecord,
{
    fn enrich(&self, url: &str) -> PartialRecord {
        self(url)
    }
}

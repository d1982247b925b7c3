use thiserror::Error;

/// Boxed error returned by bibliography writers.
pub type WriterError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a citation for {0} already exists")]
    DuplicateKey(String),
    #[error("no citation stored for {0}")]
    NotFound(String),
    #[error("citation key must not be empty")]
    EmptyKey,
    #[error("handle refers to a released record slot")]
    StaleHandle,
    #[error("record arena cannot grow any further")]
    AllocationExhausted,
    #[error("nothing to export: no processed citations")]
    NothingToExport,
    #[error("bibliography export failed")]
    Export(#[source] WriterError),
}

/// A broken cross-structure invariant. Always a store defect, never user input.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("store invariant violated: {0}")]
pub struct InvariantViolation(pub String);

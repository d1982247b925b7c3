use citation_core::{Enricher, PartialRecord};
use citation_logging::{cite_debug, cite_warn};

use crate::decode::decode_page;
use crate::extract::{HtmlMetadataExtractor, MetadataExtractor};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::types::{FailureKind, FetchError};

/// Synchronous enrichment over the async fetcher.
///
/// Owns a current-thread runtime and blocks on one request at a time, so it
/// must not be used from inside another tokio runtime.
pub struct WebEnricher<F = ReqwestFetcher, X = HtmlMetadataExtractor> {
    runtime: tokio::runtime::Runtime,
    fetcher: F,
    extractor: X,
}

impl WebEnricher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        Self::with_parts(ReqwestFetcher::new(settings), HtmlMetadataExtractor)
    }
}

impl<F, X> WebEnricher<F, X>
where
    F: Fetcher,
    X: MetadataExtractor,
{
    pub fn with_parts(fetcher: F, extractor: X) -> Result<Self, FetchError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| FetchError::new(FailureKind::Runtime, err.to_string()))?;
        Ok(Self {
            runtime,
            fetcher,
            extractor,
        })
    }

    /// Fetch, decode and extract, reporting why a lookup failed.
    pub fn lookup(&self, url: &str) -> Result<PartialRecord, FetchError> {
        let output = self.runtime.block_on(self.fetcher.fetch(url))?;
        let page = decode_page(&output.bytes, output.metadata.content_type.as_deref());
        let found = self.extractor.extract(&page.html);
        cite_debug!(
            "{}: author={:?} title={:?} year={:?}",
            url,
            found.author,
            found.title,
            found.year
        );
        Ok(found)
    }
}

impl<F, X> Enricher for WebEnricher<F, X>
where
    F: Fetcher,
    X: MetadataExtractor,
{
    fn enrich(&self, url: &str) -> PartialRecord {
        match self.lookup(url) {
            Ok(found) => found,
            Err(err) => {
                cite_warn!("web lookup for {} failed: {}", url, err);
                PartialRecord::default()
            }
        }
    }
}

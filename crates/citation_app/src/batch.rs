//! Non-interactive `-i` / `-w` runs: import a URL list, process it and
//! export it in one go.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use citation_core::{BatchPlan, CitationStore, Enricher, ImportSummary, StoreError};
use citation_engine::{BibFileWriter, ExportOptions};
use citation_logging::cite_info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub import: ImportSummary,
    pub enriched: Option<usize>,
    /// `None` when nothing was processed and no file was written.
    pub exported: Option<usize>,
    pub output: PathBuf,
}

impl BatchReport {
    pub fn describe(&self, input: &Path) -> String {
        match self.exported {
            Some(count) => format!(
                "{count} URLs from {} exported to {} ({} duplicates, {} invalid lines skipped)",
                input.display(),
                self.output.display(),
                self.import.duplicates,
                self.import.skipped
            ),
            None => format!("No valid URLs in {}: nothing to export.", input.display()),
        }
    }
}

pub fn run_batch(
    store: &mut CitationStore,
    input: &Path,
    enricher: Option<&dyn Enricher>,
    output: &Path,
    options: ExportOptions,
) -> Result<BatchReport> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read URL list: {}", input.display()))?;
    let import = store.import_text(&text)?;

    let processed = store.process_batch(BatchPlan {
        sort: false,
        enricher,
    });
    cite_info!(
        "batch run over {}: {} imported, {} processed",
        input.display(),
        import.added,
        processed.processed
    );

    let mut writer = BibFileWriter::new(output, options);
    let exported = match store.export(&mut writer) {
        Ok(summary) => Some(summary.exported),
        Err(StoreError::NothingToExport) => None,
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to write {}", output.display()));
        }
    };

    Ok(BatchReport {
        import,
        enriched: processed.enrichment.map(|e| e.enriched),
        exported,
        output: output.to_path_buf(),
    })
}

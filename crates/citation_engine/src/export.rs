use std::path::{Path, PathBuf};

use citation_core::{BibliographyWriter, Record, WriterError};
use citation_logging::cite_info;

use crate::persist::{write_atomically, PersistError};

pub const BIB_EXTENSION: &str = "bib";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryLayout {
    /// One line per entry.
    #[default]
    Compact,
    /// One field per tab-indented line.
    Expanded,
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub cite_key_prefix: String,
    pub layout: EntryLayout,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            cite_key_prefix: "CiteKey".to_string(),
            layout: EntryLayout::Compact,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("file name must not be empty")]
    EmptyFileName,
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Renders one `@online` entry. Blank fields are written as `{}`.
pub fn render_entry(index: usize, record: &Record, options: &ExportOptions) -> String {
    let year = record.year().map(|y| y.to_string()).unwrap_or_default();
    let urldate = record.accessed_on().format("%Y-%m-%d").to_string();
    let fields = [
        ("author", record.author().unwrap_or_default()),
        ("title", record.title().unwrap_or_default()),
        ("year", year.as_str()),
        ("url", record.key()),
        ("urldate", urldate.as_str()),
    ];

    let mut entry = format!("@online{{{}{}", options.cite_key_prefix, index);
    let separator = match options.layout {
        EntryLayout::Compact => ", ",
        EntryLayout::Expanded => ",\n\t",
    };
    for (name, value) in fields {
        entry.push_str(separator);
        entry.push_str(&format!("{name} = {{{value}}}"));
    }
    match options.layout {
        EntryLayout::Compact => entry.push_str("}\n"),
        EntryLayout::Expanded => entry.push_str("\n}\n"),
    }
    entry
}

/// Entry `i` of `records` gets cite key suffix `i`.
pub fn render_bibliography(records: &[&Record], options: &ExportOptions) -> String {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| render_entry(index, record, options))
        .collect()
}

/// `notes` becomes `notes.bib`; a stem that already ends in `.bib` is kept.
pub fn bib_path_for_stem(stem: &str) -> Result<PathBuf, ExportError> {
    let stem = stem.trim();
    if stem.is_empty() {
        return Err(ExportError::EmptyFileName);
    }
    let path = Path::new(stem);
    if path.extension().and_then(|ext| ext.to_str()) == Some(BIB_EXTENSION) {
        return Ok(path.to_path_buf());
    }
    Ok(PathBuf::from(format!("{stem}.{BIB_EXTENSION}")))
}

/// Writes the whole bibliography to one file, replacing it atomically.
#[derive(Debug, Clone)]
pub struct BibFileWriter {
    path: PathBuf,
    options: ExportOptions,
}

impl BibFileWriter {
    pub fn new(path: impl Into<PathBuf>, options: ExportOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BibliographyWriter for BibFileWriter {
    fn write_bibliography(&mut self, records: &[&Record]) -> Result<(), WriterError> {
        let content = render_bibliography(records, &self.options);
        write_atomically(&self.path, &content).map_err(ExportError::from)?;
        cite_info!(
            "wrote {} entries to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_gets_bib_extension() {
        assert_eq!(bib_path_for_stem(" refs ").unwrap(), PathBuf::from("refs.bib"));
        assert_eq!(bib_path_for_stem("refs.bib").unwrap(), PathBuf::from("refs.bib"));
        assert_eq!(
            bib_path_for_stem("out/refs.v2").unwrap(),
            PathBuf::from("out/refs.v2.bib")
        );
        assert!(matches!(bib_path_for_stem("  "), Err(ExportError::EmptyFileName)));
    }
}

use std::fs;

use chrono::NaiveDate;
use citation_core::{
    BibliographyWriter, CitationStore, PartialRecord, Record, StoreConfig, StoreError,
};
use citation_engine::{
    render_bibliography, render_entry, write_atomically, BibFileWriter, EntryLayout,
    ExportOptions,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn accessed() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 21).unwrap()
}

fn store() -> CitationStore {
    citation_logging::initialize_for_tests();
    CitationStore::with_config(StoreConfig::with_fixed_date(accessed()))
}

#[test]
fn compact_entry_matches_template() {
    let mut store = store();
    store
        .add(
            "https://a.com",
            PartialRecord::new()
                .with_author("Smith")
                .with_title("Guide")
                .with_year(2021),
        )
        .unwrap();
    let record = store.get("https://a.com").unwrap();

    assert_eq!(
        render_entry(0, record, &ExportOptions::default()),
        "@online{CiteKey0, author = {Smith}, title = {Guide}, year = {2021}, url = {https://a.com}, urldate = {2025-03-21}}\n"
    );
}

#[test]
fn blank_fields_render_empty_braces() {
    let record = Record::new("https://b.com", accessed());

    assert_eq!(
        render_entry(3, &record, &ExportOptions::default()),
        "@online{CiteKey3, author = {}, title = {}, year = {}, url = {https://b.com}, urldate = {2025-03-21}}\n"
    );
}

#[test]
fn expanded_layout_uses_one_field_per_line() {
    let record = Record::new("https://b.com", accessed());
    let options = ExportOptions {
        cite_key_prefix: "WebsiteCiteKey".to_string(),
        layout: EntryLayout::Expanded,
    };

    assert_eq!(
        render_entry(0, &record, &options),
        "@online{WebsiteCiteKey0,\n\tauthor = {},\n\ttitle = {},\n\tyear = {},\n\turl = {https://b.com},\n\turldate = {2025-03-21}\n}\n"
    );
}

#[test]
fn bibliography_numbers_entries_in_order() {
    let first = Record::new("https://1.com", accessed());
    let second = Record::new("https://2.com", accessed());

    let text = render_bibliography(&[&first, &second], &ExportOptions::default());

    let keys: Vec<_> = text
        .lines()
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(keys, vec!["@online{CiteKey0", "@online{CiteKey1"]);
    assert!(text.lines().nth(1).unwrap().contains("url = {https://2.com}"));
}

#[test]
fn store_export_writes_file_in_drain_order() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("references.bib");
    let mut store = store();
    for url in ["https://first.com", "https://second.com"] {
        store.add(url, PartialRecord::default()).unwrap();
    }
    store.process_all();
    let mut writer = BibFileWriter::new(&target, ExportOptions::default());

    let summary = store.export(&mut writer).unwrap();

    assert_eq!(summary.exported, 2);
    let text = fs::read_to_string(&target).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("@online{CiteKey0, ") && lines[0].contains("https://second.com"));
    assert!(lines[1].starts_with("@online{CiteKey1, ") && lines[1].contains("https://first.com"));
    assert!(store.is_empty());
}

#[test]
fn unwritable_target_keeps_store_intact() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();
    let mut store = store();
    store.add("https://a.com", PartialRecord::default()).unwrap();
    store.process_all();
    let mut writer = BibFileWriter::new(blocker.join("refs.bib"), ExportOptions::default());

    let err = store.export(&mut writer).unwrap_err();

    assert!(matches!(err, StoreError::Export(_)));
    assert_eq!(store.processed_len(), 1);
    store.audit().unwrap();
}

#[test]
fn export_error_chain_names_each_cause_once() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();
    let mut store = store();
    store.add("https://a.com", PartialRecord::default()).unwrap();
    store.process_all();
    let mut writer = BibFileWriter::new(blocker.join("refs.bib"), ExportOptions::default());

    let err = store.export(&mut writer).unwrap_err();

    let mut chain = vec![err.to_string()];
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0], "bibliography export failed");
    assert!(chain[1].starts_with("output directory missing or not writable"));
    assert!(chain[1].contains("is not a directory"));
    let joined = chain.join(": ");
    assert_eq!(joined.matches("not writable").count(), 1);
}

#[test]
fn writer_can_be_driven_directly() {
    let temp = TempDir::new().unwrap();
    let record = Record::new("https://direct.com", accessed());
    let mut writer = BibFileWriter::new(temp.path().join("out.bib"), ExportOptions::default());

    writer.write_bibliography(&[&record]).unwrap();

    assert!(fs::read_to_string(writer.path())
        .unwrap()
        .contains("url = {https://direct.com}"));
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("refs.bib");

    write_atomically(&target, "old").unwrap();
    let written = write_atomically(&target, "new").unwrap();

    assert_eq!(written, target);
    assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    let leftovers = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn atomic_write_creates_missing_parent() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("refs.bib");

    write_atomically(&target, "data").unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), "data");
}

use chrono::NaiveDate;
use citation_core::{CitationStore, Location, PartialRecord, StoreConfig, StoreError};
use pretty_assertions::assert_eq;

fn init_logging() {
    citation_logging::initialize_for_tests();
}

fn store() -> CitationStore {
    CitationStore::with_config(StoreConfig::with_fixed_date(
        NaiveDate::from_ymd_opt(2025, 3, 21).unwrap(),
    ))
}

#[test]
fn add_registers_and_queues() {
    init_logging();
    let mut store = store();
    let handle = store
        .add("https://a.com", PartialRecord::new().with_author("Smith"))
        .unwrap();

    assert_eq!(store.find("https://a.com"), Some(handle));
    assert_eq!(store.location("https://a.com").unwrap(), Location::Pending);
    let record = store.get("https://a.com").unwrap();
    assert_eq!(record.author(), Some("Smith"));
    assert_eq!(record.title(), None);
    assert_eq!(
        record.accessed_on(),
        NaiveDate::from_ymd_opt(2025, 3, 21).unwrap()
    );
    store.audit().unwrap();
}

#[test]
fn duplicate_add_is_rejected_and_first_record_kept() {
    init_logging();
    let mut store = store();
    let first = store
        .add("https://x.com", PartialRecord::new().with_title("Original"))
        .unwrap();

    let err = store
        .add("https://x.com", PartialRecord::new().with_title("Replacement"))
        .unwrap_err();

    assert!(matches!(err, StoreError::DuplicateKey(ref key) if key == "https://x.com"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.pending_len(), 1);
    assert_eq!(store.find("https://x.com"), Some(first));
    assert_eq!(store.get("https://x.com").unwrap().title(), Some("Original"));
    store.audit().unwrap();
}

#[test]
fn empty_key_is_rejected() {
    let mut store = store();
    assert!(matches!(
        store.add("  ", PartialRecord::default()),
        Err(StoreError::EmptyKey)
    ));
    assert!(store.is_empty());
}

#[test]
fn update_changes_only_optional_fields() {
    init_logging();
    let mut store = store();
    store
        .add("https://a.com", PartialRecord::new().with_author("Smith"))
        .unwrap();

    let updated = store
        .update(
            "https://a.com",
            &PartialRecord::new().with_title("Guide").with_year(2021),
        )
        .unwrap();

    assert_eq!(updated.key(), "https://a.com");
    assert_eq!(updated.author(), Some("Smith"));
    assert_eq!(updated.title(), Some("Guide"));
    assert_eq!(updated.year(), Some(2021));
}

#[test]
fn update_unknown_key_reports_not_found() {
    let mut store = store();
    let err = store
        .update("https://nowhere.com", &PartialRecord::new().with_title("x"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn remove_while_pending_releases_everything() {
    init_logging();
    let mut store = store();
    let handle = store.add("https://y.com", PartialRecord::default()).unwrap();

    let removed = store.remove("https://y.com").unwrap();

    assert_eq!(removed.key(), "https://y.com");
    assert!(store.is_empty());
    assert_eq!(store.pending_len(), 0);
    assert_eq!(store.processed_len(), 0);
    assert_eq!(store.find("https://y.com"), None);
    assert!(matches!(store.resolve(handle), Err(StoreError::StaleHandle)));
    assert!(matches!(
        store.get("https://y.com"),
        Err(StoreError::NotFound(_))
    ));
    store.audit().unwrap();
}

#[test]
fn remove_after_processing_excises_from_stack() {
    init_logging();
    let mut store = store();
    for url in ["https://1.com", "https://2.com", "https://3.com"] {
        store.add(url, PartialRecord::default()).unwrap();
    }
    store.process_all();

    store.remove("https://2.com").unwrap();

    let remaining: Vec<_> = store.processed().map(|r| r.key().to_owned()).collect();
    assert_eq!(remaining, vec!["https://3.com", "https://1.com"]);
    store.audit().unwrap();
}

#[test]
fn remove_unknown_key_reports_not_found() {
    let mut store = store();
    store.add("https://a.com", PartialRecord::default()).unwrap();

    assert!(matches!(
        store.remove("https://b.com"),
        Err(StoreError::NotFound(_))
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn removed_key_can_be_added_again() {
    let mut store = store();
    let first = store.add("https://a.com", PartialRecord::default()).unwrap();
    store.remove("https://a.com").unwrap();

    let second = store.add("https://a.com", PartialRecord::default()).unwrap();

    assert_ne!(first, second);
    assert_eq!(store.find("https://a.com"), Some(second));
    store.audit().unwrap();
}

#[test]
fn import_counts_added_duplicates_and_skipped() {
    init_logging();
    let mut store = store();
    let text = "https://a.com\nnot a url\n\nhttps://b.com/page\n  https://a.com  \nftp://c.com\n";

    let summary = store.import_text(text).unwrap();

    assert_eq!(summary.added, 2);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.skipped, 2);
    let keys: Vec<_> = store.pending().map(|r| r.key()).collect();
    assert_eq!(keys, vec!["https://a.com", "https://b.com/page"]);
}

#[test]
fn small_bucket_count_still_resolves_every_key() {
    let mut store = CitationStore::with_config(StoreConfig {
        bucket_count: 2,
        ..StoreConfig::with_fixed_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    });
    let urls: Vec<String> = (0..20).map(|i| format!("https://site{i}.com")).collect();
    for url in &urls {
        store.add(url, PartialRecord::default()).unwrap();
    }
    for url in urls.iter().step_by(3) {
        store.remove(url).unwrap();
    }

    for (i, url) in urls.iter().enumerate() {
        assert_eq!(store.find(url).is_some(), i % 3 != 0, "{url}");
    }
    store.audit().unwrap();
}

//! The lifecycle coordinator tying the arena and the membership structures
//! together.
//!
//! Every public operation runs to completion and leaves these invariants
//! intact:
//! - each URL index entry resolves to a live arena slot holding that key;
//! - each live record sits in exactly one of the pending queue or the
//!   processed stack (the ordered index only holds handles inside
//!   [`CitationStore::sort_pending`]);
//! - a released slot is never referenced by any structure.

use std::collections::HashSet;

use citation_logging::{cite_debug, cite_error, cite_info, cite_warn};

use crate::arena::{Handle, Location, RecordArena};
use crate::collab::{BibliographyWriter, Enricher};
use crate::config::StoreConfig;
use crate::error::{InvariantViolation, StoreError};
use crate::import::{candidate_lines, ImportSummary};
use crate::ordered_index::OrderedIndex;
use crate::pending_queue::PendingQueue;
use crate::processed_stack::ProcessedStack;
use crate::record::{PartialRecord, Record};
use crate::url_index::UrlIndex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub attempted: usize,
    /// Records that gained at least one field.
    pub enriched: usize,
}

/// What a processing round should do before handing records to the stack.
#[derive(Clone, Copy, Default)]
pub struct BatchPlan<'a> {
    pub sort: bool,
    pub enricher: Option<&'a dyn Enricher>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub sorted: usize,
    pub enrichment: Option<EnrichSummary>,
    pub processed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
}

#[derive(Debug)]
pub struct CitationStore {
    config: StoreConfig,
    arena: RecordArena,
    index: UrlIndex,
    pending: PendingQueue,
    processed: ProcessedStack,
}

impl Default for CitationStore {
    fn default() -> Self {
        Self::with_config(StoreConfig::default())
    }
}

impl CitationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            index: UrlIndex::with_buckets(config.bucket_count),
            config,
            arena: RecordArena::new(),
            pending: PendingQueue::new(),
            processed: ProcessedStack::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    pub fn find(&self, key: &str) -> Option<Handle> {
        self.index.find(key)
    }

    pub fn resolve(&self, handle: Handle) -> Result<&Record, StoreError> {
        self.arena.get(handle)
    }

    pub fn get(&self, key: &str) -> Result<&Record, StoreError> {
        let handle = self.lookup(key)?;
        self.arena.get(handle)
    }

    pub fn location(&self, key: &str) -> Result<Location, StoreError> {
        let handle = self.lookup(key)?;
        self.arena.location(handle)
    }

    /// Pending records, front of the queue first.
    pub fn pending(&self) -> impl Iterator<Item = &Record> + '_ {
        self.pending.iter().filter_map(move |h| self.arena.get(h).ok())
    }

    /// Processed records, top of the stack first.
    pub fn processed(&self) -> impl Iterator<Item = &Record> + '_ {
        self.processed.iter().filter_map(move |h| self.arena.get(h).ok())
    }

    /// Registers a new citation and queues it for processing.
    pub fn add(&mut self, key: &str, fields: PartialRecord) -> Result<Handle, StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::EmptyKey);
        }

        let record = Record::new(key, (self.config.today)());
        let handle = self.arena.create(record)?;
        if !self.index.insert(key, handle) {
            self.arena.release(handle);
            cite_debug!("rejected duplicate citation {}", key);
            return Err(StoreError::DuplicateKey(key.to_owned()));
        }

        self.pending.enqueue(handle);
        track(&mut self.arena, handle, Location::Detached, Location::Pending);
        if let Ok(record) = self.arena.get_mut(handle) {
            record.apply(&fields);
        }
        cite_debug!("added citation {}", key);
        Ok(handle)
    }

    /// Overwrites the optional fields present in `fields`. The key and the
    /// access date never change.
    pub fn update(&mut self, key: &str, fields: &PartialRecord) -> Result<&Record, StoreError> {
        let handle = self.lookup(key)?;
        let record = self.arena.get_mut(handle)?;
        if record.apply(fields) {
            cite_debug!("updated citation {}", key);
        }
        Ok(record)
    }

    /// Deletes a citation from whichever structure currently holds it.
    ///
    /// The pending queue is searched first, then the processed stack.
    pub fn remove(&mut self, key: &str) -> Result<Record, StoreError> {
        let handle = self.lookup(key)?;

        let arena = &self.arena;
        let resolve = |h: Handle| arena.get(h).ok().map(Record::key);
        let excised = self
            .pending
            .remove_by_key(key, resolve)
            .or_else(|| self.processed.remove_by_key(key, resolve));

        self.index.remove(key);
        let released = self.arena.release(handle);

        match (excised, released) {
            (Some(found), Some(record)) => {
                debug_assert_eq!(found, handle, "index and container disagree on {key}");
                cite_info!("removed citation {}", key);
                Ok(record)
            }
            _ => {
                cite_error!(
                    "citation {} was indexed but not held by the queue or the stack",
                    key
                );
                debug_assert!(false, "citation {key} indexed but not held by any container");
                Err(StoreError::NotFound(key.to_owned()))
            }
        }
    }

    /// Adds every valid URL line of `text`. Duplicates and malformed lines
    /// are counted and skipped.
    pub fn import_text(&mut self, text: &str) -> Result<ImportSummary, StoreError> {
        let mut summary = ImportSummary::default();
        for line in candidate_lines(text) {
            match line {
                Ok(url) => match self.add(url, PartialRecord::default()) {
                    Ok(_) => summary.added += 1,
                    Err(StoreError::DuplicateKey(_)) => summary.duplicates += 1,
                    Err(err) => return Err(err),
                },
                Err(junk) => {
                    cite_debug!("skipping malformed import line {:?}", junk);
                    summary.skipped += 1;
                }
            }
        }
        cite_info!(
            "import finished: {} added, {} duplicates, {} skipped",
            summary.added,
            summary.duplicates,
            summary.skipped
        );
        Ok(summary)
    }

    /// Reorders the pending queue, descending by derived sort key. Returns
    /// the number of records sorted.
    pub fn sort_pending(&mut self) -> usize {
        let mut ordered = OrderedIndex::new();
        while let Some(handle) = self.pending.dequeue() {
            track(&mut self.arena, handle, Location::Pending, Location::Ordered);
            let arena = &self.arena;
            ordered.insert_sorted(handle, |h| {
                arena.get(h).map(Record::sort_key).unwrap_or_default()
            });
        }

        let sorted = ordered.drain_to_queue(&mut self.pending);
        for handle in self.pending.iter() {
            track(&mut self.arena, handle, Location::Ordered, Location::Pending);
        }
        cite_debug!("sorted {} pending citations", sorted);
        sorted
    }

    /// Runs `enricher` over every pending record, filling only blank fields.
    /// A record the enricher knows nothing about is left as it was.
    pub fn enrich_pending(&mut self, enricher: &dyn Enricher) -> EnrichSummary {
        let handles: Vec<Handle> = self.pending.iter().collect();
        let mut summary = EnrichSummary::default();
        for handle in handles {
            let Ok(record) = self.arena.get(handle) else {
                continue;
            };
            if !record.missing().any() {
                continue;
            }
            let key = record.key().to_owned();
            summary.attempted += 1;

            let found = enricher.enrich(&key);
            if found.is_empty() {
                cite_warn!("no metadata found for {}", key);
                continue;
            }
            if let Ok(record) = self.arena.get_mut(handle) {
                if record.fill_blanks(&found) {
                    summary.enriched += 1;
                }
            }
        }
        cite_info!(
            "enrichment finished: {} of {} citations gained data",
            summary.enriched,
            summary.attempted
        );
        summary
    }

    /// Moves the whole pending queue onto the processed stack. The stack
    /// ends up holding the queue in reverse.
    pub fn process_all(&mut self) -> usize {
        let mut moved = 0;
        while let Some(handle) = self.pending.dequeue() {
            self.processed.push(handle);
            track(&mut self.arena, handle, Location::Pending, Location::Processed);
            moved += 1;
        }
        cite_debug!("processed {} citations", moved);
        moved
    }

    /// Optional sort, optional enrichment, then [`Self::process_all`].
    pub fn process_batch(&mut self, plan: BatchPlan<'_>) -> ProcessSummary {
        let sorted = if plan.sort { self.sort_pending() } else { 0 };
        let enrichment = plan.enricher.map(|enricher| self.enrich_pending(enricher));
        let processed = self.process_all();
        ProcessSummary {
            sorted,
            enrichment,
            processed,
        }
    }

    /// Hands every processed record to `writer` in stack-drain order, then
    /// releases them. If the writer fails nothing is released.
    pub fn export(&mut self, writer: &mut dyn BibliographyWriter) -> Result<ExportSummary, StoreError> {
        if self.processed.is_empty() {
            return Err(StoreError::NothingToExport);
        }

        let records = self
            .processed
            .iter()
            .map(|h| self.arena.get(h))
            .collect::<Result<Vec<_>, _>>()?;
        writer
            .write_bibliography(&records)
            .map_err(StoreError::Export)?;

        let mut exported = 0;
        while let Some(handle) = self.processed.pop() {
            match self.arena.release(handle) {
                Some(record) => {
                    self.index.remove(record.key());
                }
                None => debug_assert!(false, "processed stack held a released handle"),
            }
            exported += 1;
        }
        cite_info!("exported {} citations", exported);
        Ok(ExportSummary { exported })
    }

    /// Cross-checks every structure against the others.
    pub fn audit(&self) -> Result<(), InvariantViolation> {
        let violation = |msg: String| Err(InvariantViolation(msg));

        if self.index.len() != self.arena.len() {
            return violation(format!(
                "index holds {} keys but arena holds {} records",
                self.index.len(),
                self.arena.len()
            ));
        }

        let queued: HashSet<Handle> = self.pending.iter().collect();
        let stacked: HashSet<Handle> = self.processed.iter().collect();
        if queued.len() != self.pending.len() || stacked.len() != self.processed.len() {
            return violation("a handle appears twice in one container".into());
        }
        if let Some(shared) = queued.intersection(&stacked).next() {
            return violation(format!("{shared:?} is both pending and processed"));
        }
        if queued.len() + stacked.len() != self.index.len() {
            return violation(format!(
                "{} indexed keys but {} queued and {} stacked",
                self.index.len(),
                queued.len(),
                stacked.len()
            ));
        }

        for (key, handle) in self.index.entries() {
            let record = match self.arena.get(handle) {
                Ok(record) => record,
                Err(_) => return violation(format!("{key} maps to a released slot")),
            };
            if record.key() != key {
                return violation(format!("{key} maps to record {}", record.key()));
            }
            let held = match self.arena.location(handle) {
                Ok(Location::Pending) => queued.contains(&handle),
                Ok(Location::Processed) => stacked.contains(&handle),
                Ok(other) => return violation(format!("{key} left at {other:?}")),
                Err(err) => return violation(format!("{key}: {err}")),
            };
            if !held {
                return violation(format!("{key} is not held where the arena says"));
            }
        }
        Ok(())
    }

    fn lookup(&self, key: &str) -> Result<Handle, StoreError> {
        self.index
            .find(key)
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }
}

/// Records a membership move. A mismatch means a coordinator bug.
fn track(arena: &mut RecordArena, handle: Handle, from: Location, to: Location) {
    if let Err(err) = arena.relocate(handle, from, to) {
        debug_assert!(false, "membership move {from:?} -> {to:?} failed: {err}");
    }
}

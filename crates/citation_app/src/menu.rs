//! The interactive main menu and its process sub-menu.

use std::fs;
use std::io::{self, BufRead, Write};

use anyhow::Result;
use citation_core::{CitationStore, Enricher, PartialRecord, StoreError};
use citation_engine::{bib_path_for_stem, BibFileWriter, ExportOptions};
use citation_logging::{cite_info, cite_warn};

use crate::console::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Import,
    Add,
    Update,
    Remove,
    Process,
    Export,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 7] = [
        MenuItem::Import,
        MenuItem::Add,
        MenuItem::Update,
        MenuItem::Remove,
        MenuItem::Process,
        MenuItem::Export,
        MenuItem::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Import => "Import URLs from file",
            MenuItem::Add => "Add citation",
            MenuItem::Update => "Update citation",
            MenuItem::Remove => "Remove citation",
            MenuItem::Process => "Process citations",
            MenuItem::Export => "Export processed citations",
            MenuItem::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessItem {
    FillBlanks,
    Sort,
    WebLookup,
    Finish,
    Cancel,
}

impl ProcessItem {
    pub const ALL: [ProcessItem; 5] = [
        ProcessItem::FillBlanks,
        ProcessItem::Sort,
        ProcessItem::WebLookup,
        ProcessItem::Finish,
        ProcessItem::Cancel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProcessItem::FillBlanks => "Add data for all citations",
            ProcessItem::Sort => "Sort citations alphabetically",
            ProcessItem::WebLookup => "Attempt web lookup for all citations",
            ProcessItem::Finish => "Finish processing all citations",
            ProcessItem::Cancel => "Cancel processing citations",
        }
    }
}

/// Interactive session state: the store plus everything the menu needs to
/// drive it.
pub struct App<'e, R, W> {
    store: CitationStore,
    console: Console<R, W>,
    enricher: &'e dyn Enricher,
    export_options: ExportOptions,
}

impl<'e, R: BufRead, W: Write> App<'e, R, W> {
    pub fn new(
        store: CitationStore,
        console: Console<R, W>,
        enricher: &'e dyn Enricher,
        export_options: ExportOptions,
    ) -> Self {
        Self {
            store,
            console,
            enricher,
            export_options,
        }
    }

    pub fn into_parts(self) -> (CitationStore, Console<R, W>) {
        (self.store, self.console)
    }

    /// Runs until Exit is chosen or input ends.
    pub fn run(&mut self) -> Result<()> {
        self.header()?;
        loop {
            match self.step() {
                Ok(true) => continue,
                Ok(false) => break,
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    cite_info!("input closed, leaving the menu");
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }
        self.console.say("Exiting program...")?;
        Ok(())
    }

    /// One round of the main menu. `false` means exit.
    fn step(&mut self) -> io::Result<bool> {
        self.console.say("")?;
        for (number, item) in MenuItem::ALL.iter().enumerate() {
            self.console.say(format!("[{number}] {}", item.label()))?;
        }
        let choice = self.console.menu_choice(MenuItem::ALL.len() as u8 - 1)?;
        match MenuItem::ALL[usize::from(choice)] {
            MenuItem::Import => self.import()?,
            MenuItem::Add => self.add()?,
            MenuItem::Update => self.update()?,
            MenuItem::Remove => self.remove()?,
            MenuItem::Process => self.process()?,
            MenuItem::Export => self.export()?,
            MenuItem::Exit => return Ok(false),
        }
        Ok(true)
    }

    fn header(&mut self) -> io::Result<()> {
        let rule = "=".repeat(66);
        self.console.say(&rule)?;
        self.console.say("Web Citation Manager")?;
        self.console.say(&rule)
    }

    fn import(&mut self) -> io::Result<()> {
        self.console.heading("Importing Citations:")?;
        let name = self.console.file_name("Enter name of file to import: ")?;
        let text = match fs::read_to_string(&name) {
            Ok(text) => text,
            Err(err) => {
                cite_warn!("could not read import file {}: {}", name, err);
                return self.console.say(format!("Error: could not read {name}: {err}"));
            }
        };
        match self.store.import_text(&text) {
            Ok(summary) => self.console.say(format!(
                "Imported {} citations ({} duplicates, {} invalid lines skipped).",
                summary.added, summary.duplicates, summary.skipped
            )),
            Err(err) => self.console.say(format!("Error: {err}")),
        }
    }

    fn add(&mut self) -> io::Result<()> {
        self.console.heading("Add a New Citation:")?;
        let Some(url) = self.console.url()? else {
            return self.console.say("Cancelled adding citation.");
        };
        if self.store.find(&url).is_some() {
            return self.console.say("A citation for that URL already exists.");
        }

        let fields = PartialRecord {
            author: self.console.author()?,
            title: self.console.title(true)?,
            year: self.console.year()?,
        };
        match self.store.add(&url, fields) {
            Ok(_) => self.console.say("Citation added."),
            Err(err) => self.console.say(format!("Error: {err}")),
        }
    }

    fn update(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return self.console.say("No citations stored.");
        }
        self.console.heading("Updating a Citation:")?;
        let Some(url) = self.console.url()? else {
            return self.console.say("Cancelled updating citation.");
        };
        if self.store.find(&url).is_none() {
            return self.console.say("Citation for that URL not found.");
        }

        let fields = PartialRecord {
            author: self.console.author()?,
            title: self.console.title(false)?,
            year: self.console.year()?,
        };
        match self.store.update(&url, &fields) {
            Ok(record) => {
                let record = record.clone();
                self.console.say("\nCitation updated:")?;
                self.console.show_record(&record)
            }
            Err(err) => self.console.say(format!("Error: {err}")),
        }
    }

    fn remove(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            return self.console.say("No citations stored.");
        }
        self.console.heading("Remove a Citation:")?;
        let Some(url) = self.console.url()? else {
            return self.console.say("Cancelled removing citation.");
        };
        match self.store.remove(&url) {
            Ok(_) => self.console.say("Citation successfully deleted."),
            Err(StoreError::NotFound(_)) => self.console.say("Citation for that URL not found."),
            Err(err) => self.console.say(format!("Error: {err}")),
        }
    }

    fn process(&mut self) -> io::Result<()> {
        if self.store.pending_len() == 0 {
            return self.console.say("No citations stored to process.");
        }
        self.console.heading("Processing Citations:")?;
        loop {
            self.console.say("")?;
            for (number, item) in ProcessItem::ALL.iter().enumerate() {
                if *item == ProcessItem::Finish {
                    self.console.say("--------------------------------------------")?;
                }
                self.console.say(format!("[{}] {}", number + 1, item.label()))?;
            }
            let choice = loop {
                let choice = self.console.menu_choice(ProcessItem::ALL.len() as u8)?;
                if choice > 0 {
                    break choice;
                }
                self.console
                    .say("Error: Invalid option. Please select an option from the menu.")?;
            };

            match ProcessItem::ALL[usize::from(choice) - 1] {
                ProcessItem::FillBlanks => self.fill_blanks()?,
                ProcessItem::Sort => {
                    self.store.sort_pending();
                    self.console.heading("Sorted Citations")?;
                    let records: Vec<_> = self.store.pending().cloned().collect();
                    self.console.show_records(&records)?;
                }
                ProcessItem::WebLookup => {
                    self.console.say("\nLooking up citation data on the web...")?;
                    let summary = self.store.enrich_pending(self.enricher);
                    self.console.say(format!(
                        "Web lookup complete: {} of {} incomplete citations gained data.",
                        summary.enriched, summary.attempted
                    ))?;
                }
                ProcessItem::Finish => {
                    self.store.process_all();
                    self.console.say("\nProcessed Citations:\n")?;
                    let records: Vec<_> = self.store.processed().cloned().collect();
                    return self.console.show_records(&records);
                }
                ProcessItem::Cancel => {
                    return self.console.say("Cancelled processing citations.");
                }
            }
        }
    }

    /// Prompts only for the fields each pending citation is still missing.
    fn fill_blanks(&mut self) -> io::Result<()> {
        let keys: Vec<String> = self.store.pending().map(|r| r.key().to_owned()).collect();
        for key in keys {
            let Ok(missing) = self.store.get(&key).map(|r| r.missing()) else {
                continue;
            };
            if !missing.any() {
                continue;
            }
            self.console.heading("Add Citation Data:")?;
            self.console.say(format!("URL: {key}"))?;
            let mut fields = PartialRecord::default();
            if missing.author {
                fields.author = self.console.author()?;
            }
            if missing.title {
                fields.title = self.console.title(false)?;
            }
            if missing.year {
                fields.year = self.console.year()?;
            }
            if let Err(err) = self.store.update(&key, &fields) {
                self.console.say(format!("Error: {err}"))?;
            }
        }
        self.console.say("\nAll citation data added.")
    }

    fn export(&mut self) -> io::Result<()> {
        self.console.heading("Exporting Citations")?;
        if self.store.processed_len() == 0 {
            return self.console.say("No citations processed to export.");
        }
        let stem = self
            .console
            .file_name("Enter name of file (before .bib): ")?;
        let path = match bib_path_for_stem(&stem) {
            Ok(path) => path,
            Err(err) => return self.console.say(format!("Error: {err}")),
        };

        let mut writer = BibFileWriter::new(&path, self.export_options.clone());
        match self.store.export(&mut writer) {
            Ok(summary) => self.console.say(format!(
                "Exported {} citations to {}.",
                summary.exported,
                writer.path().display()
            )),
            Err(err) => {
                cite_warn!("export to {} failed: {}", path.display(), error_chain(&err));
                self.console.say(format!(
                    "Error: {}. Processed citations were kept; try another file name.",
                    error_chain(&err)
                ))
            }
        }
    }
}

/// `err` followed by each of its sources, joined with ": ".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

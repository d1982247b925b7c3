use std::path::PathBuf;
use std::time::Duration;

use citation_engine::{EntryLayout, ExportOptions, FetchSettings};
use clap::{Parser, ValueEnum};

/// Collect web citations and export them as BibLaTeX `@online` entries.
///
/// Without `-i` or `-w` the interactive menu starts.
#[derive(Parser, Debug)]
#[command(name = "citations", version)]
#[command(about = "Collect web citations and export them as BibLaTeX", long_about = None)]
pub struct Cli {
    /// Import URLs from FILE, process them and export without prompting
    #[arg(short = 'i', long = "import", value_name = "FILE", conflicts_with = "web")]
    pub import: Option<PathBuf>,

    /// Like --import, but look up author, title and year on the web first
    #[arg(short = 'w', long = "web", value_name = "FILE")]
    pub web: Option<PathBuf>,

    /// Bibliography written by the batch modes
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "references.bib")]
    pub output: PathBuf,

    /// Per-request deadline for web lookups, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Entry layout of the exported file
    #[arg(long, value_enum, default_value_t = Layout::Compact)]
    pub layout: Layout,

    /// Log debug detail
    #[arg(short, long)]
    pub verbose: bool,

    /// Also log to the terminal, not just ./citations.log
    #[arg(long)]
    pub log_terminal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    Compact,
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Batch { input: PathBuf, enrich: bool },
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match (&self.import, &self.web) {
            (_, Some(input)) => Mode::Batch {
                input: input.clone(),
                enrich: true,
            },
            (Some(input), None) => Mode::Batch {
                input: input.clone(),
                enrich: false,
            },
            (None, None) => Mode::Interactive,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings::default().with_request_timeout(Duration::from_secs(self.timeout.max(1)))
    }

    pub fn export_options(&self) -> ExportOptions {
        let layout = match self.layout {
            Layout::Compact => EntryLayout::Compact,
            Layout::Expanded => EntryLayout::Expanded,
        };
        ExportOptions {
            layout,
            ..ExportOptions::default()
        }
    }
}

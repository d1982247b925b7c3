use std::io;
use std::process;

use anyhow::{Context, Result};
use citation_app::batch::run_batch;
use citation_app::cli::{Cli, Mode};
use citation_app::console::Console;
use citation_app::logging::{self, LogDestination};
use citation_app::menu::App;
use citation_core::{CitationStore, Enricher};
use citation_engine::WebEnricher;
use citation_logging::cite_error;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    logging::initialize(LogDestination::from_flags(cli.log_terminal), cli.verbose);

    if let Err(err) = run(&cli) {
        cite_error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut store = CitationStore::new();

    match cli.mode() {
        Mode::Batch { input, enrich } => {
            let enricher = if enrich {
                Some(WebEnricher::new(cli.fetch_settings()).context("Failed to start web lookups")?)
            } else {
                None
            };
            let report = run_batch(
                &mut store,
                &input,
                enricher.as_ref().map(|e| e as &dyn Enricher),
                &cli.output,
                cli.export_options(),
            )?;
            println!("{}", report.describe(&input));
        }
        Mode::Interactive => {
            let enricher =
                WebEnricher::new(cli.fetch_settings()).context("Failed to start web lookups")?;
            let stdin = io::stdin();
            let console = Console::new(stdin.lock(), io::stdout());
            let mut app = App::new(store, console, &enricher, cli.export_options());
            app.run()?;
        }
    }
    Ok(())
}

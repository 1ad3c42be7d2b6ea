//! dobble-cards CLI - generate and print spot-the-matching-symbol card sets.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dobble_cards::{
    cards_for, BorderAssets, CardSetGenerator, CardShape, ImageLoader, JobEvent, JobOutcome,
    PrintJob, PrintSettings, SymbolCardRenderer, SymbolPool, SUPPORTED_SYMBOLS_PER_CARD,
};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// How long to wait for one symbol's artwork before giving up on it.
const ARTWORK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "dobble-cards")]
#[command(version)]
#[command(about = "Generate printable card sets for spot-the-matching-symbol games")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a print settings file (defaults are used when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a card set and print it as JSON
    Generate {
        /// Symbols on each card
        #[arg(short = 'k', long, default_value = "8", value_parser = parse_symbols_per_card)]
        symbols_per_card: usize,

        /// Directory of symbol images (names only are used)
        #[arg(short, long)]
        symbols: Option<PathBuf>,
    },

    /// Generate a card set and lay it out into a PDF
    Print {
        /// Directory of symbol images
        #[arg(short, long)]
        symbols: PathBuf,

        /// Output PDF file
        #[arg(short, long, default_value = "cards.pdf")]
        output: PathBuf,

        /// Symbols on each card
        #[arg(short = 'k', long, default_value = "8", value_parser = parse_symbols_per_card)]
        symbols_per_card: usize,

        /// Card outline
        #[arg(long, value_enum, default_value = "square")]
        shape: ShapeArg,

        /// Seed for symbol placement
        #[arg(long, default_value = "0")]
        seed: u64,

        /// PNG to use as the square border
        #[arg(long)]
        border: Option<PathBuf>,

        /// Do not open the finished file
        #[arg(long)]
        no_open: bool,
    },

    /// Show example settings file
    ExampleConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Square,
    Circle,
}

impl From<ShapeArg> for CardShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Square => CardShape::Square,
            ShapeArg::Circle => CardShape::Circle,
        }
    }
}

#[derive(Serialize)]
struct CardListing<'a> {
    index: usize,
    symbols: Vec<&'a str>,
}

fn parse_symbols_per_card(value: &str) -> Result<usize, String> {
    let k: usize = value.parse().map_err(|e| format!("{e}"))?;
    if SUPPORTED_SYMBOLS_PER_CARD.contains(&k) {
        Ok(k)
    } else {
        Err(format!("supported values are {SUPPORTED_SYMBOLS_PER_CARD:?}"))
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("logging already initialised");
    }
}

fn load_settings(path: Option<&Path>) -> Result<PrintSettings> {
    match path {
        Some(path) => PrintSettings::from_file(path)
            .with_context(|| format!("Failed to load settings from {path:?}")),
        None => Ok(PrintSettings::default()),
    }
}

fn load_pool(dir: &Path) -> Result<SymbolPool> {
    SymbolPool::scan_dir(dir).with_context(|| format!("Failed to scan symbols in {dir:?}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::ExampleConfig => {
            let example = PrintSettings::default()
                .to_toml()
                .context("Failed to serialize settings")?;
            println!("# dobble-cards print settings\n{example}");
        }

        Commands::Generate {
            symbols_per_card,
            symbols,
        } => {
            let pool = match symbols {
                Some(dir) => load_pool(&dir)?,
                None => SymbolPool::from_names(
                    (0..cards_for(symbols_per_card)).map(|i| format!("symbol-{i}")),
                ),
            };
            let cards = CardSetGenerator::new().generate(symbols_per_card, &pool.refs())?;

            let listing: Vec<CardListing<'_>> = cards
                .iter()
                .map(|card| CardListing {
                    index: card.index(),
                    symbols: card
                        .symbols()
                        .iter()
                        .filter_map(|id| pool.get(*id).map(|s| s.name()))
                        .collect(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }

        Commands::Print {
            symbols,
            output,
            symbols_per_card,
            shape,
            seed,
            border,
            no_open,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            let pool = load_pool(&symbols)?;

            let cards = CardSetGenerator::for_settings(&settings)
                .with_shape(shape.into())
                .generate(symbols_per_card, &pool.refs())?;

            let used: Vec<_> = pool.iter().take(cards.len()).map(|(_, s)| s).collect();
            let missing = ImageLoader::new().load_all(used, ARTWORK_TIMEOUT);
            if !missing.is_empty() {
                bail!("Could not load artwork for: {}", missing.join(", "));
            }

            let renderer = SymbolCardRenderer::new(Arc::new(pool)).with_seed(seed);
            let mut job = PrintJob::new(cards, &settings, &output, Arc::new(renderer));
            if no_open {
                job = job.without_viewer();
            }
            if let Some(path) = border {
                job = job.with_border_assets(BorderAssets::load_square(&path)?);
            }

            let handle = job.spawn(|event: JobEvent| match event {
                JobEvent::Started { cards, items, pages } => {
                    info!("Printing {cards} cards as {items} items on {pages} pages");
                }
                JobEvent::PageFinished { page, items } => {
                    info!("Page {} done ({items} items)", page + 1);
                }
                JobEvent::Failed { message, detail } => warn!("{message}: {detail}"),
                _ => {}
            })?;

            match handle.join()? {
                JobOutcome::Completed {
                    path,
                    pages,
                    items,
                    opened,
                } => {
                    println!("\n=== Cards Printed ===");
                    println!("File:   {}", path.display());
                    println!("Pages:  {pages}");
                    println!("Items:  {items}");
                    if !no_open && !opened {
                        println!("(could not open the file automatically)");
                    }
                }
                JobOutcome::Aborted { pages, items } => {
                    println!("Aborted after {items} items on {pages} pages");
                }
            }
        }
    }

    Ok(())
}

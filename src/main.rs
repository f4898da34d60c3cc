//! Joseki tutor command line.
//!
//! ## Usage
//!
//! - `joseki-tutor` - Train on the default record
//! - `joseki-tutor train --record lines.zip` - Train on a given record
//! - `joseki-tutor tree --record lines.sgf` - Print the variation tree outline

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use joseki_tutor::config::TutorConfig;
use joseki_tutor::console::TutorConsole;
use joseki_tutor::logging::setup_logging;
use joseki_tutor::selector::TrainingSelector;
use joseki_tutor::session::Session;
use joseki_tutor::sgf::parse_with_size;
use joseki_tutor::source::read_record;
use joseki_tutor::store;

/// Joseki tutor: drill recorded Go opening variations
#[derive(Parser)]
#[command(name = "joseki-tutor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train against the recorded variations on stdin/stdout
    Train(Overrides),
    /// Print the variation tree with its learning statistics
    Tree(Overrides),
}

#[derive(Args)]
struct Overrides {
    /// Record file (.sgf or single-entry .zip)
    #[arg(long)]
    record: Option<PathBuf>,

    /// Learning state file
    #[arg(long)]
    state: Option<PathBuf>,

    /// Board size
    #[arg(long)]
    board_size: Option<usize>,

    /// Seed for the reply selector
    #[arg(long)]
    seed: Option<u64>,

    /// Pause before the automated reply, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: TutorConfig) -> TutorConfig {
        if let Some(record) = self.record {
            config.record_path = record;
        }
        if let Some(state) = self.state {
            config.state_path = state;
        }
        if let Some(size) = self.board_size {
            config.board_size = size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(delay) = self.delay_ms {
            config.reply_delay_ms = delay;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = setup_logging(&cli.log_level).context("failed to start logging")?;

    let base = match &cli.config {
        Some(path) => TutorConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TutorConfig::default(),
    };

    match cli.command {
        Some(Commands::Tree(overrides)) => {
            let config = overrides.apply(base);
            config.validate()?;
            print_tree(&config)
        }
        Some(Commands::Train(overrides)) => {
            let config = overrides.apply(base);
            config.validate()?;
            train(&config)
        }
        None => {
            base.validate()?;
            train(&base)
        }
    }
}

fn print_tree(config: &TutorConfig) -> Result<()> {
    let tree = if config.state_path.exists() {
        store::load(&config.state_path)?
    } else {
        let text = read_record(&config.record_path)
            .with_context(|| format!("failed to read {}", config.record_path.display()))?;
        parse_with_size(&text, config.board_size)?
    };
    print!("{tree}");
    println!(
        "{} nodes, {} total mistakes",
        tree.node_count(),
        tree.total_mistake_count()
    );
    Ok(())
}

fn train(config: &TutorConfig) -> Result<()> {
    let tree = store::load_or_parse(config).context("failed to load the variation tree")?;
    let selector = match config.seed {
        Some(seed) => TrainingSelector::with_seed(seed),
        None => TrainingSelector::new(),
    };
    let session = Session::new(tree, selector)?;

    let mut console = TutorConsole::new(session, Duration::from_millis(config.reply_delay_ms));
    let result = console.run();

    // Statistics gathered so far are saved even if the console failed.
    let tree = console.into_session().into_tree();
    store::save(&tree, &config.state_path)
        .with_context(|| format!("failed to save {}", config.state_path.display()))?;
    result.context("console failed")?;
    Ok(())
}

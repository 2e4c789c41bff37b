//! Guessify Control - terminal front end for the guessing engine
//!
//! Plays games interactively, runs single turns for scripting, and inspects
//! the catalog and trained model.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use guessify_common::config::GuessifyConfig;
use guessifyctl::{commands, logging};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::path::PathBuf;
use tracing::info;

// Version is embedded at build time
const VERSION: &str = env!("GUESSIFY_VERSION");

#[derive(Parser)]
#[command(name = "guessifyctl")]
#[command(about = "Guessify - twenty questions over a celebrity catalog", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// Config file (defaults to $GUESSIFY_CONFIG, then ~/.config/guessify/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog CSV, overrides catalog.path from config
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive game
    Play {
        /// Seed for question selection (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Write the finished session as JSON
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Run one turn for the given answers and print the outcome as JSON
    Turn {
        /// Answers so far, e.g. "actor=yes,musician=probably_not"
        #[arg(long, default_value = "")]
        answers: String,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// List every attribute with its question
    Questions,

    /// Train the model and show the training report
    Train {
        /// Number of attributes to list by importance
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// List all characters in the catalog
    Characters,

    /// Aggregate statistics over saved session files
    Stats {
        /// Session JSON files written by `play --save`
        files: Vec<PathBuf>,
    },
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => GuessifyConfig::load_from(path)?,
        None => GuessifyConfig::load()?,
    };
    if let Some(catalog) = cli.catalog {
        config.catalog.path = catalog;
    }
    info!("guessifyctl v{} using catalog {}", VERSION, config.catalog.path.display());

    match cli.command {
        Commands::Play { seed, save } => {
            let engine = commands::load_engine(&config)?;
            let mut rng = rng_for(seed);
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            let session = commands::play(&engine, &mut rng, &mut input, &mut out)?;
            if let Some(path) = save {
                session
                    .save(&path)
                    .with_context(|| format!("Failed to save session to {}", path.display()))?;
                println!("Session saved to {}", path.display());
            }
        }
        Commands::Turn { answers, seed } => {
            let engine = commands::load_engine(&config)?;
            let mut rng = rng_for(seed);
            println!("{}", commands::turn(&engine, &answers, &mut rng)?);
        }
        Commands::Questions => {
            let engine = commands::load_engine(&config)?;
            print!("{}", commands::questions(&engine.catalog, &engine.controller.questions));
        }
        Commands::Train { top } => {
            let engine = commands::load_engine(&config)?;
            print!("{}", commands::train_report(&engine, top)?);
        }
        Commands::Characters => {
            let engine = commands::load_engine(&config)?;
            print!("{}", guessifyctl::output::format_characters(&engine.catalog));
        }
        Commands::Stats { files } => {
            print!("{}", commands::stats(&files)?);
        }
    }

    Ok(())
}

//! Command handlers for guessifyctl.

use crate::output;
use anyhow::{Context, Result};
use guessify_common::answer::{parse_answer_pairs, RawAnswer};
use guessify_common::catalog::Catalog;
use guessify_common::config::GuessifyConfig;
use guessify_common::questions::QuestionBook;
use guessify_common::service::{Engine, GuessService};
use guessify_common::session::GameSession;
use guessify_common::stats::GameStats;
use guessify_common::turn::TurnOutcome;
use rand::Rng;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const ANSWER_HINT: &str = "  [y]es  [n]o  [u]nknown  [p]robably  [pn] probably not";

/// Build the engine for one CLI invocation
pub fn load_engine(config: &GuessifyConfig) -> Result<Arc<Engine>> {
    let service = GuessService::from_config(config);
    service
        .engine()
        .with_context(|| format!("Failed to load catalog {}", config.catalog.path.display()))
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let n = input.read_line(&mut line).context("Failed to read input")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Play one interactive game
pub fn play<R, W, G>(engine: &Engine, rng: &mut G, input: &mut R, out: &mut W) -> Result<GameSession>
where
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let mut session = GameSession::new();
    debug!("Starting session {}", session.id);
    writeln!(
        out,
        "Think of one of {} people. I will try to guess who.",
        engine.catalog.len()
    )?;

    loop {
        match engine.advance(session.answers(), &mut *rng)? {
            TurnOutcome::Ask {
                attribute,
                question,
                progress,
            } => {
                writeln!(out)?;
                writeln!(out, "{}", output::format_question(&question, &progress))?;
                writeln!(out, "{}", ANSWER_HINT)?;

                let raw = loop {
                    write!(out, "> ")?;
                    out.flush()?;
                    let Some(line) = read_line(input)? else {
                        anyhow::bail!("Input closed before the game finished");
                    };
                    match line.parse::<RawAnswer>() {
                        Ok(raw) => break raw,
                        Err(e) => writeln!(out, "{}", e)?,
                    }
                };
                session.record(&attribute, raw)?;
            }
            TurnOutcome::Guess(guess) => {
                writeln!(out)?;
                writeln!(out, "{}", output::format_guess(&guess))?;
                let is_match = guess.is_match();
                session.complete(guess)?;

                if is_match {
                    write!(out, "Was I right? [y/n] > ")?;
                    out.flush()?;
                    if let Some(line) = read_line(input)? {
                        match line.parse::<RawAnswer>() {
                            Ok(RawAnswer::Yes) => session.confirm(true)?,
                            Ok(RawAnswer::No) => session.confirm(false)?,
                            _ => writeln!(out, "No feedback recorded.")?,
                        }
                    }
                }
                return Ok(session);
            }
        }
    }
}

/// One non-interactive turn, printed as JSON
pub fn turn<G: Rng + ?Sized>(engine: &Engine, answers: &str, rng: &mut G) -> Result<String> {
    let records = parse_answer_pairs(answers).map_err(anyhow::Error::msg)?;
    let outcome = engine.advance(&records, rng)?;
    Ok(serde_json::to_string_pretty(&outcome)?)
}

/// Every attribute with its question text
pub fn questions(catalog: &Catalog, book: &QuestionBook) -> String {
    let mut out = format!("[QUESTIONS] {} total\n", catalog.attributes().len());
    for (i, key) in catalog.attributes().iter().enumerate() {
        out.push_str(&format!("  {:>3}. {:<28} {}\n", i + 1, key, book.question(key)));
    }
    out
}

pub fn train_report(engine: &Engine, top: usize) -> Result<String> {
    let ranking = engine.model.feature_importance()?;
    Ok(output::format_training_report(&engine.report, &ranking, top))
}

/// Aggregate stats over saved session files
pub fn stats(files: &[PathBuf]) -> Result<String> {
    let mut sessions = Vec::with_capacity(files.len());
    for path in files {
        sessions.push(load_session(path)?);
    }
    Ok(output::format_stats(&GameStats::from_sessions(&sessions)))
}

fn load_session(path: &Path) -> Result<GameSession> {
    GameSession::load(path).with_context(|| format!("Failed to load session {}", path.display()))
}

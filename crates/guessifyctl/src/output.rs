//! Output formatting - ASCII-only terminal output

use guessify_common::catalog::Catalog;
use guessify_common::classifier::TrainingReport;
use guessify_common::progress::TurnProgress;
use guessify_common::stats::GameStats;
use guessify_common::turn::{FinalGuess, GuessKind};
use owo_colors::OwoColorize;

pub const THIN_SEPARATOR: &str = "----------------------------------------";

/// Question header and prompt line
pub fn format_question(question: &str, progress: &TurnProgress) -> String {
    format!(
        "Question {}/{}  {} {}%  ({} candidates left)\n{}",
        progress.question_number,
        progress.max_questions,
        progress.bar(20),
        progress.percent(),
        progress.remaining,
        question.bold()
    )
}

pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        None => "n/a".dimmed().to_string(),
        Some(c) => {
            let pct = format!("{:.1}%", c * 100.0);
            if c >= 0.9 {
                pct.bright_green().to_string()
            } else if c >= 0.5 {
                pct.yellow().to_string()
            } else {
                pct.bright_red().to_string()
            }
        }
    }
}

/// Final guess block
pub fn format_guess(guess: &FinalGuess) -> String {
    let mut out = String::new();
    out.push_str(THIN_SEPARATOR);
    out.push('\n');
    match guess.kind {
        GuessKind::NoMatch => {
            out.push_str(&format!("[NO MATCH] {}\n", guess.label().bright_red()));
        }
        GuessKind::Degraded => {
            out.push_str(&format!("[GUESS] {}\n", guess.label().bold()));
            out.push_str(&format!(
                "[NOTE] {}\n",
                "model gave no probability; picked the first match".yellow()
            ));
        }
        GuessKind::Unique | GuessKind::Ranked => {
            out.push_str(&format!("[GUESS] {}\n", guess.label().bold()));
        }
    }
    out.push_str(&format!(
        "  confidence: {}\n  candidates: {}\n  questions:  {}\n  stopped:    {}\n",
        format_confidence(guess.confidence),
        guess.candidates,
        guess.questions_asked,
        guess.reason
    ));
    out.push_str(THIN_SEPARATOR);
    out
}

pub fn format_training_report(report: &TrainingReport, ranking: &[(String, f64)], top: usize) -> String {
    let mut out = String::new();
    out.push_str("[TRAINING]\n");
    out.push_str(&format!("  entities:   {}\n", report.entities));
    out.push_str(&format!("  attributes: {}\n", report.attributes));
    out.push_str(&format!("  depth:      {}\n", report.depth));
    out.push_str(&format!("  leaves:     {}\n", report.leaves));
    let accuracy = format!("{:.2}%", report.accuracy * 100.0);
    if report.is_perfect() {
        out.push_str(&format!("  accuracy:   {}\n", accuracy.bright_green()));
    } else {
        out.push_str(&format!("  accuracy:   {}\n", accuracy.yellow()));
        out.push_str("\n[MISCLASSIFIED]\n");
        for (truth, predicted) in &report.misclassified {
            out.push_str(&format!("  * {} -> predicted as {}\n", truth, predicted));
        }
        out.push_str("\n[IDENTICAL VECTORS]\n");
        for group in &report.indistinguishable {
            out.push_str(&format!("  * {}\n", group.join(", ")));
        }
    }

    out.push_str(&format!("\n[TOP {} ATTRIBUTES]\n", top.min(ranking.len())));
    for (i, (key, weight)) in ranking.iter().take(top).enumerate() {
        out.push_str(&format!("  {:>2}. {:<28} {:.4}\n", i + 1, key, weight));
    }
    out
}

/// Entities sorted by name
pub fn format_characters(catalog: &Catalog) -> String {
    let mut names: Vec<&str> = catalog.entities().iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable_by_key(|n| n.to_lowercase());
    let mut out = format!("[CHARACTERS] {} total\n", names.len());
    for name in names {
        out.push_str(&format!("  * {}\n", name));
    }
    out
}

pub fn format_stats(stats: &GameStats) -> String {
    format!(
        "[STATS]\n  games:     {}\n  completed: {}\n  pending:   {}\n  correct:   {}\n  wrong:     {}\n  no match:  {}\n  avg questions: {:.1}\n  win rate:  {}%\n",
        stats.total_games,
        stats.completed_games,
        stats.pending_games,
        stats.correct_guesses,
        stats.wrong_guesses,
        stats.no_match_guesses,
        stats.avg_questions,
        stats.win_rate()
    )
}

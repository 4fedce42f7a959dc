//! Mukhosto CLI
//!
//! Command-line interface for reviewing vocabulary and administering the
//! review schedule.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mukhosto_core::{
    ContentRow, KeyValueStore, Outcome, PracticeDefaults, ReviewCard, ReviewQueue, ReviewScheduler,
    ReviewSession, ScheduleConfig, SqliteStore, TrackedItem, best_unit, describe_schedule, parse_interval_token,
    parse_schedule, review::rows_from_json,
};
use tracing_subscriber::EnvFilter;

/// Mukhosto - vocabulary spaced repetition
#[derive(Parser)]
#[command(name = "mukhosto")]
#[command(author = "Mukhosto Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Review vocabulary and manage the spaced-repetition schedule")]
#[command(long_about = "Mukhosto schedules vocabulary on a fixed ladder of intervals.\n\nA good review climbs one stage; again starts the word over.")]
struct Cli {
    /// Directory holding mukhosto.db
    #[arg(long, global = true, env = "MUKHOSTO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the stage intervals
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Set the rolling interval used after the last stage (e.g. 30d)
    Rolling {
        token: String,
    },

    /// Start tracking a word
    Init {
        word: String,
    },

    /// Rate a word
    Review {
        word: String,
        /// good or again
        outcome: Outcome,
    },

    /// List words due now
    Due {
        /// Only print the number of due words
        #[arg(long)]
        count: bool,
    },

    /// Show the stored state of one word
    Peek {
        word: String,
        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show tracked item statistics
    Stats,

    /// Track words that were already known before scheduling existed
    Migrate {
        /// Words to migrate
        words: Vec<String>,
        /// Also migrate the stored known-words list
        #[arg(long)]
        known_words: bool,
    },

    /// Re-apply the current first interval to every stage-0 word
    #[command(name = "reschedule-stage0")]
    RescheduleStage0,

    /// Remove every tracked word
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Remove tracked words, the known-words list and the last session summary
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Review due words interactively
    Session {
        /// Show the meaning first (also on when saved as a practice default)
        #[arg(long)]
        reverse: bool,
        /// Show extra columns on flipped cards (also on when saved as a practice default)
        #[arg(long)]
        extras: bool,
        /// Review the due cards in random order
        #[arg(long)]
        shuffle: bool,
        /// Content sheet exported as a JSON array of rows
        #[arg(long)]
        content: Option<PathBuf>,
    },

    /// Show or change how sessions start by default
    Practice {
        #[command(subcommand)]
        action: PracticeAction,
    },
}

#[derive(Subcommand)]
enum PracticeAction {
    /// Print the saved defaults
    Show,
    /// Change one or both defaults
    Set {
        /// Show the meaning first
        #[arg(long)]
        reverse: Option<bool>,
        /// Show extra columns on flipped cards
        #[arg(long)]
        show_extras: Option<bool>,
    },
    /// Forget the saved defaults
    Clear,
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Print the current schedule
    Show,
    /// Replace the stage intervals (e.g. `3d 7d 14d` or `30m,1h,1d`)
    Set {
        #[arg(required = true, num_args = 1..)]
        tokens: Vec<String>,
    },
    /// Restore the default schedule
    Reset,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let sqlite = SqliteStore::new(cli.data_dir.clone()).context("Failed to open the Mukhosto database")?;
    tracing::debug!(path = %sqlite.path().display(), "Database opened");
    let store: Arc<dyn KeyValueStore> = Arc::new(sqlite);
    let scheduler = ReviewScheduler::new(store.clone());

    match cli.command {
        Commands::Schedule { action } => match action {
            ScheduleAction::Show => run_schedule_show(scheduler.config()),
            ScheduleAction::Set { tokens } => run_schedule_set(scheduler.config(), &tokens),
            ScheduleAction::Reset => run_schedule_reset(scheduler.config()),
        },
        Commands::Rolling { token } => run_rolling(scheduler.config(), &token),
        Commands::Init { word } => run_init(&scheduler, &word),
        Commands::Review { word, outcome } => run_review(&scheduler, &word, outcome),
        Commands::Due { count } => run_due(&scheduler, count),
        Commands::Peek { word, json } => run_peek(&scheduler, &word, json),
        Commands::Stats => run_stats(&scheduler),
        Commands::Migrate { words, known_words } => run_migrate(&scheduler, &words, known_words),
        Commands::RescheduleStage0 => run_reschedule_stage0(&scheduler),
        Commands::Clear { yes } => run_clear(&scheduler, yes),
        Commands::Reset { yes } => run_reset(&scheduler, yes),
        Commands::Session {
            reverse,
            extras,
            shuffle,
            content,
        } => {
            let saved = PracticeDefaults::load(store.as_ref());
            let practice = PracticeDefaults {
                reverse: reverse || saved.reverse,
                show_extras: extras || saved.show_extras,
            };
            run_session(&scheduler, practice, shuffle, content.as_deref())
        }
        Commands::Practice { action } => match action {
            PracticeAction::Show => run_practice_show(store.as_ref()),
            PracticeAction::Set { reverse, show_extras } => run_practice_set(store.as_ref(), reverse, show_extras),
            PracticeAction::Clear => run_practice_clear(store.as_ref()),
        },
    }
}

// ============================================================================
// SCHEDULE
// ============================================================================

fn run_schedule_show(config: &ScheduleConfig) -> anyhow::Result<()> {
    let stages = config.stage_intervals();
    let rolling = config.rolling_interval();
    let (rolling_value, rolling_unit) = best_unit(rolling);

    println!("{}", "=== Review Schedule ===".cyan().bold());
    println!();
    for (stage, minutes) in stages.iter().enumerate() {
        println!(
            "  {} {:>2}  {}",
            "Stage".white().bold(),
            stage,
            ScheduleConfig::format_duration(*minutes)
        );
    }
    println!("  {}  {}{}", "Rolling".white().bold(), rolling_value, rolling_unit);
    println!();
    println!("{}: {}", "Preview".white().bold(), config.describe());
    Ok(())
}

fn run_schedule_set(config: &ScheduleConfig, tokens: &[String]) -> anyhow::Result<()> {
    let stages = parse_schedule(&tokens.join(","));
    if stages.is_empty() {
        bail!("Please enter at least one interval (e.g. 1m, 3h, 5d)");
    }
    if !config.set_stage_intervals(stages.iter().map(|&m| i64::from(m))) {
        bail!("Could not save the schedule");
    }
    println!(
        "{} {}",
        "Saved:".green().bold(),
        describe_schedule(&config.stage_intervals(), config.rolling_interval())
    );
    println!("{}", "Run `mukhosto reschedule-stage0` to apply the first interval to new words.".dimmed());
    Ok(())
}

fn run_schedule_reset(config: &ScheduleConfig) -> anyhow::Result<()> {
    if !config.reset_to_defaults() {
        bail!("Could not reset the schedule");
    }
    println!("{} {}", "Reset to defaults:".green().bold(), config.describe());
    Ok(())
}

fn run_rolling(config: &ScheduleConfig, token: &str) -> anyhow::Result<()> {
    let minutes = parse_interval_token(token).with_context(|| format!("Invalid rolling interval '{token}'"))?;
    if !config.set_rolling_interval(i64::from(minutes)) {
        bail!("Could not save the rolling interval");
    }
    println!("{} {}", "Saved:".green().bold(), config.describe());
    Ok(())
}

// ============================================================================
// ITEMS
// ============================================================================

fn run_init(scheduler: &ReviewScheduler, word: &str) -> anyhow::Result<()> {
    let item = scheduler
        .init_for_word(word)
        .with_context(|| format!("Could not start tracking '{word}'"))?;
    print_item(&item);
    Ok(())
}

fn run_review(scheduler: &ReviewScheduler, word: &str, outcome: Outcome) -> anyhow::Result<()> {
    let item = scheduler
        .mark_reviewed(word, outcome)
        .with_context(|| format!("Could not record the review of '{word}'"))?;
    let label = match outcome {
        Outcome::Good => "good".green().bold(),
        Outcome::Again => "again".yellow().bold(),
    };
    println!("{} {}", "Recorded".white().bold(), label);
    print_item(&item);
    Ok(())
}

fn run_due(scheduler: &ReviewScheduler, count_only: bool) -> anyhow::Result<()> {
    if count_only {
        println!("{}", scheduler.count_due());
        return Ok(());
    }

    let due = scheduler.due_keys();
    if due.is_empty() {
        println!("{}", "No cards are due right now.".dimmed());
        return Ok(());
    }
    println!("{} {}", "Due:".cyan().bold(), due.len());
    for word in &due {
        println!("  {word}");
    }
    Ok(())
}

fn run_peek(scheduler: &ReviewScheduler, word: &str, json: bool) -> anyhow::Result<()> {
    let Some(item) = scheduler.peek(word) else {
        println!("{}", format!("'{word}' is not tracked").dimmed());
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print_item(&item);
        for entry in &item.history {
            println!("    {}  {}", format_time(entry.ts).dimmed(), entry.action);
        }
    }
    Ok(())
}

fn run_stats(scheduler: &ReviewScheduler) -> anyhow::Result<()> {
    let stats = scheduler.stats();

    println!("{}", "=== Mukhosto Review Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Tracked Words".white().bold(), stats.tracked);
    println!("{}: {}", "Due Now".white().bold(), stats.due);
    if let Some(next) = stats.next_due {
        println!("{}: {}", "Next Due".white().bold(), format_time(next));
    }
    if let Some(summary) = ReviewSession::last_summary(scheduler) {
        println!(
            "{}: {} card(s) at {}",
            "Last Session".white().bold(),
            summary.reviewed,
            format_time(summary.ts)
        );
    }

    if !stats.by_stage.is_empty() {
        println!();
        println!("{}", "=== Stage Distribution ===".yellow().bold());
        for (stage, count) in &stats.by_stage {
            print_distribution_bar(&format!("Stage {stage}"), *count, stats.tracked);
        }
    }
    Ok(())
}

fn print_distribution_bar(label: &str, count: usize, total: usize) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));

    println!("  {:10} [{:30}] {:>5} ({:>5.1}%)", label, bar.green(), count, percentage);
}

// ============================================================================
// ADMINISTRATION
// ============================================================================

fn run_migrate(scheduler: &ReviewScheduler, words: &[String], known_words: bool) -> anyhow::Result<()> {
    let mut added = scheduler.migrate_from_legacy_set(words).added;
    if known_words {
        added += scheduler.migrate_from_known_words().added;
    }
    println!("{} {} word(s)", "Migrated".green().bold(), added);
    Ok(())
}

fn run_reschedule_stage0(scheduler: &ReviewScheduler) -> anyhow::Result<()> {
    let report = scheduler.reschedule_stage0();
    println!("Applied schedule to {} card(s).", report.changed.to_string().green().bold());
    Ok(())
}

fn run_clear(scheduler: &ReviewScheduler, yes: bool) -> anyhow::Result<()> {
    let tracked = scheduler.tracked_count();
    if !yes && !confirm(&format!("Remove all {tracked} tracked word(s)?"))? {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }
    if !scheduler.clear_all() {
        bail!("Could not clear tracked words");
    }
    println!("{} {} word(s)", "Cleared".green().bold(), tracked);
    Ok(())
}

fn run_reset(scheduler: &ReviewScheduler, yes: bool) -> anyhow::Result<()> {
    if !yes && !confirm("This removes all known words and all scheduled reviews. Continue?")? {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }
    if !scheduler.reset_progress() {
        bail!("Failed to reset progress");
    }
    println!("{}", "All progress has been reset.".green().bold());
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt.yellow().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

// ============================================================================
// PRACTICE DEFAULTS
// ============================================================================

fn run_practice_show(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    print_practice(&PracticeDefaults::load(store));
    Ok(())
}

fn run_practice_set(store: &dyn KeyValueStore, reverse: Option<bool>, show_extras: Option<bool>) -> anyhow::Result<()> {
    let mut defaults = PracticeDefaults::load(store);
    if let Some(reverse) = reverse {
        defaults.reverse = reverse;
    }
    if let Some(show_extras) = show_extras {
        defaults.show_extras = show_extras;
    }
    if !defaults.save(store) {
        bail!("Could not save the practice defaults");
    }
    println!("{}", "Saved.".green().bold());
    print_practice(&defaults);
    Ok(())
}

fn run_practice_clear(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    if !PracticeDefaults::clear(store) {
        bail!("Could not clear the practice defaults");
    }
    println!("{}", "Practice defaults cleared.".green().bold());
    Ok(())
}

fn print_practice(defaults: &PracticeDefaults) {
    let on_off = |on: bool| if on { "on".green() } else { "off".dimmed() };
    println!("{}: {}", "Reverse".white().bold(), on_off(defaults.reverse));
    println!("{}: {}", "Show Extras".white().bold(), on_off(defaults.show_extras));
}

// ============================================================================
// SESSION
// ============================================================================

fn run_session(
    scheduler: &ReviewScheduler,
    practice: PracticeDefaults,
    shuffle: bool,
    content: Option<&Path>,
) -> anyhow::Result<()> {
    let rows = match content {
        Some(path) => load_rows(path)?,
        None => Vec::new(),
    };
    let due = scheduler.due_keys();
    if due.is_empty() {
        println!("{}", "No cards are due right now.".dimmed());
        return Ok(());
    }

    let mut session = ReviewSession::new(scheduler, ReviewQueue::build(&due, &rows, practice.reverse));
    if shuffle {
        session.shuffle();
    }
    let stdin = io::stdin();
    let summary = drive_session(session, practice.show_extras, stdin.lock(), io::stdout())?;
    println!();
    println!("{} {} card(s)", "Session complete:".green().bold(), summary);
    Ok(())
}

fn load_rows(path: &Path) -> anyhow::Result<Vec<ContentRow>> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    rows_from_json(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Run the interactive card loop until the queue is empty or the user quits.
/// Returns how many cards were rated.
fn drive_session<R: BufRead, W: Write>(
    mut session: ReviewSession<'_>,
    mut show_extras: bool,
    mut input: R,
    mut out: W,
) -> anyhow::Result<usize> {
    let mut flipped = false;
    while let Some(card) = session.current().cloned() {
        let (position, total) = session.position();
        writeln!(out)?;
        writeln!(out, "[{position}/{total}] {}", side(&card.front).bold())?;
        if flipped {
            write_back(&mut out, &card, show_extras)?;
        }
        write!(out, "{} ", "[f]lip [g]ood [a]gain [n]ext [p]revious e[x]tras [q]uit >".dimmed())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match line.trim().to_lowercase().as_str() {
            "" | "f" => flipped = !flipped,
            "g" | "good" => {
                session.mark(Outcome::Good);
                flipped = false;
            }
            "a" | "again" => {
                session.mark(Outcome::Again);
                flipped = false;
            }
            "n" | "next" => {
                if !session.next() {
                    break;
                }
                flipped = false;
            }
            "p" | "prev" | "previous" => {
                session.previous();
                flipped = false;
            }
            "x" | "extras" => show_extras = !show_extras,
            "q" | "quit" => break,
            other => writeln!(out, "{}", format!("unknown command '{other}'").yellow())?,
        }
    }
    Ok(session.finish().reviewed)
}

fn write_back<W: Write>(out: &mut W, card: &ReviewCard, show_extras: bool) -> io::Result<()> {
    writeln!(out, "    {}", side(&card.back).cyan())?;
    if !card.sub_back.is_empty() {
        writeln!(out, "    {}", card.sub_back.italic())?;
    }
    if !show_extras {
        return Ok(());
    }
    for (i, extra) in card.extras.iter().enumerate() {
        writeln!(out, "    {}. {}", i + 1, extra)?;
    }
    Ok(())
}

fn side(text: &str) -> String {
    if text.is_empty() { "(blank)".to_string() } else { text.to_string() }
}

// ============================================================================
// OUTPUT
// ============================================================================

fn print_item(item: &TrackedItem) {
    println!("{}: {}", "Word".white().bold(), item.display);
    println!("{}: {}", "Stage".white().bold(), item.stage);
    println!("{}: {}", "Due".white().bold(), format_time(item.due_at));
    println!("{}: {}", "Added".white().bold(), format_time(item.added_at));
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

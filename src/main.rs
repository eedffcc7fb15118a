use clap::{Parser, Subcommand};
use crossterm::tty::IsTty;
use itertools::Itertools;
use std::{
    error::Error,
    fs,
    io::{self, BufReader},
    path::PathBuf,
    time::Duration,
};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;
use vocadrill::{
    catalog::{MAX_LEVEL, MIN_LEVEL},
    config::{Config, ConfigStore, FileConfigStore},
    drill::{self, DrillOptions},
    FileProgressStorage, Mode, ProgressStore, Session, SessionConfig, SqliteCatalog, WordCatalog,
};

/// leveled vocabulary drills with cloze and multiple-choice questions
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice vocabulary level by level. Cloze questions hide the vowels of a word next to its definition; quiz questions ask for the right definition among distractors. Progress is kept per word and can be exported and restored."
)]
pub struct Cli {
    /// word catalog database to use
    #[clap(long, global = true)]
    catalog: Option<PathBuf>,

    /// progress file to use
    #[clap(long, global = true)]
    progress: Option<PathBuf>,

    /// config file to use
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// practice a level (the default command)
    Drill {
        /// level to practice, 1-6 (default: the last level played)
        #[clap(short = 'l', long)]
        level: Option<u8>,

        /// question style
        #[clap(short = 'm', long, value_enum)]
        mode: Option<Mode>,

        /// stop after this many answers
        #[clap(short = 'n', long)]
        rounds: Option<usize>,

        /// move on to the next question immediately after feedback
        #[clap(long)]
        no_delay: bool,

        /// disable colored feedback
        #[clap(long)]
        no_color: bool,
    },
    /// show word counts and learned words per level
    Levels,
    /// show per-word statistics
    Stats {
        /// only words of this level
        #[clap(short = 'l', long)]
        level: Option<u8>,
    },
    /// write a progress snapshot file
    Export {
        /// directory to write into
        #[clap(short = 'd', long, default_value = ".")]
        dir: PathBuf,
    },
    /// restore progress from a snapshot file
    Import { file: PathBuf },
    /// add words from a CSV file (word,definition,pos,level,example)
    LoadWords { file: PathBuf },
    /// add the bundled starter words
    Seed,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vocadrill=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("vocadrill: {e}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Config {
    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut config = store.load();
    if let Some(path) = &cli.catalog {
        config.catalog_path = Some(path.clone());
    }
    if let Some(path) = &cli.progress {
        config.progress_path = Some(path.clone());
    }
    config
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(&cli);
    let command = cli.command.clone().unwrap_or(Command::Drill {
        level: None,
        mode: None,
        rounds: None,
        no_delay: false,
        no_color: false,
    });

    let mut catalog = SqliteCatalog::open(config.catalog_path())?;
    let progress = ProgressStore::open(FileProgressStorage::with_path(config.progress_path()));

    match command {
        Command::Seed => {
            let added = catalog.seed_starter_words()?;
            println!("Added {added} starter words.");
        }
        Command::LoadWords { file } => {
            let reader = BufReader::new(fs::File::open(&file)?);
            let added = catalog.load_csv(reader)?;
            println!("Added {added} words from {}.", file.display());
        }
        Command::Levels => print_levels(&catalog, &progress),
        Command::Stats { level } => print_stats(&catalog, &progress, level),
        Command::Export { dir } => {
            let path = progress.export_to_dir(&dir)?;
            println!("Progress exported to {}", path.display());
        }
        Command::Import { file } => {
            let mut progress = progress;
            let bytes = fs::read(&file)?;
            progress.import_snapshot(&bytes)?;
            println!("Progress restored successfully!");
        }
        Command::Drill {
            level,
            mode,
            rounds,
            no_delay,
            no_color,
        } => {
            let mut session_config = SessionConfig::from(&config);
            if let Some(mode) = mode {
                session_config.mode = mode;
            }
            let mut session = Session::new(catalog, progress, session_config);

            let level = level.unwrap_or_else(|| session.resume_level());
            let start = session.start_level(level).map_err(|e| {
                if session.counts_by_level().is_empty() {
                    format!("{e} (the catalog is empty, try `vocadrill seed`)")
                } else {
                    e.to_string()
                }
            })?;
            println!(
                "Level {level}: learned {} / {}. Answer with the full word or the option number, {} switches mode, {} quits.",
                start.learned,
                start.total,
                drill::TOGGLE_MODE,
                drill::QUIT
            );

            let stdout = io::stdout();
            let options = DrillOptions {
                feedback_delay: if no_delay {
                    Duration::ZERO
                } else {
                    Duration::from_millis(config.feedback_delay_ms)
                },
                max_rounds: rounds,
                color: !no_color && stdout.is_tty(),
            };
            let summary = drill::run(&mut session, io::stdin().lock(), &mut stdout.lock(), &options)?;

            let progress = session.level_progress();
            println!(
                "Answered {}, correct {}. Level {level}: learned {} / {}.",
                summary.answered, summary.correct, progress.learned, progress.total
            );
        }
    }

    Ok(())
}

fn print_levels(catalog: &SqliteCatalog, progress: &ProgressStore<FileProgressStorage>) {
    let counts = catalog.counts_by_level();
    for level in MIN_LEVEL..=MAX_LEVEL {
        let words = catalog.words_by_level(level);
        let learned = progress.level_progress(&words);
        println!(
            "Level {level}  {:>5} words  learned {:>5} / {}",
            counts.get(&level).copied().unwrap_or(0),
            learned.learned,
            learned.total
        );
    }

    let profile = progress.profile();
    let accuracy = progress
        .accuracy()
        .map(|a| format!("{a:.1}%"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "Answered {} in total, {} correct ({accuracy}).",
        profile.total_attempts, profile.total_correct
    );
    if let Some(level) = profile.last_active_level {
        println!("Last active level: {level}");
    }
}

fn print_stats(
    catalog: &SqliteCatalog,
    progress: &ProgressStore<FileProgressStorage>,
    level: Option<u8>,
) {
    let levels = match level {
        Some(l) => l..=l,
        None => MIN_LEVEL..=MAX_LEVEL,
    };

    let rows = levels
        .flat_map(|l| catalog.words_by_level(l))
        .filter_map(|w| progress.word_stat(w.id).map(|s| (w, *s)))
        .sorted_by(|(a, sa), (b, sb)| {
            let ra = sa.correct as f64 / sa.attempts.max(1) as f64;
            let rb = sb.correct as f64 / sb.attempts.max(1) as f64;
            ra.partial_cmp(&rb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.word.cmp(&b.word))
        })
        .collect_vec();

    if rows.is_empty() {
        println!("No practice recorded yet.");
        return;
    }

    let width = rows.iter().map(|(w, _)| w.word.width()).max().unwrap_or(0);
    for (word, stat) in rows {
        let last = chrono::DateTime::from_timestamp_millis(stat.last_review)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let padding = " ".repeat(width - word.word.width());
        println!(
            "L{} {}{padding}  {:>3} / {:<3} correct  last {last}",
            word.level, word.word, stat.correct, stat.attempts
        );
    }
}

mod output;

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use haku_common::{
    CriteriaText, FileType, HistoryStore, LogRecord, LogWriter, SearchCriteria, SizeUnit, SortKey,
    run_search, sort_hits,
};

static EXAMPLES: &str = r"EXAMPLES:
    Find JPEGs between 100 KB and 5 MB created this year:
    haku search ~/Pictures --from 2026-01-01 --to 2026-12-31 --type jpeg --min 100 --max 5120

    Same search with MB sizes, sorted by size, largest first:
    haku search ~/Pictures --from 2026-01-01 --to 2026-12-31 --type jpeg --max 5 --unit mb --sort size --desc

    Browse past searches and re-run the second one:
    haku history list
    haku history replay 2

    Pull criteria out of old log files into the history:
    haku history import";

#[derive(Parser, Debug)]
#[command(
    name = "haku",
    version,
    about = "Search a directory tree by file type, creation date and size",
    after_help = EXAMPLES
)]
struct Args {
    /// Directory holding search_history.json and search_logs/
    /// (default: ~/.haku)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a search and record the outcome
    Search(SearchArgs),
    /// Browse, replay and maintain past searches
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Folder to search recursively
    folder: String,

    /// Start of the creation-date range (YYYY-MM-DD)
    #[arg(long)]
    from: String,

    /// End of the creation-date range (YYYY-MM-DD)
    #[arg(long)]
    to: String,

    /// File type: all_files, all_images, jpeg, png, tiff, raw, psd, dng,
    /// video or archive
    #[arg(long = "type", default_value = "all_files")]
    file_type: FileType,

    /// Minimum size in the selected unit (default 0)
    #[arg(long)]
    min: Option<String>,

    /// Maximum size in the selected unit (omit for no upper bound)
    #[arg(long)]
    max: Option<String>,

    /// Size unit: kb, mb, gb or tb
    #[arg(long, default_value = "kb")]
    unit: SizeUnit,

    #[command(flatten)]
    display: DisplayArgs,
}

#[derive(clap::Args, Debug)]
struct DisplayArgs {
    /// Sort results by column: name, path, size, created or modified
    #[arg(long)]
    sort: Option<SortKey>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List past searches, newest first
    List {
        /// Print history as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-run a past search by its list number
    Replay {
        number: usize,
        #[command(flatten)]
        display: DisplayArgs,
        /// Size unit for displayed results
        #[arg(long, default_value = "kb")]
        unit: SizeUnit,
    },
    /// Delete one history entry by its list number
    Delete { number: usize },
    /// Remove all history entries
    Clear,
    /// Import criteria from existing log files (JSON history wins on
    /// duplicates)
    Import {
        /// Log folder to scan (default: <data-dir>/search_logs)
        #[arg(long)]
        logs: Option<PathBuf>,
    },
}

fn default_data_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".haku")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("could not create data dir {}", data_dir.display()))?;

    let mut history = HistoryStore::load(data_dir.join("search_history.json"));
    let log_writer = LogWriter::new(data_dir.join("search_logs"));

    match args.command {
        Command::Search(search) => cmd_search(search, &mut history, &log_writer),
        Command::History { command } => match command {
            HistoryCommand::List { json } => {
                if json {
                    output::print_json(&history.records())
                } else {
                    output::print_history(history.records());
                    Ok(())
                }
            }
            HistoryCommand::Replay {
                number,
                display,
                unit,
            } => cmd_replay(number, display, unit, &mut history, &log_writer),
            HistoryCommand::Delete { number } => {
                if number == 0 || !history.delete(number - 1) {
                    bail!("no history entry #{number}");
                }
                println!("Deleted history entry #{number}");
                Ok(())
            }
            HistoryCommand::Clear => {
                history.clear();
                println!("History cleared");
                Ok(())
            }
            HistoryCommand::Import { logs } => {
                let logs = logs.unwrap_or_else(|| log_writer.folder().to_path_buf());
                let appended = history.import_logs(&logs);
                println!(
                    "Imported {appended} record(s) from {} ({} total)",
                    logs.display(),
                    history.len()
                );
                Ok(())
            }
        },
    }
}

/// Parses the raw arguments into criteria, logging a failure record for
/// every validation error before reporting it to the user.
fn cmd_search(args: SearchArgs, history: &mut HistoryStore, log_writer: &LogWriter) -> Result<()> {
    let raw = CriteriaText {
        folder: args.folder.clone(),
        date_from: args.from.clone(),
        date_to: args.to.clone(),
        file_type: args.file_type.code().to_string(),
        size_min: args.min.clone().unwrap_or_else(|| "0".to_string()),
        size_max: args.max.clone().unwrap_or_default(),
    };
    let fail = |message: &str| log_writer.write(&LogRecord::failure(raw.clone(), message));

    let parse_date = |value: &str| NaiveDate::parse_from_str(value, "%Y-%m-%d");
    let (date_from, date_to) = match (parse_date(&args.from), parse_date(&args.to)) {
        (Ok(from), Ok(to)) => (from, to),
        _ => {
            let message = "invalid date format (expected YYYY-MM-DD)";
            fail(message);
            bail!(message);
        }
    };

    let parse_size = |value: &Option<String>| value.as_deref().map(str::parse::<f64>).transpose();
    let (size_min, size_max) = match (parse_size(&args.min), parse_size(&args.max)) {
        (Ok(min), Ok(max)) => (min.unwrap_or(0.0), max),
        _ => {
            let message = "file size must be a number";
            fail(message);
            bail!(message);
        }
    };

    let criteria = SearchCriteria {
        folder: PathBuf::from(&args.folder),
        date_from,
        date_to,
        file_type: args.file_type,
        size_min_kb: args.unit.to_kb(size_min),
        size_max_kb: size_max.map(|v| args.unit.to_kb(v)),
    };

    let outcome = match run_search(&criteria) {
        Ok(outcome) => outcome,
        Err(e) => {
            fail(&e.to_string());
            bail!(e);
        }
    };

    render_and_persist(&criteria, outcome, args.display, args.unit, history, log_writer)
}

fn cmd_replay(
    number: usize,
    display: DisplayArgs,
    unit: SizeUnit,
    history: &mut HistoryStore,
    log_writer: &LogWriter,
) -> Result<()> {
    let Some(record) = number
        .checked_sub(1)
        .and_then(|i| history.records().get(i))
    else {
        bail!("no history entry #{number}");
    };
    let criteria = record.criteria.clone();

    let outcome = match run_search(&criteria) {
        Ok(outcome) => outcome,
        Err(e) => {
            log_writer.write(&LogRecord::failure(
                CriteriaText::from(&criteria),
                &e.to_string(),
            ));
            bail!(e);
        }
    };

    render_and_persist(&criteria, outcome, display, unit, history, log_writer)
}

/// Persists the log record and the history entry for a finished search,
/// then renders the results. Logging never interrupts the workflow.
fn render_and_persist(
    criteria: &SearchCriteria,
    mut outcome: haku_common::SearchOutcome,
    display: DisplayArgs,
    unit: SizeUnit,
    history: &mut HistoryStore,
    log_writer: &LogWriter,
) -> Result<()> {
    if let Some(key) = display.sort {
        sort_hits(&mut outcome.hits, key, display.desc);
    }

    log_writer.write(&LogRecord::success(
        criteria,
        outcome.hits.len(),
        outcome.elapsed_seconds,
    ));
    history.add(criteria);

    if display.json {
        output::print_json(&outcome)?;
    } else {
        output::print_hits(&outcome, unit);
    }

    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use haku_common::interpret::describe;
use haku_common::log::{LogRecord, list_log_files};

#[derive(Parser, Debug)]
#[command(
    name = "haku-logview",
    version,
    about = "Interpret haku search log records back into readable summaries"
)]
struct Args {
    /// Log folder to read (default: ~/.haku/search_logs)
    #[arg(long, global = true)]
    logs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List log files, newest first
    List,
    /// Interpret a single log file (a path, or a name inside the log
    /// folder)
    Show { file: PathBuf },
    /// Interpret every record in the log folder, newest first
    All,
}

fn default_log_folder() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".haku").join("search_logs")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let folder = args.logs.unwrap_or_else(default_log_folder);

    match args.command {
        Command::List => {
            let files = list_log_files(&folder);
            if files.is_empty() {
                println!("No log files in {}", folder.display());
                return Ok(());
            }
            for file in files {
                if let Some(name) = file.file_name() {
                    println!("{}", name.to_string_lossy());
                }
            }
            Ok(())
        }
        Command::Show { file } => {
            // Bare names are resolved against the log folder.
            let path = if file.is_file() {
                file
            } else {
                folder.join(&file)
            };
            let text = interpret_file(&path)?;
            println!("{text}");
            Ok(())
        }
        Command::All => {
            let files = list_log_files(&folder);
            if files.is_empty() {
                println!("No log files in {}", folder.display());
                return Ok(());
            }
            for file in files {
                match interpret_file(&file) {
                    Ok(text) => {
                        println!("{text}");
                        println!("{}", "=".repeat(50));
                    }
                    Err(e) => tracing::warn!("skipping {}: {e:#}", file.display()),
                }
            }
            Ok(())
        }
    }
}

fn interpret_file(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("could not read log file {}", path.display()))?;
    let record = match LogRecord::parse(&content) {
        Ok(record) => record,
        Err(e) => bail!("log format error in {}: {e}", path.display()),
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(format!(
        "Log file:   {name}\n{}",
        describe(&record)
    ))
}

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::criteria::SearchCriteria;

/// Validation failures caught before any traversal happens. The message
/// text doubles as the `result` field of the failure log record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("not a valid folder: {0}")]
    InvalidFolder(String),
    #[error("start date cannot be later than end date")]
    InvertedDateRange,
}

/// One matched file, in host traversal order.
#[derive(Debug, Clone, Serialize)]
pub struct FileHit {
    pub name: String,
    pub path: PathBuf,
    pub size_kb: f64,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    pub hits: Vec<FileHit>,
    pub elapsed_seconds: f64,
}

fn validate(criteria: &SearchCriteria) -> Result<(), SearchError> {
    if criteria.folder.as_os_str().is_empty() || !criteria.folder.is_dir() {
        return Err(SearchError::InvalidFolder(
            criteria.folder.display().to_string(),
        ));
    }
    if criteria.date_from > criteria.date_to {
        return Err(SearchError::InvertedDateRange);
    }
    Ok(())
}

/// Walks the folder once and applies the type, size and creation-date
/// predicates. Files whose metadata cannot be read are skipped; the date
/// window is the full days from `date_from` through `date_to` inclusive.
/// Filesystems without a birth time fall back to the modification time.
pub fn run_search(criteria: &SearchCriteria) -> Result<SearchOutcome, SearchError> {
    validate(criteria)?;

    let started = Instant::now();
    let mut hits = Vec::new();

    for entry in WalkDir::new(&criteria.folder)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !criteria.file_type.matches(&name) {
            continue;
        }

        let Ok(meta) = entry.metadata() else {
            continue;
        };

        let size_kb = meta.len() as f64 / 1024.0;
        if size_kb < criteria.size_min_kb {
            continue;
        }
        if criteria.size_max_kb.is_some_and(|max| size_kb > max) {
            continue;
        }

        let Ok(modified) = meta.modified() else {
            continue;
        };
        let created = meta.created().unwrap_or(modified);
        let created = DateTime::<Local>::from(created).naive_local();

        let day = created.date();
        if day < criteria.date_from || day > criteria.date_to {
            continue;
        }

        hits.push(FileHit {
            name,
            path: entry.into_path(),
            size_kb,
            created,
            modified: DateTime::<Local>::from(modified).naive_local(),
        });
    }

    Ok(SearchOutcome {
        hits,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    })
}

/// Display columns the result list can be re-sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Path,
    Size,
    Created,
    Modified,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "path" => Ok(SortKey::Path),
            "size" => Ok(SortKey::Size),
            "created" => Ok(SortKey::Created),
            "modified" => Ok(SortKey::Modified),
            _ => Err(format!(
                "unknown sort column '{s}' (expected name, path, size, created or modified)"
            )),
        }
    }
}

/// Stable secondary sort over displayed results; strings compare
/// case-insensitively, size numerically, dates chronologically.
pub fn sort_hits(hits: &mut [FileHit], key: SortKey, descending: bool) {
    hits.sort_by(|a, b| {
        let ord = match key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Path => a
                .path
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.path.to_string_lossy().to_lowercase()),
            SortKey::Size => a.size_kb.total_cmp(&b.size_kb),
            SortKey::Created => a.created.cmp(&b.created),
            SortKey::Modified => a.modified.cmp(&b.modified),
        };
        if descending { ord.reverse() } else { ord }
    });
}

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::criteria::{FileType, SearchCriteria};
use crate::interpret::{format_timestamp, parse_legacy};
use crate::log::{LogRecord, LogStatus, list_log_files};

pub const HISTORY_LIMIT: usize = 20;
pub const HISTORY_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    #[serde(flatten)]
    pub criteria: SearchCriteria,
}

/// The bounded, deduplicated store of past successful searches, backed by
/// one JSON file. The JSON file is authoritative; log files only feed the
/// explicit `import_logs` step. All persistence failures degrade to
/// console warnings.
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<HistoryRecord>,
}

impl HistoryStore {
    /// Missing file means an empty store; an unreadable or corrupt file
    /// is warned about and treated the same.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut records: Vec<HistoryRecord> = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    "history file {} is not valid JSON, starting empty: {e}",
                    path.display()
                );
                Vec::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!("could not read history file {}: {e}", path.display());
                Vec::new()
            }
        };
        records.truncate(HISTORY_LIMIT);
        HistoryStore { path, records }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stamps the current time, drops any older record with identical
    /// criteria, prepends, truncates to the limit and persists.
    pub fn add(&mut self, criteria: &SearchCriteria) {
        let timestamp = Local::now().format(HISTORY_TIMESTAMP).to_string();
        self.insert_front(criteria.clone(), timestamp);
        self.save();
    }

    fn insert_front(&mut self, criteria: SearchCriteria, timestamp: String) {
        self.records.retain(|r| r.criteria != criteria);
        self.records.insert(0, HistoryRecord { timestamp, criteria });
        self.records.truncate(HISTORY_LIMIT);
    }

    pub fn delete(&mut self, index: usize) -> bool {
        if index >= self.records.len() {
            return false;
        }
        self.records.remove(index);
        self.save();
        true
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.save();
    }

    /// One-time import of criteria from a folder of log records, newest
    /// first. Existing JSON records always take precedence: imported
    /// records are appended after them, duplicates and unparseable files
    /// are skipped, and the store never grows past the limit. Returns how
    /// many records were appended.
    pub fn import_logs(&mut self, log_dir: &Path) -> usize {
        let mut appended = 0;
        for path in list_log_files(log_dir) {
            if self.records.len() >= HISTORY_LIMIT {
                break;
            }
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("could not read log file {}: {e}", path.display());
                    continue;
                }
            };
            let Some(record) = record_from_log(&content) else {
                tracing::warn!("skipping log file {}: not an importable record", path.display());
                continue;
            };
            if self.records.iter().any(|r| r.criteria == record.criteria) {
                continue;
            }
            self.records.push(record);
            appended += 1;
        }
        self.save();
        appended
    }

    fn save(&self) {
        let json = match serde_json::to_string_pretty(&self.records) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("could not serialize history: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            tracing::warn!(
                "could not write history file {}: {e}",
                self.path.display()
            );
        }
    }
}

/// Reconstructs a history record from one log file's content. Tries the
/// compact one-line format first (successful searches only; failures are
/// not history), then the legacy multi-line format, which carries no
/// status field.
fn record_from_log(content: &str) -> Option<HistoryRecord> {
    if let Ok(log) = LogRecord::parse(content) {
        if log.status != LogStatus::Success {
            return None;
        }
        let criteria = SearchCriteria {
            folder: PathBuf::from(&log.folder),
            date_from: NaiveDate::parse_from_str(&log.date_from, "%Y-%m-%d").ok()?,
            date_to: NaiveDate::parse_from_str(&log.date_to, "%Y-%m-%d").ok()?,
            file_type: FileType::from_code(&log.file_type)?,
            size_min_kb: log.size_min.parse().ok()?,
            size_max_kb: if log.size_max.is_empty() {
                None
            } else {
                Some(log.size_max.parse().ok()?)
            },
        };
        return Some(HistoryRecord {
            timestamp: format_timestamp(&log.timestamp),
            criteria,
        });
    }

    let legacy = parse_legacy(content)?;
    let criteria = SearchCriteria {
        folder: PathBuf::from(&legacy.folder),
        date_from: NaiveDate::parse_from_str(&legacy.date_from, "%Y-%m-%d").ok()?,
        date_to: NaiveDate::parse_from_str(&legacy.date_to, "%Y-%m-%d").ok()?,
        file_type: FileType::from_code_or_label(&legacy.file_type)?,
        size_min_kb: legacy.size_min_kb,
        size_max_kb: legacy.size_max_kb,
    };
    Some(HistoryRecord {
        timestamp: legacy.timestamp,
        criteria,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::CriteriaText;
    use std::thread;
    use std::time::Duration;

    fn criteria(folder: &str) -> SearchCriteria {
        SearchCriteria {
            folder: PathBuf::from(folder),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            file_type: FileType::Jpeg,
            size_min_kb: 0.0,
            size_max_kb: None,
        }
    }

    fn store_in(dir: &Path) -> HistoryStore {
        HistoryStore::load(dir.join("search_history.json"))
    }

    #[test]
    fn identical_criteria_collapse_to_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());

        store.add(&criteria("/a"));
        store.add(&criteria("/b"));
        store.add(&criteria("/a"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].criteria.folder, PathBuf::from("/a"));
        assert_eq!(store.records()[1].criteria.folder, PathBuf::from("/b"));
    }

    #[test]
    fn history_never_exceeds_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());

        for i in 0..30 {
            store.add(&criteria(&format!("/folder/{i}")));
        }

        assert_eq!(store.len(), HISTORY_LIMIT);
        // Newest first; the oldest ten fell off the end.
        assert_eq!(
            store.records()[0].criteria.folder,
            PathBuf::from("/folder/29")
        );
        assert_eq!(
            store.records()[HISTORY_LIMIT - 1].criteria.folder,
            PathBuf::from("/folder/10")
        );
    }

    #[test]
    fn store_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_history.json");

        let mut store = HistoryStore::load(&path);
        store.add(&criteria("/photos"));

        let reloaded = HistoryStore::load(&path);
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn corrupt_history_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_history.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(HistoryStore::load(&path).is_empty());
    }

    #[test]
    fn delete_and_clear_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_history.json");

        let mut store = HistoryStore::load(&path);
        store.add(&criteria("/a"));
        store.add(&criteria("/b"));

        assert!(store.delete(0));
        assert!(!store.delete(5));
        assert_eq!(HistoryStore::load(&path).len(), 1);

        store.clear();
        assert!(HistoryStore::load(&path).is_empty());
    }

    #[test]
    fn import_appends_after_existing_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("search_logs");
        fs::create_dir(&logs).unwrap();

        let write_log = |name: &str, c: &SearchCriteria, status_success: bool| {
            let record = if status_success {
                LogRecord::success(c, 2, 0.05)
            } else {
                LogRecord::failure(CriteriaText::from(c), "bad date")
            };
            fs::write(logs.join(name), record.to_line()).unwrap();
            thread::sleep(Duration::from_millis(5));
        };

        write_log("one.txt", &criteria("/a"), true);
        write_log("two.txt", &criteria("/b"), true);
        write_log("failed.txt", &criteria("/c"), false);
        fs::write(logs.join("junk.txt"), "not,a,record").unwrap();

        let mut store = store_in(dir.path());
        store.add(&criteria("/a"));

        let appended = store.import_logs(&logs);

        // "/a" already existed (JSON wins), the failure and the junk are
        // skipped, so only "/b" came in, after the existing record.
        assert_eq!(appended, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].criteria.folder, PathBuf::from("/a"));
        assert_eq!(store.records()[1].criteria.folder, PathBuf::from("/b"));
    }

    #[test]
    fn import_reads_legacy_records() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("search_logs");
        fs::create_dir(&logs).unwrap();

        let content = "Search Log - 2023-11-02 08:00:00\n\
                       Search Folder: /archive\n\
                       Date Range: 2023-01-01 to 2023-06-30\n\
                       File Type: All images\n\
                       Size Range: 10 KB to Unlimited\n";
        fs::write(logs.join("legacy.txt"), content).unwrap();

        let mut store = store_in(dir.path());
        assert_eq!(store.import_logs(&logs), 1);

        let record = &store.records()[0];
        assert_eq!(record.timestamp, "2023-11-02 08:00:00");
        assert_eq!(record.criteria.file_type, FileType::AllImages);
        assert_eq!(record.criteria.size_min_kb, 10.0);
        assert_eq!(record.criteria.size_max_kb, None);
    }

    #[test]
    fn import_respects_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("search_logs");
        fs::create_dir(&logs).unwrap();

        for i in 0..25 {
            let record = LogRecord::success(&criteria(&format!("/f/{i}")), 1, 0.01);
            fs::write(logs.join(format!("log_{i:02}.txt")), record.to_line()).unwrap();
        }

        let mut store = store_in(dir.path());
        let appended = store.import_logs(&logs);
        assert_eq!(appended, HISTORY_LIMIT);
        assert_eq!(store.len(), HISTORY_LIMIT);
    }
}

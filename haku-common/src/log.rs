use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::criteria::SearchCriteria;

/// Timestamp format used inside log records.
pub const COMPACT_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Success,
    Failure,
}

impl LogStatus {
    pub fn code(self) -> &'static str {
        match self {
            LogStatus::Success => "S",
            LogStatus::Failure => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<LogStatus> {
        match code {
            "S" => Some(LogStatus::Success),
            "F" => Some(LogStatus::Failure),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogParseError {
    #[error("log line has {0} comma-separated fields, expected at least 9")]
    TooFewFields(usize),
    #[error("unknown status code '{0}'")]
    UnknownStatus(String),
}

/// The criteria as entered, before validation. Failure records are written
/// even when the input never parsed into a `SearchCriteria`, so this keeps
/// the raw field text.
#[derive(Debug, Clone, Default)]
pub struct CriteriaText {
    pub folder: String,
    pub date_from: String,
    pub date_to: String,
    pub file_type: String,
    pub size_min: String,
    pub size_max: String,
}

impl From<&SearchCriteria> for CriteriaText {
    fn from(criteria: &SearchCriteria) -> Self {
        CriteriaText {
            folder: criteria.folder.display().to_string(),
            date_from: criteria.date_from.format("%Y-%m-%d").to_string(),
            date_to: criteria.date_to.format("%Y-%m-%d").to_string(),
            file_type: criteria.file_type.code().to_string(),
            size_min: format_kb(criteria.size_min_kb),
            size_max: criteria.size_max_kb.map(format_kb).unwrap_or_default(),
        }
    }
}

/// Renders a KB value without a trailing `.0` so that whole numbers stay
/// comparable with what older tool versions wrote.
pub fn format_kb(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One search outcome, one flat line:
/// `timestamp,status,folder,date_from,date_to,file_type,size_min,size_max,result`.
/// An empty `size_max` means no upper bound; `result` may itself contain
/// commas (success counts or free-form error text).
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: String,
    pub status: LogStatus,
    pub folder: String,
    pub date_from: String,
    pub date_to: String,
    pub file_type: String,
    pub size_min: String,
    pub size_max: String,
    pub result: String,
}

impl LogRecord {
    pub fn success(criteria: &SearchCriteria, file_count: usize, elapsed_seconds: f64) -> Self {
        let text = CriteriaText::from(criteria);
        LogRecord::stamped(
            LogStatus::Success,
            text,
            format!("{file_count},{elapsed_seconds:.2}"),
        )
    }

    pub fn failure(criteria: CriteriaText, message: &str) -> Self {
        LogRecord::stamped(LogStatus::Failure, criteria, message.to_string())
    }

    fn stamped(status: LogStatus, text: CriteriaText, result: String) -> Self {
        LogRecord {
            timestamp: Local::now().format(COMPACT_TIMESTAMP).to_string(),
            status,
            folder: text.folder,
            date_from: text.date_from,
            date_to: text.date_to,
            file_type: text.file_type,
            size_min: text.size_min,
            size_max: text.size_max,
            result,
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.timestamp,
            self.status.code(),
            self.folder,
            self.date_from,
            self.date_to,
            self.file_type,
            self.size_min,
            self.size_max,
            self.result
        )
    }

    /// First 8 fields are fixed-position; everything after is re-joined
    /// back into `result`.
    pub fn parse(line: &str) -> Result<LogRecord, LogParseError> {
        let parts: Vec<&str> = line.trim().split(',').collect();
        if parts.len() < 9 {
            return Err(LogParseError::TooFewFields(parts.len()));
        }
        let status = LogStatus::from_code(parts[1])
            .ok_or_else(|| LogParseError::UnknownStatus(parts[1].to_string()))?;
        Ok(LogRecord {
            timestamp: parts[0].to_string(),
            status,
            folder: parts[2].to_string(),
            date_from: parts[3].to_string(),
            date_to: parts[4].to_string(),
            file_type: parts[5].to_string(),
            size_min: parts[6].to_string(),
            size_max: parts[7].to_string(),
            result: parts[8..].join(","),
        })
    }
}

/// Writes one uniquely named file per search. Failures degrade to a
/// console warning; logging must never break the search workflow.
pub struct LogWriter {
    folder: PathBuf,
}

impl LogWriter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        let folder = folder.into();
        if let Err(e) = fs::create_dir_all(&folder) {
            tracing::warn!("could not create log folder {}: {e}", folder.display());
        }
        LogWriter { folder }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Returns the path written, or `None` when the write failed.
    pub fn write(&self, record: &LogRecord) -> Option<PathBuf> {
        let filename = format!(
            "search_log_{}.txt",
            Local::now().format("%Y%m%d_%H%M%S_%3f")
        );
        let path = self.folder.join(filename);
        match fs::write(&path, record.to_line()) {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!("failed to write search log {}: {e}", path.display());
                None
            }
        }
    }
}

/// All `.txt` records in a log folder, newest first by modification time.
/// A missing or unreadable folder is just an empty list.
pub fn list_log_files(folder: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(folder) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        })
        .collect();
    files.sort_by_key(|p| fs::metadata(p).and_then(|m| m.modified()).ok());
    files.reverse();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{FileType, SearchCriteria};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn sample_criteria() -> SearchCriteria {
        SearchCriteria {
            folder: PathBuf::from("/photos"),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            file_type: FileType::Jpeg,
            size_min_kb: 100.0,
            size_max_kb: None,
        }
    }

    #[test]
    fn success_record_round_trips() {
        let record = LogRecord::success(&sample_criteria(), 3, 0.1234);
        let parsed = LogRecord::parse(&record.to_line()).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.result, "3,0.12");
        assert_eq!(parsed.size_max, "");
        assert_eq!(parsed.file_type, "jpeg");
    }

    #[test]
    fn failure_result_keeps_embedded_commas() {
        let record = LogRecord::failure(
            CriteriaText::from(&sample_criteria()),
            "bad date, try again",
        );
        let parsed = LogRecord::parse(&record.to_line()).unwrap();
        assert_eq!(parsed.status, LogStatus::Failure);
        assert_eq!(parsed.result, "bad date, try again");
    }

    #[test]
    fn short_lines_are_format_errors() {
        assert_eq!(
            LogRecord::parse("a,b,c"),
            Err(LogParseError::TooFewFields(3))
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let line = "20240101_120000,X,/p,2024-01-01,2024-01-02,jpeg,0,,ok";
        assert_eq!(
            LogRecord::parse(line),
            Err(LogParseError::UnknownStatus("X".to_string()))
        );
    }

    #[test]
    fn writer_produces_one_parseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LogWriter::new(dir.path().join("logs"));
        let record = LogRecord::success(&sample_criteria(), 1, 0.01);

        let path = writer.write(&record).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert_eq!(LogRecord::parse(&content).unwrap(), record);

        assert_eq!(list_log_files(writer.folder()), vec![path]);
    }

    #[test]
    fn whole_kb_values_have_no_decimal_point() {
        assert_eq!(format_kb(0.0), "0");
        assert_eq!(format_kb(1024.0), "1024");
        assert_eq!(format_kb(1.5), "1.5");
    }
}

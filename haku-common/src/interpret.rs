use crate::criteria::FileType;
use crate::log::{LogRecord, LogStatus};

pub fn status_label(status: LogStatus) -> &'static str {
    match status {
        LogStatus::Success => "succeeded",
        LogStatus::Failure => "failed",
    }
}

/// Expands the compact `YYYYMMDD_HHMMSS` stamp back into
/// `YYYY-MM-DD HH:MM:SS`; anything else is shown as-is.
pub fn format_timestamp(ts: &str) -> String {
    let bytes = ts.as_bytes();
    let compact = bytes.len() == 15
        && bytes[8] == b'_'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 8 || b.is_ascii_digit());
    if !compact {
        return ts.to_string();
    }
    format!(
        "{}-{}-{} {}:{}:{}",
        &ts[0..4],
        &ts[4..6],
        &ts[6..8],
        &ts[9..11],
        &ts[11..13],
        &ts[13..15]
    )
}

/// Success results are `<count>,<elapsed>`; failure results are the raw
/// error text.
pub fn format_result(record: &LogRecord) -> String {
    match record.status {
        LogStatus::Success => match record.result.split_once(',') {
            Some((count, elapsed)) => {
                format!("succeeded, {count} files, {elapsed} seconds")
            }
            None => record.result.clone(),
        },
        LogStatus::Failure => format!("failed - {}", record.result),
    }
}

/// An empty `size_max` field means no upper bound.
pub fn format_size_range(size_min: &str, size_max: &str) -> String {
    match (size_min, size_max) {
        ("0", "") => "unlimited".to_string(),
        (min, "") => format!("{min} KB or larger (no upper bound)"),
        (min, max) => format!("{min} KB to {max} KB"),
    }
}

/// The full human-readable block for one record.
pub fn describe(record: &LogRecord) -> String {
    let type_label = FileType::from_code(&record.file_type)
        .map(FileType::label)
        .unwrap_or(record.file_type.as_str());
    let folder = if record.folder.is_empty() {
        "(not specified)"
    } else {
        &record.folder
    };
    [
        format!("Timestamp:  {}", format_timestamp(&record.timestamp)),
        format!(
            "Status:     {} ({})",
            record.status.code(),
            status_label(record.status)
        ),
        format!("Folder:     {folder}"),
        format!("Date range: {} to {}", record.date_from, record.date_to),
        format!("File type:  {} ({})", record.file_type, type_label),
        format!(
            "Size range: {}",
            format_size_range(&record.size_min, &record.size_max)
        ),
        format!("Result:     {}", format_result(record)),
    ]
    .join("\n")
}

/// A record recovered from the old multi-line "Search Log - ..." /
/// "搜索日志 - ..." key:value files. Read-only compatibility for history
/// import; sizes are already in KB.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRecord {
    pub timestamp: String,
    pub folder: String,
    pub date_from: String,
    pub date_to: String,
    pub file_type: String,
    pub size_min_kb: f64,
    pub size_max_kb: Option<f64>,
}

fn value_after<'a>(line: &'a str, en: &str, zh: &str) -> Option<&'a str> {
    line.strip_prefix(en)
        .or_else(|| line.strip_prefix(zh))
        .map(str::trim)
}

fn split_range<'a>(range: &'a str) -> Option<(&'a str, &'a str)> {
    range
        .split_once(" to ")
        .or_else(|| range.split_once("to"))
        .or_else(|| range.split_once('至'))
}

/// Returns `None` unless every field of the old format is present.
pub fn parse_legacy(content: &str) -> Option<LegacyRecord> {
    let mut timestamp = None;
    let mut folder = None;
    let mut date_from = None;
    let mut date_to = None;
    let mut file_type = None;
    let mut size_min_kb = None;
    let mut size_max_kb = None;

    for line in content.lines() {
        let line = line.trim();
        if let Some(ts) = value_after(line, "Search Log - ", "搜索日志 - ") {
            timestamp = Some(ts.to_string());
        } else if let Some(v) = value_after(line, "Search Folder:", "搜索文件夹:") {
            folder = Some(v.to_string());
        } else if let Some(v) = value_after(line, "Date Range:", "日期范围:") {
            if let Some((from, to)) = split_range(v) {
                date_from = Some(from.trim().to_string());
                date_to = Some(to.trim().to_string());
            }
        } else if let Some(v) = value_after(line, "File Type:", "文件类型:") {
            file_type = Some(v.to_string());
        } else if let Some(v) = value_after(line, "Size Range:", "大小范围:") {
            let Some((min, max)) = split_range(v) else {
                continue;
            };
            let min = min.replace("KB", "");
            let max = max.replace("KB", "");
            size_min_kb = Some(min.trim().parse::<f64>().unwrap_or(0.0));
            let max = max.trim();
            size_max_kb = Some(if max == "Unlimited" || max == "不限制" {
                None
            } else {
                max.parse::<f64>().ok()
            });
        }
    }

    Some(LegacyRecord {
        timestamp: timestamp?,
        folder: folder?,
        date_from: date_from?,
        date_to: date_to?,
        file_type: file_type?,
        size_min_kb: size_min_kb?,
        size_max_kb: size_max_kb?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: LogStatus, result: &str) -> LogRecord {
        LogRecord {
            timestamp: "20240315_093000".to_string(),
            status,
            folder: "/photos".to_string(),
            date_from: "2024-01-01".to_string(),
            date_to: "2024-12-31".to_string(),
            file_type: "jpeg".to_string(),
            size_min: "0".to_string(),
            size_max: String::new(),
            result: result.to_string(),
        }
    }

    #[test]
    fn success_result_reads_as_count_and_elapsed() {
        let r = record(LogStatus::Success, "3,0.12");
        assert_eq!(format_result(&r), "succeeded, 3 files, 0.12 seconds");
    }

    #[test]
    fn failure_result_reads_as_error_text() {
        let r = record(LogStatus::Failure, "bad date");
        assert_eq!(format_result(&r), "failed - bad date");
    }

    #[test]
    fn empty_size_max_reads_as_no_upper_bound() {
        assert_eq!(format_size_range("0", ""), "unlimited");
        assert_eq!(
            format_size_range("100", ""),
            "100 KB or larger (no upper bound)"
        );
        assert_eq!(format_size_range("100", "500"), "100 KB to 500 KB");
    }

    #[test]
    fn compact_timestamps_are_prettified() {
        assert_eq!(format_timestamp("20240315_093000"), "2024-03-15 09:30:00");
        assert_eq!(format_timestamp("not a stamp"), "not a stamp");
    }

    #[test]
    fn describe_maps_codes_to_labels() {
        let text = describe(&record(LogStatus::Success, "3,0.12"));
        assert!(text.contains("S (succeeded)"));
        assert!(text.contains("jpeg (JPEG images)"));
        assert!(text.contains("succeeded, 3 files, 0.12 seconds"));
    }

    #[test]
    fn legacy_english_format_parses() {
        let content = "Search Log - 2024-03-15 09:30:00\n\
                       Search Folder: /photos\n\
                       Date Range: 2024-01-01 to 2024-12-31\n\
                       File Type: jpeg\n\
                       Size Range: 100 KB to 500 KB\n";
        let rec = parse_legacy(content).unwrap();
        assert_eq!(rec.timestamp, "2024-03-15 09:30:00");
        assert_eq!(rec.folder, "/photos");
        assert_eq!(rec.date_from, "2024-01-01");
        assert_eq!(rec.date_to, "2024-12-31");
        assert_eq!(rec.size_min_kb, 100.0);
        assert_eq!(rec.size_max_kb, Some(500.0));
    }

    #[test]
    fn legacy_chinese_format_parses() {
        let content = "搜索日志 - 2024-03-15 09:30:00\n\
                       搜索文件夹: /photos\n\
                       日期范围: 2024-01-01 至 2024-12-31\n\
                       文件类型: 所有文件\n\
                       大小范围: 0 KB 至 不限制\n";
        let rec = parse_legacy(content).unwrap();
        assert_eq!(rec.date_from, "2024-01-01");
        assert_eq!(rec.date_to, "2024-12-31");
        assert_eq!(rec.size_min_kb, 0.0);
        assert_eq!(rec.size_max_kb, None);
    }

    #[test]
    fn incomplete_legacy_content_is_rejected() {
        assert_eq!(parse_legacy("Search Folder: /photos"), None);
        assert_eq!(parse_legacy(""), None);
    }
}

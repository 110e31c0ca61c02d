use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// File categories the search understands. Each carries a stable wire code
/// (used in log records and the history file) and a fixed extension set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    AllFiles,
    AllImages,
    Jpeg,
    Png,
    Tiff,
    Raw,
    Psd,
    Dng,
    Video,
    Archive,
}

impl FileType {
    pub const ALL: [FileType; 10] = [
        FileType::AllFiles,
        FileType::AllImages,
        FileType::Jpeg,
        FileType::Png,
        FileType::Tiff,
        FileType::Raw,
        FileType::Psd,
        FileType::Dng,
        FileType::Video,
        FileType::Archive,
    ];

    pub fn code(self) -> &'static str {
        match self {
            FileType::AllFiles => "all_files",
            FileType::AllImages => "all_images",
            FileType::Jpeg => "jpeg",
            FileType::Png => "png",
            FileType::Tiff => "tiff",
            FileType::Raw => "raw",
            FileType::Psd => "psd",
            FileType::Dng => "dng",
            FileType::Video => "video",
            FileType::Archive => "archive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileType::AllFiles => "All files",
            FileType::AllImages => "All images",
            FileType::Jpeg => "JPEG images",
            FileType::Png => "PNG images",
            FileType::Tiff => "TIFF images",
            FileType::Raw => "RAW images",
            FileType::Psd => "PSD files",
            FileType::Dng => "DNG images",
            FileType::Video => "Video files",
            FileType::Archive => "Archive files",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            FileType::AllFiles => &[],
            FileType::AllImages => &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif"],
            FileType::Jpeg => &["jpg", "jpeg"],
            FileType::Png => &["png"],
            FileType::Tiff => &["tiff", "tif"],
            FileType::Raw => &[
                "cr2", "cr3", "nef", "arw", "dng", "rw2", "orf", "pef", "srw", "raf", "mos",
            ],
            FileType::Psd => &["psd"],
            FileType::Dng => &["dng"],
            FileType::Video => &["mp4", "avi", "mkv", "mov", "wmv", "m4v"],
            FileType::Archive => &["zip", "rar", "7z", "tar", "gz"],
        }
    }

    /// Matches on the file name's extension, case-insensitively.
    /// `AllFiles` matches everything, including files without an extension.
    pub fn matches(self, file_name: &str) -> bool {
        if self == FileType::AllFiles {
            return true;
        }
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        self.extensions()
            .iter()
            .any(|e| ext.eq_ignore_ascii_case(e))
    }

    pub fn from_code(code: &str) -> Option<FileType> {
        FileType::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Resolves a wire code or a display label. Legacy log files stored
    /// labels rather than codes, including the original Chinese ones.
    pub fn from_code_or_label(value: &str) -> Option<FileType> {
        FileType::from_code(value)
            .or_else(|| FileType::ALL.into_iter().find(|t| t.label() == value))
            .or_else(|| match value {
                "所有文件" => Some(FileType::AllFiles),
                "所有图片" => Some(FileType::AllImages),
                "JPEG格式" => Some(FileType::Jpeg),
                "PNG格式" => Some(FileType::Png),
                "TIFF格式" => Some(FileType::Tiff),
                "RAW格式" => Some(FileType::Raw),
                "PSD格式" => Some(FileType::Psd),
                "DNG格式" => Some(FileType::Dng),
                "视频文件" => Some(FileType::Video),
                "压缩文件" => Some(FileType::Archive),
                _ => None,
            })
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileType::from_code(s).ok_or_else(|| {
            let codes: Vec<&str> = FileType::ALL.iter().map(|t| t.code()).collect();
            format!("unknown file type '{}' (expected one of: {})", s, codes.join(", "))
        })
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Size units accepted on the command line. KB is the base unit used
/// everywhere internally (criteria, history, log records).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Kb,
    Mb,
    Gb,
    Tb,
}

impl SizeUnit {
    pub fn factor(self) -> f64 {
        match self {
            SizeUnit::Kb => 1.0,
            SizeUnit::Mb => 1024.0,
            SizeUnit::Gb => 1024.0 * 1024.0,
            SizeUnit::Tb => 1024.0 * 1024.0 * 1024.0,
        }
    }

    pub fn to_kb(self, value: f64) -> f64 {
        value * self.factor()
    }

    pub fn from_kb(self, kb: f64) -> f64 {
        kb / self.factor()
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeUnit::Kb => "KB",
            SizeUnit::Mb => "MB",
            SizeUnit::Gb => "GB",
            SizeUnit::Tb => "TB",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kb" => Ok(SizeUnit::Kb),
            "mb" => Ok(SizeUnit::Mb),
            "gb" => Ok(SizeUnit::Gb),
            "tb" => Ok(SizeUnit::Tb),
            _ => Err(format!("unknown size unit '{s}' (expected kb, mb, gb or tb)")),
        }
    }
}

/// One search, fully specified. Equality over all fields is the history
/// dedup key; sizes are stored in KB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub folder: PathBuf,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub file_type: FileType,
    pub size_min_kb: f64,
    /// `None` means no upper bound.
    pub size_max_kb: Option<f64>,
}

impl SearchCriteria {
    /// Human rendering of the size range, in KB.
    pub fn size_range_display(&self) -> String {
        match (self.size_min_kb, self.size_max_kb) {
            (min, None) if min == 0.0 => "unlimited".to_string(),
            (min, None) => format!(">= {min} KB"),
            (min, Some(max)) if min == 0.0 => format!("<= {max} KB"),
            (min, Some(max)) => format!("{min} to {max} KB"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_unit_round_trips_through_kb() {
        for unit in [SizeUnit::Kb, SizeUnit::Mb, SizeUnit::Gb, SizeUnit::Tb] {
            for value in [0.0, 0.5, 1.0, 123.456, 9_999.25] {
                let back = unit.from_kb(unit.to_kb(value));
                assert!(
                    (back - value).abs() < 1e-9,
                    "{value} {} did not round-trip: got {back}",
                    unit.label()
                );
            }
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(FileType::Jpeg.matches("holiday.JPG"));
        assert!(FileType::Jpeg.matches("holiday.jpeg"));
        assert!(!FileType::Jpeg.matches("holiday.png"));
        assert!(FileType::Raw.matches("shot.CR3"));
        assert!(FileType::Archive.matches("backup.tar"));
    }

    #[test]
    fn all_files_matches_extensionless_names() {
        assert!(FileType::AllFiles.matches("Makefile"));
        assert!(!FileType::Png.matches("Makefile"));
    }

    #[test]
    fn codes_round_trip() {
        for t in FileType::ALL {
            assert_eq!(FileType::from_code(t.code()), Some(t));
        }
        assert_eq!(FileType::from_code("bogus"), None);
    }

    #[test]
    fn labels_resolve_too() {
        assert_eq!(
            FileType::from_code_or_label("All images"),
            Some(FileType::AllImages)
        );
        assert_eq!(FileType::from_code_or_label("video"), Some(FileType::Video));
    }

    #[test]
    fn criteria_equality_ignores_nothing() {
        let a = SearchCriteria {
            folder: PathBuf::from("/photos"),
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            file_type: FileType::Jpeg,
            size_min_kb: 0.0,
            size_max_kb: None,
        };
        let mut b = a.clone();
        assert_eq!(a, b);
        b.size_max_kb = Some(100.0);
        assert_ne!(a, b);
    }
}

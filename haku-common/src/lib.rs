//! Shared engine for the haku file-search tools: criteria model, the
//! directory-walk search, the bounded search-history store and the
//! one-line-per-search log format.

pub mod criteria;
pub mod history;
pub mod interpret;
pub mod log;
pub mod search;

pub use criteria::{FileType, SearchCriteria, SizeUnit};
pub use history::{HISTORY_LIMIT, HistoryRecord, HistoryStore};
pub use log::{CriteriaText, LogRecord, LogStatus, LogWriter};
pub use search::{FileHit, SearchError, SearchOutcome, SortKey, run_search, sort_hits};

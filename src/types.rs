use chrono::{DateTime, Local};
use tabled::Tabled;

use crate::error::LoadError;

/// One attendance row as it appears in the worksheet, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceRecord {
    pub employee: String,
    pub site: String,
    pub status: String,
    pub investment_raw: String,
    pub economy_raw: String,
    pub role: String,
    pub shift: String,
}

/// A cleaned attendance row. `investment` and `economy` are parsed from the
/// raw currency cells and are always finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub employee: String,
    pub site: String,
    pub status: String,
    pub role: String,
    pub shift: String,
    pub investment: f64,
    pub economy: f64,
}

/// Result of one fetch+clean cycle.
///
/// A snapshot is always well formed. When loading failed, `records` and
/// `pending` are empty and `error` says why, so callers can tell a failed
/// fetch apart from a sheet that simply has no rows.
#[derive(Debug)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub pending: Vec<String>,
    pub loaded_at: DateTime<Local>,
    pub error: Option<LoadError>,
}

impl Snapshot {
    pub fn failed(error: LoadError) -> Self {
        Snapshot {
            records: Vec::new(),
            pending: Vec::new(),
            loaded_at: Local::now(),
            error: Some(error),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteShare {
    pub site: String,
    pub investment: f64,
    /// Fraction of `total_investment`, in `0.0..=1.0`.
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialReport {
    pub total_investment: f64,
    pub total_economy: f64,
    pub total_combined: f64,
    pub sites: Vec<SiteShare>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusCount {
    pub employee: String,
    pub status: String,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRanking {
    pub employee: String,
    pub presents: usize,
    pub absents: usize,
    pub presence_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceReport {
    pub total_calls: usize,
    pub total_present: usize,
    /// Fraction of present calls, in `0.0..=1.0`.
    pub attendance_rate: f64,
    pub by_status: Vec<StatusCount>,
    pub ranking: Vec<EmployeeRanking>,
}

#[derive(Debug, Tabled, Clone)]
pub struct SiteShareRow {
    #[tabled(rename = "Site")]
    pub site: String,
    #[tabled(rename = "Investment")]
    pub investment: String,
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct StatusCountRow {
    #[tabled(rename = "Employee")]
    pub employee: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Days")]
    pub days: usize,
}

#[derive(Debug, Tabled, Clone)]
pub struct RankingRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Employee")]
    pub employee: String,
    #[tabled(rename = "Present")]
    pub presents: usize,
    #[tabled(rename = "Absent")]
    pub absents: usize,
    #[tabled(rename = "Presence")]
    pub presence: String,
}

// Data source gateway.
//
// A `GridSource` hands back one worksheet as a grid of strings. The
// production source is `CsvWorkbook`, a directory holding one CSV export
// per worksheet, opened with service-account credentials.
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::SourceError;

/// A worksheet as text: the trimmed-later header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub trait GridSource {
    fn fetch_grid(&self, worksheet: &str) -> Result<Grid, SourceError>;
}

/// Where the service-account key comes from.
#[derive(Clone)]
pub enum Credentials {
    /// The JSON key document itself, e.g. injected as a secret.
    Embedded(String),
    /// Path to a JSON key file.
    File(PathBuf),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Embedded(_) => f.write_str("Embedded(<redacted>)"),
            Credentials::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
}

impl Credentials {
    pub fn resolve(&self) -> Result<ServiceAccount, SourceError> {
        let json = match self {
            Credentials::Embedded(json) => json.clone(),
            Credentials::File(path) => fs::read_to_string(path).map_err(|e| {
                SourceError::Connection(format!(
                    "cannot read credentials file '{}': {}",
                    path.display(),
                    e
                ))
            })?,
        };
        let account: ServiceAccount = serde_json::from_str(&json)
            .map_err(|e| SourceError::Connection(format!("invalid service account: {}", e)))?;
        if account.client_email.trim().is_empty() || account.private_key.trim().is_empty() {
            return Err(SourceError::Connection(
                "service account is missing client_email or private_key".to_string(),
            ));
        }
        Ok(account)
    }
}

/// A spreadsheet exported as `<dir>/<worksheet>.csv` files.
#[derive(Debug)]
pub struct CsvWorkbook {
    dir: PathBuf,
    account: ServiceAccount,
}

impl CsvWorkbook {
    pub fn open(dir: impl AsRef<Path>, credentials: &Credentials) -> Result<Self, SourceError> {
        let account = credentials.resolve()?;
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(SourceError::Connection(format!(
                "spreadsheet '{}' not found or not shared with {}",
                dir.display(),
                account.client_email
            )));
        }
        info!(workbook = %dir.display(), account = %account.client_email, "opened workbook");
        Ok(CsvWorkbook { dir, account })
    }

    pub fn account(&self) -> &ServiceAccount {
        &self.account
    }
}

impl GridSource for CsvWorkbook {
    fn fetch_grid(&self, worksheet: &str) -> Result<Grid, SourceError> {
        let path = self.dir.join(format!("{}.csv", worksheet));
        if !path.is_file() {
            return Err(SourceError::SheetRead(format!(
                "worksheet '{}' not found in '{}'",
                worksheet,
                self.dir.display()
            )));
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;
        let mut records = rdr.records();

        let headers: Vec<String> = match records.next() {
            Some(first) => first?.iter().map(str::to_string).collect(),
            None => {
                return Err(SourceError::SheetRead(format!(
                    "worksheet '{}' is empty",
                    worksheet
                )))
            }
        };

        let mut rows = Vec::new();
        for result in records {
            let record = result?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            rows.push(row);
        }

        debug!(worksheet, rows = rows.len(), "fetched grid");
        Ok(Grid { headers, rows })
    }
}

/// A fixed in-memory grid, or a fixed failure.
#[cfg(test)]
#[derive(Debug)]
pub struct StaticGrid {
    result: Result<Grid, String>,
}

#[cfg(test)]
impl StaticGrid {
    pub fn new(headers: &[&str], rows: &[&[&str]]) -> Self {
        StaticGrid {
            result: Ok(Grid {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows: rows
                    .iter()
                    .map(|r| r.iter().map(|c| c.to_string()).collect())
                    .collect(),
            }),
        }
    }

    /// A source that always fails with a connection error.
    pub fn unreachable(reason: &str) -> Self {
        StaticGrid {
            result: Err(reason.to_string()),
        }
    }
}

#[cfg(test)]
impl GridSource for StaticGrid {
    fn fetch_grid(&self, _worksheet: &str) -> Result<Grid, SourceError> {
        self.result.clone().map_err(SourceError::Connection)
    }
}

use std::collections::BTreeSet;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::error::LoadError;
use crate::source::{Grid, GridSource};
use crate::types::{AttendanceRecord, Record, Snapshot};
use crate::util::{contains_folded, fold, parse_currency};

/// Role values marking an employee who was never mapped to a role.
const NOT_REGISTERED: [&str; 2] = ["nao cadastrado", "not registered"];

/// Accepted header labels per column, already folded (lowercase, no accents).
const EMPLOYEE: (&str, &[&str]) = ("employee", &["colaborador", "employee", "nome"]);
const SITE: (&str, &[&str]) = ("site", &["obra", "site"]);
const STATUS: (&str, &[&str]) = ("status", &["status"]);
const INVESTMENT: (&str, &[&str]) = ("investment", &["investimento", "investment", "invest_bruto"]);
const ECONOMY: (&str, &[&str]) = ("economy", &["economia", "economy", "econ_bruto"]);
const ROLE: (&str, &[&str]) = ("role", &["funcao", "role"]);
const SHIFT: (&str, &[&str]) = ("shift", &["turno", "shift"]);

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnMap {
    employee: usize,
    site: usize,
    status: usize,
    investment: usize,
    economy: usize,
    role: usize,
    shift: usize,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Result<Self, LoadError> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(LoadError::MalformedGrid("header row is empty".to_string()));
        }
        let folded: Vec<String> = headers.iter().map(|h| fold(h.trim())).collect();
        let find = |(name, aliases): (&'static str, &[&str])| {
            folded
                .iter()
                .position(|h| aliases.contains(&h.as_str()))
                .ok_or(LoadError::MissingColumn(name))
        };
        Ok(ColumnMap {
            employee: find(EMPLOYEE)?,
            site: find(SITE)?,
            status: find(STATUS)?,
            investment: find(INVESTMENT)?,
            economy: find(ECONOMY)?,
            role: find(ROLE)?,
            shift: find(SHIFT)?,
        })
    }

    fn extract(&self, row: &[String]) -> AttendanceRecord {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();
        AttendanceRecord {
            employee: cell(self.employee),
            site: cell(self.site),
            status: cell(self.status),
            investment_raw: cell(self.investment),
            economy_raw: cell(self.economy),
            role: cell(self.role),
            shift: cell(self.shift),
        }
    }
}

pub fn normalize(raw: AttendanceRecord) -> Record {
    let investment = parse_currency(&raw.investment_raw);
    let economy = parse_currency(&raw.economy_raw);
    Record {
        employee: raw.employee,
        site: raw.site,
        status: raw.status,
        role: raw.role,
        shift: raw.shift,
        investment,
        economy,
    }
}

pub fn is_not_registered(role: &str) -> bool {
    NOT_REGISTERED.iter().any(|s| contains_folded(role, s))
}

/// Sorted, distinct names of employees whose role is "not registered".
pub fn pending_registrations(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter(|r| is_not_registered(&r.role))
        .map(|r| r.employee.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A currency cell holding text with no digits at all, e.g. `"-"` or `"abc"`.
fn is_unreadable_amount(raw: &str) -> bool {
    let raw = raw.trim();
    !raw.is_empty() && raw != "nan" && !raw.chars().any(|c| c.is_ascii_digit())
}

/// Map a raw grid to normalized records plus the pending-registration list.
pub fn clean_grid(grid: &Grid) -> Result<(Vec<Record>, Vec<String>), LoadError> {
    let columns = ColumnMap::from_headers(&grid.headers)?;
    let mut unreadable = 0usize;
    let records: Vec<Record> = grid
        .rows
        .iter()
        .map(|row| {
            let raw = columns.extract(row);
            unreadable += [&raw.investment_raw, &raw.economy_raw]
                .iter()
                .filter(|cell| is_unreadable_amount(cell))
                .count();
            normalize(raw)
        })
        .collect();
    if unreadable > 0 {
        debug!(cells = unreadable, "currency cells without digits read as zero");
    }
    let pending = pending_registrations(&records);
    Ok((records, pending))
}

/// Fetch and clean one worksheet. Never fails: on any error the snapshot is
/// empty and carries the error.
pub fn load_snapshot(source: &dyn GridSource, worksheet: &str) -> Snapshot {
    let result = source
        .fetch_grid(worksheet)
        .map_err(LoadError::from)
        .and_then(|grid| clean_grid(&grid));

    match result {
        Ok((records, pending)) => {
            info!(worksheet, rows = records.len(), "loaded worksheet");
            if !pending.is_empty() {
                warn!(count = pending.len(), "employees pending registration");
            }
            Snapshot {
                records,
                pending,
                loaded_at: Local::now(),
                error: None,
            }
        }
        Err(e) => {
            error!(worksheet, error = %e, "failed to load worksheet");
            Snapshot::failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticGrid;

    const HEADERS: [&str; 7] = [
        " Colaborador ",
        "Obra",
        "Status",
        "Investimento",
        "Economia",
        "Função",
        "Turno",
    ];

    #[test]
    fn cleans_rows_and_parses_currency() {
        let source = StaticGrid::new(
            &HEADERS,
            &[
                &["Ana", "SiteA", "Presente", "R$ 1.234,56", "nan", "Pedreiro", "Diurno"],
                &["Bia", "SiteB", "Ausente", "abc", "", "Servente", "Noturno"],
            ],
        );
        let snap = load_snapshot(&source, "DATA_DASHBOARD");
        assert!(snap.error.is_none());
        assert_eq!(snap.records.len(), 2);
        assert_eq!(snap.records[0].investment, 1234.56);
        assert_eq!(snap.records[0].economy, 0.0);
        assert_eq!(snap.records[1].investment, 0.0);
        assert!(snap.records.iter().all(|r| r.investment >= 0.0 && r.economy >= 0.0));
    }

    #[test]
    fn maps_columns_by_header_name() {
        let source = StaticGrid::new(
            &["Turno", "Status", "Obra", "Colaborador", "Economia", "Investimento", "Funcao"],
            &[&["Noturno", "Presente", "SiteA", "Ana", "R$ 5,00", "R$ 7,50", "Pedreiro"]],
        );
        let snap = load_snapshot(&source, "any");
        let r = &snap.records[0];
        assert_eq!(r.employee, "Ana");
        assert_eq!(r.site, "SiteA");
        assert_eq!(r.shift, "Noturno");
        assert_eq!(r.investment, 7.5);
        assert_eq!(r.economy, 5.0);
    }

    #[test]
    fn missing_header_fails_fast() {
        let source = StaticGrid::new(
            &["Colaborador", "Obra", "Status", "Investimento", "Economia", "Funcao"],
            &[&["Ana", "SiteA", "Presente", "1", "1", "Pedreiro"]],
        );
        let snap = load_snapshot(&source, "any");
        assert!(snap.is_empty());
        assert!(matches!(snap.error, Some(LoadError::MissingColumn("shift"))));
    }

    #[test]
    fn short_rows_read_as_blank_cells() {
        let source = StaticGrid::new(&HEADERS, &[&["Ana", "SiteA", "Presente"]]);
        let snap = load_snapshot(&source, "any");
        assert_eq!(snap.records[0].investment, 0.0);
        assert_eq!(snap.records[0].shift, "");
    }

    #[test]
    fn source_failure_yields_empty_snapshot_with_error() {
        let snap = load_snapshot(&StaticGrid::unreachable("network down"), "any");
        assert!(snap.is_empty());
        assert!(snap.pending.is_empty());
        assert!(matches!(snap.error, Some(LoadError::Source(_))));
    }

    #[test]
    fn pending_set_is_distinct_sorted_and_stable() {
        let source = StaticGrid::new(
            &HEADERS,
            &[
                &["Zeca", "SiteA", "Presente", "", "", "NÃO CADASTRADO", "Diurno"],
                &["Ana", "SiteA", "Presente", "", "", "não cadastrado", "Diurno"],
                &["Zeca", "SiteB", "Ausente", "", "", "NÃO CADASTRADO", "Diurno"],
                &["Bia", "SiteB", "Presente", "", "", "Pedreiro", "Diurno"],
            ],
        );
        let first = load_snapshot(&source, "any");
        let second = load_snapshot(&source, "any");
        assert_eq!(first.pending, vec!["Ana".to_string(), "Zeca".to_string()]);
        assert_eq!(first.pending, second.pending);
        // pending employees stay in the working data
        assert_eq!(first.records.len(), 4);
    }

    #[test]
    fn decomposed_header_and_sentinel_still_match() {
        let source = StaticGrid::new(
            &["Colaborador", "Obra", "Status", "Investimento", "Economia", "Func\u{327}a\u{303}o", "Turno"],
            &[
                &["Zeca", "SiteA", "Presente", "", "", "NA\u{303}O CADASTRADO", "Diurno"],
                &["Bia", "SiteA", "Presente", "", "", "Pedreiro", "Diurno"],
            ],
        );
        let snap = load_snapshot(&source, "any");
        assert!(snap.error.is_none());
        assert_eq!(snap.records[1].role, "Pedreiro");
        assert_eq!(snap.pending, vec!["Zeca".to_string()]);
    }

    #[test]
    fn flags_cells_without_digits() {
        assert!(is_unreadable_amount("abc"));
        assert!(is_unreadable_amount(" - "));
        assert!(!is_unreadable_amount(""));
        assert!(!is_unreadable_amount("nan"));
        assert!(!is_unreadable_amount("R$ 1,00"));
    }
}

// Text rendering of the dashboard panels.
use std::fmt::Write;

use tabled::{settings::Style, Table, Tabled};

use crate::filter::{FilterOptions, Selection};
use crate::types::{
    AttendanceReport, FinancialReport, RankingRow, SiteShareRow, Snapshot, StatusCountRow,
};
use crate::util::{format_brl, format_int, format_percent, progress_bar};

const BAR_WIDTH: usize = 30;

fn table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }
    let table_str = Table::new(rows).with(Style::markdown()).to_string();
    format!("{}\n", table_str)
}

/// Banner shown when the snapshot holds no records: either the load failed
/// or the sheet had no data rows.
pub fn render_unavailable(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    match &snapshot.error {
        Some(e) => {
            let _ = writeln!(out, "Data error: could not read the spreadsheet ({}).", e);
            let _ = writeln!(
                out,
                "Check the network connection and that the service account was added as an editor of the sheet."
            );
        }
        None => {
            let _ = writeln!(out, "The worksheet has no rows yet.");
        }
    }
    out
}

pub fn render_pending(pending: &[String]) -> String {
    if pending.is_empty() {
        return String::new();
    }
    format!("PENDING: fix the registration of: {}\n", pending.join(", "))
}

pub fn render_no_selection() -> String {
    "Select the sidebar filters (at least one shift and one site).\n".to_string()
}

pub fn render_status_line(snapshot: &Snapshot) -> String {
    format!(
        "{} rows, updated at {}\n",
        format_int(snapshot.records.len()),
        snapshot.loaded_at.format("%H:%M:%S")
    )
}

pub fn render_financial(report: &FinancialReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Financial panel ==\n");
    let _ = writeln!(out, "Investment: {}", format_brl(report.total_investment));
    let _ = writeln!(out, "Economy:    {}", format_brl(report.total_economy));
    let _ = writeln!(out, "Total:      {}\n", format_brl(report.total_combined));

    let _ = writeln!(out, "Investment by site\n");
    let rows: Vec<SiteShareRow> = report
        .sites
        .iter()
        .map(|s| SiteShareRow {
            site: s.site.clone(),
            investment: format_brl(s.investment),
            share: format_percent(s.share),
        })
        .collect();
    out.push_str(&table(rows));

    if !report.sites.is_empty() {
        let _ = writeln!(out, "\nShare bars\n");
        for s in &report.sites {
            let _ = writeln!(out, "{}", s.site);
            let _ = writeln!(
                out,
                "{} {} - {}",
                progress_bar(s.share, BAR_WIDTH),
                format_percent(s.share),
                format_brl(s.investment)
            );
        }
    }
    out
}

pub fn render_attendance(report: &AttendanceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Attendance panel ==\n");
    let _ = writeln!(out, "Total calls:        {}", format_int(report.total_calls));
    let _ = writeln!(out, "Presents:           {}", format_int(report.total_present));
    let _ = writeln!(out, "Average attendance: {}\n", format_percent(report.attendance_rate));

    let _ = writeln!(out, "Presence vs absence per employee\n");
    let rows: Vec<StatusCountRow> = report
        .by_status
        .iter()
        .map(|s| StatusCountRow {
            employee: s.employee.clone(),
            status: s.status.clone(),
            days: s.days,
        })
        .collect();
    out.push_str(&table(rows));

    let _ = writeln!(out, "\nIndividual attendance ranking\n");
    let rows: Vec<RankingRow> = report
        .ranking
        .iter()
        .enumerate()
        .map(|(idx, r)| RankingRow {
            rank: idx + 1,
            employee: r.employee.clone(),
            presents: r.presents,
            absents: r.absents,
            presence: format_percent(r.presence_ratio),
        })
        .collect();
    out.push_str(&table(rows));
    for r in &report.ranking {
        let _ = writeln!(
            out,
            "{:<24} {} {}",
            r.employee,
            progress_bar(r.presence_ratio, BAR_WIDTH),
            format_percent(r.presence_ratio)
        );
    }
    out
}

/// Numbered checkbox listing used by the filters menu.
pub fn render_filters(options: &FilterOptions, selection: &Selection) -> String {
    let mut out = String::new();
    let tick = |on: bool| if on { "[x]" } else { "[ ]" };

    let _ = writeln!(out, "Shifts");
    for (idx, shift) in options.shifts.iter().enumerate() {
        let _ = writeln!(out, "  s{} {} {}", idx + 1, tick(selection.shifts.contains(shift)), shift);
    }
    let _ = writeln!(out, "Sites");
    for (idx, site) in options.sites.iter().enumerate() {
        let _ = writeln!(out, "  o{} {} {}", idx + 1, tick(selection.sites.contains(site)), site);
    }
    let _ = writeln!(out, "Employee");
    let _ = writeln!(out, "  c0 {} All", tick(selection.employee.is_none()));
    for (idx, name) in options.employees.iter().enumerate() {
        let chosen = selection.employee.as_deref() == Some(name.as_str());
        let _ = writeln!(out, "  c{} {} {}", idx + 1, tick(chosen), name);
    }
    out
}

use std::collections::BTreeSet;

use tracing::debug;

use crate::loader::is_not_registered;
use crate::types::Record;

/// The values the user can pick from, derived from the loaded records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub shifts: Vec<String>,
    pub sites: Vec<String>,
    /// Employees offered in the name picker; those pending registration are
    /// left out.
    pub employees: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        let shifts: BTreeSet<&str> = records.iter().map(|r| r.shift.as_str()).collect();
        let sites: BTreeSet<&str> = records.iter().map(|r| r.site.as_str()).collect();
        let employees: BTreeSet<&str> = records
            .iter()
            .filter(|r| !is_not_registered(&r.role))
            .map(|r| r.employee.as_str())
            .collect();
        FilterOptions {
            shifts: shifts.into_iter().map(str::to_string).collect(),
            sites: sites.into_iter().map(str::to_string).collect(),
            employees: employees.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Current filter choices. `employee: None` means every employee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub shifts: BTreeSet<String>,
    pub sites: BTreeSet<String>,
    pub employee: Option<String>,
}

impl Selection {
    /// Every shift and site ticked, no employee narrowing.
    pub fn all(options: &FilterOptions) -> Self {
        Selection {
            shifts: options.shifts.iter().cloned().collect(),
            sites: options.sites.iter().cloned().collect(),
            employee: None,
        }
    }

    pub fn toggle_shift(&mut self, shift: &str) {
        if !self.shifts.remove(shift) {
            self.shifts.insert(shift.to_string());
        }
    }

    pub fn toggle_site(&mut self, site: &str) {
        if !self.sites.remove(site) {
            self.sites.insert(site.to_string());
        }
    }

    pub fn set_employee(&mut self, employee: Option<String>) {
        self.employee = employee;
    }

    /// Keep the selection meaningful after a reload: values that vanished
    /// from the data are dropped, new ones start ticked.
    pub fn reconcile(&mut self, previous: &FilterOptions, current: &FilterOptions) {
        let retain_known = |set: &mut BTreeSet<String>, known: &[String]| {
            set.retain(|v| known.contains(v));
        };
        retain_known(&mut self.shifts, &current.shifts);
        retain_known(&mut self.sites, &current.sites);
        for shift in current.shifts.iter().filter(|s| !previous.shifts.contains(*s)) {
            self.shifts.insert(shift.clone());
        }
        for site in current.sites.iter().filter(|s| !previous.sites.contains(*s)) {
            self.sites.insert(site.clone());
        }
        if let Some(name) = &self.employee {
            if !current.employees.contains(name) {
                self.employee = None;
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum FilterOutcome<'a> {
    /// No shift or no site is selected; distinct from an empty match.
    NoSelection,
    Rows(Vec<&'a Record>),
}

/// Narrow `records` to the selection. The input is never modified.
pub fn apply<'a>(records: &'a [Record], selection: &Selection) -> FilterOutcome<'a> {
    if selection.shifts.is_empty() || selection.sites.is_empty() {
        debug!("no shift or site selected");
        return FilterOutcome::NoSelection;
    }
    let rows = records
        .iter()
        .filter(|r| selection.shifts.contains(&r.shift) && selection.sites.contains(&r.site))
        .filter(|r| match &selection.employee {
            Some(name) => &r.employee == name,
            None => true,
        })
        .collect();
    FilterOutcome::Rows(rows)
}

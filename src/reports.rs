use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::types::{AttendanceReport, EmployeeRanking, FinancialReport, Record, SiteShare, StatusCount};
use crate::util::contains_folded;

pub fn is_present(status: &str) -> bool {
    contains_folded(status, "present")
}

pub fn is_absent(status: &str) -> bool {
    contains_folded(status, "ausente") || contains_folded(status, "absent")
}

/// Investment counts only attended days; economy accrues on every row.
pub fn financial(rows: &[&Record]) -> FinancialReport {
    let mut total_investment = 0.0;
    let mut total_economy = 0.0;
    let mut by_site: HashMap<&str, f64> = HashMap::new();

    for r in rows {
        total_economy += r.economy;
        if is_present(&r.status) {
            total_investment += r.investment;
            *by_site.entry(r.site.as_str()).or_insert(0.0) += r.investment;
        }
    }

    let mut sites: Vec<SiteShare> = if total_investment > 0.0 {
        by_site
            .into_iter()
            .map(|(site, investment)| SiteShare {
                site: site.to_string(),
                investment,
                share: investment / total_investment,
            })
            .collect()
    } else {
        Vec::new()
    };
    sites.sort_by(|a, b| {
        b.investment
            .partial_cmp(&a.investment)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.site.cmp(&b.site))
    });

    FinancialReport {
        total_investment,
        total_economy,
        total_combined: total_investment + total_economy,
        sites,
    }
}

pub fn attendance(rows: &[&Record]) -> AttendanceReport {
    #[derive(Default)]
    struct Acc<'a> {
        days: usize,
        presents: usize,
        absents: usize,
        statuses: BTreeMap<&'a str, usize>,
    }

    let total_calls = rows.len();
    let mut total_present = 0usize;
    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in rows {
        let e = map.entry(r.employee.as_str()).or_default();
        e.days += 1;
        *e.statuses.entry(r.status.as_str()).or_insert(0) += 1;
        if is_present(&r.status) {
            e.presents += 1;
            total_present += 1;
        } else if is_absent(&r.status) {
            e.absents += 1;
        }
    }

    let attendance_rate = if total_calls > 0 {
        total_present as f64 / total_calls as f64
    } else {
        0.0
    };

    // busiest employees first, names break ties
    let mut order: Vec<(&str, &Acc)> = map.iter().map(|(k, v)| (*k, v)).collect();
    order.sort_by(|a, b| b.1.days.cmp(&a.1.days).then_with(|| a.0.cmp(b.0)));
    let by_status: Vec<StatusCount> = order
        .iter()
        .flat_map(|(employee, acc)| {
            acc.statuses.iter().map(move |(status, days)| StatusCount {
                employee: employee.to_string(),
                status: status.to_string(),
                days: *days,
            })
        })
        .collect();

    let ranking = if total_present == 0 {
        Vec::new()
    } else {
        let mut ranking: Vec<EmployeeRanking> = map
            .iter()
            .map(|(employee, acc)| {
                let counted = acc.presents + acc.absents;
                let presence_ratio = if counted > 0 {
                    acc.presents as f64 / counted as f64
                } else {
                    0.0
                };
                EmployeeRanking {
                    employee: employee.to_string(),
                    presents: acc.presents,
                    absents: acc.absents,
                    presence_ratio,
                }
            })
            .collect();
        ranking.sort_by(|a, b| {
            b.presence_ratio
                .partial_cmp(&a.presence_ratio)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.employee.cmp(&b.employee))
        });
        ranking
    };

    AttendanceReport {
        total_calls,
        total_present,
        attendance_rate,
        by_status,
        ranking,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{self, FilterOptions, FilterOutcome, Selection};
    use crate::loader::load_snapshot;
    use crate::source::StaticGrid;
    use crate::types::Record;

    fn rec(employee: &str, site: &str, status: &str, inv: f64, eco: f64) -> Record {
        Record {
            employee: employee.into(),
            site: site.into(),
            status: status.into(),
            role: "Pedreiro".into(),
            shift: "Diurno".into(),
            investment: inv,
            economy: eco,
        }
    }

    #[test]
    fn investment_gated_on_presence_economy_is_not() {
        let data = vec![
            rec("Ana", "SiteA", "Presente", 300.0, 10.0),
            rec("Bia", "SiteB", "PRESENTE", 100.0, 10.0),
            rec("Bia", "SiteB", "Ausente", 999.0, 5.0),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let fin = financial(&rows);
        assert_eq!(fin.total_investment, 400.0);
        assert_eq!(fin.total_economy, 25.0);
        assert_eq!(fin.total_combined, 425.0);
        assert_eq!(fin.sites.len(), 2);
        assert_eq!(fin.sites[0].site, "SiteA");
        assert_eq!(fin.sites[0].share, 0.75);
        assert_eq!(fin.sites[1].share, 0.25);
    }

    #[test]
    fn zero_investment_means_no_shares() {
        let data = vec![
            rec("Ana", "SiteA", "Ausente", 100.0, 10.0),
            rec("Ana", "SiteA", "Presente", 0.0, 10.0),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let fin = financial(&rows);
        assert_eq!(fin.total_investment, 0.0);
        assert!(fin.sites.is_empty());
        assert_eq!(fin.total_economy, 20.0);
    }

    #[test]
    fn empty_input_gives_zero_reports() {
        assert_eq!(financial(&[]), FinancialReport::default());
        let att = attendance(&[]);
        assert_eq!(att.total_calls, 0);
        assert_eq!(att.attendance_rate, 0.0);
        assert!(att.by_status.is_empty());
        assert!(att.ranking.is_empty());
    }

    #[test]
    fn presence_ratio_three_of_four() {
        let data = vec![
            rec("Ana", "SiteA", "Presente", 0.0, 0.0),
            rec("Ana", "SiteA", "Presente", 0.0, 0.0),
            rec("Ana", "SiteA", "Presente", 0.0, 0.0),
            rec("Ana", "SiteA", "Ausente", 0.0, 0.0),
            rec("Bia", "SiteA", "Presente", 0.0, 0.0),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let att = attendance(&rows);
        assert_eq!(att.total_calls, 5);
        assert_eq!(att.total_present, 4);
        assert_eq!(att.ranking[0].employee, "Bia");
        assert_eq!(att.ranking[0].presence_ratio, 1.0);
        assert_eq!(att.ranking[0].absents, 0);
        assert_eq!(att.ranking[1].presence_ratio, 0.75);
    }

    #[test]
    fn cross_tab_counts_per_employee_and_status() {
        let data = vec![
            rec("Bia", "SiteA", "Presente", 0.0, 0.0),
            rec("Ana", "SiteA", "Presente", 0.0, 0.0),
            rec("Ana", "SiteA", "Ausente", 0.0, 0.0),
            rec("Ana", "SiteA", "Presente", 0.0, 0.0),
        ];
        let rows: Vec<&Record> = data.iter().collect();
        let att = attendance(&rows);
        let flat: Vec<(&str, &str, usize)> = att
            .by_status
            .iter()
            .map(|s| (s.employee.as_str(), s.status.as_str(), s.days))
            .collect();
        assert_eq!(
            flat,
            vec![("Ana", "Ausente", 1), ("Ana", "Presente", 2), ("Bia", "Presente", 1)]
        );
    }

    #[test]
    fn no_present_rows_means_no_ranking() {
        let data = vec![rec("Ana", "SiteA", "Ausente", 0.0, 0.0)];
        let rows: Vec<&Record> = data.iter().collect();
        let att = attendance(&rows);
        assert!(att.ranking.is_empty());
        assert_eq!(att.by_status.len(), 1);
    }

    #[test]
    fn end_to_end_two_rows() {
        let source = StaticGrid::new(
            &["Colaborador", "Obra", "Status", "Investimento", "Economia", "Funcao", "Turno"],
            &[
                &["Ana", "SiteA", "Presente", "R$ 100,00", "R$ 10,00", "Pedreiro", "Diurno"],
                &["Ana", "SiteA", "Ausente", "", "R$ 10,00", "Pedreiro", "Diurno"],
            ],
        );
        let snap = load_snapshot(&source, "DATA_DASHBOARD");
        let selection = Selection::all(&FilterOptions::from_records(&snap.records));
        let FilterOutcome::Rows(rows) = filter::apply(&snap.records, &selection) else {
            panic!("expected rows");
        };

        let fin = financial(&rows);
        assert_eq!(fin.total_investment, 100.0);
        assert_eq!(fin.total_economy, 20.0);
        assert_eq!(fin.total_combined, 120.0);

        let att = attendance(&rows);
        assert_eq!(att.attendance_rate, 0.5);
        assert_eq!(crate::util::format_percent(att.attendance_rate), "50.0%");
    }
}

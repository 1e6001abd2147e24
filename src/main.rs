// Entry point and interactive menu.
//
// The menu plays the part of the dashboard sidebar:
// - [1] / [2] render the Financial or Attendance panel for the current filters.
// - [3] opens the shift / site / employee filters.
// - [4] drops the cached snapshot so the next panel refetches the sheet.
mod cache;
mod config;
mod error;
mod filter;
mod loader;
mod output;
mod reports;
mod source;
mod types;
mod util;

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cache::TtlCache;
use config::Settings;
use error::LoadError;
use filter::{FilterOptions, FilterOutcome, Selection};
use source::CsvWorkbook;
use types::Snapshot;

#[derive(Debug, Clone, Copy)]
enum Panel {
    Financial,
    Attendance,
}

struct Dashboard {
    settings: Settings,
    cache: TtlCache<Snapshot>,
    options: FilterOptions,
    selection: Selection,
}

/// Open the workbook and load the configured worksheet. Connection failures
/// end up on the snapshot like any other load error.
fn fetch_snapshot(settings: &Settings) -> Snapshot {
    match CsvWorkbook::open(&settings.workbook, &settings.credentials) {
        Ok(book) => {
            info!(account = %book.account().client_email, "connected");
            loader::load_snapshot(&book, &settings.worksheet)
        }
        Err(e) => {
            warn!(error = %e, "connection failed");
            Snapshot::failed(LoadError::from(e))
        }
    }
}

impl Dashboard {
    fn new(settings: Settings) -> Self {
        let cache = TtlCache::new(settings.cache_ttl);
        Dashboard {
            settings,
            cache,
            options: FilterOptions::default(),
            selection: Selection::default(),
        }
    }

    /// Current snapshot, reloading when the cache expired. Filter choices are
    /// carried over to the new data; a failed load leaves them untouched.
    fn snapshot(&mut self) -> Arc<Snapshot> {
        let settings = &self.settings;
        let snap = self.cache.get_or_load(|| fetch_snapshot(settings));
        if snap.error.is_some() {
            return snap;
        }
        let options = FilterOptions::from_records(&snap.records);
        if options != self.options {
            self.selection.reconcile(&self.options, &options);
            self.options = options;
        }
        snap
    }

    fn refresh(&mut self) {
        if let Some(snap) = self.cache.current() {
            let age = chrono::Local::now() - snap.loaded_at;
            info!(age_secs = age.num_seconds(), "dropping cached snapshot");
        }
        self.cache.invalidate();
        println!("Data will be reloaded on the next panel.\n");
    }

    fn show_panel(&mut self, panel: Panel) {
        let snap = self.snapshot();
        if snap.is_empty() {
            println!("{}", output::render_unavailable(&snap));
            return;
        }
        print!("{}", output::render_status_line(&snap));
        print!("{}", output::render_pending(&snap.pending));
        println!();

        match filter::apply(&snap.records, &self.selection) {
            FilterOutcome::NoSelection => println!("{}", output::render_no_selection()),
            FilterOutcome::Rows(rows) => match panel {
                Panel::Financial => println!("{}", output::render_financial(&reports::financial(&rows))),
                Panel::Attendance => {
                    println!("{}", output::render_attendance(&reports::attendance(&rows)))
                }
            },
        }
    }

    fn edit_filters(&mut self) {
        let snap = self.snapshot();
        if snap.is_empty() {
            println!("{}", output::render_unavailable(&snap));
            return;
        }
        loop {
            println!("{}", output::render_filters(&self.options, &self.selection));
            println!("Toggle with s<n> / o<n>, pick an employee with c<n>, empty line to go back.");
            let Some(input) = read_choice() else { return };
            if input.is_empty() {
                println!();
                return;
            }
            if !self.apply_filter_command(&input) {
                println!("Invalid choice: {}\n", input);
            }
        }
    }

    fn apply_filter_command(&mut self, input: &str) -> bool {
        let mut chars = input.chars();
        let Some(kind) = chars.next() else { return false };
        let Ok(n) = chars.as_str().parse::<usize>() else { return false };
        match kind.to_ascii_lowercase() {
            's' => match n.checked_sub(1).and_then(|i| self.options.shifts.get(i)) {
                Some(shift) => self.selection.toggle_shift(shift),
                None => return false,
            },
            'o' => match n.checked_sub(1).and_then(|i| self.options.sites.get(i)) {
                Some(site) => self.selection.toggle_site(site),
                None => return false,
            },
            'c' if n == 0 => self.selection.set_employee(None),
            'c' => match self.options.employees.get(n - 1) {
                Some(name) => self.selection.set_employee(Some(name.clone())),
                None => return false,
            },
            _ => return false,
        }
        true
    }
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// Returns `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let settings = Settings::from_env()?;
    info!(
        workbook = %settings.workbook.display(),
        worksheet = %settings.worksheet,
        ttl_secs = settings.cache_ttl.as_secs(),
        "starting dashboard"
    );
    let mut dashboard = Dashboard::new(settings);

    loop {
        println!("Site Management Dashboard");
        println!("[1] Financial panel");
        println!("[2] Attendance panel");
        println!("[3] Filters");
        println!("[4] Refresh data");
        println!("[0] Exit\n");
        let Some(choice) = read_choice() else { break };
        println!();
        match choice.as_str() {
            "1" => dashboard.show_panel(Panel::Financial),
            "2" => dashboard.show_panel(Panel::Attendance),
            "3" => dashboard.edit_filters(),
            "4" => dashboard.refresh(),
            "0" => break,
            _ => println!("Invalid choice. Please enter 0-4.\n"),
        }
    }
    println!("Exiting the program.");
    Ok(())
}

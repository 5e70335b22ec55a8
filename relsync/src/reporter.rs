use crate::syncer::SyncSummary;
use std::{
    fmt::Debug,
    io::{self, Write},
};
use url::Url;

/// Receives the user-facing progress of a sync. Diagnostics go through the `log` crate instead;
/// this is only for the output a person running the sync wants to see.
pub trait Reporter: Debug + Send {
    fn fetching_manifest(&mut self, url: &Url);
    /// `index` is 1-based.
    fn release_started(&mut self, index: usize, count: usize, name: &str);
    fn release_up_to_date(&mut self, name: &str);
    fn downloading(&mut self, url: &Url);
    /// Called after every block of the archive is written. `total` is the declared content
    /// length, if the server sent a positive one.
    fn archive_progress(&mut self, bytes_read: u64, total: Option<u64>);
    fn archive_finished(&mut self, bytes_read: u64);
    fn all_processed(&mut self, summary: &SyncSummary);
}

/// Prints progress to stdout. The archive counter is rewritten in place with `\r`.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    #[must_use]
    pub fn new() -> Self {
        ConsoleReporter::default()
    }

    /// A reporter that prints nothing at all.
    #[must_use]
    pub fn quiet() -> Self {
        ConsoleReporter { quiet: true }
    }

    fn line(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }
}

impl Reporter for ConsoleReporter {
    fn fetching_manifest(&mut self, url: &Url) {
        self.line(&format!("Fetching JSON data from {url}..."));
    }

    fn release_started(&mut self, index: usize, count: usize, name: &str) {
        self.line(&format!("[{index}/{count}] Processing release {name}..."));
    }

    fn release_up_to_date(&mut self, name: &str) {
        self.line(&format!("  - Release {name} already downloaded and up to date."));
    }

    fn downloading(&mut self, url: &Url) {
        self.line(&format!("  - Downloading {url}..."));
    }

    fn archive_progress(&mut self, bytes_read: u64, total: Option<u64>) {
        if self.quiet {
            return;
        }
        print!("{}\r", progress_line(bytes_read, total));
        // A failed flush only delays the counter until the next line is printed.
        let _ = io::stdout().flush();
    }

    fn archive_finished(&mut self, _bytes_read: u64) {
        self.line("");
    }

    fn all_processed(&mut self, _summary: &SyncSummary) {
        self.line("All releases processed.");
    }
}

pub(crate) fn progress_line(bytes_read: u64, total: Option<u64>) -> String {
    match total.and_then(|t| percent(bytes_read, t).map(|p| (t, p))) {
        Some((total, pct)) => {
            format!("    - Downloaded {bytes_read}/{total} bytes ({pct:.2}%)...")
        }
        None => format!("    - Downloaded {bytes_read} bytes..."),
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn percent(bytes_read: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(bytes_read as f64 * 100.0 / total as f64)
}

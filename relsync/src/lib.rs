//! A library for keeping a local mirror of the releases listed in a JSON manifest.
//!
//! The manifest is a JSON array of release records, each shaped like this:
//!
//! ```json
//! {
//!   "id": 1,
//!   "name": "Logic 2.4.0",
//!   "currentRelease": {
//!     "name": "Logic 2.4.0",
//!     "readmeUrl": "https://example.com/readme",
//!     "downloadUrl": "https://example.com/release.zip"
//!   }
//! }
//! ```
//!
//! For every release, `relsync` creates a folder under the download directory and fills it with
//! a copy of the record (`metadata.json`), the release's README (`README.md`) and its archive
//! (`release.zip`). Releases whose stored `metadata.json` has the same `id` as the manifest entry
//! are skipped, so running a sync repeatedly only downloads what changed.
//!
//! The main entry point for programmatic use is the [`SyncerBuilder`] struct:
//!
//! ```ignore
//! use relsync::SyncerBuilder;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let syncer = SyncerBuilder::new()
//!         .manifest_url("https://example.com/releases.json")
//!         .download_dir("/srv/mirror")
//!         .build()?;
//!
//!     let summary = syncer.sync().await?;
//!     println!("{} downloaded, {} up to date", summary.downloaded, summary.up_to_date);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Folder Naming
//!
//! Folders are named after the release's `currentRelease.name`. The characters
//! `< > : " / \ | ? *` are replaced with `_` and surrounding whitespace is trimmed, so
//! `"A/B:C"` is stored in `A_B_C`. Two releases whose names differ only in those characters end
//! up sharing a folder, and whichever is processed last wins.
//!
//! ## Features
//!
//! This crate offers several features to control the TLS dependency used by `reqwest`:
//!
#![doc = document_features::document_features!()]

mod builder;
mod error;
mod fetcher;
mod folder;
mod manifest;
mod reporter;
mod syncer;

pub use crate::{
    builder::{SyncerBuilder, DEFAULT_MANIFEST_URL},
    error::SyncError,
    folder::folder_name,
    manifest::{CurrentRelease, Release},
    reporter::{ConsoleReporter, Reporter},
    syncer::{SyncSummary, Syncer},
};

// The version of the `relsync` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "logging")]
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};

/// This function initializes logging for the application. It's public for the sake of the
/// `relsync` binary, but it lives in the library crate so that test code can also enable logging.
///
/// # Errors
///
/// This can return a `log::SetLoggerError` error.
#[cfg(feature = "logging")]
pub fn init_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    let line_colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::BrightBlack)
        .debug(Color::BrightBlack)
        .trace(Color::BrightBlack);
    let level_colors = line_colors.info(Color::Green).debug(Color::Black);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{color_line}[{target}][{level}{color_line}] {message}\x1B[0m",
                color_line = format_args!(
                    "\x1B[{}m",
                    line_colors.get_color(&record.level()).to_fg_str()
                ),
                target = record.target(),
                level = level_colors.color(record.level()),
                message = message,
            ));
        })
        .level(level)
        // Both of these are very noisy at debug level.
        .level_for("hyper", log::LevelFilter::Error)
        .level_for("hyper_util", log::LevelFilter::Error)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
}

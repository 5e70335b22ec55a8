use crate::{fetcher::Fetcher, folder::ReleaseFolder, manifest::Release, reporter::Reporter};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use url::Url;

/// `Syncer` is the core of this library. It fetches the manifest and brings every release folder
/// up to date. Use the [`SyncerBuilder`](crate::SyncerBuilder) struct to create a new `Syncer`
/// instance.
#[derive(Debug)]
pub struct Syncer {
    manifest_url: Url,
    download_dir: PathBuf,
    fetcher: Fetcher,
    reporter: Box<dyn Reporter>,
}

/// What a completed sync did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Releases whose metadata, README, and archive were (re)written.
    pub downloaded: usize,
    /// Releases skipped because their stored id matched the manifest.
    pub up_to_date: usize,
}

impl Syncer {
    pub(crate) fn new(
        manifest_url: Url,
        download_dir: PathBuf,
        fetcher: Fetcher,
        reporter: Box<dyn Reporter>,
    ) -> Syncer {
        Syncer {
            manifest_url,
            download_dir,
            fetcher,
            reporter,
        }
    }

    /// The directory that release folders are created in.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Fetch the manifest and sync every release in it, in manifest order. Each release is
    /// finished before the next one starts.
    ///
    /// For each release, a folder named after the sanitized release name is created if needed.
    /// If its `metadata.json` has the same `id` as the manifest entry, nothing else happens.
    /// Otherwise `metadata.json`, `README.md`, and `release.zip` are all rewritten.
    ///
    /// # Errors
    ///
    /// The first failure stops the whole sync. Releases earlier in the manifest keep whatever was
    /// already written for them. Failures include:
    ///
    /// * Network errors, or any response status other than 200.
    /// * A manifest that isn't a JSON array of release records.
    /// * A stored `metadata.json` that can't be parsed or has no `id`.
    /// * A release that needs downloading but whose `readmeUrl` or `downloadUrl` isn't a URL.
    /// * Being unable to create a folder or write a file.
    pub async fn sync(&mut self) -> Result<SyncSummary> {
        self.reporter.fetching_manifest(&self.manifest_url);
        let manifest = self.fetcher.fetch_manifest(&self.manifest_url).await?;
        debug!("manifest lists {} releases", manifest.len());

        fs::create_dir_all(&self.download_dir).with_context(|| {
            format!(
                "failed to create download directory at {}",
                self.download_dir.display()
            )
        })?;

        let mut summary = SyncSummary::default();
        let mut seen = HashSet::new();
        let count = manifest.len();
        for (i, release) in manifest.iter().enumerate() {
            let folder = ReleaseFolder::new(&self.download_dir, release.display_name());
            if !seen.insert(folder.name().to_string()) {
                warn!(
                    "more than one release in the manifest is stored in {}, the last one wins",
                    folder.path().display(),
                );
            }
            folder.ensure_exists()?;
            self.reporter.release_started(i + 1, count, folder.name());

            if folder.is_up_to_date(&release.id)? {
                info!("{} is up to date with id {}", folder.name(), release.id);
                self.reporter.release_up_to_date(folder.name());
                summary.up_to_date += 1;
                continue;
            }

            self.download_release(release, &folder).await?;
            summary.downloaded += 1;
        }

        self.reporter.all_processed(&summary);
        Ok(summary)
    }

    async fn download_release(&mut self, release: &Release, folder: &ReleaseFolder) -> Result<()> {
        folder.write_metadata(release)?;

        let readme_url = release.current_release.readme_url()?;
        let download_url = release.current_release.download_url()?;

        self.reporter.downloading(&readme_url);
        self.fetcher
            .download_file(&readme_url, &folder.readme_path())
            .await?;

        self.reporter.downloading(&download_url);
        let bytes = self
            .fetcher
            .download_archive(&download_url, &folder.archive_path(), self.reporter.as_mut())
            .await?;

        info!(
            "downloaded {} with id {} ({bytes} byte archive)",
            folder.name(),
            release.id,
        );
        Ok(())
    }
}

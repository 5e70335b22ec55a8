/// The `builder` module contains the `SyncerBuilder` struct which is used to create a `Syncer`
/// instance.
use crate::{
    fetcher::Fetcher,
    reporter::{ConsoleReporter, Reporter},
    syncer::Syncer,
};
use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Client,
};
use std::{
    env,
    path::{Path, PathBuf},
};
use url::Url;

/// The manifest that is synced when no other URL is given.
pub const DEFAULT_MANIFEST_URL: &str = "https://logic2api.saleae.com/marketplace/v1/list";

/// `SyncerBuilder` is used to create a [`Syncer`] instance.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct SyncerBuilder<'a> {
    manifest_url: Option<&'a str>,
    download_dir: Option<PathBuf>,
    reporter: Option<Box<dyn Reporter>>,
}

impl<'a> SyncerBuilder<'a> {
    /// Returns a new empty `SyncerBuilder`.
    #[must_use]
    pub fn new() -> Self {
        SyncerBuilder::default()
    }

    /// Set the URL of the JSON manifest to sync. If not set, this is [`DEFAULT_MANIFEST_URL`].
    #[must_use]
    pub fn manifest_url(mut self, url: &'a str) -> Self {
        self.manifest_url = Some(url);
        self
    }

    /// Set the directory that release folders are created in. If not set, it will default to
    /// `./downloads`. The directory is created when the sync runs if it doesn't exist.
    #[must_use]
    pub fn download_dir<P: AsRef<Path>>(mut self, download_dir: P) -> Self {
        self.download_dir = Some(download_dir.as_ref().to_path_buf());
        self
    }

    /// Set where progress output goes. By default this is a [`ConsoleReporter`] that prints to
    /// stdout.
    #[must_use]
    pub fn reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Builds a new [`Syncer`] instance and returns it.
    ///
    /// # Errors
    ///
    /// This returns an error if the manifest URL can't be parsed, if the current directory can't
    /// be determined when no download directory was set, or if the HTTP client can't be created.
    pub fn build(self) -> Result<Syncer> {
        let url = self.manifest_url.unwrap_or(DEFAULT_MANIFEST_URL);
        let manifest_url =
            Url::parse(url).with_context(|| format!("could not parse manifest URL `{url}`"))?;
        let download_dir = download_dir(self.download_dir)?;
        let reporter = self
            .reporter
            .unwrap_or_else(|| Box::new(ConsoleReporter::new()));

        Ok(Syncer::new(
            manifest_url,
            download_dir,
            Fetcher::new(reqwest_client()?),
            reporter,
        ))
    }
}

fn download_dir(download_dir: Option<PathBuf>) -> Result<PathBuf> {
    let download_dir = if let Some(download_dir) = download_dir {
        download_dir
    } else {
        let mut download_dir =
            env::current_dir().context("could not determine the current directory")?;
        download_dir.push("downloads");
        download_dir
    };
    debug!("download dir = {}", download_dir.display());
    Ok(download_dir)
}

fn reqwest_client() -> Result<Client> {
    let builder = Client::builder().gzip(true);

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&format!("relsync version {}", super::VERSION))?,
    );
    Ok(builder.default_headers(headers).build()?)
}

#[cfg(test)]
mod test {
    use super::*;
    use mockito::Server;
    use test_log::test;

    #[test]
    fn defaults() -> Result<()> {
        let syncer = SyncerBuilder::new().build()?;
        assert_eq!(syncer.download_dir(), env::current_dir()?.join("downloads"));
        Ok(())
    }

    #[test]
    fn explicit_download_dir() -> Result<()> {
        let syncer = SyncerBuilder::new().download_dir("/srv/mirror").build()?;
        assert_eq!(syncer.download_dir(), Path::new("/srv/mirror"));
        Ok(())
    }

    #[test]
    fn invalid_manifest_url() {
        let res = SyncerBuilder::new().manifest_url("not a url").build();
        assert!(res.is_err());
    }

    #[test(tokio::test)]
    async fn requests_carry_user_agent() -> Result<()> {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/list")
            .match_header(
                USER_AGENT.as_str(),
                format!("relsync version {}", crate::VERSION).as_str(),
            )
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let td = tempfile::tempdir()?;
        let summary = SyncerBuilder::new()
            .manifest_url(&format!("{}/list", server.url()))
            .download_dir(td.path())
            .reporter(Box::new(ConsoleReporter::quiet()))
            .build()?
            .sync()
            .await?;
        assert_eq!(summary.downloaded + summary.up_to_date, 0);

        m.assert_async().await;

        Ok(())
    }
}

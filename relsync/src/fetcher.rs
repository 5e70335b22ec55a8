use crate::{error::SyncError, manifest::Release, reporter::Reporter};
use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    header::{HeaderValue, ACCEPT},
    Client, Response, StatusCode,
};
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};
use url::Url;

/// Archives are written, and their progress reported, in blocks of at most this many bytes.
pub(crate) const BLOCK_SIZE: usize = 8192;

#[derive(Debug)]
pub(crate) struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub(crate) fn new(client: Client) -> Self {
        Fetcher { client }
    }

    pub(crate) async fn fetch_manifest(&self, url: &Url) -> Result<Vec<Release>> {
        debug!("fetching manifest from {url}");
        let req = self
            .client
            .get(url.clone())
            .header(
                ACCEPT,
                HeaderValue::from_str("application/json")
                    .context("failed to create header value for Accept header")?,
            )
            .build()
            .with_context(|| format!("failed to build HTTP request for {url}"))?;
        let resp = self.execute(req, url).await?;

        resp.json::<Vec<Release>>()
            .await
            .with_context(|| format!("failed to parse the manifest from {url}"))
    }

    /// Downloads the whole body of `url` into `path`, replacing the file if it exists.
    pub(crate) async fn download_file(&self, url: &Url, path: &Path) -> Result<u64> {
        let resp = self.get(url).await?;
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("failed to read response body from {url}"))?;
        fs::write(path, &body).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("wrote {} bytes to {}", body.len(), path.display());

        Ok(u64::try_from(body.len())?)
    }

    /// Streams `url` into `path` in blocks of [`BLOCK_SIZE`] bytes, telling `reporter` about the
    /// running total after each block. Returns the number of bytes written.
    pub(crate) async fn download_archive(
        &self,
        url: &Url,
        path: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<u64> {
        let mut resp = self.get(url).await?;
        let total = resp.content_length().filter(|l| *l > 0);
        debug!(
            "archive content length is {}",
            total.map_or_else(|| "unknown".to_string(), |t| t.to_string()),
        );

        let mut bytes_read: u64 = 0;
        {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create file at {}", path.display()))?;
            while let Some(chunk) = resp
                .chunk()
                .await
                .with_context(|| format!("failed to read chunk while downloading {url}"))?
            {
                for block in chunk.chunks(BLOCK_SIZE) {
                    file.write_all(block)
                        .with_context(|| format!("failed to write chunk to {}", path.display()))?;
                    bytes_read += u64::try_from(block.len())?;
                    reporter.archive_progress(bytes_read, total);
                }
            }
            file.flush()
                .with_context(|| format!("failed to flush {}", path.display()))?;
        }
        reporter.archive_finished(bytes_read);
        debug!("wrote {bytes_read} bytes to {}", path.display());

        Ok(bytes_read)
    }

    async fn get(&self, url: &Url) -> Result<Response> {
        debug!("downloading {url}");
        let req = self
            .client
            .get(url.clone())
            .build()
            .with_context(|| format!("failed to build HTTP request for {url}"))?;
        self.execute(req, url).await
    }

    async fn execute(&self, req: reqwest::Request, url: &Url) -> Result<Response> {
        let resp = self
            .client
            .execute(req)
            .await
            .with_context(|| format!("failed to execute HTTP request to {url}"))?;
        let status = resp.status();
        if status != StatusCode::OK {
            if let Ok(t) = resp.text().await {
                debug!("response body for {url}: {t}");
            }
            return Err(SyncError::HttpStatus {
                url: url.clone(),
                status,
            }
            .into());
        }

        Ok(resp)
    }
}

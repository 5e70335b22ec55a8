use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Conditions that `relsync` detects itself, as opposed to I/O, HTTP transport, or JSON errors
/// that are passed through with added context. All of them abort the sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("error requesting {url}: {status}")]
    HttpStatus { url: Url, status: StatusCode },
    #[error("the stored metadata at {} has no `id` field", path.display())]
    MissingStoredId { path: PathBuf },
    #[error("the release's `{field}` is {value}, not a URL")]
    InvalidUrl { field: &'static str, value: String },
}

use crate::error::SyncError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// One entry in the manifest.
///
/// Fields this crate doesn't use are carried along in `extra` so that writing the record back out
/// as `metadata.json` keeps everything the manifest said about the release.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Release {
    /// An opaque identifier. A new value means the release's content changed. It is compared with
    /// JSON equality, so `1` and `"1"` are different ids.
    pub id: Value,
    pub name: String,
    #[serde(rename = "currentRelease")]
    pub current_release: CurrentRelease,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The downloadable parts of a release.
///
/// The URLs are kept exactly as the manifest wrote them and are only parsed when a release is
/// actually downloaded, so a release that is already up to date never needs valid URLs.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CurrentRelease {
    pub name: String,
    #[serde(
        rename = "readmeUrl",
        default,
        skip_serializing_if = "Value::is_null"
    )]
    pub readme_url: Value,
    #[serde(
        rename = "downloadUrl",
        default,
        skip_serializing_if = "Value::is_null"
    )]
    pub download_url: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Release {
    /// The name the release's folder is derived from.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.current_release.name
    }
}

impl CurrentRelease {
    /// Parses `readmeUrl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing, isn't a string, or isn't an absolute URL.
    pub fn readme_url(&self) -> Result<Url> {
        parse_url("readmeUrl", &self.readme_url)
    }

    /// Parses `downloadUrl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing, isn't a string, or isn't an absolute URL.
    pub fn download_url(&self) -> Result<Url> {
        parse_url("downloadUrl", &self.download_url)
    }
}

fn parse_url(field: &'static str, value: &Value) -> Result<Url> {
    let Value::String(s) = value else {
        return Err(SyncError::InvalidUrl {
            field,
            value: value.to_string(),
        }
        .into());
    };
    Url::parse(s).with_context(|| format!("could not parse {field} `{s}`"))
}

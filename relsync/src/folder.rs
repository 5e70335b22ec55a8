use crate::{error::SyncError, manifest::Release};
use anyhow::{Context, Result};
use lazy_regex::regex;
use log::debug;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};
use std::{
    borrow::Cow,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub(crate) const METADATA_FILE: &str = "metadata.json";
pub(crate) const README_FILE: &str = "README.md";
pub(crate) const ARCHIVE_FILE: &str = "release.zip";

/// Turns a release name into something that's safe to use as a directory name on all the
/// platforms we care about. Each of `< > : " / \ | ? *` becomes `_`, then leading and trailing
/// whitespace is removed.
#[must_use]
pub fn folder_name(release_name: &str) -> String {
    let replaced: Cow<'_, str> = regex!(r#"[<>:"/\\|?*]"#).replace_all(release_name, "_");
    replaced.trim().to_string()
}

/// The on-disk home of one release.
#[derive(Debug)]
pub(crate) struct ReleaseFolder {
    name: String,
    path: PathBuf,
}

impl ReleaseFolder {
    pub(crate) fn new(download_dir: &Path, release_name: &str) -> Self {
        let name = folder_name(release_name);
        let path = download_dir.join(&name);
        ReleaseFolder { name, path }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE)
    }

    pub(crate) fn readme_path(&self) -> PathBuf {
        self.path.join(README_FILE)
    }

    pub(crate) fn archive_path(&self) -> PathBuf {
        self.path.join(ARCHIVE_FILE)
    }

    pub(crate) fn ensure_exists(&self) -> Result<()> {
        if !self.path.exists() {
            debug!("creating release folder at {}", self.path.display());
        }
        fs::create_dir_all(&self.path).with_context(|| {
            format!("failed to create release folder at {}", self.path.display())
        })
    }

    /// Returns true when a `metadata.json` exists in the folder and its `id` equals `id`. A
    /// missing file means the release has never been synced. A file that can't be parsed, or
    /// that has no `id`, is an error.
    pub(crate) fn is_up_to_date(&self, id: &Value) -> Result<bool> {
        let path = self.metadata_path();
        if !path.exists() {
            debug!("no metadata at {}", path.display());
            return Ok(false);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read stored metadata at {}", path.display()))?;
        let stored: Map<String, Value> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse stored metadata at {}", path.display()))?;
        let stored_id = stored
            .get("id")
            .ok_or_else(|| SyncError::MissingStoredId { path: path.clone() })?;

        debug!("stored id is {stored_id}, manifest id is {id}");
        Ok(stored_id == id)
    }

    /// Writes `release` as `metadata.json`, replacing whatever was there. The JSON is indented
    /// with four spaces.
    pub(crate) fn write_metadata(&self, release: &Release) -> Result<()> {
        let path = self.metadata_path();
        debug!("writing metadata to {}", path.display());

        let file = File::create(&path)
            .with_context(|| format!("failed to create metadata file at {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let mut ser = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        release
            .serialize(&mut ser)
            .with_context(|| format!("failed to serialize metadata to {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("failed to write metadata to {}", path.display()))
    }
}

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::AppError;

// @module: File and directory utilities

/// Hosts whose URLs can be turned into result directory names
pub const SUPPORTED_DOMAINS: [&str; 2] = ["youtube.com", "youtu.be"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }
}

/// Turn a channel/playlist/video URL into a directory name.
///
/// Everything after the host (path and query) is kept, with `/` replaced by `_`.
pub fn url_to_dir(url: &str) -> Result<String, AppError> {
    let unsupported = || AppError::UnsupportedUrl {
        url: url.to_string(),
        domains: SUPPORTED_DOMAINS.join(", "),
    };

    let parsed = Url::parse(url)
        .or_else(|_| Url::parse(&format!("https://{}", url)))
        .map_err(|_| unsupported())?;

    let host = parsed.host_str().ok_or_else(unsupported)?;
    let supported = SUPPORTED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));
    if !supported {
        return Err(unsupported());
    }

    let mut after = parsed.path().trim_matches('/').to_string();
    if let Some(query) = parsed.query() {
        after.push('?');
        after.push_str(query);
    }
    if after.is_empty() {
        return Err(unsupported());
    }

    Ok(after.replace('/', "_"))
}

/// Where one run keeps its files
#[derive(Debug, Clone, PartialEq)]
pub struct ResultLayout {
    pub root: PathBuf,
}

impl ResultLayout {
    pub fn new<P: AsRef<Path>>(output_dir: P, url: &str) -> Result<Self, AppError> {
        Ok(Self {
            root: output_dir.as_ref().join(url_to_dir(url)?),
        })
    }

    pub fn subtitle_dir(&self) -> PathBuf {
        self.root.join("subtitles")
    }

    pub fn video_dir(&self) -> PathBuf {
        self.root.join("videos")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join("keyword_scan.json")
    }

    pub fn edl_path(&self) -> PathBuf {
        self.root.join("supercut.edl")
    }
}

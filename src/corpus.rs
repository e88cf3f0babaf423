use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::keyword_matcher::KeywordHit;

// @module: Scanned videos and their pipeline snapshot

/// One source video and every keyword hit found in its captions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video identifier
    pub id: String,

    /// Caption track the hits came from
    pub subtitle_path: PathBuf,

    /// Downloaded media file, empty until acquired
    #[serde(default)]
    pub media_path: PathBuf,

    /// Frame rate of the media file, zero until probed
    #[serde(default)]
    pub frame_rate: f64,

    /// Hits in caption order, never empty
    pub hits: Vec<KeywordHit>,
}

impl VideoRecord {
    pub fn new(id: impl Into<String>, subtitle_path: impl Into<PathBuf>, hits: Vec<KeywordHit>) -> Self {
        Self {
            id: id.into(),
            subtitle_path: subtitle_path.into(),
            media_path: PathBuf::new(),
            frame_rate: 0.0,
            hits,
        }
    }

    // @returns: Copy with the media path resolved
    pub fn with_media_path(&self, media_path: impl Into<PathBuf>) -> Self {
        Self {
            media_path: media_path.into(),
            ..self.clone()
        }
    }

    // @returns: Copy with the frame rate resolved
    pub fn with_frame_rate(&self, frame_rate: f64) -> Self {
        Self {
            frame_rate,
            ..self.clone()
        }
    }

    pub fn has_media(&self) -> bool {
        !self.media_path.as_os_str().is_empty()
    }

    /// File name of the media, used as the EDL clip name
    pub fn clip_name(&self) -> String {
        self.media_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// How far a corpus has travelled through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    #[default]
    Scanned,
    Downloaded,
    Probed,
}

/// Ordered collection of video records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub stage: PipelineStage,
    /// Keywords the captions were scanned for
    #[serde(default)]
    pub keywords: Vec<String>,
    pub videos: Vec<VideoRecord>,
}

impl Corpus {
    pub fn new(videos: Vec<VideoRecord>) -> Self {
        Self {
            stage: PipelineStage::Scanned,
            keywords: Vec::new(),
            videos,
        }
    }

    /// Replace the records and advance the stage, leaving `self` untouched
    pub fn advance(&self, stage: PipelineStage, videos: Vec<VideoRecord>) -> Self {
        Self {
            stage,
            keywords: self.keywords.clone(),
            videos,
        }
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn hit_count(&self) -> usize {
        self.videos.iter().map(|v| v.hits.len()).sum()
    }

    /// Sort records by video id; stable, so equal ids keep scan order
    pub fn sort_by_id(&mut self) {
        self.videos.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// Frame rates with the number of videos using each, most common first
    pub fn frame_rate_summary(&self) -> Vec<(f64, usize)> {
        let mut counts: Vec<(f64, usize)> = Vec::new();
        for video in &self.videos {
            match counts.iter_mut().find(|(fps, _)| fps.to_bits() == video.frame_rate.to_bits()) {
                Some((_, count)) => *count += 1,
                None => counts.push((video.frame_rate, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Write the corpus as JSON, replacing any previous snapshot atomically
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let json = serde_json::to_string_pretty(self).context("Failed to serialize corpus")?;
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        file.write_all(json.as_bytes())?;
        file.persist(path)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;

        debug!("Saved {} videos ({:?}) to {}", self.len(), self.stage, path.display());
        Ok(())
    }

    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open snapshot: {}", path.display()))?;
        let corpus: Corpus = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        Ok(corpus)
    }
}

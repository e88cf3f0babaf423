use std::path::Path;
use log::{debug, info};
use walkdir::WalkDir;

use crate::corpus::{Corpus, VideoRecord};
use crate::errors::AppError;
use crate::keyword_matcher::{find_keywords, KeywordHit, KeywordSet};
use crate::subtitle_processor::SubtitleTrack;

// @module: Keyword scan over a directory of caption tracks

/// Extension of the caption files the scanner reads
pub const SUBTITLE_EXTENSION: &str = "vtt";

/// Video id encoded in a downloaded file name (`<id>=<title>.<ext>`)
pub fn video_id_from_file_name(file_name: &str) -> &str {
    file_name.split('=').next().unwrap_or(file_name)
}

/// Collect every hit in a single caption file
pub fn scan_track<P: AsRef<Path>>(path: P, keywords: &KeywordSet) -> Result<Vec<KeywordHit>, AppError> {
    let track = SubtitleTrack::from_file(path)?;
    Ok(find_keywords(&track.cues, keywords).collect())
}

/// Scan every caption file directly inside `dir`.
///
/// Videos without hits are left out. Records come back in directory
/// enumeration order; callers wanting stable output sort the corpus.
pub fn scan_directory<P: AsRef<Path>>(dir: P, keywords: &KeywordSet) -> Result<Corpus, AppError> {
    let dir = dir.as_ref();
    let mut videos = Vec::new();
    let mut scanned = 0usize;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| AppError::File(format!("Failed to read {}: {}", dir.display(), e)))?;
        let path = entry.path();

        let is_caption = entry.file_type().is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SUBTITLE_EXTENSION));
        if !is_caption {
            debug!("Skipping non-caption entry {:?}", path);
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let video_id = video_id_from_file_name(&file_name);
        let hits = scan_track(path, keywords)?;
        scanned += 1;

        if hits.is_empty() {
            debug!("No keyword hits in {}", video_id);
            continue;
        }

        debug!("{} hits in {}", hits.len(), video_id);
        videos.push(VideoRecord::new(video_id, path, hits));
    }

    info!("Scanned {} caption files, {} with keyword hits", scanned, videos.len());
    Ok(Corpus::new(videos))
}

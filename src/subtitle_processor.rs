use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, warn};
use crate::errors::SubtitleError;

// @module: WebVTT caption track parsing

// @const: WebVTT cue timing line
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:\d+:)?\d{2}:\d{2}\.\d{3})\s+-->\s+((?:\d+:)?\d{2}:\d{2}\.\d{3})(?:\s+.*)?$").unwrap()
});

// @const: Inline cue tags such as <c>, <b> and karaoke timestamps
static CUE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").unwrap()
});

// @struct: Single caption cue
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    // @field: Plain text payload, lines joined with '\n'
    pub text: String,

    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,
}

impl Cue {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Cue {
            text: text.into(),
            start,
            end,
        }
    }

    /// Parse a WebVTT timestamp (`HH:MM:SS.mmm` or `MM:SS.mmm`) to seconds
    pub fn parse_timestamp(timestamp: &str) -> Option<f64> {
        let parts: Vec<&str> = timestamp.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, *s),
            [m, s] => (0, m.parse::<u64>().ok()?, *s),
            _ => return None,
        };

        let (whole, millis) = seconds.split_once('.')?;
        let whole: u64 = whole.parse().ok()?;
        let millis: u64 = millis.parse().ok()?;

        if minutes >= 60 || whole >= 60 || millis >= 1000 {
            return None;
        }

        let total_ms = hours
            .checked_mul(3600)?
            .checked_add(minutes * 60 + whole)?
            .checked_mul(1000)?
            .checked_add(millis)?;
        Some(total_ms as f64 / 1000.0)
    }

    /// Format seconds as a WebVTT timestamp (HH:MM:SS.mmm)
    pub fn format_timestamp(seconds: f64) -> String {
        let ms = (seconds * 1000.0).round() as u64;
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let secs = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", Self::format_timestamp(self.start), Self::format_timestamp(self.end))?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// A caption track read from disk
#[derive(Debug)]
pub struct SubtitleTrack {
    /// Source filename
    pub source_file: PathBuf,

    /// Cues in file order
    pub cues: Vec<Cue>,
}

impl SubtitleTrack {
    /// Read and parse a WebVTT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SubtitleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let cues = parse_vtt_string(&content).map_err(|e| match e {
            SubtitleError::MissingHeader(_) => SubtitleError::MissingHeader(path.display().to_string()),
            other => other,
        })?;
        debug!("Parsed {} cues from {:?}", cues.len(), path);

        Ok(SubtitleTrack {
            source_file: path.to_path_buf(),
            cues,
        })
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "WEBVTT")?;
        writeln!(f)?;
        for cue in &self.cues {
            write!(f, "{}", cue)?;
        }
        Ok(())
    }
}

/// Parse WebVTT content into cues, keeping file order.
///
/// Comment, style and region blocks are skipped. Inline tags are removed from
/// the payload and the basic HTML entities are decoded.
pub fn parse_vtt_string(content: &str) -> Result<Vec<Cue>, SubtitleError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines: Vec<&str> = content.lines().map(|l| l.trim_end_matches('\r')).collect();

    if !lines.first().is_some_and(|l| l.starts_with("WEBVTT")) {
        return Err(SubtitleError::MissingHeader("<string>".to_string()));
    }

    // Split into blocks of (line number, text); the first block is the header
    let mut blocks: Vec<Vec<(usize, &str)>> = Vec::new();
    let mut current: Vec<(usize, &str)> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push((idx + 1, line));
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    let mut cues = Vec::new();
    for block in blocks.into_iter().skip(1) {
        let first = block[0].1;
        if first == "NOTE" || first.starts_with("NOTE ") || first.starts_with("NOTE\t")
            || first.starts_with("STYLE") || first.starts_with("REGION") {
            continue;
        }

        let timing_idx = if first.contains("-->") {
            0
        } else if block.len() > 1 && block[1].1.contains("-->") {
            1
        } else {
            return Err(SubtitleError::MalformedCue {
                line: block[0].0,
                reason: "missing cue timing line".to_string(),
            });
        };

        let (line_no, timing) = block[timing_idx];
        let (start, end) = parse_timing_line(timing.trim()).ok_or_else(|| SubtitleError::MalformedCue {
            line: line_no,
            reason: format!("invalid timing: {}", timing.trim()),
        })?;

        if end < start {
            return Err(SubtitleError::MalformedCue {
                line: line_no,
                reason: format!("end {} before start {}", end, start),
            });
        }

        let text = block[timing_idx + 1..]
            .iter()
            .map(|(_, line)| clean_payload_line(line))
            .collect::<Vec<_>>()
            .join("\n");

        cues.push(Cue::new(text, start, end));
    }

    if cues.is_empty() {
        warn!("No cues found in caption content");
    }

    Ok(cues)
}

fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let caps = TIMING_REGEX.captures(line)?;
    let start = Cue::parse_timestamp(caps.get(1)?.as_str())?;
    let end = Cue::parse_timestamp(caps.get(2)?.as_str())?;
    Some((start, end))
}

fn clean_payload_line(line: &str) -> String {
    CUE_TAG_REGEX
        .replace_all(line, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

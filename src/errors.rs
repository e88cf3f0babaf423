/*!
 * Error types for the supercut application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a caption track
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The file does not start with the WEBVTT signature
    #[error("Missing WEBVTT header in {0}")]
    MissingHeader(String),

    /// A cue block could not be parsed
    #[error("Malformed cue at line {line}: {reason}")]
    MalformedCue {
        /// 1-based line number of the offending line
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// The caption file could not be read
    #[error("Failed to read caption file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while synthesizing an edit decision list
#[derive(Error, Debug, PartialEq)]
pub enum EdlError {
    /// The CMX-style sequence number field only holds three digits
    #[error("EDL format only supports {limit} edits")]
    FormatLimitExceeded {
        /// Maximum number of edits the format can carry
        limit: usize,
    },

    /// The frame rate of a video is unresolved or implausible
    #[error("Invalid frame rate {frame_rate} for video {video_id}")]
    InvalidFrameRate {
        video_id: String,
        frame_rate: f64,
    },
}

/// Errors from the external acquisition and probing tools
#[derive(Error, Debug)]
pub enum MediaError {
    /// The tool could not be started at all
    #[error("Failed to execute {program}: {message}")]
    SpawnFailed { program: String, message: String },

    /// The tool exited with a non-zero status
    #[error("{program} failed: {stderr}")]
    CommandFailed { program: String, stderr: String },

    /// The tool did not finish in time
    #[error("{program} timed out after {secs} seconds")]
    Timeout { program: String, secs: u64 },

    /// The tool output could not be understood
    #[error("Unexpected output from {program}: {message}")]
    UnexpectedOutput { program: String, message: String },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error reading a caption track
    #[error(transparent)]
    Subtitle(#[from] SubtitleError),

    /// Error building the edit list
    #[error(transparent)]
    Edl(#[from] EdlError),

    /// Error from an external tool
    #[error(transparent)]
    Media(#[from] MediaError),

    /// The source URL is not one we know how to lay out on disk
    #[error("URL domain not in [{domains}]: {url}")]
    UnsupportedUrl { url: String, domains: String },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

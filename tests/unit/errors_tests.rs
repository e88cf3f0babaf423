/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use supercut::errors::{AppError, EdlError, MediaError, SubtitleError};

/// Test the EDL error messages
#[test]
fn test_edl_error_display_shouldDescribeProblem() {
    assert_eq!(
        EdlError::FormatLimitExceeded { limit: 999 }.to_string(),
        "EDL format only supports 999 edits"
    );
    assert_eq!(
        EdlError::InvalidFrameRate {
            video_id: "abc".to_string(),
            frame_rate: 0.0,
        }
        .to_string(),
        "Invalid frame rate 0 for video abc"
    );
}

/// Test that component errors pass through unchanged
#[test]
fn test_app_error_fromComponentErrors_shouldKeepInnerMessage() {
    let error: AppError = EdlError::FormatLimitExceeded { limit: 999 }.into();
    assert_eq!(error.to_string(), "EDL format only supports 999 edits");

    let error: AppError = SubtitleError::MalformedCue {
        line: 7,
        reason: "missing timing line".to_string(),
    }
    .into();
    assert_eq!(
        error.to_string(),
        "Malformed cue at line 7: missing timing line"
    );

    let error: AppError = MediaError::Timeout {
        program: "ffprobe".to_string(),
        secs: 60,
    }
    .into();
    assert_eq!(error.to_string(), "ffprobe timed out after 60 seconds");
}

/// Test that a context chain names a tool failure only once
#[test]
fn test_app_error_inContextChain_shouldNotRepeatInnerMessage() {
    let error: AppError = MediaError::CommandFailed {
        program: "yt-dlp".to_string(),
        stderr: "ERROR: Private video".to_string(),
    }
    .into();

    let chain = format!("{:#}", anyhow::Error::new(error).context("Failed to download video abc"));

    assert_eq!(chain, "Failed to download video abc: yt-dlp failed: ERROR: Private video");
}

/// Test the io and anyhow conversions
#[test]
fn test_app_error_fromIoAndAnyhow_shouldMapToFileAndUnknown() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(ref message) if message == "gone"));

    let error: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(error.to_string(), "Unknown error: boom");
}

/// Test that subtitle read errors keep their source
#[test]
fn test_subtitle_io_error_shouldExposeSource() {
    use std::error::Error;

    let error = SubtitleError::Io {
        path: PathBuf::from("a.vtt"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };

    assert!(error.source().is_some());
    assert!(error.to_string().contains("a.vtt"));
    assert_eq!(
        SubtitleError::MissingHeader("a.vtt".to_string()).to_string(),
        "Missing WEBVTT header in a.vtt"
    );
}

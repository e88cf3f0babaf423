/*!
 * Acquisition and probing of source media.
 *
 * Thin wrappers around the external downloader (yt-dlp or youtube-dl) and
 * ffprobe. Each call runs one process to completion with a timeout; the
 * results come back as new `VideoRecord` values.
 */

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use log::{debug, warn};
use serde_json::Value;
use tokio::process::Command;

use crate::app_config::{DownloaderConfig, ProbeConfig};
use crate::corpus::VideoRecord;
use crate::errors::{AppError, EdlError, MediaError};

/// Exit code yt-dlp and youtube-dl use when `--max-downloads` was reached
const MAX_DOWNLOADS_REACHED: i32 = 101;

/// Run a tool to completion, failing if it takes longer than `timeout_secs`
async fn run_tool(program: &str, args: &[String], timeout_secs: u64) -> Result<Output, MediaError> {
    debug!("Running {} {}", program, args.join(" "));

    let future = Command::new(program).args(args).kill_on_drop(true).output();
    tokio::select! {
        result = future => result.map_err(|e| MediaError::SpawnFailed {
            program: program.to_string(),
            message: e.to_string(),
        }),
        _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => Err(MediaError::Timeout {
            program: program.to_string(),
            secs: timeout_secs,
        }),
    }
}

/// Keep the tail of a tool's stderr, which is where the actual error lives
fn filter_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let meaningful: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if meaningful.is_empty() {
        return "no error output".to_string();
    }
    let start = meaningful.len().saturating_sub(5);
    meaningful[start..].join("\n")
}

/// Downloads caption tracks and videos with yt-dlp/youtube-dl
pub struct Downloader {
    config: DownloaderConfig,
}

impl Downloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    fn output_template(&self, dir: &Path) -> String {
        dir.join(&self.config.file_template).to_string_lossy().to_string()
    }

    /// Arguments for fetching every subtitle track behind `url` without the media
    pub fn subtitle_args(&self, url: &str, dir: &Path) -> Vec<String> {
        let mut args = vec![
            "--skip-download".to_string(),
            "--write-sub".to_string(),
            "--write-auto-sub".to_string(),
            "--sub-format".to_string(),
            "vtt".to_string(),
            "--restrict-filenames".to_string(),
            "-o".to_string(),
            self.output_template(dir),
        ];
        if self.config.max_videos > 0 {
            args.push("--max-downloads".to_string());
            args.push(self.config.max_videos.to_string());
        }
        args.push(url.to_string());
        args
    }

    /// Arguments for fetching one video and printing its info JSON
    pub fn video_args(&self, video_id: &str, dir: &Path) -> Vec<String> {
        vec![
            "-o".to_string(),
            self.output_template(dir),
            "--restrict-filenames".to_string(),
            "--print-json".to_string(),
            "--sleep-interval".to_string(),
            self.config.sleep_interval_secs.to_string(),
            "--max-sleep-interval".to_string(),
            self.config.max_sleep_interval_secs.to_string(),
            "-f".to_string(),
            self.config.video_format.clone(),
            // ids may start with '-'
            "--".to_string(),
            video_id.to_string(),
        ]
    }

    pub async fn download_subtitles(&self, url: &str, dir: &Path) -> Result<(), AppError> {
        std::fs::create_dir_all(dir)?;
        if self.config.max_videos > 0 {
            debug!("Limiting to {} videos", self.config.max_videos);
        }

        let args = self.subtitle_args(url, dir);
        let output = run_tool(&self.config.program, &args, self.config.timeout_secs).await?;

        if !output.status.success() {
            if self.config.max_videos > 0 && output.status.code() == Some(MAX_DOWNLOADS_REACHED) {
                debug!("Download limit of {} reached", self.config.max_videos);
                return Ok(());
            }
            // Unavailable entries make the downloader exit non-zero after fetching the rest
            warn!(
                "{} exited with {}, scanning what was downloaded: {}",
                self.config.program,
                output.status,
                filter_stderr(&output.stderr)
            );
        }
        Ok(())
    }

    /// Download the media for `record`, returning a copy with `media_path` set
    pub async fn download_video(&self, record: &VideoRecord, dir: &Path) -> Result<VideoRecord, AppError> {
        std::fs::create_dir_all(dir)?;

        let args = self.video_args(&record.id, dir);
        let output = run_tool(&self.config.program, &args, self.config.timeout_secs).await?;

        if !output.status.success() {
            return Err(MediaError::CommandFailed {
                program: self.config.program.clone(),
                stderr: filter_stderr(&output.stderr),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let media_path = media_path_from_info_json(&stdout).map_err(|message| MediaError::UnexpectedOutput {
            program: self.config.program.clone(),
            message,
        })?;
        Ok(record.with_media_path(media_path))
    }
}

/// Pull the written file name out of the downloader's `--print-json` output.
///
/// The info dictionary is the last JSON line; yt-dlp names the key
/// `_filename`, newer builds also write `filename`.
pub fn media_path_from_info_json(stdout: &str) -> Result<PathBuf, String> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| line.trim_start().starts_with('{'))
        .ok_or_else(|| "no info JSON in output".to_string())?;

    let info: Value = serde_json::from_str(line).map_err(|e| format!("invalid info JSON: {}", e))?;
    info.get("_filename")
        .or_else(|| info.get("filename"))
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .ok_or_else(|| "info JSON has no file name".to_string())
}

/// Reads video frame rates with ffprobe
pub struct FrameRateProbe {
    config: ProbeConfig,
}

impl FrameRateProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub async fn read_frame_rate(&self, media_path: &Path) -> Result<f64, MediaError> {
        let args = vec![
            media_path.to_string_lossy().to_string(),
            "-v".to_string(),
            "0".to_string(),
            "-select_streams".to_string(),
            "v".to_string(),
            "-print_format".to_string(),
            "flat".to_string(),
            "-show_entries".to_string(),
            "stream=r_frame_rate".to_string(),
        ];
        let output = run_tool(&self.config.program, &args, self.config.timeout_secs).await?;

        if !output.status.success() {
            return Err(MediaError::CommandFailed {
                program: self.config.program.clone(),
                stderr: filter_stderr(&output.stderr),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_flat_frame_rate(&stdout).ok_or_else(|| MediaError::UnexpectedOutput {
            program: self.config.program.clone(),
            message: format!("no frame rate in: {}", stdout.trim()),
        })
    }

    /// Probe `record`'s media, returning a copy with `frame_rate` set.
    ///
    /// Rates at or below the configured minimum are rejected.
    pub async fn probe(&self, record: &VideoRecord) -> Result<VideoRecord, AppError> {
        if !record.has_media() {
            warn!("Video {} has no media file to probe", record.id);
        }
        let frame_rate = self.read_frame_rate(&record.media_path).await?;
        check_frame_rate(&record.id, frame_rate, self.config.min_frame_rate)?;
        Ok(record.with_frame_rate(frame_rate))
    }
}

/// Reject unresolved or implausibly low frame rates
pub fn check_frame_rate(video_id: &str, frame_rate: f64, min_frame_rate: f64) -> Result<(), EdlError> {
    if !frame_rate.is_finite() || frame_rate <= 0.0 || frame_rate <= min_frame_rate {
        return Err(EdlError::InvalidFrameRate {
            video_id: video_id.to_string(),
            frame_rate,
        });
    }
    Ok(())
}

/// Parse `streams.stream.0.r_frame_rate="30000/1001"` style ffprobe output
pub fn parse_flat_frame_rate(output: &str) -> Option<f64> {
    let value = output.split('"').nth(1)?;
    let parts: Vec<&str> = value.split('/').collect();
    match parts.as_slice() {
        [rate] => rate.trim().parse().ok(),
        [num, den] => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        _ => None,
    }
}

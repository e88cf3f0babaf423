use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory under which one result directory per source URL is created
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Title written into the EDL header
    #[serde(default = "default_edl_title")]
    pub edl_title: String,

    /// Sort scanned videos by id so repeated runs produce identical lists
    #[serde(default = "default_true")]
    pub sort_by_id: bool,

    /// Video/subtitle downloader settings
    #[serde(default)]
    pub downloader: DownloaderConfig,

    /// Frame rate probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for the external downloader (yt-dlp or youtube-dl)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DownloaderConfig {
    // @field: Downloader executable
    #[serde(default = "default_downloader_program")]
    pub program: String,

    // @field: Output file template; must start with the video id followed by '='
    #[serde(default = "default_file_template")]
    pub file_template: String,

    // @field: Format selector for video downloads
    #[serde(default = "default_video_format")]
    pub video_format: String,

    // @field: Minimum pause between video downloads
    #[serde(default = "default_sleep_interval_secs")]
    pub sleep_interval_secs: u64,

    // @field: Maximum pause between video downloads
    #[serde(default = "default_max_sleep_interval_secs")]
    pub max_sleep_interval_secs: u64,

    // @field: Limit on videos whose subtitles are fetched (0 = no limit)
    #[serde(default)]
    pub max_videos: usize,

    // @field: Timeout per downloader invocation
    #[serde(default = "default_download_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: default_downloader_program(),
            file_template: default_file_template(),
            video_format: default_video_format(),
            sleep_interval_secs: default_sleep_interval_secs(),
            max_sleep_interval_secs: default_max_sleep_interval_secs(),
            max_videos: 0,
            timeout_secs: default_download_timeout_secs(),
        }
    }
}

/// Settings for the ffprobe frame rate lookup
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProbeConfig {
    /// ffprobe executable
    #[serde(default = "default_probe_program")]
    pub program: String,

    /// Frame rates at or below this are rejected as implausible
    #[serde(default = "default_min_frame_rate")]
    pub min_frame_rate: f64,

    /// Timeout per probe in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: default_probe_program(),
            min_frame_rate: default_min_frame_rate(),
            timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_output_dir() -> String {
    "./".to_string()
}

fn default_edl_title() -> String {
    "Supercut".to_string()
}

fn default_true() -> bool {
    true
}

fn default_downloader_program() -> String {
    "yt-dlp".to_string()
}

fn default_file_template() -> String {
    "%(id)s=%(title)s.%(ext)s".to_string()
}

fn default_video_format() -> String {
    // Keep bandwidth down; the edit only needs preview quality
    "best[height<=720][fps<=?30]".to_string()
}

fn default_sleep_interval_secs() -> u64 {
    10
}

fn default_max_sleep_interval_secs() -> u64 {
    100
}

fn default_download_timeout_secs() -> u64 {
    3600
}

fn default_probe_program() -> String {
    "ffprobe".to_string()
}

fn default_min_frame_rate() -> f64 {
    20.0
}

fn default_probe_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.edl_title.trim().is_empty() || self.edl_title.contains('\n') {
            return Err(anyhow!("EDL title must be a single non-empty line"));
        }

        if self.downloader.program.trim().is_empty() {
            return Err(anyhow!("Downloader program is required"));
        }

        // The scanner recovers the video id from the text before the first '='
        if !self.downloader.file_template.starts_with("%(id)s=") {
            return Err(anyhow!(
                "Downloader file template must start with '%(id)s=': {}",
                self.downloader.file_template
            ));
        }

        if self.downloader.max_sleep_interval_secs < self.downloader.sleep_interval_secs {
            return Err(anyhow!(
                "max_sleep_interval_secs ({}) is lower than sleep_interval_secs ({})",
                self.downloader.max_sleep_interval_secs,
                self.downloader.sleep_interval_secs
            ));
        }

        if self.probe.program.trim().is_empty() {
            return Err(anyhow!("Probe program is required"));
        }

        if !self.probe.min_frame_rate.is_finite() || self.probe.min_frame_rate < 0.0 {
            return Err(anyhow!("Invalid minimum frame rate: {}", self.probe.min_frame_rate));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            edl_title: default_edl_title(),
            sort_by_id: true,
            downloader: DownloaderConfig::default(),
            probe: ProbeConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

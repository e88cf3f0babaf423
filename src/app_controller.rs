use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::corpus::{Corpus, PipelineStage};
use crate::edl::{write_edl_file, EditDecisionList};
use crate::file_utils::{FileManager, ResultLayout};
use crate::keyword_matcher::KeywordSet;
use crate::media::{Downloader, FrameRateProbe};
use crate::scanner;

// @module: Application controller for supercut generation

/// Main application controller: subtitles → scan → videos → frame rates → EDL
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline for `url`, returning the written EDL path.
    ///
    /// A snapshot left by an earlier run for the same keywords is picked up
    /// and finished stages are skipped, unless `force` is set.
    pub async fn run(&self, url: &str, keywords: &KeywordSet, force: bool) -> Result<PathBuf> {
        let start_time = std::time::Instant::now();
        let layout = ResultLayout::new(&self.config.output_dir, url)?;
        FileManager::ensure_dir(&layout.root)?;

        let mut corpus = match self.resume(&layout, keywords, force)? {
            Some(corpus) => corpus,
            None => {
                info!("Downloading subtitle files from {}", url);
                Downloader::new(self.config.downloader.clone())
                    .download_subtitles(url, &layout.subtitle_dir())
                    .await?;

                let corpus = self.scan(&layout.subtitle_dir(), keywords)?;
                corpus.save_snapshot(layout.snapshot_path())?;
                corpus
            }
        };

        if corpus.stage < PipelineStage::Downloaded {
            info!("Downloading {} videos with keyword hits", corpus.len());
            corpus = self.acquire(&corpus, &layout.video_dir()).await?;
            corpus.save_snapshot(layout.snapshot_path())?;
        }

        if corpus.stage < PipelineStage::Probed {
            corpus = self.probe(&corpus).await?;
            corpus.save_snapshot(layout.snapshot_path())?;
        }

        let edl_path = layout.edl_path();
        self.write_edl(&corpus, &edl_path)?;
        self.report_frame_rates(&corpus);

        info!("Supercut list complete in {}", Self::format_duration(start_time.elapsed()));
        Ok(edl_path)
    }

    fn resume(&self, layout: &ResultLayout, keywords: &KeywordSet, force: bool) -> Result<Option<Corpus>> {
        let snapshot = layout.snapshot_path();
        if force || !FileManager::file_exists(&snapshot) {
            return Ok(None);
        }

        let corpus = Corpus::load_snapshot(&snapshot)?;
        let wanted: Vec<String> = keywords.iter().map(str::to_string).collect();
        if corpus.keywords != wanted {
            warn!("Snapshot was made for different keywords, rescanning");
            return Ok(None);
        }

        info!("Resuming from snapshot ({:?}, {} videos)", corpus.stage, corpus.len());
        Ok(Some(corpus))
    }

    /// Scan a caption directory, sorting by id when configured
    pub fn scan(&self, subtitle_dir: &Path, keywords: &KeywordSet) -> Result<Corpus> {
        info!("Searching subtitle files for: {}", keywords.iter().collect::<Vec<_>>().join(", "));

        let mut corpus = scanner::scan_directory(subtitle_dir, keywords)
            .with_context(|| format!("Failed to scan {}", subtitle_dir.display()))?;
        if self.config.sort_by_id {
            corpus.sort_by_id();
        }
        corpus.keywords = keywords.iter().map(str::to_string).collect();

        info!("Subtitle scan complete: {} hits in {} videos", corpus.hit_count(), corpus.len());
        Ok(corpus)
    }

    /// Download the media of every video, one at a time
    pub async fn acquire(&self, corpus: &Corpus, video_dir: &Path) -> Result<Corpus> {
        let downloader = Downloader::new(self.config.downloader.clone());
        let progress = Self::progress_bar(corpus.len(), "videos");

        let mut videos = Vec::with_capacity(corpus.len());
        for video in &corpus.videos {
            progress.set_message(video.id.clone());
            let downloaded = downloader
                .download_video(video, video_dir)
                .await
                .with_context(|| format!("Failed to download video {}", video.id))?;
            videos.push(downloaded);
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(corpus.advance(PipelineStage::Downloaded, videos))
    }

    /// Read the frame rate of every downloaded video
    pub async fn probe(&self, corpus: &Corpus) -> Result<Corpus> {
        let probe = FrameRateProbe::new(self.config.probe.clone());
        let progress = Self::progress_bar(corpus.len(), "probed");

        let mut videos = Vec::with_capacity(corpus.len());
        for video in &corpus.videos {
            progress.set_message(video.id.clone());
            let probed = probe
                .probe(video)
                .await
                .with_context(|| format!("Failed to read frame rate of {}", video.id))?;
            videos.push(probed);
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(corpus.advance(PipelineStage::Probed, videos))
    }

    pub fn write_edl(&self, corpus: &Corpus, path: &Path) -> Result<EditDecisionList> {
        info!("Generating edit decision list {}", path.display());
        write_edl_file(corpus, &self.config.edl_title, path)
    }

    fn report_frame_rates(&self, corpus: &Corpus) {
        for (fps, count) in corpus.frame_rate_summary() {
            info!("{:.2} frames per second: {} videos", fps, count);
        }
    }

    fn progress_bar(len: usize, unit: &str) -> ProgressBar {
        let progress_bar = ProgressBar::new(len as u64);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::time::Duration;
use tokio_test;
use supercut::app_config::Config;
use supercut::app_controller::Controller;
use supercut::corpus::{Corpus, PipelineStage};
use supercut::errors::AppError;
use supercut::file_utils::ResultLayout;
use supercut::keyword_matcher::KeywordSet;
use crate::common;

const VIDEO_URL: &str = "https://youtu.be/abc123";

/// Config that writes under `output_dir` and can never reach the network
fn offline_config(output_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.output_dir = output_dir.to_string_lossy().to_string();
    config.downloader.program = "supercut-test-no-such-downloader".to_string();
    config.probe.program = "supercut-test-no-such-probe".to_string();
    config
}

/// Leaves a snapshot at `stage` where a run for `VIDEO_URL` will look for it
fn seed_snapshot(output_dir: &std::path::Path, stage: PipelineStage, keywords: &[&str]) -> Result<ResultLayout> {
    let layout = ResultLayout::new(output_dir, VIDEO_URL)?;
    let mut corpus = Corpus::new(vec![common::resolved_video("abc123", 30.0, &[(1.0, 2.0), (4.0, 5.5)])]);
    corpus.keywords = keywords.iter().map(|k| k.to_string()).collect();
    corpus.advance(stage, corpus.videos.clone()).save_snapshot(layout.snapshot_path())?;
    Ok(layout)
}

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;

    assert_eq!(controller.config().edl_title, "Supercut");
    Ok(())
}

/// Test that an invalid configuration is rejected up front
#[test]
fn test_controller_initialization_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.downloader.file_template = "%(title)s.%(ext)s".to_string();

    let result = Controller::with_config(config);

    let error = result.err().expect("invalid config must be rejected");
    assert_eq!(error.to_string(), "Configuration validation failed");
}

/// Test that an unsupported URL fails before anything is downloaded
#[test]
fn test_run_withUnsupportedUrl_shouldFailWithoutCreatingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(offline_config(temp_dir.path()))?;

    let result = tokio_test::block_on(async {
        controller.run("https://vimeo.com/12345", &KeywordSet::new(["hello"]), false).await
    });

    let error = result.err().expect("unsupported URL must fail");
    assert!(matches!(
        error.downcast_ref::<AppError>(),
        Some(AppError::UnsupportedUrl { .. })
    ));
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}

/// Test that a finished snapshot is resumed and only the EDL is written
#[test]
fn test_run_withProbedSnapshot_shouldSkipToEdl() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let layout = seed_snapshot(temp_dir.path(), PipelineStage::Probed, &["hello"])?;
    let controller = Controller::with_config(offline_config(temp_dir.path()))?;

    let edl_path = tokio_test::block_on(async {
        controller.run(VIDEO_URL, &KeywordSet::new(["Hello"]), false).await
    })?;

    assert_eq!(edl_path, layout.edl_path());
    let content = std::fs::read_to_string(&edl_path)?;
    assert!(content.starts_with("TITLE: Supercut\nFCM: DROP FRAME\n\n001  AX"));
    assert!(content.contains("002  AX       AA/V  C        0:00:04:00 0:00:05:15 0:00:01:00 0:00:02:15\n"));
    Ok(())
}

/// Test that a downloaded snapshot resumes at the probe step
#[test]
fn test_run_withDownloadedSnapshot_shouldResumeAtProbe() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let layout = seed_snapshot(temp_dir.path(), PipelineStage::Downloaded, &["hello"])?;
    let controller = Controller::with_config(offline_config(temp_dir.path()))?;

    let result = tokio_test::block_on(async {
        controller.run(VIDEO_URL, &KeywordSet::new(["hello"]), false).await
    });

    let message = format!("{:#}", result.err().expect("probe must fail"));
    assert!(message.contains("supercut-test-no-such-probe"), "{}", message);
    assert!(!layout.edl_path().exists());
    Ok(())
}

/// Test that a snapshot for other keywords, or a forced run, starts from the download
#[test]
fn test_run_withStaleOrForcedSnapshot_shouldDownloadAgain() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    seed_snapshot(temp_dir.path(), PipelineStage::Probed, &["hello"])?;
    let controller = Controller::with_config(offline_config(temp_dir.path()))?;

    for (keywords, force) in [(["goodbye"], false), (["hello"], true)] {
        let result = tokio_test::block_on(async {
            controller.run(VIDEO_URL, &KeywordSet::new(keywords), force).await
        });

        let message = format!("{:#}", result.err().expect("download must fail"));
        assert!(message.contains("supercut-test-no-such-downloader"), "{}", message);
    }
    Ok(())
}

/// Stand-in downloader: writes one caption track next to the `-o` template,
/// complains about a private video and exits 1, as yt-dlp does for channels
#[cfg(unix)]
fn partial_downloader(dir: &std::path::Path) -> Result<std::path::PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let script = "#!/bin/sh\n\
        while [ \"$#\" -gt 0 ]; do\n\
          if [ \"$1\" = \"-o\" ]; then out=\"$2\"; fi\n\
          shift\n\
        done\n\
        printf 'WEBVTT\\n\\n00:00:01.000 --> 00:00:02.500\\nwell hello there\\n' > \"$(dirname \"$out\")/abc=Title.en.vtt\"\n\
        echo 'ERROR: [youtube] xyz: Private video' >&2\n\
        exit 1\n";
    let path = common::create_test_file(dir, "partial_downloader.sh", script)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Test that tracks fetched before a downloader error are still scanned
#[cfg(unix)]
#[test]
fn test_run_withDownloaderExitingNonZero_shouldScanFetchedSubtitles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tools_dir = temp_dir.path().join("tools");
    std::fs::create_dir(&tools_dir)?;
    let output_dir = temp_dir.path().join("results");
    let mut config = offline_config(&output_dir);
    config.downloader.program = partial_downloader(&tools_dir)?.to_string_lossy().to_string();
    let controller = Controller::with_config(config)?;
    let url = "https://www.youtube.com/c/Chan";

    let result = tokio_test::block_on(async {
        controller.run(url, &KeywordSet::new(["hello"]), false).await
    });

    // The same stand-in then fails the video download, which stops the run after the scan
    let message = format!("{:#}", result.err().expect("video download must fail"));
    assert!(message.contains("Failed to download video abc"), "{}", message);

    let layout = ResultLayout::new(&output_dir, url)?;
    assert!(layout.subtitle_dir().join("abc=Title.en.vtt").exists());
    let corpus = Corpus::load_snapshot(layout.snapshot_path())?;
    assert_eq!(corpus.stage, PipelineStage::Scanned);
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.videos[0].id, "abc");
    assert_eq!(corpus.videos[0].hits[0].start, 1.0);
    assert_eq!(corpus.videos[0].hits[0].end, 2.5);
    Ok(())
}

/// Test duration formatting used in the completion message
#[test]
fn test_format_duration_withVariousDurations_shouldBeHumanReadable() {
    assert_eq!(Controller::format_duration(Duration::from_millis(4_250)), "4.250s");
    assert_eq!(Controller::format_duration(Duration::from_secs(125)), "2m 5s");
    assert_eq!(Controller::format_duration(Duration::from_secs(3_725)), "1h 2m 5s");
}

/*!
 * Tests for file and directory utilities
 */

use anyhow::Result;
use std::path::PathBuf;
use supercut::errors::AppError;
use supercut::file_utils::{url_to_dir, FileManager, ResultLayout};
use crate::common;

/// Test directory names for the URL shapes a channel or video can take
#[test]
fn test_url_to_dir_withSupportedUrls_shouldKeepPathAndQuery() -> Result<()> {
    assert_eq!(url_to_dir("https://www.youtube.com/c/SomeChannel")?, "c_SomeChannel");
    assert_eq!(url_to_dir("https://youtu.be/dQw4w9WgXcQ")?, "dQw4w9WgXcQ");
    assert_eq!(
        url_to_dir("https://www.youtube.com/playlist?list=PL123")?,
        "playlist?list=PL123"
    );
    assert_eq!(url_to_dir("https://m.youtube.com/user/someone/")?, "user_someone");
    Ok(())
}

/// Test URLs given without a scheme
#[test]
fn test_url_to_dir_withoutScheme_shouldStillResolve() -> Result<()> {
    assert_eq!(url_to_dir("youtube.com/c/SomeChannel")?, "c_SomeChannel");
    Ok(())
}

/// Test that other hosts are refused
#[test]
fn test_url_to_dir_withUnsupportedDomain_shouldFail() {
    let result = url_to_dir("https://vimeo.com/12345");

    match result {
        Err(AppError::UnsupportedUrl { url, domains }) => {
            assert_eq!(url, "https://vimeo.com/12345");
            assert_eq!(domains, "youtube.com, youtu.be");
        }
        other => panic!("Expected unsupported URL, got {:?}", other),
    }
    assert!(url_to_dir("https://notyoutube.com/c/x").is_err());
}

/// Test that a bare host gives no usable directory name
#[test]
fn test_url_to_dir_withNothingAfterHost_shouldFail() {
    assert!(matches!(
        url_to_dir("https://www.youtube.com/"),
        Err(AppError::UnsupportedUrl { .. })
    ));
}

/// Test the file layout of one run
#[test]
fn test_result_layout_withOutputDir_shouldNestEverythingUnderUrlDir() -> Result<()> {
    let layout = ResultLayout::new("results", "https://www.youtube.com/c/SomeChannel")?;

    assert_eq!(layout.root, PathBuf::from("results/c_SomeChannel"));
    assert_eq!(layout.subtitle_dir(), PathBuf::from("results/c_SomeChannel/subtitles"));
    assert_eq!(layout.video_dir(), PathBuf::from("results/c_SomeChannel/videos"));
    assert_eq!(layout.snapshot_path(), PathBuf::from("results/c_SomeChannel/keyword_scan.json"));
    assert_eq!(layout.edl_path(), PathBuf::from("results/c_SomeChannel/supercut.edl"));
    Ok(())
}

/// Test directory creation and existence checks
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateAllLevels() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));
    assert!(!FileManager::file_exists(&nested));

    let file = common::create_test_file(&nested, "x.txt", "x")?;
    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::dir_exists(&file));
    Ok(())
}

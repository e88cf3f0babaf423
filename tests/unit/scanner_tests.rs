/*!
 * Tests for the caption directory scan
 */

use anyhow::Result;
use supercut::errors::{AppError, SubtitleError};
use supercut::keyword_matcher::{KeywordHit, KeywordSet};
use supercut::scanner::{scan_directory, scan_track, video_id_from_file_name};
use crate::common;

/// Test id extraction from downloader file names
#[test]
fn test_video_id_from_file_name_withTitleContainingEquals_shouldUseFirstSegment() {
    assert_eq!(video_id_from_file_name("a1B2c3=Funny=Title.en.vtt"), "a1B2c3");
    assert_eq!(video_id_from_file_name("=Untitled.vtt"), "");
}

/// Test that only videos with hits are kept
#[test]
fn test_scan_directory_withMixedFiles_shouldKeepOnlyVideosWithHits() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_vtt(
        temp_dir.path(),
        "abc=First_Video.en.vtt",
        &[
            ("00:00:01.000", "00:00:02.000", "hello there"),
            ("00:00:02.000", "00:00:04.000", "hello there\nsay hello again"),
        ],
    )?;
    common::create_test_vtt(
        temp_dir.path(),
        "def=Second_Video.en.vtt",
        &[("00:00:01.000", "00:00:02.000", "nothing to see")],
    )?;
    common::create_test_file(temp_dir.path(), "notes.txt", "hello hello")?;
    std::fs::create_dir(temp_dir.path().join("nested"))?;

    let corpus = scan_directory(temp_dir.path(), &KeywordSet::new(["hello"]))?;

    assert_eq!(corpus.len(), 1);
    let video = &corpus.videos[0];
    assert_eq!(video.id, "abc");
    assert_eq!(video.subtitle_path, temp_dir.path().join("abc=First_Video.en.vtt"));
    assert!(video.media_path.as_os_str().is_empty());
    assert_eq!(video.frame_rate, 0.0);
    assert_eq!(
        video.hits,
        vec![KeywordHit::new("hello", 1.0, 2.0), KeywordHit::new("hello", 2.0, 4.0)]
    );
    Ok(())
}

/// Test that an empty directory yields an empty corpus
#[test]
fn test_scan_directory_withEmptyDirectory_shouldReturnEmptyCorpus() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let corpus = scan_directory(temp_dir.path(), &KeywordSet::new(["anything"]))?;

    assert!(corpus.is_empty());
    assert_eq!(corpus.hit_count(), 0);
    Ok(())
}

/// Test that sorting makes the order independent of the file system
#[test]
fn test_scan_directory_withSortById_shouldOrderById() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for id in ["zulu", "alpha", "mike"] {
        common::create_test_vtt(
            temp_dir.path(),
            &format!("{}=Title.en.vtt", id),
            &[("00:00:01.000", "00:00:02.000", "keyword")],
        )?;
    }

    let mut corpus = scan_directory(temp_dir.path(), &KeywordSet::new(["keyword"]))?;
    corpus.sort_by_id();

    let ids: Vec<&str> = corpus.videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "mike", "zulu"]);
    Ok(())
}

/// Test that a malformed caption file aborts the scan with the parser's error
#[test]
fn test_scan_directory_withMalformedCue_shouldPropagateParserError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(
        temp_dir.path(),
        "bad=Broken.en.vtt",
        "WEBVTT\n\nnot a timing --> line\nhello\n",
    )?;

    let result = scan_directory(temp_dir.path(), &KeywordSet::new(["hello"]));

    assert!(matches!(
        result,
        Err(AppError::Subtitle(SubtitleError::MalformedCue { .. }))
    ));
    Ok(())
}

/// Test scanning a single track file
#[test]
fn test_scan_track_withMatchingCue_shouldReturnHits() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_vtt(
        temp_dir.path(),
        "one=Track.vtt",
        &[("00:01:30.500", "00:01:32.000", "the cat sat on the mat")],
    )?;

    let hits = scan_track(&path, &KeywordSet::new(["cat", "mat"]))?;

    assert_eq!(
        hits,
        vec![KeywordHit::new("cat", 90.5, 92.0), KeywordHit::new("mat", 90.5, 92.0)]
    );
    Ok(())
}

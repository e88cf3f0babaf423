/*!
 * # supercut - keyword supercuts from video captions
 *
 * A Rust library for finding spoken keywords in a batch of caption tracks and
 * compiling every occurrence into one sequential edit decision list.
 *
 * ## Features
 *
 * - Download caption tracks for a channel, playlist or single video
 * - Scan WebVTT captions for keywords, ignoring lines repeated by scrolling captions
 * - Download only the videos with hits and read their frame rates
 * - Write a CMX 3600 style EDL that lays every hit back to back
 * - Resume a long run from its JSON snapshot
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle_processor`: WebVTT caption track parsing
 * - `keyword_matcher`: Keyword hits over a cue sequence
 * - `scanner`: Keyword scan over a caption directory
 * - `corpus`: Video records and the pipeline snapshot
 * - `timecode`: Seconds to `H:MM:SS:FF`
 * - `edl`: Edit decision list synthesis
 * - `media`: Downloader and ffprobe wrappers
 * - `file_utils`: Result directory layout
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod corpus;
pub mod edl;
pub mod errors;
pub mod file_utils;
pub mod keyword_matcher;
pub mod media;
pub mod scanner;
pub mod subtitle_processor;
pub mod timecode;

// Re-export main types for easier usage
pub use app_config::Config;
pub use corpus::{Corpus, PipelineStage, VideoRecord};
pub use edl::{write_edl, write_edl_file, EditDecisionList, EditRecord};
pub use errors::{AppError, EdlError, MediaError, SubtitleError};
pub use keyword_matcher::{find_keywords, KeywordHit, KeywordSet};
pub use scanner::scan_directory;
pub use subtitle_processor::{Cue, SubtitleTrack};
pub use timecode::timecode;

/*!
 * Edit decision list synthesis.
 *
 * Every keyword hit becomes one edit. Hits are laid back to back on a single
 * program timeline in corpus order, then hit order. Source timecodes come from
 * the hit's own video and all timecodes use that video's frame rate.
 *
 * The output follows the CMX 3600 layout that editors such as Premiere import:
 *
 * ```text
 * TITLE: Supercut
 * FCM: DROP FRAME
 *
 * 001  AX       AA/V  C        0:00:01:00 0:00:02:12 0:00:00:00 0:00:01:12
 * * FROM CLIP NAME: abc=Title.mp4
 * ```
 */

use std::fmt;
use std::io::Write;
use std::path::Path;
use anyhow::{Context, Result};
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::corpus::Corpus;
use crate::errors::{AppError, EdlError};
use crate::timecode::timecode;

/// Largest sequence number the three-digit edit field can hold
pub const MAX_EDITS: usize = 999;

/// Frame counting mode line
pub const FRAME_CODE_MODE: &str = "FCM: DROP FRAME";

/// One edit in the list
#[derive(Debug, Clone, PartialEq)]
pub struct EditRecord {
    pub sequence_number: usize,
    pub source_in: String,
    pub source_out: String,
    pub program_in: String,
    pub program_out: String,
    /// Media file name without its directory
    pub clip_name: String,
}

impl fmt::Display for EditRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:03}  AX       AA/V  C        {} {} {} {}",
            self.sequence_number, self.source_in, self.source_out, self.program_in, self.program_out
        )?;
        writeln!(f, "* FROM CLIP NAME: {}", self.clip_name)
    }
}

/// Header plus edits, ready to serialize
#[derive(Debug, Clone, PartialEq)]
pub struct EditDecisionList {
    pub title: String,
    pub records: Vec<EditRecord>,
}

impl EditDecisionList {
    /// Build the whole list in memory; nothing is produced if any edit fails
    pub fn from_corpus(corpus: &Corpus, title: &str) -> Result<Self, EdlError> {
        let mut records = Vec::with_capacity(corpus.hit_count().min(MAX_EDITS));
        synthesize(corpus, |record| {
            records.push(record);
            Ok::<(), EdlError>(())
        })?;

        Ok(Self {
            title: title.to_string(),
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for EditDecisionList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_header(f, &self.title)?;
        for record in &self.records {
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

fn write_header(f: &mut impl fmt::Write, title: &str) -> fmt::Result {
    writeln!(f, "TITLE: {}", title)?;
    writeln!(f, "{}", FRAME_CODE_MODE)?;
    writeln!(f)
}

/// Walk the corpus once, handing each edit to `emit` as soon as it is computed.
///
/// Stops before the first edit that would break the format, so `emit` never
/// sees more than `MAX_EDITS` records.
fn synthesize<E, F>(corpus: &Corpus, mut emit: F) -> Result<(), E>
where
    E: From<EdlError>,
    F: FnMut(EditRecord) -> Result<(), E>,
{
    let mut sequence_number = 1usize;
    let mut program_cursor = 0.0f64;

    for video in &corpus.videos {
        let fps = video.frame_rate;
        let clip_name = video.clip_name();

        for hit in &video.hits {
            if sequence_number > MAX_EDITS {
                return Err(EdlError::FormatLimitExceeded { limit: MAX_EDITS }.into());
            }
            if !(fps.is_finite() && fps > 0.0) {
                return Err(EdlError::InvalidFrameRate {
                    video_id: video.id.clone(),
                    frame_rate: fps,
                }
                .into());
            }

            let duration = hit.duration();
            emit(EditRecord {
                sequence_number,
                source_in: timecode(hit.start, fps),
                source_out: timecode(hit.end, fps),
                program_in: timecode(program_cursor, fps),
                program_out: timecode(program_cursor + duration, fps),
                clip_name: clip_name.clone(),
            })?;

            program_cursor += duration;
            sequence_number += 1;
        }
    }

    debug!("Synthesized {} edits, {:.3}s of program", sequence_number - 1, program_cursor);
    Ok(())
}

/// Stream the list to `out`, one edit at a time.
///
/// On error, everything already written stays in `out`; use
/// [`write_edl_file`] when a half-written list must never be visible.
pub fn write_edl<W: Write>(corpus: &Corpus, title: &str, out: &mut W) -> Result<(), AppError> {
    let mut header = String::new();
    write_header(&mut header, title).map_err(|e| AppError::Unknown(e.to_string()))?;
    out.write_all(header.as_bytes())?;

    synthesize(corpus, |record| {
        out.write_all(record.to_string().as_bytes())?;
        Ok::<(), AppError>(())
    })
}

/// Build the list and commit it to `path` in one step.
///
/// The list is rendered fully before touching the filesystem and then moved
/// into place, so a failed synthesis leaves no file behind.
pub fn write_edl_file<P: AsRef<Path>>(corpus: &Corpus, title: &str, path: P) -> Result<EditDecisionList> {
    let path = path.as_ref();
    let edl = EditDecisionList::from_corpus(corpus, title)
        .context("Failed to build edit decision list")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(edl.to_string().as_bytes())?;
    file.persist(path)
        .with_context(|| format!("Failed to write EDL file: {}", path.display()))?;

    info!("Wrote {} edits to {}", edl.len(), path.display());
    Ok(edl)
}

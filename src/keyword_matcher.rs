/*!
 * Keyword matching over caption cues.
 *
 * Cue text is trimmed, lowercased and split into physical lines. Scrolling
 * captions repeat the previous cue's last line as the next cue's first line,
 * so a line identical to the last accepted line is skipped. Every accepted
 * line is tested for substring containment of each keyword, and each match
 * yields a hit carrying the cue's own start and end time.
 */

use std::borrow::Borrow;
use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::subtitle_processor::Cue;

/// Occurrence of one keyword inside one caption cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordHit {
    /// The keyword that matched
    pub word: String,
    /// Cue start in seconds
    pub start: f64,
    /// Cue end in seconds
    pub end: f64,
}

impl KeywordHit {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    /// Length of the hit on the source timeline
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Lowercased, deduplicated keywords in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordSet {
    words: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = Vec::new();
        for keyword in keywords {
            let word = keyword.as_ref().trim().to_lowercase();
            if !word.is_empty() && !words.contains(&word) {
                words.push(word);
            }
        }
        Self { words }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeywordSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Scan a single cue, threading the last accepted line through `previous_line`.
///
/// Hits are appended to `out` in line order, then keyword-set order within a line.
pub fn scan_cue(cue: &Cue, keywords: &KeywordSet, previous_line: &mut String, out: &mut VecDeque<KeywordHit>) {
    let normalized = cue.text.trim().to_lowercase();
    for line in normalized.split('\n') {
        if line == previous_line.as_str() {
            continue;
        }
        previous_line.clear();
        previous_line.push_str(line);

        for word in keywords.iter() {
            if line.contains(word) {
                out.push_back(KeywordHit::new(word, cue.start, cue.end));
            }
        }
    }
}

/// Lazy, single-pass stream of keyword hits over a cue sequence
pub struct KeywordScan<'k, I> {
    cues: I,
    keywords: &'k KeywordSet,
    previous_line: String,
    pending: VecDeque<KeywordHit>,
}

impl<'k, I> KeywordScan<'k, I> {
    pub fn new(cues: I, keywords: &'k KeywordSet) -> Self {
        Self {
            cues,
            keywords,
            previous_line: String::new(),
            pending: VecDeque::new(),
        }
    }
}

impl<I, C> Iterator for KeywordScan<'_, I>
where
    I: Iterator<Item = C>,
    C: Borrow<Cue>,
{
    type Item = KeywordHit;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.pending.pop_front() {
                return Some(hit);
            }
            let cue = self.cues.next()?;
            scan_cue(cue.borrow(), self.keywords, &mut self.previous_line, &mut self.pending);
        }
    }
}

/// Find every keyword occurrence in a cue sequence
pub fn find_keywords<'k, I>(cues: I, keywords: &'k KeywordSet) -> KeywordScan<'k, I::IntoIter>
where
    I: IntoIterator,
    I::Item: Borrow<Cue>,
{
    KeywordScan::new(cues.into_iter(), keywords)
}

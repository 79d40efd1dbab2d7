pub mod blocks;
pub mod headers;
pub mod lines;

use std::borrow::Cow;

use serde::Deserialize;
use tracing::debug;

use crate::model::{ends_with_ellipsis, strip_truncation_phrase, Entry, Marker};

/// How entries are delimited in an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Sniff the input.
    #[default]
    Auto,
    /// `Yellow highlight | Page: 12` header lines start entries.
    Header,
    /// Blank-line separated blocks with `Page:`/`Location:` tokens.
    Block,
}

impl Strategy {
    pub fn resolve(self, raw: &str) -> Strategy {
        match self {
            Strategy::Auto => lines::detect_strategy(raw),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// No header or marker token anywhere in the input.
    NoRecognizableMarkers,
    /// Markers were found but every candidate entry was empty.
    NothingSurvivedFiltering,
}

#[derive(Debug, Clone)]
pub struct ParseReport {
    pub strategy: Strategy,
    pub entries: Vec<Entry>,
    pub markers_seen: usize,
}

impl ParseReport {
    pub fn truncated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.truncated).count()
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if !self.entries.is_empty() {
            None
        } else if self.markers_seen == 0 {
            Some(EmptyReason::NoRecognizableMarkers)
        } else {
            Some(EmptyReason::NothingSurvivedFiltering)
        }
    }
}

/// Decode export bytes, substituting U+FFFD for invalid UTF-8.
pub fn decode_lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Parse an export into entries, picking the strategy automatically.
pub fn parse(raw: &str) -> Vec<Entry> {
    parse_with(raw, Strategy::Auto).entries
}

pub fn parse_with(raw: &str, strategy: Strategy) -> ParseReport {
    let strategy = strategy.resolve(raw);
    let lines = lines::normalize_lines(raw, strategy);
    debug!(?strategy, lines = lines.len(), "parsing export");

    let (entries, markers_seen) = match strategy {
        Strategy::Block => blocks::parse_blocks(&lines),
        _ => headers::parse_headers(&lines),
    };

    ParseReport {
        strategy,
        entries,
        markers_seen,
    }
}

/// An entry being accumulated line by line.
#[derive(Debug, Default)]
pub(crate) struct Draft {
    marker: Option<Marker>,
    highlight: Vec<String>,
    note: Option<Vec<String>>,
    truncated: bool,
}

impl Draft {
    pub(crate) fn new(marker: Option<Marker>) -> Self {
        Draft {
            marker,
            ..Default::default()
        }
    }

    pub(crate) fn push_highlight(&mut self, line: &str) {
        self.highlight.push(line.to_string());
    }

    /// Open the note (possibly with no text yet) and append `text` if non-empty.
    pub(crate) fn push_note(&mut self, text: &str) {
        let note = self.note.get_or_insert_with(Vec::new);
        if !text.is_empty() {
            note.push(text.to_string());
        }
    }

    pub(crate) fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Run truncation and emptiness checks. `None` means the draft was noise.
    pub(crate) fn finish(self) -> Option<Entry> {
        let joined = self.highlight.join("\n");
        let (scrubbed, had_phrase) = strip_truncation_phrase(&joined);
        let highlight = scrubbed.trim().to_string();
        let truncated = self.truncated || had_phrase || ends_with_ellipsis(&highlight);

        let note = self
            .note
            .map(|lines| lines.join("\n").trim().to_string())
            .filter(|n| !n.is_empty());

        if highlight.is_empty() && !truncated {
            debug!(marker = ?self.marker, "dropping empty entry");
            return None;
        }

        Some(Entry {
            marker: self.marker,
            highlight,
            note,
            truncated,
        })
    }
}

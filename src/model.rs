use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const TRUNCATION_PHRASE: &str =
    "Some highlights have been hidden or truncated due to export limits.";

static TRUNCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){}", regex::escape(TRUNCATION_PHRASE))).unwrap());
static ELLIPSIS_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(…|\.\.\.)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    Page,
    Location,
}

impl MarkerKind {
    /// Case-insensitive `page` / `location`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "page" => Some(MarkerKind::Page),
            "location" => Some(MarkerKind::Location),
            _ => None,
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::Page => f.write_str("Page"),
            MarkerKind::Location => f.write_str("Location"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub value: u64,
}

impl Marker {
    pub fn new(kind: MarkerKind, value: u64) -> Self {
        Marker { kind, value }
    }

    /// Parse the digits of an export marker, tolerating thousands separators ("1,234").
    pub fn from_digits(kind: MarkerKind, digits: &str) -> Option<Self> {
        let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
        cleaned.parse().ok().map(|value| Marker { kind, value })
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}

/// One recovered highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub marker: Option<Marker>,
    pub highlight: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub truncated: bool,
}

impl Entry {
    pub fn new(marker: Option<Marker>, highlight: impl Into<String>) -> Self {
        Entry {
            marker,
            highlight: highlight.into(),
            note: None,
            truncated: false,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Replace highlight and note with reviewed text.
    ///
    /// `truncated` is raised again when the warning phrase survived the edit,
    /// but never cleared here: a missing phrase does not prove the text is whole.
    pub fn apply_edit(&mut self, highlight: &str, note: Option<&str>) {
        self.highlight = highlight.trim().to_string();
        self.note = note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        self.refresh_truncation();
    }

    pub fn refresh_truncation(&mut self) {
        if contains_truncation_phrase(&self.highlight) {
            self.truncated = true;
        }
    }
}

pub fn contains_truncation_phrase(text: &str) -> bool {
    TRUNCATION_RE.is_match(text)
}

/// Remove every occurrence of the warning phrase. Returns the cleaned text and
/// whether anything was removed.
pub fn strip_truncation_phrase(text: &str) -> (String, bool) {
    if !TRUNCATION_RE.is_match(text) {
        return (text.to_string(), false);
    }
    (TRUNCATION_RE.replace_all(text, "").into_owned(), true)
}

pub fn ends_with_ellipsis(text: &str) -> bool {
    ELLIPSIS_END_RE.is_match(text)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterMark {
    pub kind: MarkerKind,
    pub value: u64,
    pub title: String,
}

impl ChapterMark {
    pub fn new(kind: MarkerKind, value: u64, title: impl Into<String>) -> Self {
        ChapterMark {
            kind,
            value,
            title: title.into(),
        }
    }
}

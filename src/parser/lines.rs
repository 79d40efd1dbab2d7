use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::Strategy;
use crate::model::{Marker, MarkerKind};

static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(options|added\s+on\b.*|=+)$").unwrap());
static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+\s+highlights?\s*\|\s*\d+\s+notes?$").unwrap());
static DATE_STAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(january|february|march|april|may|june|july|august|september|october|november|december),?\s+\d{1,2}(st|nd|rd|th)\s+\d{4}$",
    )
    .unwrap()
});
static BARE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:yellow|blue|pink|orange|purple|red|green)\s+(?:highlight|underline)|(?:highlight|underline)\s*\((?:yellow|blue|pink|orange|purple|red|green)\))$",
    )
    .unwrap()
});
pub(crate) static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z]+\s+)?(highlight|underline)\s*\|\s*(page|location)\s*:\s*(\d[\d,]*).*$")
        .unwrap()
});
pub(crate) static MARKER_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(page|location)\s*:\s*(\d[\d,]*)").unwrap());
pub(crate) static NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^note\s*:\s*(.*)$").unwrap());
pub(crate) static NOTE_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^note\s*(?::|-(?:\s|$))\s*(.*)$").unwrap());

/// Clean raw export text into trimmed lines.
///
/// Blank lines survive as a single `""` separator; noise lines are removed.
/// Which lines count as noise depends on `strategy` (must already be resolved).
pub fn normalize_lines(raw: &str, strategy: Strategy) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for cleaned in split_lines(raw) {
        let l = cleaned.trim();

        if l.is_empty() {
            if out.last().is_some_and(|prev| !prev.is_empty()) {
                out.push(String::new());
            }
            continue;
        }

        if is_noise(l, strategy) {
            continue;
        }

        out.push(l.to_string());
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out
}

/// Split on `\r\n`, `\r` or `\n`, with BOM removed and NBSP turned into spaces.
fn split_lines(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split("\r\n")
        .flat_map(|chunk| chunk.split(['\r', '\n']))
        .map(|line| line.replace('\u{feff}', "").replace('\u{a0}', " "))
}

fn is_noise(line: &str, strategy: Strategy) -> bool {
    if META_RE.is_match(line) || SUMMARY_RE.is_match(line) {
        return true;
    }
    match strategy {
        Strategy::Block => DATE_STAMP_RE.is_match(line) || BARE_HEADER_RE.is_match(line),
        _ => false,
    }
}

/// Pick a strategy from the conventions present in the raw text.
pub fn detect_strategy(raw: &str) -> Strategy {
    let mut saw_token = false;
    for line in split_lines(raw) {
        let l = line.trim();
        if HEADER_RE.is_match(l) {
            return Strategy::Header;
        }
        if !saw_token && MARKER_TOKEN_RE.is_match(l) {
            saw_token = true;
        }
    }
    if saw_token {
        Strategy::Block
    } else {
        Strategy::Header
    }
}

/// Marker carried by a highlight/underline header line, if the line is one.
pub fn header_marker(line: &str) -> Option<Marker> {
    let caps = HEADER_RE.captures(line)?;
    marker_from_caps(&caps, 2, 3)
}

pub(crate) fn marker_from_caps(caps: &Captures, kind_idx: usize, digits_idx: usize) -> Option<Marker> {
    let kind = MarkerKind::parse(&caps[kind_idx])?;
    Marker::from_digits(kind, &caps[digits_idx])
}

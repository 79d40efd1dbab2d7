use super::lines::{marker_from_caps, HEADER_RE, MARKER_TOKEN_RE, NOTE_DASH_RE};
use super::Draft;
use crate::model::{strip_truncation_phrase, Entry, Marker};

/// Split normalized lines into blank-separated blocks.
fn split_blocks(lines: &[String]) -> Vec<&[String]> {
    lines
        .split(|l| l.is_empty())
        .filter(|block| !block.is_empty())
        .collect()
}

/// Find the last marker token on a line and return it with the tokens removed.
fn take_markers(line: &str) -> (Option<Marker>, String) {
    let marker = MARKER_TOKEN_RE
        .captures_iter(line)
        .filter_map(|caps| marker_from_caps(&caps, 1, 2))
        .last();
    if marker.is_none() {
        return (None, line.to_string());
    }
    // A full header line carries only the marker.
    if HEADER_RE.is_match(line) {
        return (marker, String::new());
    }
    let rest = MARKER_TOKEN_RE.replace_all(line, "");
    let rest = rest
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '|' | '·' | '-' | ',' | '–'))
        .to_string();
    (marker, rest)
}

/// Block-driven parsing: returns entries and the number of marker tokens seen.
pub fn parse_blocks(lines: &[String]) -> (Vec<Entry>, usize) {
    let mut entries = Vec::new();
    let mut active: Option<Marker> = None;
    let mut markers_seen = 0;

    for block in split_blocks(lines) {
        let mut text_lines = Vec::new();
        let mut note_lines: Option<Vec<String>> = None;
        let mut truncated = false;

        for line in block {
            let (cleaned, had_phrase) = strip_truncation_phrase(line);
            truncated |= had_phrase;
            let (marker, rest) = take_markers(cleaned.trim());
            if let Some(m) = marker {
                active = Some(m);
                markers_seen += 1;
            }
            if rest.is_empty() {
                continue;
            }
            if let Some(notes) = note_lines.as_mut() {
                notes.push(rest);
            } else if let Some(caps) = NOTE_DASH_RE.captures(&rest) {
                let first = caps.get(1).map_or("", |m| m.as_str()).trim();
                note_lines = Some(vec![first.to_string()]);
            } else {
                text_lines.push(rest);
            }
        }

        let mut draft = Draft::new(active);
        if truncated {
            draft.mark_truncated();
        }
        for text in &text_lines {
            draft.push_highlight(text);
        }
        for note in note_lines.iter().flatten() {
            draft.push_note(note);
        }
        entries.extend(draft.finish());
    }

    (entries, markers_seen)
}

use super::lines::{header_marker, NOTE_RE};
use super::Draft;
use crate::model::{strip_truncation_phrase, Entry, Marker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InHighlight,
    InNote,
}

#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Header(Marker),
    NoteStart(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if let Some(marker) = header_marker(line) {
        return LineKind::Header(marker);
    }
    if let Some(caps) = NOTE_RE.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str()).trim();
        return LineKind::NoteStart(text);
    }
    LineKind::Text(line)
}

struct HeaderParser {
    state: State,
    current: Option<Draft>,
    entries: Vec<Entry>,
    markers_seen: usize,
}

impl HeaderParser {
    fn new() -> Self {
        HeaderParser {
            state: State::Idle,
            current: None,
            entries: Vec::new(),
            markers_seen: 0,
        }
    }

    fn flush(&mut self) {
        if let Some(draft) = self.current.take() {
            self.entries.extend(draft.finish());
        }
        self.state = State::Idle;
    }

    fn feed(&mut self, line: &str) {
        if let LineKind::Header(marker) = classify(line) {
            self.flush();
            self.markers_seen += 1;
            self.current = Some(Draft::new(Some(marker)));
            self.state = State::InHighlight;
            return;
        }

        // Text before the first header has nowhere to go.
        let Some(draft) = self.current.as_mut() else {
            return;
        };

        let (cleaned, had_phrase) = strip_truncation_phrase(line);
        if had_phrase {
            draft.mark_truncated();
        }
        let line = cleaned.trim();
        if had_phrase && line.is_empty() {
            return;
        }

        match (self.state, classify(line)) {
            (_, LineKind::Blank) => {}
            (State::InNote, LineKind::NoteStart(text)) => draft.push_note(text),
            (State::InNote, LineKind::Text(text)) => draft.push_note(text),
            (_, LineKind::NoteStart(text)) => {
                draft.push_note(text);
                self.state = State::InNote;
            }
            (_, LineKind::Text(text)) => draft.push_highlight(text),
            // A header hidden behind the warning phrase still opens a new entry.
            (_, LineKind::Header(_)) => self.feed(line),
        }
    }
}

/// Header-driven parsing: returns entries and the number of headers seen.
pub fn parse_headers(lines: &[String]) -> (Vec<Entry>, usize) {
    let mut parser = HeaderParser::new();
    for line in lines {
        parser.feed(line);
    }
    parser.flush();
    (parser.entries, parser.markers_seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MarkerKind, TRUNCATION_PHRASE};
    use crate::parser::lines::normalize_lines;
    use crate::parser::Strategy;

    fn parse(raw: &str) -> Vec<Entry> {
        parse_headers(&normalize_lines(raw, Strategy::Header)).0
    }

    #[test]
    fn classify_lines() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(
            classify("Orange Highlight | Location: 42"),
            LineKind::Header(Marker::new(MarkerKind::Location, 42))
        );
        assert_eq!(classify("NOTE:  mine "), LineKind::NoteStart("mine"));
        assert_eq!(classify("Notes are fun"), LineKind::Text("Notes are fun"));
    }

    #[test]
    fn basic_scenario() {
        let entries = parse("Yellow highlight | Page: 12\nThis is a test highlight.\n\nNote: remember this");
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.marker, Some(Marker::new(MarkerKind::Page, 12)));
        assert_eq!(e.highlight, "This is a test highlight.");
        assert_eq!(e.note.as_deref(), Some("remember this"));
        assert!(!e.truncated);
    }

    #[test]
    fn multi_line_highlight_and_note() {
        let raw = "Blue highlight | Location: 10\nline one\nline two\nNote: n1\nn2\n\nNote: n3";
        let entries = parse(raw);
        assert_eq!(entries[0].highlight, "line one\nline two");
        assert_eq!(entries[0].note.as_deref(), Some("n1\nn2\nn3"));
    }

    #[test]
    fn text_before_first_header_is_discarded() {
        let raw = "Your Kindle Notes For:\nSome Book\nYellow highlight | Page: 1\nhello";
        let entries = parse(raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].highlight, "hello");
    }

    #[test]
    fn truncation_phrase_alone() {
        let raw = format!("Yellow highlight | Page: 2\nkept text\n{}", TRUNCATION_PHRASE);
        let entries = parse(&raw);
        assert!(entries[0].truncated);
        assert_eq!(entries[0].highlight, "kept text");
    }

    #[test]
    fn truncation_phrase_embedded() {
        let raw = format!("Yellow highlight | Page: 2\nbefore {} after", TRUNCATION_PHRASE.to_uppercase());
        let entries = parse(&raw);
        assert!(entries[0].truncated);
        assert_eq!(entries[0].highlight, "before  after");
    }

    #[test]
    fn truncation_only_entry_is_kept_empty() {
        let raw = format!("Yellow highlight | Page: 2\n{}\nYellow highlight | Page: 3\nnext", TRUNCATION_PHRASE);
        let entries = parse(&raw);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].truncated);
        assert!(entries[0].highlight.is_empty());
        assert!(!entries[1].truncated);
    }

    #[test]
    fn ellipsis_flags_truncation() {
        let entries = parse("Yellow highlight | Page: 4\nit trails off…\nYellow highlight | Page: 5\nas does this...");
        assert!(entries.iter().all(|e| e.truncated));
    }

    #[test]
    fn empty_entries_dropped() {
        let entries = parse("Yellow highlight | Page: 1\n\nYellow highlight | Page: 2\nreal");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].marker.unwrap().value, 2);
    }

    #[test]
    fn metadata_between_entries_ignored() {
        let raw = "Yellow highlight | Page: 1\nfirst\nOptions\nAdded on Tuesday\nYellow highlight | Page: 2\nsecond";
        let entries = parse(raw);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].highlight, "first");
    }

    #[test]
    fn marker_order_preserved() {
        let raw = "Yellow highlight | Page: 30\na\nYellow highlight | Page: 4\nb\nUnderline | Location: 900\nc";
        let values: Vec<u64> = parse(raw).iter().map(|e| e.marker.unwrap().value).collect();
        assert_eq!(values, vec![30, 4, 900]);
    }

    #[test]
    fn empty_note_line_opens_note() {
        let raw = "Yellow highlight | Page: 1\nhighlight\nNote:\nthe note body";
        let entries = parse(raw);
        assert_eq!(entries[0].highlight, "highlight");
        assert_eq!(entries[0].note.as_deref(), Some("the note body"));
    }
}

use std::io::{Cursor, Read};

use highlight_curator::{
    build_docx, chapters_from_rows, parse, parse_with, ChapterMark, ChapterRow, Entry, FontChoice,
    Marker, MarkerKind, Strategy, TRUNCATION_PHRASE,
};

fn document_xml(bytes: Vec<u8>) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[test]
fn notebook_fixture() {
    let raw = std::fs::read_to_string("tests/fixtures/notebook_export.txt").unwrap();
    let report = parse_with(&raw, Strategy::Auto);
    assert_eq!(report.strategy, Strategy::Header);
    assert_eq!(report.markers_seen, 6);

    let entries = &report.entries;
    let pages: Vec<u64> = entries.iter().map(|e| e.marker.unwrap().value).collect();
    assert_eq!(pages, vec![1, 12, 34, 61, 88, 1102]);

    assert!(entries[0].highlight.starts_with("I'll make my report"));
    assert_eq!(entries[1].note.as_deref(), Some("first time the pronoun problem shows up"));
    assert_eq!(
        entries[2].highlight,
        "Light is the left hand of darkness\nand darkness the right hand of light."
    );
    assert_eq!(
        entries[2].note.as_deref(),
        Some("the title, from Tormer's Lay\nTwo are one, life and death, lying\ntogether like lovers in kemmer")
    );
    assert!(entries[3].truncated && entries[3].highlight.is_empty());
    assert!(entries[4].truncated);
    assert_eq!(report.truncated_count(), 2);
    assert!(entries.iter().all(|e| !e.highlight.contains("Options") && !e.highlight.contains("Added on")));
}

#[test]
fn marker_blocks_fixture() {
    let raw = std::fs::read_to_string("tests/fixtures/marker_blocks.txt").unwrap();
    let report = parse_with(&raw, Strategy::Auto);
    assert_eq!(report.strategy, Strategy::Block);

    let entries = &report.entries;
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].marker, Some(Marker::new(MarkerKind::Page, 3)));
    assert_eq!(entries[1].marker, Some(Marker::new(MarkerKind::Page, 3)));
    assert_eq!(entries[1].note.as_deref(), Some("the famous opening"));
    assert_eq!(entries[2].marker, Some(Marker::new(MarkerKind::Page, 180)));
    assert_eq!(entries[3].marker, Some(Marker::new(MarkerKind::Location, 2210)));
    assert_eq!(entries[3].highlight, "It was an extraordinary gift for hope.");
    assert!(entries.iter().all(|e| !e.highlight.contains("1925")));
}

#[test]
fn spec_scenario_single_entry() {
    let entries = parse("Yellow highlight | Page: 12\nThis is a test highlight.\n\nNote: remember this");
    assert_eq!(
        entries,
        vec![Entry::new(Some(Marker::new(MarkerKind::Page, 12)), "This is a test highlight.")
            .with_note("remember this")]
    );
}

#[test]
fn empty_input_yields_nothing() {
    assert!(parse("").is_empty());
    assert!(parse("\n\n   \n").is_empty());
}

#[test]
fn end_to_end_docx() {
    let raw = format!(
        "Yellow highlight | Page: 1\nopening\nYellow highlight | Page: 30\nmiddle & more\nNote: keep\nYellow highlight | Page: 60\n{}",
        TRUNCATION_PHRASE
    );
    let entries = parse(&raw);
    assert_eq!(entries.len(), 3);

    let chapters = chapters_from_rows(&[
        ChapterRow::new("Page", "50", "Chapter 2"),
        ChapterRow::new("Page", "1", "Chapter 1"),
        ChapterRow::new("Page", "abc", "Broken"),
        ChapterRow::new("Page", "70", ""),
    ]);
    assert_eq!(chapters.len(), 2);

    let bytes = build_docx("My <Book>", &entries, Some("Read in a week."), &chapters, FontChoice::Arial).unwrap();
    let xml = document_xml(bytes);

    let at = |needle: &str| xml.find(needle).unwrap_or_else(|| panic!("missing {}", needle));
    assert!(at("My &lt;Book&gt;") < at("Read in a week."));
    assert!(at("Chapter 1") < at(">Page 1<"));
    assert!(at(">Page 30<") < at("Chapter 2"));
    assert!(at("Chapter 2") < at(">Page 60<"));
    assert!(xml.contains("middle &amp; more"));
    assert!(xml.contains(">Note:<"));
    assert!(xml.contains(">TRUNCATION NEEDED<"));
    assert!(!xml.contains("Broken"));
    assert!(!xml.contains("Some highlights have been hidden"));
    assert_eq!(xml.matches("<w:pBdr>").count(), 3);
}

#[test]
fn edited_entries_render_with_chapters_for_both_kinds() {
    let mut entries = vec![
        Entry::new(Some(Marker::new(MarkerKind::Location, 500)), "loc text"),
        Entry::new(None, "unanchored"),
        Entry::new(Some(Marker::new(MarkerKind::Page, 9)), "page text"),
    ];
    entries[0].apply_edit(&format!("still cut {}", TRUNCATION_PHRASE), None);
    assert!(entries[0].truncated);

    let chapters = vec![
        ChapterMark::new(MarkerKind::Location, 100, "Loc Part"),
        ChapterMark::new(MarkerKind::Page, 10, "Too Late"),
    ];
    let xml = document_xml(build_docx("", &entries, None, &chapters, FontChoice::Calibri).unwrap());
    assert!(xml.contains("Kindle Highlights"));
    assert!(xml.contains("Loc Part"));
    assert!(!xml.contains("Too Late"));
    assert!(!xml.contains("No marker"));
}

//! Turn raw e-reader highlight exports into reviewed, chaptered `.docx` documents.
//!
//! raw text → [`parser::parse`] → `Vec<Entry>` → (review) → [`build_docx`].

pub mod chapters;
pub mod document;
pub mod error;
pub mod model;
pub mod parser;
pub mod settings;

pub use chapters::{chapters_from_rows, chapters_from_text, ChapterRow};
pub use document::{Assembler, Document, FontChoice};
pub use error::CurateError;
pub use model::{ChapterMark, Entry, Marker, MarkerKind, TRUNCATION_PHRASE};
pub use parser::{decode_lossy, parse, parse_with, ParseReport, Strategy};
pub use settings::Settings;

/// Assemble and serialize in one call.
pub fn build_docx(
    title: &str,
    entries: &[Entry],
    reading_note: Option<&str>,
    chapters: &[ChapterMark],
    font: FontChoice,
) -> error::Result<Vec<u8>> {
    let doc = Assembler::new(title).reading_note(reading_note).assemble(entries, chapters);
    document::docx::write_docx(&doc, font)
}

/// Entries as the pretty JSON array handed to the review surface.
pub fn entries_to_json(entries: &[Entry]) -> error::Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Load reviewed entries, re-flagging any whose edited text still carries the
/// export warning.
pub fn entries_from_json(raw: &str) -> error::Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = serde_json::from_str(raw)?;
    for entry in &mut entries {
        entry.refresh_truncation();
    }
    Ok(entries)
}

/// File name derived from a document title: only `[A-Za-z0-9 _-]` survive.
pub fn safe_file_name(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let kept = kept.trim();
    if kept.is_empty() {
        format!("{}.docx", document::DEFAULT_TITLE)
    } else {
        format!("{}.docx", kept)
    }
}

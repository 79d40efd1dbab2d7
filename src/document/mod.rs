pub mod docx;

use serde::Deserialize;

use crate::chapters::ChapterPlan;
use crate::model::{ends_with_ellipsis, ChapterMark, Entry};

pub const DEFAULT_TITLE: &str = "Kindle Highlights";
pub const TRUNCATION_PLACEHOLDER: &str = "TRUNCATION NEEDED";

pub const BODY_PT: u8 = 10;
pub const TITLE_PT: u8 = 12;
pub const CHAPTER_PT: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    #[default]
    Calibri,
    Arial,
}

impl FontChoice {
    pub fn name(self) -> &'static str {
        match self {
            FontChoice::Calibri => "Calibri",
            FontChoice::Arial => "Arial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub size_pt: u8,
    pub bold: bool,
    pub italic: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Run {
            text: text.into(),
            size_pt: BODY_PT,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>, size_pt: u8) -> Self {
        Run {
            bold: true,
            size_pt,
            ..Run::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Run {
            italic: true,
            ..Run::plain(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Run>),
    /// Horizontal rule between entries.
    Rule,
}

impl Block {
    /// Visible text of the block, runs concatenated.
    pub fn text(&self) -> String {
        match self {
            Block::Paragraph(runs) => runs.iter().map(|r| r.text.as_str()).collect(),
            Block::Rule => String::new(),
        }
    }

    fn spacer() -> Self {
        Block::Paragraph(Vec::new())
    }
}

/// Styled flow document, ready for serialization.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

/// Title falls back to the default when blank.
pub fn effective_title(title: &str) -> &str {
    let t = title.trim();
    if t.is_empty() {
        DEFAULT_TITLE
    } else {
        t
    }
}

/// Visible highlight text, with the placeholder appended for truncated entries.
pub fn visible_highlight(entry: &Entry, placeholder: &str) -> String {
    let text = entry.highlight.trim();
    if !entry.truncated {
        return text.to_string();
    }
    if text.is_empty() {
        placeholder.to_string()
    } else if ends_with_ellipsis(text) {
        format!("{} {}", text, placeholder)
    } else {
        format!("{} … {}", text, placeholder)
    }
}

pub struct Assembler<'a> {
    pub title: &'a str,
    pub reading_note: Option<&'a str>,
    pub placeholder: &'a str,
}

impl<'a> Assembler<'a> {
    pub fn new(title: &'a str) -> Self {
        Assembler {
            title,
            reading_note: None,
            placeholder: TRUNCATION_PLACEHOLDER,
        }
    }

    pub fn reading_note(mut self, note: Option<&'a str>) -> Self {
        self.reading_note = note;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn assemble(&self, entries: &[Entry], chapters: &[ChapterMark]) -> Document {
        let title = effective_title(self.title).to_string();
        let mut blocks = vec![Block::Paragraph(vec![Run::bold(title.clone(), TITLE_PT)])];

        if let Some(note) = self.reading_note.map(str::trim).filter(|n| !n.is_empty()) {
            blocks.push(Block::Paragraph(vec![Run::italic(note)]));
        }
        blocks.push(Block::spacer());

        let mut plan = ChapterPlan::new(chapters);
        for entry in entries {
            for chapter in plan.due(entry.marker) {
                blocks.push(Block::Paragraph(vec![Run::bold(chapter.title.trim(), CHAPTER_PT)]));
                blocks.push(Block::spacer());
            }

            if let Some(marker) = entry.marker {
                blocks.push(Block::Paragraph(vec![Run::bold(marker.to_string(), BODY_PT)]));
            }

            blocks.push(Block::Paragraph(vec![Run::plain(visible_highlight(entry, self.placeholder))]));

            if let Some(note) = entry.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                blocks.push(Block::Paragraph(vec![
                    Run::plain("• "),
                    Run::bold("Note:", BODY_PT),
                    Run::plain(format!(" {}", note)),
                ]));
            }

            blocks.push(Block::Rule);
        }

        Document { title, blocks }
    }
}

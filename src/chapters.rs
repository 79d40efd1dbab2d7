use tracing::debug;

use crate::model::{ChapterMark, Marker, MarkerKind};

/// Untyped chapter row as a review surface hands it over.
#[derive(Debug, Clone, Default)]
pub struct ChapterRow {
    pub kind: String,
    pub value: String,
    pub title: String,
}

impl ChapterRow {
    pub fn new(kind: impl Into<String>, value: impl Into<String>, title: impl Into<String>) -> Self {
        ChapterRow {
            kind: kind.into(),
            value: value.into(),
            title: title.into(),
        }
    }

    /// `kind,value,title`; the title may itself contain commas.
    pub fn from_csv_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, ',');
        let kind = parts.next()?;
        let value = parts.next()?;
        let title = parts.next()?;
        Some(ChapterRow::new(kind, value, title))
    }
}

impl ChapterMark {
    /// Validate a row; `None` for a bad kind, non-numeric value or blank title.
    pub fn from_row(row: &ChapterRow) -> Option<Self> {
        let kind = match row.kind.trim() {
            "Page" => MarkerKind::Page,
            "Location" => MarkerKind::Location,
            _ => return None,
        };
        let value: u64 = row.value.trim().parse().ok()?;
        let title = row.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(ChapterMark::new(kind, value, title))
    }
}

pub fn chapters_from_rows(rows: &[ChapterRow]) -> Vec<ChapterMark> {
    rows.iter()
        .filter_map(|row| {
            let mark = ChapterMark::from_row(row);
            if mark.is_none() {
                debug!(?row, "skipping invalid chapter row");
            }
            mark
        })
        .collect()
}

/// Read a chapter rows file: one `kind,value,title` per line, `#` comments allowed.
pub fn chapters_from_text(text: &str) -> Vec<ChapterMark> {
    let rows: Vec<ChapterRow> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let row = ChapterRow::from_csv_line(l);
            if row.is_none() {
                debug!(line = l, "skipping malformed chapter line");
            }
            row
        })
        .collect();
    chapters_from_rows(&rows)
}

#[derive(Debug, Default)]
struct Track {
    marks: Vec<ChapterMark>,
    next: usize,
}

impl Track {
    fn due(&mut self, value: u64) -> &[ChapterMark] {
        let start = self.next;
        while self.next < self.marks.len() && self.marks[self.next].value <= value {
            self.next += 1;
        }
        &self.marks[start..self.next]
    }
}

/// Chapter thresholds split by marker kind, each with its own cursor.
#[derive(Debug, Default)]
pub struct ChapterPlan {
    page: Track,
    location: Track,
}

impl ChapterPlan {
    pub fn new(chapters: &[ChapterMark]) -> Self {
        let mut plan = ChapterPlan::default();
        for ch in chapters {
            plan.track_mut(ch.kind).marks.push(ch.clone());
        }
        plan.page.marks.sort_by_key(|c| c.value);
        plan.location.marks.sort_by_key(|c| c.value);
        plan
    }

    fn track_mut(&mut self, kind: MarkerKind) -> &mut Track {
        match kind {
            MarkerKind::Page => &mut self.page,
            MarkerKind::Location => &mut self.location,
        }
    }

    /// Headings to emit before an entry at `marker`, in ascending order.
    /// Each heading is returned at most once over the life of the plan.
    pub fn due(&mut self, marker: Option<Marker>) -> &[ChapterMark] {
        match marker {
            Some(m) => self.track_mut(m.kind).due(m.value),
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(marks: &[ChapterMark]) -> Vec<&str> {
        marks.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn row_validation() {
        assert!(ChapterMark::from_row(&ChapterRow::new("Page", "1", "Chapter 1")).is_some());
        assert!(ChapterMark::from_row(&ChapterRow::new("Page", "x", "Chapter 1")).is_none());
        assert!(ChapterMark::from_row(&ChapterRow::new("Page", "-3", "Chapter 1")).is_none());
        assert!(ChapterMark::from_row(&ChapterRow::new("Chapter", "1", "Chapter 1")).is_none());
        assert!(ChapterMark::from_row(&ChapterRow::new("Location", "9", "   ")).is_none());
        let m = ChapterMark::from_row(&ChapterRow::new(" Location ", " 90 ", " Part Two ")).unwrap();
        assert_eq!(m, ChapterMark::new(MarkerKind::Location, 90, "Part Two"));
    }

    #[test]
    fn rows_from_text() {
        let text = "# chapters\nPage,1,Chapter 1\n\nPage,abc,Bad\nLocation,120,One, Two, Three\nnonsense";
        let marks = chapters_from_text(text);
        assert_eq!(titles(&marks), vec!["Chapter 1", "One, Two, Three"]);
    }

    #[test]
    fn plan_emits_in_order_once() {
        let mut plan = ChapterPlan::new(&[
            ChapterMark::new(MarkerKind::Page, 50, "Two"),
            ChapterMark::new(MarkerKind::Page, 1, "One"),
            ChapterMark::new(MarkerKind::Location, 10, "Loc"),
        ]);
        assert_eq!(titles(plan.due(Some(Marker::new(MarkerKind::Page, 60)))), vec!["One", "Two"]);
        assert!(plan.due(Some(Marker::new(MarkerKind::Page, 70))).is_empty());
        assert!(plan.due(None).is_empty());
        assert_eq!(titles(plan.due(Some(Marker::new(MarkerKind::Location, 10)))), vec!["Loc"]);
    }

    #[test]
    fn plan_is_monotonic_when_markers_go_backwards() {
        let mut plan = ChapterPlan::new(&[
            ChapterMark::new(MarkerKind::Page, 5, "A"),
            ChapterMark::new(MarkerKind::Page, 20, "B"),
        ]);
        assert_eq!(titles(plan.due(Some(Marker::new(MarkerKind::Page, 10)))), vec!["A"]);
        assert!(plan.due(Some(Marker::new(MarkerKind::Page, 6))).is_empty());
        assert_eq!(titles(plan.due(Some(Marker::new(MarkerKind::Page, 20)))), vec!["B"]);
    }
}

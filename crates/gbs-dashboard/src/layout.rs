//! Row layout for the branch list
//!
//! Turns a sorted list of classified branches into positioned text segments.
//! Layout is pure; painting happens in [`crate::widgets`].
//!
//! ```text
//! @ main            1a2b3c4d 03/14/26 09:15:23      Ada Fix parser
//!   = origin/main   1a2b3c4d 03/14/26 09:15:23      Ada Fix parser
//!   > release       99aa77ff 03/01/26 17:40:02 Grace H. Cut 1.2
//! ```

use chrono::{Local, TimeZone};
use gbs_core::{BranchView, CommitInfo, RelationshipKind};
use ratatui::style::{Color, Modifier, Style};

/// Narrowest terminal that still gets a layout
pub const MIN_WIDTH: u16 = 10;

/// Characters of the commit hash shown
pub const SHORT_HASH_LEN: usize = 8;

/// Space between the longest name and the first column
const GUTTER_PADDING: usize = 4;

/// Terminal size available to the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

impl Dimensions {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// A run of styled text starting at column `x`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub x: u16,
    pub text: String,
    pub style: Style,
}

/// One screen row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub y: u16,
    pub segments: Vec<Segment>,
}

impl RenderedRow {
    /// Row text with gaps filled by spaces
    pub fn text(&self) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            let len = line.chars().count();
            let x = usize::from(segment.x);
            if x > len {
                line.push_str(&" ".repeat(x - len));
            }
            line.push_str(&segment.text);
        }
        line
    }
}

/// Styles used by the layout; plain when colors are off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn fg(&self, color: Color) -> Style {
        if self.color {
            Style::default().fg(color)
        } else {
            Style::default()
        }
    }

    /// Style of the marker and name of a branch
    pub fn branch(&self, branch: &BranchView) -> Style {
        if !self.color {
            return Style::default();
        }
        let color = if branch.is_head {
            Color::Green
        } else {
            match branch.relationship {
                RelationshipKind::Current | RelationshipKind::Identical => Color::Green,
                RelationshipKind::Ahead => Color::Blue,
                RelationshipKind::Behind => Color::Red,
                RelationshipKind::Diverged | RelationshipKind::Unknown => Color::Magenta,
            }
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn hash(&self) -> Style {
        self.fg(Color::Yellow)
    }

    pub fn time(&self) -> Style {
        self.fg(Color::Cyan)
    }

    pub fn author(&self) -> Style {
        self.fg(Color::White)
    }

    pub fn message(&self) -> Style {
        self.fg(Color::Yellow)
    }

    pub fn error(&self) -> Style {
        self.fg(Color::Red)
    }
}

/// Lay out one row per branch, in the given order
///
/// Nothing is produced for terminals narrower than [`MIN_WIDTH`]. Rows at or
/// beyond `dims.height` are dropped. Secondary columns start after a gutter
/// sized to the longest name; a column that would reach the right edge is
/// omitted together with every column after it.
pub fn layout_rows(branches: &[BranchView], dims: Dimensions, theme: Theme) -> Vec<RenderedRow> {
    if dims.width < MIN_WIDTH {
        return Vec::new();
    }

    let width = usize::from(dims.width);
    let longest_name = branches
        .iter()
        .map(|b| b.name.chars().count())
        .max()
        .unwrap_or(0);
    let gutter = longest_name + GUTTER_PADDING;
    let author_width = branches
        .iter()
        .filter_map(|b| b.last_commit.as_ref())
        .map(|c| c.display_name().chars().count())
        .max()
        .unwrap_or(0);

    branches
        .iter()
        .take(usize::from(dims.height))
        .enumerate()
        .map(|(y, branch)| {
            let mut segments = vec![Segment {
                x: 0,
                text: truncate(&label(branch), width),
                style: theme.branch(branch),
            }];
            if let Some(commit) = &branch.last_commit {
                segments.extend(columns(commit, gutter, author_width, width, theme));
            }
            RenderedRow {
                y: y as u16,
                segments,
            }
        })
        .collect()
}

/// Lay out the single inline error line
pub fn error_row(message: &str, dims: Dimensions, theme: Theme) -> Vec<RenderedRow> {
    if dims.width == 0 || dims.height == 0 {
        return Vec::new();
    }
    vec![RenderedRow {
        y: 0,
        segments: vec![Segment {
            x: 0,
            text: truncate(&format!("Error: {}", message), usize::from(dims.width)),
            style: theme.error(),
        }],
    }]
}

fn label(branch: &BranchView) -> String {
    if branch.is_head {
        format!("{} {}", RelationshipKind::Current.marker(), branch.name)
    } else {
        format!("  {} {}", branch.relationship.marker(), branch.name)
    }
}

fn columns(
    commit: &CommitInfo,
    gutter: usize,
    author_width: usize,
    width: usize,
    theme: Theme,
) -> Vec<Segment> {
    let mut cells = vec![(commit.short_hash(SHORT_HASH_LEN).to_string(), theme.hash())];
    if let Some(time) = format_time(commit.timestamp) {
        cells.push((time, theme.time()));
    }
    cells.push((
        format!("{:>width$}", commit.display_name(), width = author_width),
        theme.author(),
    ));
    cells.push((commit.summary().to_string(), theme.message()));

    let mut segments = Vec::with_capacity(cells.len());
    let mut x = gutter;
    for (text, style) in cells {
        let len = text.chars().count();
        if x + len >= width {
            break;
        }
        segments.push(Segment {
            x: x as u16,
            text: format!(" {}", text),
            style,
        });
        x += len + 1;
    }
    segments
}

/// Local date and time of a commit; `None` for an unknown (zero) timestamp
fn format_time(timestamp: i64) -> Option<String> {
    if timestamp <= 0 {
        return None;
    }
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|time| time.format("%x %X").to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, author: &str, message: &str) -> CommitInfo {
        CommitInfo {
            hash: hash.to_string(),
            author_name: Some(author.to_string()),
            committer_name: None,
            message: message.to_string(),
            timestamp: 0,
        }
    }

    fn branch(name: &str, relationship: RelationshipKind, commit: Option<CommitInfo>) -> BranchView {
        BranchView {
            name: name.to_string(),
            is_head: relationship == RelationshipKind::Current,
            last_commit: commit,
            relationship,
        }
    }

    fn sample() -> Vec<BranchView> {
        vec![
            branch(
                "main",
                RelationshipKind::Current,
                Some(commit("1a2b3c4d5e6f", "Ada", "Fix parser\n\nbody")),
            ),
            branch(
                "feature",
                RelationshipKind::Behind,
                Some(commit("99aa77ff0011", "Grace", "Add lexer")),
            ),
            branch("gh-pages", RelationshipKind::Unknown, None),
        ]
    }

    fn texts(rows: &[RenderedRow]) -> Vec<String> {
        rows.iter().map(RenderedRow::text).collect()
    }

    #[test]
    fn test_narrow_terminal_renders_nothing() {
        let rows = layout_rows(&sample(), Dimensions::new(5, 24), Theme::new(true));
        assert!(rows.is_empty());

        let rows = layout_rows(&sample(), Dimensions::new(9, 24), Theme::new(true));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rows_limited_to_height() {
        let mut branches = vec![branch("main", RelationshipKind::Current, None)];
        for i in 0..9 {
            branches.push(branch(&format!("topic-{}", i), RelationshipKind::Ahead, None));
        }

        let rows = layout_rows(&branches, Dimensions::new(80, 3), Theme::new(false));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].text(), "@ main");
        assert_eq!(rows.iter().map(|r| r.y).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_labels_and_columns() {
        let rows = layout_rows(&sample(), Dimensions::new(80, 24), Theme::new(false));
        assert_eq!(
            texts(&rows),
            vec![
                "@ main       1a2b3c4d   Ada Fix parser".to_string(),
                "  < feature  99aa77ff Grace Add lexer".to_string(),
                "  ? gh-pages".to_string(),
            ]
        );
    }

    #[test]
    fn test_gutter_follows_longest_name() {
        let rows = layout_rows(&sample(), Dimensions::new(80, 24), Theme::new(false));
        // "gh-pages" is 8 characters
        assert_eq!(rows[0].segments[1].x, 12);
        assert_eq!(rows[1].segments[1].x, 12);
    }

    #[test]
    fn test_columns_omitted_at_right_edge() {
        // Hash ends at 12 + 1 + 8 = 21; author would end at 27
        let rows = layout_rows(&sample(), Dimensions::new(24, 24), Theme::new(false));
        assert_eq!(rows[0].text(), "@ main       1a2b3c4d");
        assert_eq!(rows[0].segments.len(), 2);

        // A column reaching the edge exactly is dropped
        let rows = layout_rows(&sample(), Dimensions::new(20, 24), Theme::new(false));
        assert_eq!(rows[0].segments.len(), 1);
    }

    #[test]
    fn test_name_truncated_to_width() {
        let branches = vec![branch(
            "a-really-long-branch-name",
            RelationshipKind::Current,
            None,
        )];
        let rows = layout_rows(&branches, Dimensions::new(12, 5), Theme::new(false));
        assert_eq!(rows[0].text(), "@ a-really-l");
        assert!(rows[0].text().chars().count() <= 12);
    }

    #[test]
    fn test_nothing_written_past_width() {
        for width in MIN_WIDTH..60 {
            let rows = layout_rows(&sample(), Dimensions::new(width, 24), Theme::new(true));
            for row in rows {
                for segment in row.segments {
                    let end = usize::from(segment.x) + segment.text.chars().count();
                    assert!(end <= usize::from(width), "width {}: {:?}", width, segment);
                }
            }
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let dims = Dimensions::new(60, 10);
        let first = layout_rows(&sample(), dims, Theme::new(true));
        let second = layout_rows(&sample(), dims, Theme::new(true));
        assert_eq!(first, second);
    }

    #[test]
    fn test_timestamp_column_present_when_known() {
        let mut branches = sample();
        if let Some(c) = branches[0].last_commit.as_mut() {
            c.timestamp = 1_700_000_000;
        }
        let rows = layout_rows(&branches, Dimensions::new(120, 24), Theme::new(false));
        assert_eq!(rows[0].segments.len(), 5);
        assert_eq!(rows[1].segments.len(), 4);
    }

    #[test]
    fn test_colors() {
        let rows = layout_rows(&sample(), Dimensions::new(80, 24), Theme::new(true));
        assert_eq!(rows[0].segments[0].style.fg, Some(Color::Green));
        assert!(rows[0].segments[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(rows[1].segments[0].style.fg, Some(Color::Red));
        assert_eq!(rows[2].segments[0].style.fg, Some(Color::Magenta));
        assert_eq!(rows[0].segments[1].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_plain_theme_has_no_styles() {
        let rows = layout_rows(&sample(), Dimensions::new(80, 24), Theme::new(false));
        for row in rows {
            for segment in row.segments {
                assert_eq!(segment.style, Style::default());
            }
        }
    }

    #[test]
    fn test_error_row() {
        let rows = error_row("Cannot get head", Dimensions::new(80, 24), Theme::new(false));
        assert_eq!(texts(&rows), vec!["Error: Cannot get head".to_string()]);

        let rows = error_row("Cannot get head", Dimensions::new(10, 24), Theme::new(false));
        assert_eq!(rows[0].text(), "Error: Can");

        assert!(error_row("x", Dimensions::new(80, 0), Theme::new(false)).is_empty());
    }
}

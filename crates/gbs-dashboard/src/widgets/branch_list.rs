//! Branch list widget
//!
//! Paints [`RenderedRow`]s into a buffer, clipped to the target area.

use crate::layout::RenderedRow;
use ratatui::prelude::*;

pub struct BranchListWidget;

impl BranchListWidget {
    /// Paint `rows` relative to the top-left corner of `area`
    pub fn render(rows: &[RenderedRow], area: Rect, buf: &mut Buffer) {
        for row in rows {
            if row.y >= area.height {
                continue;
            }
            for segment in &row.segments {
                if segment.x >= area.width {
                    continue;
                }
                buf.set_stringn(
                    area.x + segment.x,
                    area.y + row.y,
                    &segment.text,
                    usize::from(area.width - segment.x),
                    segment.style,
                );
            }
        }
    }
}

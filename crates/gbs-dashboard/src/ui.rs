//! Frame composition
//!
//! Lays out the outcome of a refresh tick and paints it over the whole frame.

use crate::{
    app::TickOutcome,
    layout::{error_row, layout_rows, Dimensions, Theme},
    widgets::BranchListWidget,
};
use ratatui::{prelude::*, Frame};

/// Draw one tick's outcome over the entire frame
pub fn draw(frame: &mut Frame, outcome: &TickOutcome, theme: Theme) {
    let area = frame.area();
    let dims = Dimensions::new(area.width, area.height);

    let rows = match outcome {
        TickOutcome::Snapshot(snapshot) => layout_rows(&snapshot.branches, dims, theme),
        TickOutcome::Error(message) => error_row(message, dims, theme),
    };

    frame.render_widget(
        WidgetAdapter::new(|area, buf| BranchListWidget::render(&rows, area, buf)),
        area,
    );
}

/// Bridges static render functions to ratatui's Widget trait
struct WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    render_fn: F,
}

impl<F> WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    fn new(render_fn: F) -> Self {
        Self { render_fn }
    }
}

impl<F> Widget for WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        (self.render_fn)(area, buf);
    }
}

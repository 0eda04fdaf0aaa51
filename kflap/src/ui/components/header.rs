//! Title and column header for the flap table.

use ratatui::{
    prelude::*,
    style::{Modifier, Style},
    widgets::{Paragraph, Row},
    Frame,
};

pub const TITLE: &str = "Kubernetes Resource Monitor";

const COLUMNS: [&str; 5] = ["NAME", "TYPE", "NAMESPACE", "RESOURCE VERSION", "CHANGES"];

/// Draws the bold screen title.
pub fn draw_title(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(TITLE).style(Style::default().add_modifier(Modifier::BOLD)),
        area,
    );
}

/// Header row of the table, underlined in place of a bottom border.
pub fn header_row() -> Row<'static> {
    Row::new(COLUMNS).style(
        Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )
}

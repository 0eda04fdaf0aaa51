//! Layout utilities for the flap table.
//!
//! Columns have fixed widths; anything longer is cut with an ellipsis.

use ratatui::layout::{Constraint, Layout, Rect};

pub const NAME_WIDTH: u16 = 30;
pub const TYPE_WIDTH: u16 = 25;
pub const NAMESPACE_WIDTH: u16 = 20;
pub const VERSION_WIDTH: u16 = 20;
pub const CHANGES_WIDTH: u16 = 10;

/// Height of the status footer, including its leading blank line.
pub const FOOTER_HEIGHT: u16 = 5;

const ELLIPSIS: &str = "...";

/// Widths for [NAME, TYPE, NAMESPACE, RESOURCE VERSION, CHANGES].
pub fn column_widths() -> [Constraint; 5] {
    [
        Constraint::Length(NAME_WIDTH),
        Constraint::Length(TYPE_WIDTH),
        Constraint::Length(NAMESPACE_WIDTH),
        Constraint::Length(VERSION_WIDTH),
        Constraint::Length(CHANGES_WIDTH),
    ]
}

/// Splits the screen into [title, blank, table, footer].
pub fn screen_split(area: Rect) -> [Rect; 4] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .areas(area)
}

/// Cuts `s` to at most `max` characters, marking the cut with `...` when
/// there is room for it.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= ELLIPSIS.len() {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

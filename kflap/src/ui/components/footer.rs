//! Status footer below the table.

use chrono::{DateTime, Local};
use ratatui::{
    prelude::*,
    style::{palette::tailwind, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the footer reports about the current frame.
pub struct FooterInfo {
    pub shown: usize,
    pub tracked: usize,
    pub interval_secs: u64,
    pub last_poll: Option<DateTime<Local>>,
}

/// Draws the summary lines and the quit hint.
pub fn draw_footer(f: &mut Frame, area: Rect, info: &FooterInfo) {
    let dim = Style::default().fg(tailwind::GRAY.c400);
    let last_poll = info
        .last_poll
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let lines = vec![
        Line::default(),
        Line::from(format!(
            "Showing top {} resources sorted by changes(DESC), resourceVersion(DESC)",
            info.shown
        )),
        Line::from(format!("Polling interval: {} seconds", info.interval_secs)),
        Line::from(Span::styled(
            format!("Tracking {} objects, last poll at {}", info.tracked, last_poll),
            dim,
        )),
        quit_hint(),
    ];

    f.render_widget(Paragraph::new(lines), area);
}

/// `Press 'q' to quit.` with the key highlighted.
pub fn quit_hint() -> Line<'static> {
    Line::from(vec![
        Span::raw("Press '"),
        Span::styled(
            "q",
            Style::default()
                .fg(tailwind::YELLOW.c400)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("' to quit."),
    ])
}

//! Renders a [`FlapState`] frame.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{
    config::Config,
    monitor::ObjectRecord,
    sort::rank,
    ui::{
        components::{draw_footer, draw_title, header_row, quit_hint, FooterInfo},
        layout::{
            column_widths, screen_split, truncate, CHANGES_WIDTH, NAMESPACE_WIDTH, NAME_WIDTH,
            TYPE_WIDTH, VERSION_WIDTH,
        },
        state::{FlapState, Phase},
    },
};

pub const CLUSTER_PLACEHOLDER: &str = "<cluster>";

/// Draws the whole screen for the current phase.
pub fn draw(f: &mut Frame, area: Rect, state: &FlapState, config: &Config) {
    match state.phase() {
        Phase::Loading => f.render_widget(Paragraph::new("Loading..."), area),
        Phase::Failed(msg) => draw_error(f, area, msg),
        Phase::Ready => draw_table(f, area, state, config),
    }
}

fn draw_error(f: &mut Frame, area: Rect, msg: &str) {
    let text = Text::from(vec![
        Line::styled(format!("Error: {msg}"), Style::default().fg(Color::Red)),
        Line::default(),
        quit_hint(),
    ]);
    f.render_widget(Paragraph::new(text), area);
}

fn draw_table(f: &mut Frame, area: Rect, state: &FlapState, config: &Config) {
    let [title_area, _blank, table_area, footer_area] = screen_split(area);

    let ranked = rank(state.snapshot(), config.limit);

    draw_title(f, title_area);

    let rows: Vec<Row> = ranked.iter().map(record_row).collect();
    let table = Table::new(rows, column_widths()).header(header_row());
    f.render_widget(table, table_area);

    draw_footer(
        f,
        footer_area,
        &FooterInfo {
            shown: ranked.len(),
            tracked: state.snapshot().len(),
            interval_secs: config.interval_secs,
            last_poll: state.last_poll(),
        },
    );
}

fn record_row(record: &ObjectRecord) -> Row<'static> {
    let identity = &record.identity;
    let namespace = if identity.is_cluster_scoped() {
        CLUSTER_PLACEHOLDER.to_string()
    } else {
        truncate(&identity.namespace, NAMESPACE_WIDTH as usize)
    };

    let changes = Cell::from(truncate(&record.changes.to_string(), CHANGES_WIDTH as usize));
    let changes = if record.changes > 0 {
        changes.style(
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        changes
    };

    Row::new(vec![
        Cell::from(truncate(&identity.name, NAME_WIDTH as usize)),
        Cell::from(truncate(&identity.resource_type, TYPE_WIDTH as usize)),
        Cell::from(namespace),
        Cell::from(truncate(&record.last_version.to_string(), VERSION_WIDTH as usize)),
        changes,
    ])
}

//! Layout rendering (top bar with search input and status)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, PlaybackStatus, SessionSnapshot, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, snapshot: &SessionSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(16), // Loading / status
        ])
        .split(area);

    let search_focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if search_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text: &str = if ui_state.search_query.is_empty() && search_focused {
        "Type to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if search_focused {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let (status_text, status_color) = status_label(snapshot);
    let status = Paragraph::new(status_text)
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(status, chunks[1]);
}

fn status_label(snapshot: &SessionSnapshot) -> (&'static str, Color) {
    if snapshot.is_loading {
        return ("⟳ Loading...", Color::Yellow);
    }
    match snapshot.status {
        PlaybackStatus::Playing => ("▶ Playing", Color::Green),
        PlaybackStatus::Paused => ("⏸ Paused", Color::Cyan),
        PlaybackStatus::Ended => ("■ Ended", Color::DarkGray),
        PlaybackStatus::Idle => ("■ Idle", Color::DarkGray),
    }
}

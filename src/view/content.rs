//! Main content area rendering (search results list)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Paragraph, Wrap},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, SessionSnapshot, Track, UiState};
use super::utils::{
    calculate_track_column_widths, format_duration, render_scrollable_list, truncate_string,
    TrackColumns,
};

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    snapshot: &SessionSnapshot,
) {
    let is_focused = ui_state.active_section == ActiveSection::Results;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    // An error replaces the list entirely
    if let Some(error) = &snapshot.error_message {
        let content = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Results ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(content, area);
        return;
    }

    if snapshot.tracks.is_empty() {
        let hint = if snapshot.is_loading {
            "Loading..."
        } else {
            "Type in search and press Enter to find music\n\nUse Tab to switch between search and results\nPress H for all key bindings"
        };
        let content = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Results ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(content, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let items = render_track_items(
        &snapshot.tracks,
        ui_state.results_selected,
        is_focused,
        snapshot.playing_row(),
        content_width,
    );

    let title = format!(" Results ({}) ", snapshot.tracks.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    // +1 for header
    render_scrollable_list(frame, area, items, ui_state.results_selected + 1, block);
}

fn render_track_items(
    tracks: &[Track],
    selected_index: usize,
    is_focused: bool,
    playing_row: Option<usize>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let columns = calculate_track_column_widths(content_width, tracks.len());

    let mut items = vec![
        ListItem::new(format!(
            " {:<num$}   {:<title$}   {:<artist$}   {:<album$}   {:<genre$}   {:>duration$}",
            "#", "Title", "Artist", "Album", "Genre", "Duration",
            num = columns.num,
            title = columns.title,
            artist = columns.artist,
            album = columns.album,
            genre = columns.genre,
            duration = columns.duration,
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    items.extend(tracks.iter().enumerate().map(|(i, track)| {
        let is_playing = playing_row == Some(i);
        let style = if i == selected_index && is_focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_playing {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if i == selected_index {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        ListItem::new(track_row(track, i, is_playing, &columns)).style(style)
    }));

    items
}

fn track_row(track: &Track, index: usize, is_playing: bool, columns: &TrackColumns) -> String {
    let playing_indicator = if is_playing { "▶" } else { " " };
    format!(
        "{}{:<num$}   {}   {}   {}   {}   {:>duration$}",
        playing_indicator,
        index + 1,
        truncate_string(&track.title, columns.title),
        truncate_string(&track.artist, columns.artist),
        truncate_string(&track.album, columns.album),
        truncate_string(&track.genre, columns.genre),
        format_duration(track.duration_ms),
        num = columns.num,
        duration = columns.duration,
    )
}

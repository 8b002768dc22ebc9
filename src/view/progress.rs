//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{NowPlaying, PlaybackStatus, SessionSnapshot};
use super::utils::format_duration;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let status_text = if snapshot.playing_row().is_none() {
        format!(" {}", snapshot.now_playing.title)
    } else if snapshot.is_playing {
        format!(" ▶ {}", track_label(&snapshot.now_playing))
    } else {
        format!(" ⏸  {}", track_label(&snapshot.now_playing))
    };

    let position_ms = snapshot.position_ms();
    let duration_ms = snapshot.duration_ms().unwrap_or(0);

    let time_str = format!(
        "{} / {}",
        format_duration(position_ms),
        format_duration(duration_ms)
    );

    let progress_ratio = if duration_ms > 0 {
        (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let controls_info = match snapshot.status {
        PlaybackStatus::Playing => " Space pause | n/p skip | ←/→ seek ",
        _ => " Space play | n/p skip | ←/→ seek ",
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}

fn track_label(now_playing: &NowPlaying) -> String {
    if now_playing.artist.is_empty() {
        now_playing.title.clone()
    } else {
        format!("{} | {}", now_playing.title, now_playing.artist)
    }
}

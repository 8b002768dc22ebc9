//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Top bar (search input, status)
//! - `content`: Results list, or the error text that replaces it
//! - `progress`: Now-playing progress bar
//! - `overlays`: Help popup

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{SessionSnapshot, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, snapshot: &SessionSnapshot, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + status
                Constraint::Min(0),    // Results
                Constraint::Length(3), // Progress bar with now playing
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, snapshot);

        content::render_main_content(frame, chunks[1], ui_state, snapshot);

        progress::render_progress_bar(frame, chunks[2], snapshot);

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

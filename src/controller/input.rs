//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use super::{AppController, SearchOrigin};

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.shutdown().await;
            return Ok(());
        }

        let mut model = self.model.lock().await;

        // Help popup swallows everything but its close keys
        if model.is_help_popup_open() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup();
            }
            return Ok(());
        }

        if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
            model.cycle_section();
            return Ok(());
        }

        match model.active_section() {
            ActiveSection::Search => match key.code {
                KeyCode::Enter => {
                    let query = model.search_query().to_string();
                    drop(model);
                    self.submit_search(query, SearchOrigin::User);
                }
                KeyCode::Esc => model.clear_search(),
                KeyCode::Backspace => model.backspace_search(),
                KeyCode::Char(c) => model.append_to_search(c),
                _ => {}
            },
            ActiveSection::Results => match key.code {
                KeyCode::Up => model.move_selection_up(),
                KeyCode::Down => model.move_selection_down(),
                KeyCode::Enter => {
                    drop(model);
                    self.play_selected().await;
                }
                // Play/Pause toggle
                KeyCode::Char(' ') => {
                    drop(model);
                    self.toggle_playback().await;
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    drop(model);
                    self.next_track().await;
                }
                KeyCode::Char('p') | KeyCode::Char('P') => {
                    drop(model);
                    self.previous_track().await;
                }
                KeyCode::Right => {
                    drop(model);
                    self.seek_forward().await;
                }
                KeyCode::Left => {
                    drop(model);
                    self.seek_backward().await;
                }
                // Focus search
                KeyCode::Char('/') => model.set_active_section(ActiveSection::Search),
                KeyCode::Char('h') | KeyCode::Char('H') => model.show_help_popup(),
                KeyCode::Char('q') | KeyCode::Char('Q') => {
                    drop(model);
                    self.shutdown().await;
                }
                _ => {}
            },
        }
        Ok(())
    }
}

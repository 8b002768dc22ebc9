//! Main application model with state management
//!
//! `AppModel` is shared as `Arc<Mutex<AppModel>>` between the input loop, search
//! tasks, the engine event listener and the position poller. Every mutating
//! method publishes a fresh [`SessionSnapshot`] to the watch channel.

use tokio::sync::watch;

use super::playback::{PlaybackTiming, SessionSnapshot};
use super::session::PlaybackSession;
use super::track::Track;
use super::types::{ActiveSection, LoadState, UiState};
use crate::audio::{EngineEvent, EngineState};
use crate::error::{Error, Result};

pub struct AppModel {
    session: PlaybackSession,
    load_state: LoadState,
    ui_state: UiState,
    timing: PlaybackTiming,
    should_quit: bool,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl AppModel {
    pub fn new(session: PlaybackSession) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        let model = Self {
            session,
            load_state: LoadState::default(),
            ui_state: UiState::default(),
            timing: PlaybackTiming::default(),
            should_quit: false,
            snapshot_tx,
        };
        model.publish();
        model
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tracks: self.session.playlist().clone(),
            current_index: self.session.current_index(),
            now_playing: self.session.now_playing(),
            status: self.session.status(),
            is_playing: self.session.is_playing(),
            is_loading: self.load_state.is_loading,
            error_message: self.load_state.error_message.clone(),
            timing: self.timing.clone(),
            released: self.session.is_released(),
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Validate `term` and flag a load in flight. A blank term empties the
    /// playlist and shows the validation message instead.
    pub fn begin_search(&mut self, term: &str) -> Result<()> {
        if term.trim().is_empty() {
            self.session.replace_playlist(Vec::new());
            self.ui_state.results_selected = 0;
            self.load_state.error_message = Some(Error::EmptySearchTerm.user_message());
            self.publish();
            return Err(Error::EmptySearchTerm);
        }

        self.load_state.is_loading = true;
        self.load_state.error_message = None;
        self.publish();
        Ok(())
    }

    /// Apply a catalog completion. Completions arriving after release are dropped.
    pub fn finish_search(&mut self, term: &str, result: Result<Vec<Track>>) {
        if self.session.is_released() {
            tracing::debug!(term, "Session released, dropping search completion");
            return;
        }

        self.load_state.is_loading = false;
        match result {
            Ok(tracks) if !tracks.is_empty() => {
                self.session.replace_playlist(tracks);
                self.load_state.error_message = None;
            }
            Ok(_) => {
                self.session.replace_playlist(Vec::new());
                let error = Error::EmptyResult {
                    term: term.to_string(),
                };
                self.load_state.error_message = Some(error.user_message());
            }
            Err(e) => {
                self.session.replace_playlist(Vec::new());
                self.load_state.error_message = Some(e.user_message());
            }
        }
        self.ui_state.results_selected = 0;
        self.publish();
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub fn select_and_play(&mut self, index: usize) -> Result<()> {
        let result = self.session.select_and_play(index);
        self.publish();
        result
    }

    pub fn toggle_play_pause(&mut self) {
        self.session.toggle_play_pause();
        self.publish();
    }

    pub fn next(&mut self) {
        self.session.next();
        self.follow_current_track();
        self.publish();
    }

    pub fn previous(&mut self) {
        self.session.previous();
        self.follow_current_track();
        self.publish();
    }

    /// Seek relative to the current position, clamped at zero.
    pub fn seek_by(&mut self, delta_ms: i64) {
        if self.session.is_released() {
            return;
        }
        let current = self.session.position_ms();
        let target = current.saturating_add_signed(delta_ms);
        self.session.seek(target);
        self.sample_position();
    }

    /// Read the engine position into the published timing.
    pub fn sample_position(&mut self) {
        self.timing.update(
            self.session.position_ms(),
            self.session.duration_ms(),
            self.session.is_playing(),
        );
        self.publish();
    }

    pub fn apply_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::IsPlayingChanged(is_playing) => {
                self.session.on_is_playing_changed(is_playing);
                self.timing.set_playing(is_playing);
            }
            EngineEvent::TrackChanged => {
                self.timing.reset();
            }
            EngineEvent::StateChanged(state) => {
                if self.session.on_state_changed(state) {
                    self.follow_current_track();
                }
                if state == EngineState::Ready {
                    self.timing.duration_ms = self.session.duration_ms();
                }
            }
        }
        self.publish();
    }

    /// Deregister from and release the engine. Idempotent.
    pub fn release(&mut self) {
        self.session.release();
        self.timing.reset();
        self.publish();
    }

    /// Keep the list cursor on the track that just started
    fn follow_current_track(&mut self) {
        if let Some(index) = self.session.current_index() {
            if index < self.session.playlist().len() {
                self.ui_state.results_selected = index;
            }
        }
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub fn ui_state(&self) -> UiState {
        self.ui_state.clone()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_should_quit(&mut self, quit: bool) {
        self.should_quit = quit;
    }

    pub fn active_section(&self) -> ActiveSection {
        self.ui_state.active_section
    }

    pub fn cycle_section(&mut self) {
        self.ui_state.active_section = self.ui_state.active_section.next();
    }

    pub fn set_active_section(&mut self, section: ActiveSection) {
        self.ui_state.active_section = section;
    }

    pub fn search_query(&self) -> &str {
        &self.ui_state.search_query
    }

    pub fn append_to_search(&mut self, c: char) {
        self.ui_state.search_query.push(c);
    }

    pub fn backspace_search(&mut self) {
        self.ui_state.search_query.pop();
    }

    pub fn clear_search(&mut self) {
        self.ui_state.search_query.clear();
    }

    pub fn selected_row(&self) -> usize {
        self.ui_state.results_selected
    }

    pub fn move_selection_up(&mut self) {
        self.ui_state.results_selected = self.ui_state.results_selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let last = self.session.playlist().len().saturating_sub(1);
        if self.ui_state.results_selected < last {
            self.ui_state.results_selected += 1;
        }
    }

    pub fn is_help_popup_open(&self) -> bool {
        self.ui_state.show_help_popup
    }

    pub fn show_help_popup(&mut self) {
        self.ui_state.show_help_popup = true;
    }

    pub fn hide_help_popup(&mut self) {
        self.ui_state.show_help_popup = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlaybackStatus;
    use crate::test_support::{track, tracks, EngineCall, FakeEngine, FakeEngineHandle};

    fn model() -> (AppModel, FakeEngineHandle) {
        let (engine, handle) = FakeEngine::new();
        let (session, _events) = PlaybackSession::start(Box::new(engine));
        (AppModel::new(session), handle)
    }

    fn loaded(count: usize) -> (AppModel, FakeEngineHandle) {
        let (mut model, handle) = model();
        model.begin_search("anything").unwrap();
        model.finish_search("anything", Ok(tracks(count)));
        handle.clear_calls();
        (model, handle)
    }

    #[test]
    fn blank_term_sets_validation_message_and_empties_playlist() {
        let (mut model, _handle) = loaded(3);

        let err = model.begin_search("   ").unwrap_err();

        assert_eq!(err, Error::EmptySearchTerm);
        let snapshot = model.snapshot();
        assert!(snapshot.tracks.is_empty());
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error_message.as_deref(), Some("Search can't empty"));
    }

    #[test]
    fn starting_a_search_clears_the_previous_error() {
        let (mut model, _handle) = model();
        model.finish_search("zzz", Ok(Vec::new()));
        assert!(model.snapshot().error_message.is_some());

        model.begin_search("abba").unwrap();

        assert!(model.snapshot().is_loading);
        assert_eq!(model.snapshot().error_message, None);
    }

    #[test]
    fn empty_result_shows_message_naming_the_term() {
        let (mut model, _handle) = loaded(2);
        model.begin_search("zzzzqqq").unwrap();
        model.finish_search("zzzzqqq", Ok(Vec::new()));

        let snapshot = model.snapshot();
        assert!(!snapshot.is_loading);
        assert!(snapshot.tracks.is_empty());
        assert_eq!(
            snapshot.error_message.as_deref(),
            Some("No songs found for 'zzzzqqq'.")
        );
    }

    #[test]
    fn successful_search_replaces_playlist_and_clears_error() {
        let (mut model, _handle) = model();
        let _ = model.begin_search("");
        model.begin_search("neck deep").unwrap();
        model.finish_search("neck deep", Ok(tracks(4)));

        let snapshot = model.snapshot();
        assert_eq!(snapshot.tracks.len(), 4);
        assert_eq!(snapshot.error_message, None);
        assert!(!snapshot.is_loading);
    }

    #[test]
    fn failure_message_keeps_the_detail() {
        let (mut model, _handle) = loaded(2);
        model.begin_search("abba").unwrap();
        model.finish_search(
            "abba",
            Err(Error::Server {
                status: 500,
                reason: "Internal Server Error".to_string(),
                url: "https://itunes.apple.com/search?term=abba".to_string(),
            }),
        );

        let snapshot = model.snapshot();
        assert!(snapshot.tracks.is_empty());
        let message = snapshot.error_message.unwrap();
        assert!(message.starts_with("Error fetching songs: "));
        assert!(message.contains("500"));
        assert!(message.contains("term=abba"));
    }

    #[test]
    fn new_results_keep_the_current_selection_playing() {
        let (mut model, handle) = loaded(5);
        model.select_and_play(4).unwrap();
        handle.clear_calls();

        model.begin_search("other").unwrap();
        model.finish_search("other", Ok(tracks(2)));

        assert!(handle.calls().is_empty());
        let snapshot = model.snapshot();
        assert_eq!(snapshot.current_index, Some(4));
        assert_eq!(snapshot.now_playing.title, "Select a song");
        assert_eq!(snapshot.playing_row(), None);
    }

    #[test]
    fn completion_after_release_is_ignored() {
        let (mut model, _handle) = model();
        model.begin_search("abba").unwrap();
        model.release();

        model.finish_search("abba", Ok(tracks(3)));

        let snapshot = model.snapshot();
        assert!(snapshot.released);
        assert!(snapshot.tracks.is_empty());
        assert!(snapshot.is_loading);
    }

    #[test]
    fn every_change_is_published() {
        let (mut model, _handle) = model();
        let mut rx = model.subscribe();
        rx.mark_unchanged();

        model.begin_search("abba").unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_loading);

        model.finish_search("abba", Ok(tracks(2)));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().tracks.len(), 2);
    }

    #[test]
    fn engine_confirmation_drives_status() {
        let (mut model, _handle) = loaded(3);
        model.select_and_play(1).unwrap();

        model.apply_engine_event(EngineEvent::IsPlayingChanged(true));
        let snapshot = model.snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::Playing);
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.now_playing.title, track(1).title);
    }

    #[test]
    fn end_of_clip_advances_and_moves_the_cursor() {
        let (mut model, handle) = loaded(3);
        model.select_and_play(1).unwrap();
        handle.set_state(EngineState::Ended);
        handle.clear_calls();

        model.apply_engine_event(EngineEvent::StateChanged(EngineState::Ended));

        assert_eq!(model.session().current_index(), Some(2));
        assert_eq!(model.selected_row(), 2);
        assert_eq!(handle.calls()[0], EngineCall::Load(track(2).preview_url));
    }

    #[test]
    fn seek_by_is_clamped_at_zero() {
        let (mut model, handle) = loaded(1);
        model.select_and_play(0).unwrap();
        handle.set_position(2_000);
        handle.clear_calls();

        model.seek_by(-5_000);
        model.seek_by(5_000);

        assert_eq!(
            handle.calls(),
            vec![EngineCall::SeekTo(0), EngineCall::SeekTo(5_000)]
        );
        assert_eq!(model.snapshot().timing.position_ms, 5_000);
    }

    #[test]
    fn cursor_stays_inside_the_playlist() {
        let (mut model, _handle) = loaded(2);
        model.move_selection_up();
        assert_eq!(model.selected_row(), 0);
        model.move_selection_down();
        model.move_selection_down();
        assert_eq!(model.selected_row(), 1);

        model.begin_search("x").unwrap();
        model.finish_search("x", Ok(tracks(5)));
        assert_eq!(model.selected_row(), 0);
    }
}

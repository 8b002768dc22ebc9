//! Playback session: playlist, selection and transport control over an engine
//!
//! The session owns its [`PlaybackEngine`] exclusively. It registers the one
//! engine listener on start and, on [`PlaybackSession::release`] (or drop),
//! removes the listener before releasing the engine.
//!
//! The playlist can be swapped out underneath the current selection, so every
//! use of `current_index` is bounds-checked.

use std::sync::Arc;

use super::playback::{NowPlaying, PlaybackStatus};
use super::track::Track;
use crate::audio::{EngineEventChannel, EngineState, PlaybackEngine, NORMAL_SPEED};
use crate::error::{Error, Result};

pub struct PlaybackSession {
    engine: Option<Box<dyn PlaybackEngine>>,
    playlist: Arc<[Track]>,
    current_index: Option<usize>,
    status: PlaybackStatus,
    is_playing: bool,
}

impl PlaybackSession {
    /// Take ownership of `engine` and register the session's listener on it.
    pub fn start(mut engine: Box<dyn PlaybackEngine>) -> (Self, EngineEventChannel) {
        let events = engine.add_listener();
        let session = Self {
            engine: Some(engine),
            playlist: Arc::from(Vec::new()),
            current_index: None,
            status: PlaybackStatus::Idle,
            is_playing: false,
        };
        (session, events)
    }

    pub fn playlist(&self) -> &Arc<[Track]> {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Transport button projection, driven by engine notifications
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_released(&self) -> bool {
        self.engine.is_none()
    }

    /// The selected track, if the index still fits the current playlist
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    /// Swap in a new playlist. Selection and playback are left alone.
    pub fn replace_playlist(&mut self, tracks: Vec<Track>) {
        self.playlist = Arc::from(tracks);
        if let Some(index) = self.current_index {
            if index >= self.playlist.len() {
                tracing::debug!(
                    index,
                    len = self.playlist.len(),
                    "Current index is stale for the new playlist"
                );
            }
        }
    }

    pub fn now_playing(&self) -> NowPlaying {
        self.current_track()
            .map(NowPlaying::from_track)
            .unwrap_or_default()
    }

    pub fn select_and_play(&mut self, index: usize) -> Result<()> {
        let len = self.playlist.len();
        let Some(track) = self.playlist.get(index).cloned() else {
            tracing::warn!(index, len, "Ignoring selection outside the playlist");
            return Err(Error::InvalidSelection { index, len });
        };
        let Some(engine) = self.engine.as_mut() else {
            tracing::debug!(index, "Session released, ignoring selection");
            return Ok(());
        };

        self.current_index = Some(index);
        tracing::info!(
            index,
            track_id = track.id,
            title = %track.title,
            artist = %track.artist,
            "Playing preview"
        );

        engine.load(&track.preview_url);
        engine.prepare();
        engine.set_speed(NORMAL_SPEED);
        engine.play();
        Ok(())
    }

    pub fn toggle_play_pause(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if engine.is_playing() {
            engine.pause();
            self.status = PlaybackStatus::Paused;
            tracing::debug!("Playback paused");
            return;
        }

        match engine.state() {
            EngineState::Idle | EngineState::Ended => match self.current_index {
                Some(index) if index < self.playlist.len() => {
                    // Engine has nothing loaded any more; restart the selection from 0
                    let _ = self.select_and_play(index);
                }
                _ => tracing::warn!(
                    index = ?self.current_index,
                    len = self.playlist.len(),
                    "No valid track to resume"
                ),
            },
            EngineState::Buffering | EngineState::Ready => {
                engine.play();
                tracing::debug!("Playback resumed");
            }
        }
    }

    pub fn next(&mut self) {
        let len = self.playlist.len();
        if len == 0 {
            return;
        }
        let next = match self.current_index {
            Some(index) => (index + 1) % len,
            None => 0,
        };
        let _ = self.select_and_play(next);
    }

    pub fn previous(&mut self) {
        let len = self.playlist.len();
        if len == 0 {
            return;
        }
        let previous = match self.current_index {
            // A stale index still steps back from where it was, modulo the new length
            Some(index) => (index % len + len - 1) % len,
            None => len - 1,
        };
        let _ = self.select_and_play(previous);
    }

    pub fn seek(&mut self, position_ms: u64) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if matches!(engine.state(), EngineState::Idle) {
            tracing::debug!(position_ms, "Seek ignored, nothing loaded");
            return;
        }
        engine.seek_to(position_ms);
    }

    pub fn position_ms(&self) -> u64 {
        self.engine
            .as_ref()
            .map(|engine| engine.current_position_ms())
            .unwrap_or(0)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.engine.as_ref().and_then(|engine| engine.duration_ms())
    }

    // ========================================================================
    // Engine notifications
    // ========================================================================

    pub fn on_is_playing_changed(&mut self, is_playing: bool) {
        self.is_playing = is_playing;
        if is_playing {
            self.status = PlaybackStatus::Playing;
        } else if self.status == PlaybackStatus::Playing {
            let ready = self
                .engine
                .as_ref()
                .is_some_and(|engine| engine.state() == EngineState::Ready);
            if ready {
                self.status = PlaybackStatus::Paused;
            }
        }
    }

    /// Returns true when the end of a clip advanced the session to the next track.
    pub fn on_state_changed(&mut self, state: EngineState) -> bool {
        match state {
            EngineState::Ended => {
                let still_ended = self
                    .engine
                    .as_ref()
                    .is_some_and(|engine| engine.state() == EngineState::Ended);
                if self.engine.is_some() && !still_ended {
                    // A load since the clip ended already replaced it
                    tracing::debug!(index = ?self.current_index, "Ignoring stale end of clip");
                    return false;
                }
                self.status = PlaybackStatus::Ended;
                self.is_playing = false;
                if self.engine.is_none() || self.playlist.is_empty() {
                    return false;
                }
                tracing::debug!(index = ?self.current_index, "Clip ended, advancing");
                self.next();
                true
            }
            EngineState::Idle => {
                self.is_playing = false;
                self.status = PlaybackStatus::Idle;
                false
            }
            EngineState::Buffering | EngineState::Ready => false,
        }
    }

    /// Deregister the listener, stop and release the engine. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.remove_listener();
            engine.stop();
            engine.release();
            self.is_playing = false;
            self.status = PlaybackStatus::Idle;
            tracing::info!("Playback session released");
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.release();
    }
}

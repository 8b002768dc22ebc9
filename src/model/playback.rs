//! Playback-related types and the published view snapshot

use std::sync::Arc;
use std::time::Instant;

use super::track::Track;

pub const NO_SELECTION_TITLE: &str = "Select a song";

/// Session status as shown in the UI
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
}

/// Title and artist of the selected track
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self {
            title: NO_SELECTION_TITLE.to_string(),
            artist: String::new(),
        }
    }
}

impl NowPlaying {
    pub fn from_track(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
        }
    }
}

/// Last sampled engine position, extrapolated between samples for a smooth gauge
#[derive(Clone, Debug)]
pub struct PlaybackTiming {
    pub position_ms: u64,
    pub duration_ms: Option<u64>,
    pub is_playing: bool,
    pub last_update: Instant,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position_ms: 0,
            duration_ms: None,
            is_playing: false,
            last_update: Instant::now(),
        }
    }
}

impl PlaybackTiming {
    pub fn current_position_ms(&self) -> u64 {
        let Some(duration_ms) = self.duration_ms.filter(|d| *d > 0) else {
            return self.position_ms;
        };
        if self.is_playing {
            let elapsed = self.last_update.elapsed().as_millis() as u64;
            self.position_ms.saturating_add(elapsed).min(duration_ms)
        } else {
            self.position_ms.min(duration_ms)
        }
    }

    pub fn update(&mut self, position_ms: u64, duration_ms: Option<u64>, is_playing: bool) {
        self.position_ms = position_ms;
        self.duration_ms = duration_ms;
        self.is_playing = is_playing;
        self.last_update = Instant::now();
    }

    /// Freeze the extrapolated position, e.g. when playback pauses between samples
    pub fn set_playing(&mut self, is_playing: bool) {
        self.position_ms = self.current_position_ms();
        self.is_playing = is_playing;
        self.last_update = Instant::now();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything the view needs, captured at one point in time
#[derive(Clone, Debug, Default)]
pub struct SessionSnapshot {
    pub tracks: Arc<[Track]>,
    pub current_index: Option<usize>,
    pub now_playing: NowPlaying,
    pub status: PlaybackStatus,
    pub is_playing: bool,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub timing: PlaybackTiming,
    pub released: bool,
}

impl SessionSnapshot {
    pub fn position_ms(&self) -> u64 {
        self.timing.current_position_ms()
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.timing.duration_ms
    }

    /// Row of the list to mark as playing, if the index is valid for `tracks`
    pub fn playing_row(&self) -> Option<usize> {
        self.current_index.filter(|i| *i < self.tracks.len())
    }
}

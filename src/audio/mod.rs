//! Audio module - playback engine interface and the local preview player
//!
//! - `decoder`: symphonia decoding of a downloaded clip into device-ready samples
//! - `preview_player`: cpal-backed [`PlaybackEngine`] implementation

pub mod decoder;
mod preview_player;

use tokio::sync::mpsc;

pub use preview_player::PreviewPlayer;

/// Normal playback speed
pub const NORMAL_SPEED: f32 = 1.0;

/// Lifecycle of the media item loaded into an engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing loaded, or the last load failed
    Idle,
    /// Fetching/decoding the media item
    Buffering,
    /// Loaded and able to play from the current position
    Ready,
    /// Played through to the end
    Ended,
}

/// Notifications delivered to the registered listener
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    IsPlayingChanged(bool),
    TrackChanged,
    StateChanged(EngineState),
}

pub type EngineEventChannel = mpsc::UnboundedReceiver<EngineEvent>;

/// Media engine consumed by the playback session.
///
/// Calls never block on I/O; loading happens in the background and is
/// reported through [`EngineEvent`]s on the listener channel.
pub trait PlaybackEngine: Send {
    fn load(&mut self, uri: &str);
    fn prepare(&mut self);
    fn set_speed(&mut self, speed: f32);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Out-of-range positions are clamped by the engine.
    fn seek_to(&mut self, position_ms: u64);
    fn current_position_ms(&self) -> u64;
    /// `None` until a media item is ready
    fn duration_ms(&self) -> Option<u64>;
    fn is_playing(&self) -> bool;
    fn state(&self) -> EngineState;
    /// Registers the single listener, replacing any previous one.
    fn add_listener(&mut self) -> EngineEventChannel;
    fn remove_listener(&mut self);
    /// Frees the output device. The engine is unusable afterwards.
    fn release(&mut self);
}

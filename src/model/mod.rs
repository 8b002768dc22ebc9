//! Model module - Application state and data types
//!
//! - `types`: UI focus, load state and view-local UI state
//! - `playback`: status, now-playing, position timing and the view snapshot
//! - `track`: catalog tracks and the search record mapping
//! - `catalog_client`: catalog search client
//! - `session`: playback session state machine over a `PlaybackEngine`
//! - `app_model`: main application model with state management methods

mod types;
mod playback;
mod track;
mod catalog_client;
mod session;
mod app_model;

pub use types::{ActiveSection, UiState};

pub use playback::{NowPlaying, PlaybackStatus, SessionSnapshot};

pub use track::Track;

pub use catalog_client::{CatalogClient, ItunesClient};

pub use session::PlaybackSession;

pub use app_model::AppModel;

//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the playback session.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Transport controls, position polling and shutdown
//! - `search`: Search/load orchestration against the catalog
//! - `player_events`: Engine event listener

mod input;
mod playback;
mod search;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::model::{AppModel, CatalogClient};

pub use search::SearchOrigin;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) catalog: Arc<dyn CatalogClient>,
    pub(crate) config: Arc<Config>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, catalog: Arc<dyn CatalogClient>, config: Config) -> Self {
        Self {
            model,
            catalog,
            config: Arc::new(config),
        }
    }
}

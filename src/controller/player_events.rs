//! Player event listener for playback engine events

use tokio::task::JoinHandle;

use crate::audio::{EngineEvent, EngineEventChannel};
use super::AppController;

impl AppController {
    /// Apply engine notifications to the session until the engine drops the
    /// listener (on release) or the app quits.
    pub fn start_player_event_listener(&self, mut event_channel: EngineEventChannel) -> JoinHandle<()> {
        let model = self.model.clone();
        tracing::info!("Starting playback engine event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                let mut model_guard = model.lock().await;

                if model_guard.should_quit() || model_guard.session().is_released() {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                match event {
                    EngineEvent::IsPlayingChanged(is_playing) => {
                        tracing::debug!(is_playing, "EngineEvent::IsPlayingChanged");
                    }
                    EngineEvent::TrackChanged => {
                        tracing::debug!(index = ?model_guard.session().current_index(), "EngineEvent::TrackChanged");
                    }
                    EngineEvent::StateChanged(state) => {
                        tracing::debug!(?state, "EngineEvent::StateChanged");
                    }
                }
                model_guard.apply_engine_event(event);
            }
            tracing::debug!("Player event channel closed");
        })
    }
}

//! Playback control methods

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::AppController;

impl AppController {
    /// Play the highlighted row of the results list
    pub async fn play_selected(&self) {
        let mut model = self.model.lock().await;
        let index = model.selected_row();
        if let Err(e) = model.select_and_play(index) {
            tracing::warn!(index, error = %e, "Could not play selected row");
        }
    }

    pub async fn toggle_playback(&self) {
        let mut model = self.model.lock().await;
        tracing::debug!(is_playing = model.session().is_playing(), "Toggling playback");
        model.toggle_play_pause();
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        self.model.lock().await.next();
    }

    pub async fn previous_track(&self) {
        tracing::debug!("Skipping to previous track");
        self.model.lock().await.previous();
    }

    pub async fn seek_forward(&self) {
        let step = self.config.seek_step.as_millis() as i64;
        self.model.lock().await.seek_by(step);
    }

    pub async fn seek_backward(&self) {
        let step = self.config.seek_step.as_millis() as i64;
        self.model.lock().await.seek_by(-step);
    }

    /// Sample the engine position on a fixed cadence while a clip is playing.
    /// Stops once the app quits or the session is released.
    pub fn start_position_poller(&self) -> JoinHandle<()> {
        let model = self.model.clone();
        let period = self.config.position_poll_interval;
        tracing::debug!(period_ms = period.as_millis() as u64, "Starting position poller");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let mut model = model.lock().await;
                if model.should_quit() || model.session().is_released() {
                    tracing::debug!("Position poller shutting down");
                    break;
                }
                if model.session().is_playing() {
                    model.sample_position();
                }
            }
        })
    }

    /// Quit the UI loop and release the playback session
    pub async fn shutdown(&self) {
        let mut model = self.model.lock().await;
        model.set_should_quit(true);
        model.release();
    }
}

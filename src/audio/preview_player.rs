//! Local preview player: downloads a clip, decodes it and plays it through cpal

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::decoder::{decode_clip, extension_hint, DecodedClip};
use super::{EngineEvent, EngineEventChannel, EngineState, PlaybackEngine, NORMAL_SPEED};
use crate::config::Config;

const OUTPUT_THREAD_NAME: &str = "tunes-audio-output";
/// How often the output thread checks for a clip the callback ran off the end of
const END_CHECK_INTERVAL: Duration = Duration::from_millis(20);
const NO_PENDING_END: u64 = u64::MAX;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State shared between the engine handle, load tasks and the output callback
struct Shared {
    clip: Mutex<Option<Arc<DecodedClip>>>,
    /// Read offset into the clip's interleaved samples
    cursor: AtomicUsize,
    play_when_ready: AtomicBool,
    state: Mutex<EngineState>,
    listener: Mutex<Option<mpsc::UnboundedSender<EngineEvent>>>,
    /// Bumped on every load/stop so late downloads are discarded
    generation: AtomicU64,
    /// Generation whose clip the callback finished, or `NO_PENDING_END`
    ended_generation: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            clip: Mutex::new(None),
            cursor: AtomicUsize::new(0),
            play_when_ready: AtomicBool::new(false),
            state: Mutex::new(EngineState::Idle),
            listener: Mutex::new(None),
            generation: AtomicU64::new(0),
            ended_generation: AtomicU64::new(NO_PENDING_END),
        }
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(tx) = lock(&self.listener).as_ref() {
            let _ = tx.send(event);
        }
    }

    fn state(&self) -> EngineState {
        *lock(&self.state)
    }

    fn set_state(&self, new_state: EngineState) {
        let changed = {
            let mut state = lock(&self.state);
            let changed = *state != new_state;
            *state = new_state;
            changed
        };
        if changed {
            tracing::trace!(state = ?new_state, "Engine state changed");
            self.emit(EngineEvent::StateChanged(new_state));
        }
    }

    fn is_playing(&self) -> bool {
        self.play_when_ready.load(Ordering::Acquire) && self.state() == EngineState::Ready
    }

    /// Drop the current clip and return to `Idle`
    fn reset(&self) {
        let was_playing = self.is_playing();
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut clip = lock(&self.clip);
        *clip = None;
        self.cursor.store(0, Ordering::Release);
        self.set_state(EngineState::Idle);
        drop(clip);
        if was_playing {
            self.emit(EngineEvent::IsPlayingChanged(false));
        }
    }

    fn finish_prepare(&self, generation: u64, result: Result<DecodedClip>, uri: &str) {
        let mut clip = lock(&self.clip);
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(uri, "Discarding clip for a superseded load");
            return;
        }

        match result {
            Ok(decoded) => {
                tracing::info!(uri, duration_ms = decoded.duration_ms(), "Preview clip ready");
                *clip = Some(Arc::new(decoded));
                self.cursor.store(0, Ordering::Release);
                self.set_state(EngineState::Ready);
                drop(clip);
                if self.play_when_ready.load(Ordering::Acquire) {
                    self.emit(EngineEvent::IsPlayingChanged(true));
                }
            }
            Err(e) => {
                tracing::warn!(uri, error = %e, "Failed to load preview clip");
                *clip = None;
                self.set_state(EngineState::Idle);
            }
        }
    }

    /// Output callback body. Only atomics and `try_lock`; contended state yields
    /// silence and the end of a clip is reported by [`Shared::finish_ended_clip`].
    fn fill(&self, data: &mut [f32]) {
        if !self.play_when_ready.load(Ordering::Acquire) {
            data.fill(0.0);
            return;
        }

        let ready = matches!(self.state.try_lock().as_deref(), Ok(EngineState::Ready));
        let clip = match self.clip.try_lock() {
            Ok(guard) if ready => guard.clone(),
            _ => None,
        };
        let Some(clip) = clip else {
            data.fill(0.0);
            return;
        };

        let total = clip.samples.len();
        let start = self.cursor.load(Ordering::Acquire).min(total);
        let end = (start + data.len()).min(total);
        let copied = end - start;
        data[..copied].copy_from_slice(&clip.samples[start..end]);
        data[copied..].fill(0.0);

        // A seek that landed while we were copying wins
        let _ = self
            .cursor
            .compare_exchange(start, end, Ordering::AcqRel, Ordering::Acquire);

        if end >= total {
            self.play_when_ready.store(false, Ordering::Release);
            self.ended_generation
                .store(self.generation.load(Ordering::SeqCst), Ordering::Release);
        }
    }

    /// Publish the end of a clip flagged by the output callback. Runs off the
    /// audio thread. A clip replaced or stopped since then is left alone.
    fn finish_ended_clip(&self) {
        let ended = self.ended_generation.swap(NO_PENDING_END, Ordering::AcqRel);
        if ended == NO_PENDING_END {
            return;
        }

        let clip = lock(&self.clip);
        if self.generation.load(Ordering::SeqCst) != ended {
            tracing::debug!("Dropping end of clip for a superseded load");
            return;
        }
        let at_end = clip
            .as_ref()
            .is_some_and(|clip| self.cursor.load(Ordering::Acquire) >= clip.samples.len());

        self.emit(EngineEvent::IsPlayingChanged(false));
        if at_end {
            self.set_state(EngineState::Ended);
        }
    }
}

struct OutputThread {
    shutdown_tx: std_mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// [`PlaybackEngine`] that plays preview clips on the default output device.
///
/// The cpal stream is not `Send`, so it lives on its own thread for the
/// lifetime of the player.
pub struct PreviewPlayer {
    shared: Arc<Shared>,
    http: reqwest::Client,
    runtime: Handle,
    output: Option<OutputThread>,
    sample_rate: u32,
    channels: u16,
    uri: Option<String>,
}

impl PreviewPlayer {
    pub fn new(config: &Config) -> Result<Self> {
        let runtime = Handle::try_current()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let shared = Arc::new(Shared::new());
        let (output, sample_rate, channels) = spawn_output_thread(shared.clone())?;

        tracing::info!(sample_rate, channels, "Audio output initialized");

        Ok(Self {
            shared,
            http,
            runtime,
            output: Some(output),
            sample_rate,
            channels,
            uri: None,
        })
    }
}

fn spawn_output_thread(shared: Arc<Shared>) -> Result<(OutputThread, u32, u16)> {
    let (ready_tx, ready_rx) = std_mpsc::channel::<std::result::Result<(u32, u16), String>>();
    let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();

    let handle = std::thread::Builder::new()
        .name(OUTPUT_THREAD_NAME.to_string())
        .spawn(move || {
            let stream = match build_stream(shared.clone()) {
                Ok((stream, sample_rate, channels)) => {
                    let _ = ready_tx.send(Ok((sample_rate, channels)));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            // Runs until release() signals or the player is dropped
            while let Err(std_mpsc::RecvTimeoutError::Timeout) =
                shutdown_rx.recv_timeout(END_CHECK_INTERVAL)
            {
                shared.finish_ended_clip();
            }
            drop(stream);
            tracing::debug!("Audio output thread stopped");
        })?;

    let (sample_rate, channels) = ready_rx
        .recv()
        .map_err(|_| anyhow!("audio output thread exited during setup"))?
        .map_err(|e| anyhow!("audio output unavailable: {}", e))?;

    Ok((OutputThread { shutdown_tx, handle }, sample_rate, channels))
}

fn build_stream(shared: Arc<Shared>) -> Result<(cpal::Stream, u32, u16)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("no default output device"))?;

    let stream_config: cpal::StreamConfig = device.default_output_config()?.into();
    let sample_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| shared.fill(data),
        |err| tracing::error!(error = %err, "Audio stream error"),
        None,
    )?;
    stream.play()?;

    Ok((stream, sample_rate, channels))
}

async fn fetch_and_decode(
    http: reqwest::Client,
    uri: String,
    sample_rate: u32,
    channels: u16,
) -> Result<DecodedClip> {
    let response = http.get(&uri).send().await?.error_for_status()?;
    let bytes = response.bytes().await?.to_vec();
    tracing::debug!(uri = %uri, bytes = bytes.len(), "Preview clip downloaded");

    let extension = extension_hint(&uri).map(str::to_owned);
    let clip = tokio::task::spawn_blocking(move || {
        decode_clip(bytes, extension.as_deref(), sample_rate, channels)
    })
    .await??;
    Ok(clip)
}

impl PlaybackEngine for PreviewPlayer {
    fn load(&mut self, uri: &str) {
        tracing::debug!(uri, "Loading media item");
        self.shared.reset();
        self.uri = Some(uri.to_string());
        self.shared.emit(EngineEvent::TrackChanged);
    }

    fn prepare(&mut self) {
        let Some(uri) = self.uri.clone() else {
            tracing::warn!("prepare() called with no media item loaded");
            return;
        };

        let generation = self.shared.generation.load(Ordering::SeqCst);
        self.shared.set_state(EngineState::Buffering);

        let shared = self.shared.clone();
        let http = self.http.clone();
        let (sample_rate, channels) = (self.sample_rate, self.channels);
        self.runtime.spawn(async move {
            let result = fetch_and_decode(http, uri.clone(), sample_rate, channels).await;
            shared.finish_prepare(generation, result, &uri);
        });
    }

    fn set_speed(&mut self, speed: f32) {
        if (speed - NORMAL_SPEED).abs() > f32::EPSILON {
            tracing::warn!(speed, "Only normal playback speed is supported");
        }
    }

    fn play(&mut self) {
        let was_playing = self.shared.is_playing();
        self.shared.play_when_ready.store(true, Ordering::Release);
        if !was_playing && self.shared.is_playing() {
            self.shared.emit(EngineEvent::IsPlayingChanged(true));
        }
    }

    fn pause(&mut self) {
        let was_playing = self.shared.is_playing();
        self.shared.play_when_ready.store(false, Ordering::Release);
        if was_playing {
            self.shared.emit(EngineEvent::IsPlayingChanged(false));
        }
    }

    fn stop(&mut self) {
        self.shared.play_when_ready.store(false, Ordering::Release);
        self.shared.reset();
        self.uri = None;
    }

    fn seek_to(&mut self, position_ms: u64) {
        let clip = lock(&self.shared.clip);
        let Some(clip) = clip.as_ref() else {
            return;
        };
        let offset = clip.offset_for_ms(position_ms);
        self.shared.cursor.store(offset, Ordering::Release);
        if offset < clip.samples.len() && self.shared.state() == EngineState::Ended {
            self.shared.set_state(EngineState::Ready);
        }
    }

    fn current_position_ms(&self) -> u64 {
        lock(&self.shared.clip)
            .as_ref()
            .map(|clip| clip.ms_for_offset(self.shared.cursor.load(Ordering::Acquire)))
            .unwrap_or(0)
    }

    fn duration_ms(&self) -> Option<u64> {
        lock(&self.shared.clip).as_ref().map(|clip| clip.duration_ms())
    }

    fn is_playing(&self) -> bool {
        self.shared.is_playing()
    }

    fn state(&self) -> EngineState {
        self.shared.state()
    }

    fn add_listener(&mut self) -> EngineEventChannel {
        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&self.shared.listener) = Some(tx);
        rx
    }

    fn remove_listener(&mut self) {
        *lock(&self.shared.listener) = None;
    }

    fn release(&mut self) {
        self.stop();
        if let Some(output) = self.output.take() {
            let _ = output.shutdown_tx.send(());
            if output.handle.join().is_err() {
                tracing::warn!("Audio output thread panicked");
            }
            tracing::info!("Audio output released");
        }
    }
}

impl Drop for PreviewPlayer {
    fn drop(&mut self) {
        self.release();
    }
}

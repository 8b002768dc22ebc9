//! Fakes shared by the unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use crate::audio::{EngineEvent, EngineEventChannel, EngineState, PlaybackEngine};
use crate::error::Result;
use crate::model::{CatalogClient, Track};

pub const FAKE_CLIP_MS: u64 = 30_000;

pub fn track(i: usize) -> Track {
    Track {
        id: i as i64,
        title: format!("Song {i}"),
        artist: format!("Artist {i}"),
        album: format!("Album {i}"),
        preview_url: format!("https://audio.example/{i}.m4a"),
        artwork_url: format!("https://art.example/{i}.jpg"),
        duration_ms: 180_000,
        genre: "Rock".to_string(),
    }
}

pub fn tracks(count: usize) -> Vec<Track> {
    (0..count).map(track).collect()
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    Load(String),
    Prepare,
    SetSpeed(f32),
    Play,
    Pause,
    Stop,
    SeekTo(u64),
    AddListener,
    RemoveListener,
    Release,
}

struct FakeState {
    calls: Vec<EngineCall>,
    state: EngineState,
    playing: bool,
    position_ms: u64,
    duration_ms: Option<u64>,
    listener: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl FakeState {
    fn emit(&self, event: EngineEvent) {
        if let Some(listener) = &self.listener {
            let _ = listener.send(event);
        }
    }
}

fn lock(inner: &Mutex<FakeState>) -> MutexGuard<'_, FakeState> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Engine that records calls and confirms playback immediately
pub struct FakeEngine {
    inner: Arc<Mutex<FakeState>>,
}

/// Test-side view of a [`FakeEngine`] after it moved into a session
#[derive(Clone)]
pub struct FakeEngineHandle {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> (Self, FakeEngineHandle) {
        let inner = Arc::new(Mutex::new(FakeState {
            calls: Vec::new(),
            state: EngineState::Idle,
            playing: false,
            position_ms: 0,
            duration_ms: None,
            listener: None,
        }));
        (
            Self {
                inner: inner.clone(),
            },
            FakeEngineHandle { inner },
        )
    }

    fn record(&self, call: EngineCall) -> MutexGuard<'_, FakeState> {
        let mut state = lock(&self.inner);
        state.calls.push(call);
        state
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, uri: &str) {
        let mut state = self.record(EngineCall::Load(uri.to_string()));
        state.state = EngineState::Buffering;
        state.playing = false;
        state.position_ms = 0;
        state.duration_ms = None;
        state.emit(EngineEvent::TrackChanged);
    }

    fn prepare(&mut self) {
        let mut state = self.record(EngineCall::Prepare);
        state.state = EngineState::Ready;
        state.duration_ms = Some(FAKE_CLIP_MS);
    }

    fn set_speed(&mut self, speed: f32) {
        drop(self.record(EngineCall::SetSpeed(speed)));
    }

    fn play(&mut self) {
        let mut state = self.record(EngineCall::Play);
        if !state.playing && state.state != EngineState::Idle {
            state.playing = true;
            state.emit(EngineEvent::IsPlayingChanged(true));
        }
    }

    fn pause(&mut self) {
        let mut state = self.record(EngineCall::Pause);
        if state.playing {
            state.playing = false;
            state.emit(EngineEvent::IsPlayingChanged(false));
        }
    }

    fn stop(&mut self) {
        let mut state = self.record(EngineCall::Stop);
        state.playing = false;
        state.state = EngineState::Idle;
    }

    fn seek_to(&mut self, position_ms: u64) {
        let mut state = self.record(EngineCall::SeekTo(position_ms));
        state.position_ms = match state.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        };
    }

    fn current_position_ms(&self) -> u64 {
        lock(&self.inner).position_ms
    }

    fn duration_ms(&self) -> Option<u64> {
        lock(&self.inner).duration_ms
    }

    fn is_playing(&self) -> bool {
        lock(&self.inner).playing
    }

    fn state(&self) -> EngineState {
        lock(&self.inner).state
    }

    fn add_listener(&mut self) -> EngineEventChannel {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.record(EngineCall::AddListener);
        state.listener = Some(tx);
        rx
    }

    fn remove_listener(&mut self) {
        let mut state = self.record(EngineCall::RemoveListener);
        state.listener = None;
    }

    fn release(&mut self) {
        let mut state = self.record(EngineCall::Release);
        state.state = EngineState::Idle;
        state.playing = false;
    }
}

impl FakeEngineHandle {
    pub fn calls(&self) -> Vec<EngineCall> {
        lock(&self.inner).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.inner).calls.clear();
    }

    /// Change the engine state and notify the listener
    pub fn set_state(&self, engine_state: EngineState) {
        let mut state = lock(&self.inner);
        state.state = engine_state;
        state.emit(EngineEvent::StateChanged(engine_state));
    }

    pub fn set_playing(&self, playing: bool) {
        lock(&self.inner).playing = playing;
    }

    pub fn set_position(&self, position_ms: u64) {
        lock(&self.inner).position_ms = position_ms;
    }

    pub fn has_listener(&self) -> bool {
        lock(&self.inner).listener.is_some()
    }
}

/// Catalog returning the same canned result for every term
pub struct StaticCatalog {
    result: Result<Vec<Track>>,
    calls: AtomicUsize,
    terms: Mutex<Vec<String>>,
}

impl StaticCatalog {
    pub fn new(result: Result<Vec<Track>>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            terms: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn terms(&self) -> Vec<String> {
        self.terms
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CatalogClient for StaticCatalog {
    async fn search(&self, term: &str) -> Result<Vec<Track>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.terms
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(term.to_string());
        self.result.clone()
    }
}

/// Catalog whose responses are held back until the test releases them
pub struct GatedCatalog {
    responses: HashMap<String, (Arc<Notify>, Result<Vec<Track>>)>,
    calls: AtomicUsize,
}

impl GatedCatalog {
    pub fn new(responses: Vec<(&str, Result<Vec<Track>>)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(term, result)| (term.to_string(), (Arc::new(Notify::new()), result)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Let the pending (or next) request for `term` complete
    pub fn release(&self, term: &str) {
        if let Some((gate, _)) = self.responses.get(term) {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl CatalogClient for GatedCatalog {
    async fn search(&self, term: &str) -> Result<Vec<Track>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some((gate, result)) = self.responses.get(term) else {
            return Ok(Vec::new());
        };
        gate.notified().await;
        result.clone()
    }
}

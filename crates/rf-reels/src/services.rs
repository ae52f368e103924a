//! Collaborator contracts: assets, audio, spin control, win presentation
//!
//! The engine never reaches into ambient registries. Everything it needs from
//! the host — resolved visual handles, audio cues, the spin button's enabled
//! state, the decorative win animation — is bundled into a [`Services`] value
//! constructed once and injected at machine construction. Hosts pass real
//! implementations; tests pass doubles.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::symbols::SymbolSet;

/// Opaque resolved visual handle for one appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppearanceHandle(u32);

impl AppearanceHandle {
    /// Raw id, stable for the lifetime of the catalog
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Process-scoped appearance registry keyed by asset name
///
/// Absence of a required appearance is a fatal construction error for the
/// component that needs it — the engine fails fast instead of rendering a
/// blank symbol.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    entries: HashMap<String, AppearanceHandle>,
    next_id: u32,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-loaded with the standard symbol alphabet
    pub fn with_standard_symbols() -> Self {
        let mut catalog = Self::new();
        for name in SymbolSet::standard().names() {
            catalog.register(name);
        }
        catalog
    }

    /// Register an appearance. Registering the same name twice returns the
    /// original handle.
    pub fn register(&mut self, name: impl Into<String>) -> AppearanceHandle {
        let name = name.into();
        if let Some(&handle) = self.entries.get(&name) {
            return handle;
        }
        let handle = AppearanceHandle(self.next_id);
        self.next_id += 1;
        self.entries.insert(name, handle);
        handle
    }

    /// Resolve an appearance by name
    pub fn appearance(&self, name: &str) -> Option<AppearanceHandle> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Audio cue playback. Both operations are contractual no-ops for
/// unregistered aliases; callers never check existence first.
pub trait AudioSink {
    fn play(&self, alias: &str);
    fn stop(&self, alias: &str);
}

/// Audio sink that swallows every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&self, _alias: &str) {}
    fn stop(&self, _alias: &str) {}
}

const DEFAULT_VOLUME: f32 = 0.7;

#[derive(Debug, Clone, Copy)]
struct SoundState {
    volume: f32,
    playing: bool,
}

/// Alias-keyed sound registry
///
/// Mirrors a host-side sound manager: cues are `add`ed once at load time and
/// later driven by alias. Play/stop on an alias that was never added does
/// nothing.
#[derive(Debug, Default)]
pub struct AudioBus {
    sounds: Mutex<HashMap<String, SoundState>>,
}

impl AudioBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cue alias at the default volume
    pub fn add(&self, alias: impl Into<String>) {
        self.sounds.lock().insert(
            alias.into(),
            SoundState {
                volume: DEFAULT_VOLUME,
                playing: false,
            },
        );
    }

    /// Is the cue currently marked as playing?
    pub fn is_playing(&self, alias: &str) -> bool {
        self.sounds
            .lock()
            .get(alias)
            .map(|s| s.playing)
            .unwrap_or(false)
    }

    /// Configured volume for a registered cue
    pub fn volume(&self, alias: &str) -> Option<f32> {
        self.sounds.lock().get(alias).map(|s| s.volume)
    }
}

impl AudioSink for AudioBus {
    fn play(&self, alias: &str) {
        if let Some(state) = self.sounds.lock().get_mut(alias) {
            state.playing = true;
            debug!("audio cue started: {alias}");
        }
    }

    fn stop(&self, alias: &str) {
        if let Some(state) = self.sounds.lock().get_mut(alias) {
            state.playing = false;
            debug!("audio cue stopped: {alias}");
        }
    }
}

/// The spin-initiation affordance. The orchestrator decides *when* it is
/// enabled; the host decides how each state renders.
pub trait SpinControl {
    fn set_enabled(&self, enabled: bool);
}

/// Control that ignores every toggle
#[derive(Debug, Default)]
pub struct NullControl;

impl SpinControl for NullControl {
    fn set_enabled(&self, _enabled: bool) {}
}

/// Decorative win animation surface. Optional: the machine runs fine without
/// one, the win simply has no visual.
pub trait WinPresenter {
    fn show(&self);
    fn hide(&self);
}

/// Collaborators the machine is constructed with
pub struct Services {
    pub assets: AssetCatalog,
    pub audio: Arc<dyn AudioSink>,
    pub control: Arc<dyn SpinControl>,
    pub win_presenter: Option<Arc<dyn WinPresenter>>,
}

impl Services {
    /// Headless bundle: standard symbol catalog, no audio output, no control,
    /// no win animation. Used by simulations and tests.
    pub fn headless() -> Self {
        Self {
            assets: AssetCatalog::with_standard_symbols(),
            audio: Arc::new(NullAudio),
            control: Arc::new(NullControl),
            win_presenter: None,
        }
    }
}

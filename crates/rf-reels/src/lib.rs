//! # rf-reels — Reel Motion & Spin Choreography Engine
//!
//! Drives the visible behavior of a multi-reel slot machine: spinning reels
//! with physically plausible deceleration, staggered start/stop choreography
//! across reels, and a post-spin win evaluation. Rendering, asset loading and
//! audio playback stay on the host side behind narrow service contracts.
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine
//!     │
//!     ├── MachineConfig (geometry, motion, choreography timing)
//!     ├── Services (asset catalog, audio sink, spin control, win presenter)
//!     ├── TimerQueue<SpinAction> (rf-sched: the spin-cycle timeline)
//!     └── Vec<Reel>
//!           │
//!           v
//!     per-frame update(delta_ms) → wrap / decelerate / snap-to-grid
//! ```
//!
//! Everything runs single-threaded and cooperatively: the host render loop
//! calls [`SlotMachine::update`] once per frame, and all waiting is expressed
//! as deferred actions on an explicit clock — a test can play a whole spin
//! cycle without touching wall-clock time.

pub mod config;
pub mod error;
pub mod machine;
pub mod reel;
pub mod services;
pub mod symbols;

pub use config::{MachineConfig, MotionProfile, ReelGeometry, SpinTiming};
pub use error::{ReelError, ReelResult};
pub use machine::{REEL_SPIN_CUE, SessionStats, SlotMachine, WIN_CUE};
pub use reel::{Reel, ReelPhase, ReelSymbol};
pub use services::{
    AppearanceHandle, AssetCatalog, AudioBus, AudioSink, NullAudio, NullControl, Services,
    SpinControl, WinPresenter,
};
pub use symbols::SymbolSet;

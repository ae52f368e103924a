//! Reel motion state machine
//!
//! One reel owns a strip of symbol positions and a scalar speed. Each frame
//! it advances every symbol backward, wraps positions around the fixed-width
//! track, decays speed exponentially once told to stop, and snaps the strip
//! onto the discrete grid when the speed falls under the terminal threshold.
//!
//! The state machine is three-phase:
//!
//! ```text
//! Idle ──start_spin──▶ Spinning ──stop_spin──▶ Decelerating ──(speed < threshold)──▶ Idle
//!                         ▲                         │
//!                         └───────start_spin────────┘   (re-arm is legal)
//! ```
//!
//! The only transition out of Decelerating besides re-arming is the automatic
//! threshold crossing, which triggers the grid snap exactly once.

use log::warn;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{MotionProfile, ReelGeometry};
use crate::error::{ReelError, ReelResult};
use crate::services::{AppearanceHandle, AssetCatalog};
use crate::symbols::SymbolSet;

/// Motion phase derived from the spin flag and current speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelPhase {
    /// Fully at rest
    Idle,
    /// Commanded to spin at full speed
    Spinning,
    /// Stop requested, speed decaying toward the terminal threshold
    Decelerating,
}

/// Overshooting ease used for the terminal settle (back-out)
fn ease_out_back(t: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u * u * u + C1 * u * u
}

/// In-flight settle animation toward a grid cell
#[derive(Debug, Clone, Copy)]
struct SettleTween {
    from: f64,
    to: f64,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl SettleTween {
    fn sample(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * ease_out_back(t)
    }

    fn finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

/// One symbol slot on the strip
#[derive(Debug, Clone)]
pub struct ReelSymbol {
    position: f64,
    appearance: usize,
    settle: Option<SettleTween>,
}

impl ReelSymbol {
    /// Axial offset of the symbol on the track
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Index into the reel's resolved appearance palette
    pub fn appearance_index(&self) -> usize {
        self.appearance
    }

    /// Is a settle ease currently moving this symbol?
    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }
}

/// A single reel: strip motion, wraparound, deceleration and grid snap
pub struct Reel {
    geometry: ReelGeometry,
    motion: MotionProfile,
    symbol_set: SymbolSet,
    palette: Vec<AppearanceHandle>,
    symbols: Vec<ReelSymbol>,
    speed: f64,
    spinning: bool,
    rng: ChaCha8Rng,
}

impl Reel {
    /// Build a reel, resolving every symbol-set appearance through the
    /// catalog. An unresolved appearance is fatal: the reel refuses to exist
    /// half-built rather than rendering blanks.
    pub fn new(
        geometry: ReelGeometry,
        motion: MotionProfile,
        symbol_set: SymbolSet,
        assets: &AssetCatalog,
        mut rng: ChaCha8Rng,
    ) -> ReelResult<Self> {
        geometry.validate()?;
        motion.validate()?;
        if symbol_set.is_empty() {
            return Err(ReelError::EmptySymbolSet);
        }

        let palette = symbol_set
            .names()
            .map(|name| {
                assets.appearance(name).ok_or_else(|| ReelError::MissingAsset {
                    name: name.to_string(),
                })
            })
            .collect::<ReelResult<Vec<_>>>()?;

        let symbols = (0..geometry.slot_count)
            .map(|i| ReelSymbol {
                position: i as f64 * geometry.slot_size,
                appearance: symbol_set.sample(&mut rng),
                settle: None,
            })
            .collect();

        Ok(Self {
            geometry,
            motion,
            symbol_set,
            palette,
            symbols,
            speed: 0.0,
            spinning: false,
            rng,
        })
    }

    /// Command full-speed spinning. Legal from any phase: re-arming a
    /// decelerating or settling reel returns it directly to Spinning.
    /// Idempotent while already spinning.
    pub fn start_spin(&mut self) {
        self.spinning = true;
        self.speed = self.motion.spin_speed;
        for symbol in &mut self.symbols {
            symbol.settle = None;
        }
    }

    /// Request a stop. Speed is not zeroed here — deceleration happens in
    /// `update`. Idempotent.
    pub fn stop_spin(&mut self) {
        self.spinning = false;
    }

    /// Advance the strip by one frame of `delta_ms` milliseconds.
    pub fn update(&mut self, delta_ms: f64) {
        if !self.state_is_finite() {
            warn!("non-finite reel state, resetting to idle grid");
            self.reset_to_grid();
            return;
        }

        let settling = self.symbols.iter().any(|s| s.settle.is_some());
        if !self.spinning && self.speed == 0.0 && !settling {
            return;
        }

        let delta = delta_ms.max(0.0);
        let movement = self.speed * delta;
        if movement > 0.0 {
            let track = self.geometry.track_width();
            let slot = self.geometry.slot_size;
            for symbol in &mut self.symbols {
                symbol.position -= movement;
                // Looped so a stalled frame cannot strand a symbol past the
                // wrap boundary.
                while symbol.position <= -slot {
                    symbol.position += track;
                    // Resample only while actively spinning: symbols visible
                    // during the slowdown are what the player sees land.
                    if self.spinning {
                        symbol.appearance = self.symbol_set.sample(&mut self.rng);
                    }
                }
            }
        }

        if !self.spinning && self.speed > 0.0 {
            self.speed *= self.motion.slowdown_rate;
            if self.speed < self.motion.min_speed_threshold {
                self.speed = 0.0;
                self.snap_to_grid();
            }
        }

        for symbol in &mut self.symbols {
            if let Some(tween) = &mut symbol.settle {
                tween.elapsed_ms += delta;
                symbol.position = tween.sample();
                if tween.finished() {
                    symbol.position = tween.to;
                    symbol.settle = None;
                }
            }
        }
    }

    /// Lock every symbol onto its nearest grid cell and start the settle
    /// ease toward it. Idempotent: a symbol already on target is untouched.
    fn snap_to_grid(&mut self) {
        let track = self.geometry.track_width();
        let slot = self.geometry.slot_size;
        let count = self.geometry.slot_count;

        for symbol in &mut self.symbols {
            let original = symbol.position;
            let normalized = original.rem_euclid(track);
            let grid = (normalized / slot).round() as usize % count;
            let target = grid as f64 * slot;

            if (original - target).abs() < 1e-9 {
                symbol.position = target;
                symbol.settle = None;
                continue;
            }

            // A symbol that wrapped past the left edge and lands in the last
            // two slots enters from the right side of the track, so it does
            // not slide backward across the whole strip.
            let wrapping_to_right = original < 0.0 && grid + 2 >= count;
            let from = if wrapping_to_right {
                target + track
            } else {
                original
            };

            symbol.position = from;
            symbol.settle = Some(SettleTween {
                from,
                to: target,
                elapsed_ms: 0.0,
                duration_ms: self.motion.settle_duration_ms,
            });
        }
    }

    /// Defensive reset: hard-stop and re-align the strip to the grid.
    fn reset_to_grid(&mut self) {
        self.speed = 0.0;
        self.spinning = false;
        for (i, symbol) in self.symbols.iter_mut().enumerate() {
            symbol.position = i as f64 * self.geometry.slot_size;
            symbol.settle = None;
        }
    }

    fn state_is_finite(&self) -> bool {
        self.speed.is_finite() && self.symbols.iter().all(|s| s.position.is_finite())
    }

    /// Replace the strip RNG (reproducible sessions)
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn phase(&self) -> ReelPhase {
        if self.spinning {
            ReelPhase::Spinning
        } else if self.speed > 0.0 {
            ReelPhase::Decelerating
        } else {
            ReelPhase::Idle
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Is any symbol still easing onto the grid?
    pub fn is_settling(&self) -> bool {
        self.symbols.iter().any(|s| s.settle.is_some())
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn geometry(&self) -> ReelGeometry {
        self.geometry
    }

    pub fn symbols(&self) -> &[ReelSymbol] {
        &self.symbols
    }

    /// Resolved appearance handles, index-parallel to the symbol set
    pub fn palette(&self) -> &[AppearanceHandle] {
        &self.palette
    }
}

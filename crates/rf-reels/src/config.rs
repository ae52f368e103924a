//! Machine, reel and choreography configuration

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};

/// Fixed layout of one reel strip
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReelGeometry {
    /// Number of discrete symbol slots on the strip
    pub slot_count: usize,
    /// Width of one slot in world units
    pub slot_size: f64,
}

impl ReelGeometry {
    /// Standard strip: six slots of 150 units
    pub fn standard() -> Self {
        Self {
            slot_count: 6,
            slot_size: 150.0,
        }
    }

    /// Full track width the strip wraps around
    pub fn track_width(&self) -> f64 {
        self.slot_count as f64 * self.slot_size
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.slot_count == 0 {
            return Err(ReelError::config("slot_count must be at least 1"));
        }
        if !self.slot_size.is_finite() || self.slot_size <= 0.0 {
            return Err(ReelError::config(format!(
                "slot_size must be positive and finite, got {}",
                self.slot_size
            )));
        }
        Ok(())
    }
}

impl Default for ReelGeometry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Scalar motion parameters of a reel
///
/// Speeds are in world units per millisecond. `slowdown_rate` is applied once
/// per `update` call while decelerating, matching the reference feel at
/// 60 fps; the decay is therefore framerate-dependent by contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotionProfile {
    /// Speed while actively spinning
    pub spin_speed: f64,
    /// Per-update decay multiplier while decelerating, in (0, 1)
    pub slowdown_rate: f64,
    /// Below this speed the reel stops completely and snaps to the grid
    pub min_speed_threshold: f64,
    /// Length of the terminal settle ease onto the grid
    pub settle_duration_ms: f64,
}

impl MotionProfile {
    /// Reference motion feel: 50 units/frame at 60 fps
    pub fn normal() -> Self {
        Self {
            spin_speed: 3.0,
            slowdown_rate: 0.95,
            min_speed_threshold: 0.03,
            settle_duration_ms: 500.0,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if !self.spin_speed.is_finite() || self.spin_speed <= 0.0 {
            return Err(ReelError::config(format!(
                "spin_speed must be positive and finite, got {}",
                self.spin_speed
            )));
        }
        if !self.slowdown_rate.is_finite() || self.slowdown_rate <= 0.0 || self.slowdown_rate >= 1.0
        {
            return Err(ReelError::config(format!(
                "slowdown_rate must lie in (0, 1), got {}",
                self.slowdown_rate
            )));
        }
        if !self.min_speed_threshold.is_finite()
            || self.min_speed_threshold <= 0.0
            || self.min_speed_threshold > self.spin_speed
        {
            return Err(ReelError::config(format!(
                "min_speed_threshold must lie in (0, spin_speed], got {}",
                self.min_speed_threshold
            )));
        }
        if !self.settle_duration_ms.is_finite() || self.settle_duration_ms < 0.0 {
            return Err(ReelError::config(format!(
                "settle_duration_ms must be non-negative and finite, got {}",
                self.settle_duration_ms
            )));
        }
        Ok(())
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::normal()
    }
}

/// Spin-cycle choreography timing, all in milliseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpinTiming {
    /// Stagger between successive reel starts
    pub reel_start_delay_ms: f64,
    /// Minimum time the last-started reel spins before the stop phase arms
    pub min_spin_duration_ms: f64,
    /// Stagger between successive reel stops
    pub reel_stop_delay_ms: f64,
    /// Settle window after the last reel is told to stop, before win evaluation
    pub final_stop_delay_ms: f64,
    /// How long the win animation stays visible
    pub win_animation_duration_ms: f64,
}

impl SpinTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            reel_start_delay_ms: 200.0,
            min_spin_duration_ms: 500.0,
            reel_stop_delay_ms: 400.0,
            final_stop_delay_ms: 500.0,
            win_animation_duration_ms: 3000.0,
        }
    }

    /// Fast/Turbo mode
    pub fn turbo() -> Self {
        Self {
            reel_start_delay_ms: 75.0,
            min_spin_duration_ms: 250.0,
            reel_stop_delay_ms: 150.0,
            final_stop_delay_ms: 250.0,
            win_animation_duration_ms: 1500.0,
        }
    }

    /// Scale every delay by `factor` (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            reel_start_delay_ms: self.reel_start_delay_ms * factor,
            min_spin_duration_ms: self.min_spin_duration_ms * factor,
            reel_stop_delay_ms: self.reel_stop_delay_ms * factor,
            final_stop_delay_ms: self.final_stop_delay_ms * factor,
            win_animation_duration_ms: self.win_animation_duration_ms * factor,
        }
    }

    /// Offset of the stop-phase arming action relative to cycle start: the
    /// last reel must have been spinning for at least the minimum duration.
    pub fn stop_phase_offset_ms(&self, reel_count: usize) -> f64 {
        self.min_spin_duration_ms + reel_count.saturating_sub(1) as f64 * self.reel_start_delay_ms
    }

    pub fn validate(&self) -> ReelResult<()> {
        for (name, value) in [
            ("reel_start_delay_ms", self.reel_start_delay_ms),
            ("min_spin_duration_ms", self.min_spin_duration_ms),
            ("reel_stop_delay_ms", self.reel_stop_delay_ms),
            ("final_stop_delay_ms", self.final_stop_delay_ms),
            ("win_animation_duration_ms", self.win_animation_duration_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ReelError::config(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Number of reels; index order is the stagger order
    pub reel_count: usize,
    pub geometry: ReelGeometry,
    pub motion: MotionProfile,
    pub timing: SpinTiming,
    /// Probability that one spin evaluates as a win
    pub win_probability: f64,
}

impl MachineConfig {
    /// Standard 4-reel machine
    pub fn normal() -> Self {
        Self {
            reel_count: 4,
            geometry: ReelGeometry::standard(),
            motion: MotionProfile::normal(),
            timing: SpinTiming::normal(),
            win_probability: 0.3,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.reel_count == 0 {
            return Err(ReelError::config("reel_count must be at least 1"));
        }
        if !self.win_probability.is_finite()
            || !(0.0..=1.0).contains(&self.win_probability)
        {
            return Err(ReelError::config(format!(
                "win_probability must lie in [0, 1], got {}",
                self.win_probability
            )));
        }
        self.geometry.validate()?;
        self.motion.validate()?;
        self.timing.validate()?;
        Ok(())
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::normal()
    }
}

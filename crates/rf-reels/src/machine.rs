//! Spin orchestration — staggered reel choreography and win evaluation
//!
//! The machine owns an ordered set of reels and drives one spin cycle at a
//! time through a deferred-action queue: staggered reel starts, a minimum
//! spin duration, staggered stops, a settle window, then the win evaluation.
//! Every deferred action lives in the queue, so teardown cancels the whole
//! choreography in one sweep no matter which phase it is in.

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use rf_sched::TimerQueue;

use crate::config::MachineConfig;
use crate::error::ReelResult;
use crate::reel::Reel;
use crate::services::Services;
use crate::symbols::SymbolSet;

/// Audio cue looped while reels are in motion
pub const REEL_SPIN_CUE: &str = "reel-spin";
/// Audio cue for a winning evaluation
pub const WIN_CUE: &str = "win";

/// The choreography alphabet. A spin cycle is a timeline of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpinAction {
    /// Bring reel `i` to full speed
    StartReel(usize),
    /// Arm the staggered stop cascade
    BeginStopping,
    /// Ask reel `i` to begin decelerating
    StopReel(usize),
    /// Evaluate the win and close the cycle
    Settle,
    /// Hide the win animation after its display window
    HideWin,
}

/// Running session statistics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub wins: u64,
}

impl SessionStats {
    /// Percentage of evaluated spins that won
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            self.wins as f64 / self.total_spins as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Multi-reel slot machine front end: reel motion plus spin choreography
pub struct SlotMachine {
    config: MachineConfig,
    reels: Vec<Reel>,
    spinning: bool,
    timers: TimerQueue<SpinAction>,
    services: Services,
    rng: ChaCha8Rng,
    stats: SessionStats,
    win_visible: bool,
    destroyed: bool,
}

impl SlotMachine {
    /// Build a machine and its reels. Fails fast on invalid configuration or
    /// unresolvable symbol appearances; a missing win presenter is tolerated
    /// (the win simply has no visual).
    pub fn new(
        config: MachineConfig,
        symbol_set: SymbolSet,
        services: Services,
    ) -> ReelResult<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::from_os_rng();
        let mut reels = Vec::with_capacity(config.reel_count);
        for _ in 0..config.reel_count {
            let reel_rng = ChaCha8Rng::from_rng(&mut rng);
            reels.push(Reel::new(
                config.geometry,
                config.motion,
                symbol_set.clone(),
                &services.assets,
                reel_rng,
            )?);
        }

        if services.win_presenter.is_none() {
            debug!("no win presenter attached; win animation disabled");
        }

        Ok(Self {
            config,
            reels,
            spinning: false,
            timers: TimerQueue::new(),
            services,
            rng,
            stats: SessionStats::default(),
            win_visible: false,
            destroyed: false,
        })
    }

    /// Start one spin cycle. A request while a cycle is already running is
    /// dropped, not queued.
    pub fn spin(&mut self) {
        if self.spinning {
            debug!("spin request ignored: cycle already in progress");
            return;
        }
        if self.destroyed {
            warn!("spin request ignored: machine is destroyed");
            return;
        }

        self.spinning = true;
        // Defensive: the queue should already be drained, but a stale win
        // hide may still be pending. A new cycle supersedes it.
        self.timers.clear();
        self.hide_win();

        self.services.audio.play(REEL_SPIN_CUE);
        self.services.control.set_enabled(false);

        let timing = self.config.timing;
        for index in 0..self.reels.len() {
            self.timers.schedule(
                index as f64 * timing.reel_start_delay_ms,
                SpinAction::StartReel(index),
            );
        }
        self.timers.schedule(
            timing.stop_phase_offset_ms(self.reels.len()),
            SpinAction::BeginStopping,
        );
        debug!(
            "spin cycle armed: {} reels, stop phase at {:.0}ms",
            self.reels.len(),
            timing.stop_phase_offset_ms(self.reels.len())
        );
    }

    /// Advance the whole machine by one frame: fire due choreography, then
    /// step every reel's motion.
    pub fn update(&mut self, delta_ms: f64) {
        self.timers.advance(delta_ms);
        while let Some((_, action)) = self.timers.pop_due() {
            self.apply(action);
        }
        for reel in &mut self.reels {
            reel.update(delta_ms);
        }
    }

    fn apply(&mut self, action: SpinAction) {
        match action {
            SpinAction::StartReel(index) => {
                if let Some(reel) = self.reels.get_mut(index) {
                    reel.start_spin();
                }
            }
            SpinAction::BeginStopping => {
                let timing = self.config.timing;
                for index in 0..self.reels.len() {
                    self.timers.schedule(
                        index as f64 * timing.reel_stop_delay_ms,
                        SpinAction::StopReel(index),
                    );
                }
            }
            SpinAction::StopReel(index) => {
                if let Some(reel) = self.reels.get_mut(index) {
                    reel.stop_spin();
                }
                if index + 1 == self.reels.len() {
                    self.timers
                        .schedule(self.config.timing.final_stop_delay_ms, SpinAction::Settle);
                }
            }
            SpinAction::Settle => self.settle(),
            SpinAction::HideWin => self.hide_win(),
        }
    }

    /// Close the cycle: evaluate the win, release the busy flag, stop the
    /// spin loop cue and hand the control back to the player.
    fn settle(&mut self) {
        self.evaluate_win();
        self.spinning = false;
        self.services.audio.stop(REEL_SPIN_CUE);
        self.services.control.set_enabled(true);
    }

    fn evaluate_win(&mut self) {
        self.stats.total_spins += 1;
        let won = self.rng.random::<f64>() < self.config.win_probability;
        if !won {
            return;
        }

        self.stats.wins += 1;
        debug!(
            "winning spin #{} (session hit rate {:.1}%)",
            self.stats.total_spins,
            self.stats.hit_rate()
        );
        self.services.audio.play(WIN_CUE);

        // Evaluation runs regardless of the presenter; only the visual is
        // conditional.
        if let Some(presenter) = &self.services.win_presenter {
            presenter.show();
            self.win_visible = true;
            self.timers.schedule(
                self.config.timing.win_animation_duration_ms,
                SpinAction::HideWin,
            );
        }
    }

    fn hide_win(&mut self) {
        if self.win_visible {
            if let Some(presenter) = &self.services.win_presenter {
                presenter.hide();
            }
            self.win_visible = false;
        }
    }

    /// Tear down mid-anything: cancel every pending action, silence the spin
    /// loop, hide the win visual and release the reels. Nothing scheduled by
    /// this machine fires afterwards.
    pub fn destroy(&mut self) {
        self.timers.clear();
        self.services.audio.stop(REEL_SPIN_CUE);
        self.hide_win();
        self.reels.clear();
        self.spinning = false;
        self.destroyed = true;
    }

    /// Reseed the win evaluator and every reel strip for a reproducible
    /// session.
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        for (index, reel) in self.reels.iter_mut().enumerate() {
            reel.reseed(seed.wrapping_add(index as u64 + 1));
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Number of live deferred actions
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Is the win animation currently shown?
    pub fn win_visible(&self) -> bool {
        self.win_visible
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }
}

impl Drop for SlotMachine {
    fn drop(&mut self) {
        if !self.destroyed {
            self.destroy();
        }
    }
}

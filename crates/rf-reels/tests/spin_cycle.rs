//! Spin-cycle integration tests
//!
//! Drives a full machine through complete spin cycles on a fixed-timestep
//! loop and checks the choreography contract end to end:
//! - staggered start/stop ordering and offsets
//! - audio cue and control-affordance sequencing
//! - win animation display window
//! - re-entrancy admission policy
//! - teardown cancellation mid-cycle

use std::sync::Arc;

use parking_lot::Mutex;

use rf_reels::{
    AudioSink, MachineConfig, REEL_SPIN_CUE, ReelPhase, Services, SlotMachine, SpinControl,
    SpinTiming, SymbolSet, WIN_CUE, WinPresenter,
};

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING DOUBLES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct RecordingAudio {
    events: Mutex<Vec<String>>,
}

impl RecordingAudio {
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&self, alias: &str) {
        self.events.lock().push(format!("play:{alias}"));
    }

    fn stop(&self, alias: &str) {
        self.events.lock().push(format!("stop:{alias}"));
    }
}

#[derive(Default)]
struct RecordingControl {
    toggles: Mutex<Vec<bool>>,
}

impl RecordingControl {
    fn toggles(&self) -> Vec<bool> {
        self.toggles.lock().clone()
    }
}

impl SpinControl for RecordingControl {
    fn set_enabled(&self, enabled: bool) {
        self.toggles.lock().push(enabled);
    }
}

#[derive(Default)]
struct RecordingPresenter {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingPresenter {
    fn events(&self) -> Vec<&'static str> {
        self.events.lock().clone()
    }
}

impl WinPresenter for RecordingPresenter {
    fn show(&self) {
        self.events.lock().push("show");
    }

    fn hide(&self) {
        self.events.lock().push("hide");
    }
}

struct Harness {
    machine: SlotMachine,
    audio: Arc<RecordingAudio>,
    control: Arc<RecordingControl>,
    presenter: Arc<RecordingPresenter>,
    clock_ms: f64,
}

impl Harness {
    fn new(win_probability: f64, timing: SpinTiming) -> Self {
        let audio = Arc::new(RecordingAudio::default());
        let control = Arc::new(RecordingControl::default());
        let presenter = Arc::new(RecordingPresenter::default());

        let services = Services {
            audio: audio.clone(),
            control: control.clone(),
            win_presenter: Some(presenter.clone()),
            ..Services::headless()
        };
        let config = MachineConfig {
            timing,
            win_probability,
            ..MachineConfig::normal()
        };
        let machine = SlotMachine::new(config, SymbolSet::standard(), services)
            .expect("machine must build");

        Self {
            machine,
            audio,
            control,
            presenter,
            clock_ms: 0.0,
        }
    }

    fn step(&mut self, tick_ms: f64) {
        self.machine.update(tick_ms);
        self.clock_ms += tick_ms;
    }

    /// Run frames until the cycle is over and every reel is at rest.
    fn drain(&mut self, tick_ms: f64) {
        let mut budget = 0.0;
        loop {
            let busy = self.machine.is_spinning()
                || self.machine.pending_timers() > 0
                || self
                    .machine
                    .reels()
                    .iter()
                    .any(|r| r.speed() > 0.0 || r.is_settling());
            if !busy {
                return;
            }
            self.step(tick_ms);
            budget += tick_ms;
            assert!(budget < 120_000.0, "cycle failed to settle");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHOREOGRAPHY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_staggered_starts_follow_index_order() {
    // 4 reels, 200ms start stagger: reel i comes to speed at i * 200.
    let mut harness = Harness::new(0.0, SpinTiming::normal());
    harness.machine.spin();

    let reel_count = harness.machine.reels().len();
    let mut start_times: Vec<Option<f64>> = vec![None; reel_count];
    for _ in 0..1_000 {
        harness.step(1.0);
        for (i, reel) in harness.machine.reels().iter().enumerate() {
            if start_times[i].is_none() && reel.is_spinning() {
                start_times[i] = Some(harness.clock_ms);
            }
        }
        if start_times.iter().all(Option::is_some) {
            break;
        }
    }

    for (i, time) in start_times.iter().enumerate() {
        let observed = time.unwrap_or_else(|| panic!("reel {i} never started"));
        let expected = i as f64 * 200.0;
        assert!(
            observed >= expected && observed <= expected + 1.0,
            "reel {i} started at {observed}ms, expected {expected}ms"
        );
    }
}

#[test]
fn test_stop_cascade_and_settle_offsets() {
    // Stop phase arms at min_spin + 3 * start_delay = 1100ms; reel i stops at
    // 1100 + i * 400; the evaluation settles 500ms after the last stop.
    let mut harness = Harness::new(0.0, SpinTiming::normal());
    harness.machine.spin();

    let reel_count = harness.machine.reels().len();
    let mut stop_times: Vec<Option<f64>> = vec![None; reel_count];
    let mut started: Vec<bool> = vec![false; reel_count];
    let mut settle_time = None;

    for _ in 0..10_000 {
        harness.step(1.0);
        for (i, reel) in harness.machine.reels().iter().enumerate() {
            if reel.is_spinning() {
                started[i] = true;
            } else if started[i] && stop_times[i].is_none() {
                stop_times[i] = Some(harness.clock_ms);
            }
        }
        if settle_time.is_none() && !harness.machine.is_spinning() && started.iter().all(|&s| s) {
            settle_time = Some(harness.clock_ms);
        }
        if settle_time.is_some() {
            break;
        }
    }

    for (i, time) in stop_times.iter().enumerate() {
        let observed = time.unwrap_or_else(|| panic!("reel {i} never stopped"));
        let expected = 1_100.0 + i as f64 * 400.0;
        assert!(
            observed >= expected && observed <= expected + 1.0,
            "reel {i} stopped at {observed}ms, expected {expected}ms"
        );
    }

    let settle = settle_time.expect("cycle never settled");
    let last_stop = stop_times[reel_count - 1].expect("last reel never stopped");
    assert!(
        settle >= last_stop + 500.0 && settle <= last_stop + 501.0,
        "settle at {settle}ms, expected 500ms after last stop at {last_stop}ms"
    );
}

#[test]
fn test_cycle_sequences_audio_and_control() {
    let mut harness = Harness::new(0.0, SpinTiming::normal());
    harness.machine.spin();
    harness.drain(16.0);

    // The loop cue starts with the cycle and stops at settle; no win cue.
    let audio = harness.audio.events();
    assert_eq!(audio.first().map(String::as_str), Some("play:reel-spin"));
    assert!(audio.contains(&format!("stop:{REEL_SPIN_CUE}")));
    assert!(!audio.iter().any(|e| e == &format!("play:{WIN_CUE}")));

    // Control: disabled at spin start, re-enabled exactly once at settle.
    assert_eq!(harness.control.toggles(), vec![false, true]);
}

#[test]
fn test_cycle_ends_idle_and_grid_aligned() {
    let mut harness = Harness::new(0.0, SpinTiming::normal());
    harness.machine.spin();
    harness.drain(16.0);

    for reel in harness.machine.reels() {
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert!(!reel.is_settling());
        let slot = reel.geometry().slot_size;
        for symbol in reel.symbols() {
            let cells = symbol.position() / slot;
            assert!(
                (cells - cells.round()).abs() < 1e-9,
                "symbol rests off-grid at {}",
                symbol.position()
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WIN PRESENTATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_win_animation_display_window() {
    let mut harness = Harness::new(1.0, SpinTiming::normal());
    harness.machine.spin();

    // Run to settle: the guaranteed win shows the presenter and plays the cue.
    while harness.machine.is_spinning() {
        harness.step(16.0);
    }
    assert!(harness.machine.win_visible());
    assert_eq!(harness.presenter.events(), vec!["show"]);
    assert!(
        harness
            .audio
            .events()
            .contains(&format!("play:{WIN_CUE}"))
    );

    // The hide action is tracked like any other deferred work and fires after
    // the display window.
    harness.drain(16.0);
    assert!(!harness.machine.win_visible());
    assert_eq!(harness.presenter.events(), vec!["show", "hide"]);
}

#[test]
fn test_win_without_presenter_still_evaluates() {
    let services = Services::headless();
    let config = MachineConfig {
        win_probability: 1.0,
        ..MachineConfig::normal()
    };
    let mut machine = SlotMachine::new(config, SymbolSet::standard(), services)
        .expect("machine must build");

    machine.spin();
    let mut budget = 0.0;
    while machine.is_spinning() {
        machine.update(16.0);
        budget += 16.0;
        assert!(budget < 120_000.0);
    }

    assert_eq!(machine.stats().wins, 1);
    // No presenter, so no hide timer lingers after the cycle.
    assert_eq!(machine.pending_timers(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADMISSION & TEARDOWN
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_redundant_spin_is_dropped() {
    let mut harness = Harness::new(0.0, SpinTiming::normal());
    harness.machine.spin();
    harness.step(50.0);

    let pending = harness.machine.pending_timers();
    harness.machine.spin();
    harness.machine.spin();

    assert_eq!(harness.machine.pending_timers(), pending);
    // The loop cue started once and the control was disabled once.
    assert_eq!(harness.audio.events(), vec!["play:reel-spin".to_string()]);
    assert_eq!(harness.control.toggles(), vec![false]);
}

#[test]
fn test_destroy_mid_cycle_cancels_exhaustively() {
    let mut harness = Harness::new(1.0, SpinTiming::normal());
    harness.machine.spin();

    // Part-way through the start cascade: two reels running, timers pending.
    for _ in 0..30 {
        harness.step(10.0);
    }
    assert!(harness.machine.pending_timers() > 0);

    harness.machine.destroy();
    assert_eq!(harness.machine.pending_timers(), 0);
    let toggles_at_destroy = harness.control.toggles();

    // Time may advance arbitrarily far: nothing scheduled before the destroy
    // is allowed to fire.
    for _ in 0..10_000 {
        harness.step(100.0);
    }
    assert_eq!(harness.machine.stats().total_spins, 0);
    assert_eq!(harness.control.toggles(), toggles_at_destroy);
    assert_eq!(harness.presenter.events(), Vec::<&str>::new());

    // Destroy silenced the loop cue.
    let audio = harness.audio.events();
    assert_eq!(audio.last().map(String::as_str), Some("stop:reel-spin"));
}

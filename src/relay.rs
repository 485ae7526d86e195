// relay.rs

use crate::controls::{ControlSnapshot, ControlSource};
use crate::indicator::{IndicatorDriver, IndicatorSink, IndicatorSlot};
use crate::injection::{ClockDecision, ClockInjector, ClockSink, InjectionConfig};
use crate::midi::{MessageKind, MidiEngine, MidiMessage, Result};
use crate::tempo::TempoTracker;
use log::{error, info, warn};
use std::time::{Duration, Instant};

const STATUS_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed settings of a relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    pub monitored_channel: u8,
    pub pulse_slot: IndicatorSlot,
    pub pulse_duration: Duration,
    pub pulse_level: bool,
    pub poll_interval: Duration,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            monitored_channel: 1,
            pulse_slot: IndicatorSlot::Count,
            pulse_duration: Duration::from_millis(20),
            pulse_level: true,
            poll_interval: Duration::from_micros(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayStats {
    pub forwarded: u64,
    pub suppressed: u64,
    pub auto_injected: u64,
    pub manual_injected: u64,
    pub starts: u64,
}

/// Snapshot of the relay shown by status displays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelayStatus {
    pub bpm: Option<f64>,
    pub config: InjectionConfig,
    pub remaining: u8,
    pub suppress_pending: bool,
    pub stats: RelayStats,
}

/// Everything that produces output: the MIDI engine and the lamps
struct Output<E, S> {
    engine: E,
    indicators: IndicatorDriver<S>,
    settings: RelaySettings,
}

impl<E: MidiEngine, S: IndicatorSink> Output<E, S> {
    fn forward(&mut self, msg: &MidiMessage) {
        if let Err(e) = self.engine.send(msg) {
            error!("Failed to forward {:?}: {}", msg.kind, e);
        }
    }
}

impl<E: MidiEngine, S: IndicatorSink> ClockSink for Output<E, S> {
    fn inject_clock(&mut self, now: Instant) {
        self.forward(&MidiMessage::clock());
        self.indicators.pulse_indicator(
            now,
            self.settings.pulse_slot,
            self.settings.pulse_duration,
            self.settings.pulse_level,
        );
    }
}

/// Relays MIDI from input to output, applying clock injection on one channel
pub struct Relay<E, C, S> {
    controls: C,
    injector: ClockInjector,
    output: Output<E, S>,
    tempo: TempoTracker,
    stats: RelayStats,
    overlap_warned: bool,
    overlap_warnings: u64,
    last_report: Option<Instant>,
}

impl<E, C, S> Relay<E, C, S>
where
    E: MidiEngine,
    C: ControlSource,
    S: IndicatorSink,
{
    pub fn new(engine: E, controls: C, indicators: S, settings: RelaySettings) -> Self {
        Relay {
            controls,
            injector: ClockInjector::new(),
            output: Output {
                engine,
                indicators: IndicatorDriver::new(indicators),
                settings,
            },
            tempo: TempoTracker::new(),
            stats: RelayStats::default(),
            overlap_warned: false,
            overlap_warnings: 0,
            last_report: None,
        }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.output.settings
    }

    pub fn engine(&self) -> &E {
        &self.output.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.output.engine
    }

    pub fn controls_mut(&mut self) -> &mut C {
        &mut self.controls
    }

    pub fn indicators(&self) -> &IndicatorDriver<S> {
        &self.output.indicators
    }

    pub fn injector(&self) -> &ClockInjector {
        &self.injector
    }

    pub fn tempo(&self) -> &TempoTracker {
        &self.tempo
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Whether the current run has already warned about replaced injections
    pub fn overlap_warned(&self) -> bool {
        self.overlap_warned
    }

    /// Number of replaced-injection warnings logged so far
    pub fn overlap_warnings(&self) -> u64 {
        self.overlap_warnings
    }

    pub fn status(&self) -> RelayStatus {
        RelayStatus {
            bpm: self.tempo.bpm(),
            config: self.injector.config(),
            remaining: self.injector.remaining(),
            suppress_pending: self.injector.suppress_pending(),
            stats: self.stats,
        }
    }

    /// One pass of the polling loop. Returns false once a quit was requested.
    pub fn cycle(&mut self, now: Instant, incoming: Option<MidiMessage>) -> bool {
        let snapshot = self.controls.sample();
        self.apply_controls(now, &snapshot);

        if let Some(msg) = incoming {
            self.on_message(now, msg);
        }

        if self.injector.service(now, &mut self.output) {
            self.stats.auto_injected += 1;
        }
        self.output.indicators.service(now);
        self.report(now);

        !snapshot.quit
    }

    fn apply_controls(&mut self, now: Instant, snapshot: &ControlSnapshot) {
        let config = snapshot.config();
        self.injector.set_config(config);
        self.output
            .indicators
            .set_level_indicator(config.target_count, IndicatorSlot::Count);
        self.output
            .indicators
            .set_level_indicator(config.delay_ms, IndicatorSlot::Delay);

        // One action per sample, whatever the click count
        if snapshot.inject_pressed() {
            self.injector.request_manual_inject(now, &mut self.output);
            self.stats.manual_injected += 1;
        }
        if snapshot.suppress_pressed() {
            self.injector.request_manual_suppress();
        }
    }

    pub fn on_message(&mut self, now: Instant, msg: MidiMessage) {
        if !msg.is_for_channel(self.output.settings.monitored_channel) {
            self.forward(&msg);
            return;
        }

        match msg.kind {
            MessageKind::Clock => {
                self.tempo.on_clock(now);
                self.check_overlap();
                match self.injector.on_clock(now) {
                    ClockDecision::Forward => self.forward(&msg),
                    ClockDecision::Suppress => self.stats.suppressed += 1,
                }
            }
            MessageKind::Start => {
                self.injector.on_start();
                self.tempo.reset();
                self.overlap_warned = false;
                self.stats.starts += 1;
                self.forward(&msg);
            }
            _ => self.forward(&msg),
        }
    }

    fn forward(&mut self, msg: &MidiMessage) {
        self.output.forward(msg);
        self.stats.forwarded += 1;
    }

    fn report(&mut self, now: Instant) {
        let due = self
            .last_report
            .map_or(true, |last| now.duration_since(last) >= STATUS_INTERVAL);
        if due {
            let status = self.status();
            self.output.indicators.sink_mut().report(&status);
            self.last_report = Some(now);
        }
    }

    fn check_overlap(&mut self) {
        if self.overlap_warned || self.injector.remaining() == 0 {
            return;
        }
        if let Some(interval) = self.tempo.clock_interval() {
            let delay = self.injector.config().delay();
            if delay >= interval {
                warn!(
                    "Injection delay {:?} is not shorter than the clock interval {:?}; pending injections will be replaced",
                    delay, interval
                );
                self.overlap_warned = true;
                self.overlap_warnings += 1;
            }
        }
    }

    /// Polls the engine and cycles until a quit is requested or input fails
    pub fn run(&mut self) -> Result<()> {
        info!(
            "Relay running on channel {}",
            self.output.settings.monitored_channel
        );
        loop {
            let incoming = self.output.engine.poll(self.output.settings.poll_interval)?;
            if !self.cycle(Instant::now(), incoming) {
                break;
            }
        }
        info!("Relay stopped: {:?}", self.stats);
        Ok(())
    }
}

//! Clock injection state machine
//!
//! After a Start, each real Clock arms one synthetic Clock `delay_ms` later
//! until `target_count` injections have been armed. A manual suppress drops
//! the next real Clock; a manual inject sends one synthetic Clock right away.
//! Suppression and injection are independent of each other.

use crate::scheduler::{DeferredPulse, PulseHandle};
use log::{debug, info};
use std::time::{Duration, Instant};

pub const MAX_TARGET_COUNT: u8 = 15;
pub const MAX_DELAY_MS: u8 = 51;

/// Full scale of a raw level reading (10-bit)
pub const RAW_LEVEL_MAX: u16 = 1023;

const COUNT_STEP: u16 = 64;
const DELAY_STEP: u16 = 20;

/// Injection parameters, recomputed from the level controls every cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InjectionConfig {
    pub target_count: u8,
    pub delay_ms: u8,
}

impl InjectionConfig {
    pub fn new(target_count: u8, delay_ms: u8) -> Self {
        Self {
            target_count: target_count.min(MAX_TARGET_COUNT),
            delay_ms: delay_ms.min(MAX_DELAY_MS),
        }
    }

    /// Quantizes two raw level readings into a config
    pub fn from_raw(count_raw: u16, delay_raw: u16) -> Self {
        let count = (count_raw / COUNT_STEP).min(MAX_TARGET_COUNT as u16);
        let delay = (delay_raw / DELAY_STEP).min(MAX_DELAY_MS as u16);
        Self::new(count as u8, delay as u8)
    }

    /// Raw reading that quantizes back to `target_count`
    pub fn count_to_raw(target_count: u8) -> u16 {
        target_count.min(MAX_TARGET_COUNT) as u16 * COUNT_STEP
    }

    /// Raw reading that quantizes back to `delay_ms`
    pub fn delay_to_raw(delay_ms: u8) -> u16 {
        delay_ms.min(MAX_DELAY_MS) as u16 * DELAY_STEP
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms as u64)
    }
}

/// What to do with a real Clock pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDecision {
    Forward,
    Suppress,
}

/// Where synthetic Clock pulses go
pub trait ClockSink {
    fn inject_clock(&mut self, now: Instant);
}

#[derive(Debug, Default)]
pub struct ClockInjector {
    config: InjectionConfig,
    remaining: u8,
    suppress_next: bool,
    pending: DeferredPulse<()>,
    armed: Option<PulseHandle>,
}

impl ClockInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_config(&mut self, config: InjectionConfig) {
        self.config = config;
    }

    pub fn config(&self) -> InjectionConfig {
        self.config
    }

    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    pub fn suppress_pending(&self) -> bool {
        self.suppress_next
    }

    pub fn injection_pending(&self) -> bool {
        self.armed
            .map_or(false, |handle| self.pending.is_pending(handle))
    }

    /// Re-arms the injection run with the current target count
    pub fn on_start(&mut self) {
        self.remaining = self.config.target_count;
        info!(
            "Start received, injecting {} clocks at {} ms",
            self.remaining, self.config.delay_ms
        );
    }

    pub fn on_clock(&mut self, now: Instant) -> ClockDecision {
        if self.remaining > 0 {
            // Replaces any injection still waiting to fire
            self.armed = Some(self.pending.schedule(now, self.config.delay(), ()));
            self.remaining -= 1;
            debug!(
                "Injection armed for +{} ms, {} left",
                self.config.delay_ms, self.remaining
            );
        }

        if self.suppress_next {
            self.suppress_next = false;
            info!("Clock suppressed");
            ClockDecision::Suppress
        } else {
            ClockDecision::Forward
        }
    }

    pub fn request_manual_inject<S: ClockSink>(&self, now: Instant, sink: &mut S) {
        info!("Manual clock injection");
        sink.inject_clock(now);
    }

    pub fn request_manual_suppress(&mut self) {
        self.suppress_next = true;
        info!("Suppressing next clock");
    }

    /// Fires the pending injection if due. Returns true when a clock was injected.
    pub fn service<S: ClockSink>(&mut self, now: Instant, sink: &mut S) -> bool {
        if self.pending.tick(now).is_some() {
            debug!("Deferred injection fired");
            sink.inject_clock(now);
            true
        } else {
            false
        }
    }
}

use crate::relay::RelayStatus;
use crate::scheduler::DeferredPulse;
use log::info;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorSlot {
    Count,
    Delay,
}

impl IndicatorSlot {
    fn index(self) -> usize {
        match self {
            IndicatorSlot::Count => 0,
            IndicatorSlot::Delay => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IndicatorSlot::Count => "count",
            IndicatorSlot::Delay => "delay",
        }
    }
}

/// Two binary lamps
pub trait IndicatorSink {
    fn set(&mut self, slot: IndicatorSlot, on: bool);

    /// Periodic relay status, for sinks that can show more than lamps
    fn report(&mut self, _status: &RelayStatus) {}
}

/// Sink that writes lamp changes to the log
#[derive(Debug, Default)]
pub struct LogIndicators;

impl IndicatorSink for LogIndicators {
    fn set(&mut self, slot: IndicatorSlot, on: bool) {
        info!("Indicator {} {}", slot.label(), if on { "on" } else { "off" });
    }
}

/// Drives the lamps from quantized levels and momentary pulses.
///
/// A pulse holds its lamp at the active level; level updates that arrive in
/// the meantime are applied once the pulse ends. The sink only sees changes.
#[derive(Debug)]
pub struct IndicatorDriver<S> {
    sink: S,
    levels: [bool; 2],
    written: [Option<bool>; 2],
    pulse: DeferredPulse<IndicatorSlot>,
}

impl<S: IndicatorSink> IndicatorDriver<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            levels: [false; 2],
            written: [None; 2],
            pulse: DeferredPulse::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Lamp state last written for `slot`
    pub fn state(&self, slot: IndicatorSlot) -> Option<bool> {
        self.written[slot.index()]
    }

    pub fn is_pulsing(&self, slot: IndicatorSlot) -> bool {
        self.pulse.pending_action() == Some(&slot)
    }

    /// Even levels light the lamp, odd levels leave it dark
    pub fn set_level_indicator(&mut self, level: u8, slot: IndicatorSlot) {
        self.levels[slot.index()] = level % 2 == 0;
        if !self.is_pulsing(slot) {
            self.write(slot, self.levels[slot.index()]);
        }
    }

    pub fn pulse_indicator(
        &mut self,
        now: Instant,
        slot: IndicatorSlot,
        duration: Duration,
        active_level: bool,
    ) {
        if let Some(&replaced) = self.pulse.pending_action() {
            if replaced != slot {
                self.write(replaced, self.levels[replaced.index()]);
            }
        }
        self.write(slot, active_level);
        self.pulse.schedule(now, duration, slot);
    }

    /// Ends a pulse whose time is up
    pub fn service(&mut self, now: Instant) {
        if let Some(slot) = self.pulse.tick(now) {
            self.write(slot, self.levels[slot.index()]);
        }
    }

    fn write(&mut self, slot: IndicatorSlot, on: bool) {
        let written = &mut self.written[slot.index()];
        if *written != Some(on) {
            *written = Some(on);
            self.sink.set(slot, on);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(IndicatorSlot, bool)>,
    }

    impl IndicatorSink for RecordingSink {
        fn set(&mut self, slot: IndicatorSlot, on: bool) {
            self.writes.push((slot, on));
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_level_parity_drives_lamp() {
        let mut driver = IndicatorDriver::new(RecordingSink::default());
        driver.set_level_indicator(4, IndicatorSlot::Count);
        driver.set_level_indicator(3, IndicatorSlot::Delay);

        assert_eq!(driver.state(IndicatorSlot::Count), Some(true));
        assert_eq!(driver.state(IndicatorSlot::Delay), Some(false));
    }

    #[test]
    fn test_only_changes_reach_sink() {
        let mut driver = IndicatorDriver::new(RecordingSink::default());
        driver.set_level_indicator(2, IndicatorSlot::Count);
        driver.set_level_indicator(4, IndicatorSlot::Count);
        driver.set_level_indicator(5, IndicatorSlot::Count);

        assert_eq!(
            driver.sink().writes,
            vec![(IndicatorSlot::Count, true), (IndicatorSlot::Count, false)]
        );
    }

    #[test]
    fn test_pulse_returns_to_level() {
        let t0 = Instant::now();
        let mut driver = IndicatorDriver::new(RecordingSink::default());
        driver.set_level_indicator(1, IndicatorSlot::Count);

        driver.pulse_indicator(t0, IndicatorSlot::Count, ms(20), true);
        assert_eq!(driver.state(IndicatorSlot::Count), Some(true));
        assert!(driver.is_pulsing(IndicatorSlot::Count));

        driver.service(t0);
        driver.service(t0 + ms(19));
        assert_eq!(driver.state(IndicatorSlot::Count), Some(true));

        driver.service(t0 + ms(20));
        assert_eq!(driver.state(IndicatorSlot::Count), Some(false));
        assert!(!driver.is_pulsing(IndicatorSlot::Count));
    }

    #[test]
    fn test_level_changes_during_pulse_are_deferred() {
        let t0 = Instant::now();
        let mut driver = IndicatorDriver::new(RecordingSink::default());
        driver.set_level_indicator(1, IndicatorSlot::Count);
        driver.pulse_indicator(t0, IndicatorSlot::Count, ms(10), true);

        driver.set_level_indicator(3, IndicatorSlot::Count);
        assert_eq!(driver.state(IndicatorSlot::Count), Some(true));

        driver.set_level_indicator(6, IndicatorSlot::Count);
        driver.service(t0);
        driver.service(t0 + ms(10));
        assert_eq!(driver.state(IndicatorSlot::Count), Some(true));
        assert_eq!(driver.sink().writes.last(), Some(&(IndicatorSlot::Count, true)));
    }

    #[test]
    fn test_replaced_pulse_restores_its_lamp() {
        let t0 = Instant::now();
        let mut driver = IndicatorDriver::new(RecordingSink::default());
        driver.set_level_indicator(1, IndicatorSlot::Count);
        driver.set_level_indicator(1, IndicatorSlot::Delay);

        driver.pulse_indicator(t0, IndicatorSlot::Count, ms(50), true);
        driver.pulse_indicator(t0, IndicatorSlot::Delay, ms(50), true);

        assert_eq!(driver.state(IndicatorSlot::Count), Some(false));
        assert_eq!(driver.state(IndicatorSlot::Delay), Some(true));
        assert!(!driver.is_pulsing(IndicatorSlot::Count));
    }
}

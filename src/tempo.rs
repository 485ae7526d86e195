use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// MIDI standard PPQ (Pulses Per Quarter note)
pub const TICKS_PER_BEAT: u32 = 24;

/// Estimates tempo from incoming Clock pulses for diagnostics
#[derive(Debug)]
pub struct TempoTracker {
    last_tick_time: Option<Instant>,
    intervals: VecDeque<Duration>,
    window_size: usize, // Number of intervals to average
}

impl Default for TempoTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoTracker {
    pub fn new() -> Self {
        Self {
            last_tick_time: None,
            intervals: VecDeque::with_capacity(TICKS_PER_BEAT as usize),
            window_size: TICKS_PER_BEAT as usize, // Average over one quarter note worth of ticks
        }
    }

    pub fn reset(&mut self) {
        self.last_tick_time = None;
        self.intervals.clear();
    }

    pub fn on_clock(&mut self, now: Instant) {
        if let Some(last_time) = self.last_tick_time {
            self.intervals.push_back(now.duration_since(last_time));

            // Keep only the most recent intervals within our window
            if self.intervals.len() > self.window_size {
                self.intervals.pop_front();
            }
        }
        self.last_tick_time = Some(now);
    }

    /// Average time between clocks, once a few intervals are known
    pub fn clock_interval(&self) -> Option<Duration> {
        if self.intervals.len() < 3 {
            return None;
        }
        Some(self.intervals.iter().sum::<Duration>() / self.intervals.len() as u32)
    }

    pub fn bpm(&self) -> Option<f64> {
        let interval = self.clock_interval()?.as_secs_f64();
        if interval == 0.0 {
            return None;
        }
        Some(60.0 / (interval * TICKS_PER_BEAT as f64))
    }
}

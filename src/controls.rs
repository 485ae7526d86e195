//! Manual controls: two buttons and two level inputs
//!
//! A [`ControlSource`] is sampled once per relay cycle. Level readings are raw
//! 10-bit values; click counts only matter as zero or nonzero.

use crate::injection::{InjectionConfig, MAX_DELAY_MS, MAX_TARGET_COUNT, RAW_LEVEL_MAX};
use crossbeam::channel::{unbounded, Receiver, TryRecvError};
use log::{debug, info, warn};
use std::io::BufRead;
use std::thread;

/// One cycle's view of the controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlSnapshot {
    pub count_raw: u16,
    pub delay_raw: u16,
    pub inject_clicks: u8,
    pub suppress_clicks: u8,
    pub quit: bool,
}

impl ControlSnapshot {
    pub fn config(&self) -> InjectionConfig {
        InjectionConfig::from_raw(self.count_raw, self.delay_raw)
    }

    pub fn inject_pressed(&self) -> bool {
        self.inject_clicks != 0
    }

    pub fn suppress_pressed(&self) -> bool {
        self.suppress_clicks != 0
    }
}

pub trait ControlSource {
    fn sample(&mut self) -> ControlSnapshot;
}

/// Fixed levels with clicks queued by the caller
#[derive(Debug, Default)]
pub struct StaticControls {
    count_raw: u16,
    delay_raw: u16,
    inject_clicks: u8,
    suppress_clicks: u8,
    quit: bool,
}

impl StaticControls {
    pub fn new(count_raw: u16, delay_raw: u16) -> Self {
        Self {
            count_raw: count_raw.min(RAW_LEVEL_MAX),
            delay_raw: delay_raw.min(RAW_LEVEL_MAX),
            ..Self::default()
        }
    }

    /// Levels that quantize to exactly `target_count` and `delay_ms`
    pub fn with_config(target_count: u8, delay_ms: u8) -> Self {
        Self::new(
            InjectionConfig::count_to_raw(target_count),
            InjectionConfig::delay_to_raw(delay_ms),
        )
    }

    pub fn set_levels(&mut self, count_raw: u16, delay_raw: u16) {
        self.count_raw = count_raw.min(RAW_LEVEL_MAX);
        self.delay_raw = delay_raw.min(RAW_LEVEL_MAX);
    }

    pub fn click_inject(&mut self) {
        self.inject_clicks = self.inject_clicks.saturating_add(1);
    }

    pub fn click_suppress(&mut self) {
        self.suppress_clicks = self.suppress_clicks.saturating_add(1);
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }
}

impl ControlSource for StaticControls {
    fn sample(&mut self) -> ControlSnapshot {
        let snapshot = ControlSnapshot {
            count_raw: self.count_raw,
            delay_raw: self.delay_raw,
            inject_clicks: self.inject_clicks,
            suppress_clicks: self.suppress_clicks,
            quit: self.quit,
        };
        self.inject_clicks = 0;
        self.suppress_clicks = 0;
        snapshot
    }
}

/// Commands accepted on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Inject,
    Suppress,
    Count(u8),
    Delay(u8),
    Quit,
}

pub fn parse_command(line: &str) -> Option<ControlCommand> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();
    let value = words.next().and_then(|v| v.parse::<u8>().ok());

    match (command.as_str(), value) {
        ("i" | "inject", _) => Some(ControlCommand::Inject),
        ("s" | "suppress", _) => Some(ControlCommand::Suppress),
        ("c" | "count", Some(n)) => Some(ControlCommand::Count(n.min(MAX_TARGET_COUNT))),
        ("d" | "delay", Some(n)) => Some(ControlCommand::Delay(n.min(MAX_DELAY_MS))),
        ("q" | "quit", _) => Some(ControlCommand::Quit),
        _ => None,
    }
}

/// Controls driven by commands typed on stdin, read on a background thread
pub struct StdinControls {
    levels: StaticControls,
    rx: Receiver<ControlCommand>,
}

impl StdinControls {
    pub fn spawn(count_raw: u16, delay_raw: u16) -> Self {
        let (tx, rx) = unbounded();

        thread::spawn(move || {
            info!("Control input thread started");
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => warn!("Unrecognised control command: {:?}", line.trim()),
                }
            }
            info!("Control input thread stopping");
        });

        Self::from_receiver(StaticControls::new(count_raw, delay_raw), rx)
    }

    pub fn from_receiver(levels: StaticControls, rx: Receiver<ControlCommand>) -> Self {
        Self { levels, rx }
    }

    fn apply(&mut self, command: ControlCommand) {
        debug!("Control command: {:?}", command);
        match command {
            ControlCommand::Inject => self.levels.click_inject(),
            ControlCommand::Suppress => self.levels.click_suppress(),
            ControlCommand::Count(n) => {
                self.levels.count_raw = InjectionConfig::count_to_raw(n);
            }
            ControlCommand::Delay(n) => {
                self.levels.delay_raw = InjectionConfig::delay_to_raw(n);
            }
            ControlCommand::Quit => self.levels.request_quit(),
        }
    }
}

impl ControlSource for StdinControls {
    /// Applies queued commands up to and including the first button press.
    /// Later commands wait for the next sample so each line is its own press.
    fn sample(&mut self) -> ControlSnapshot {
        loop {
            match self.rx.try_recv() {
                Ok(command) => {
                    self.apply(command);
                    if matches!(command, ControlCommand::Inject | ControlCommand::Suppress) {
                        break;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.levels.sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("i"), Some(ControlCommand::Inject));
        assert_eq!(parse_command(" Suppress "), Some(ControlCommand::Suppress));
        assert_eq!(parse_command("count 3"), Some(ControlCommand::Count(3)));
        assert_eq!(parse_command("c 99"), Some(ControlCommand::Count(15)));
        assert_eq!(parse_command("delay 200"), Some(ControlCommand::Delay(51)));
        assert_eq!(parse_command("q"), Some(ControlCommand::Quit));
        assert_eq!(parse_command("count"), None);
        assert_eq!(parse_command("count x"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("tempo 120"), None);
    }

    #[test]
    fn test_static_controls_clicks_are_one_shot() {
        let mut controls = StaticControls::with_config(3, 10);
        controls.click_inject();
        controls.click_inject();

        let first = controls.sample();
        assert_eq!(first.config(), InjectionConfig::new(3, 10));
        assert_eq!(first.inject_clicks, 2);
        assert!(first.inject_pressed());
        assert!(!first.suppress_pressed());

        let second = controls.sample();
        assert!(!second.inject_pressed());
        assert_eq!(second.config(), InjectionConfig::new(3, 10));
    }

    #[test]
    fn test_static_controls_clamp_raw_levels() {
        let mut controls = StaticControls::new(5000, 5000);
        let snapshot = controls.sample();
        assert_eq!(snapshot.count_raw, RAW_LEVEL_MAX);
        assert_eq!(snapshot.delay_raw, RAW_LEVEL_MAX);
    }

    #[test]
    fn test_stdin_controls_keep_separate_presses_apart() {
        let (tx, rx) = unbounded();
        let mut controls = StdinControls::from_receiver(StaticControls::new(0, 0), rx);

        tx.send(ControlCommand::Inject).unwrap();
        tx.send(ControlCommand::Inject).unwrap();
        tx.send(ControlCommand::Suppress).unwrap();
        tx.send(ControlCommand::Count(2)).unwrap();

        let first = controls.sample();
        assert_eq!(first.inject_clicks, 1);
        assert!(!first.suppress_pressed());

        let second = controls.sample();
        assert_eq!(second.inject_clicks, 1);

        let third = controls.sample();
        assert!(!third.inject_pressed());
        assert!(third.suppress_pressed());
        assert_eq!(third.config().target_count, 0);

        let fourth = controls.sample();
        assert!(!fourth.suppress_pressed());
        assert_eq!(fourth.config().target_count, 2);
    }

    #[test]
    fn test_stdin_controls_drain_queued_commands() {
        let (tx, rx) = unbounded();
        let mut controls = StdinControls::from_receiver(StaticControls::new(0, 0), rx);

        tx.send(ControlCommand::Count(4)).unwrap();
        tx.send(ControlCommand::Delay(12)).unwrap();
        tx.send(ControlCommand::Suppress).unwrap();

        let snapshot = controls.sample();
        assert_eq!(snapshot.config(), InjectionConfig::new(4, 12));
        assert!(snapshot.suppress_pressed());
        assert!(!snapshot.quit);

        tx.send(ControlCommand::Quit).unwrap();
        drop(tx);
        let snapshot = controls.sample();
        assert!(!snapshot.suppress_pressed());
        assert!(snapshot.quit);
    }
}

use crate::midi::{MidiEngine, MidiMessage, Result};
use std::collections::VecDeque;
use std::time::Duration;

/// Scripted engine for tests: replays queued input and records everything sent
#[derive(Debug, Default)]
pub struct MockMidiEngine {
    incoming: VecDeque<MidiMessage>,
    sent: Vec<MidiMessage>,
}

impl MockMidiEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I: IntoIterator<Item = MidiMessage>>(messages: I) -> Self {
        Self {
            incoming: messages.into_iter().collect(),
            sent: Vec::new(),
        }
    }

    pub fn push_input(&mut self, msg: MidiMessage) {
        self.incoming.push_back(msg);
    }

    pub fn sent(&self) -> &[MidiMessage] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<MidiMessage> {
        std::mem::take(&mut self.sent)
    }
}

impl MidiEngine for MockMidiEngine {
    fn send(&mut self, msg: &MidiMessage) -> Result<()> {
        self.sent.push(*msg);
        Ok(())
    }

    fn poll(&mut self, _timeout: Duration) -> Result<Option<MidiMessage>> {
        Ok(self.incoming.pop_front())
    }
}

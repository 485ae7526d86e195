use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Channel value carried by system real-time messages, which address every channel
pub const OMNI: u8 = 0;

/// Custom error type for MIDI operations
#[derive(Debug)]
pub enum MidiError {
    /// Error when sending a MIDI message
    SendError(String),
    /// Error when receiving a MIDI message
    RecvError(String),
    /// Error when connecting to a MIDI device
    ConnectionError(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::RecvError(msg) => write!(f, "MIDI receive error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
        }
    }
}

impl Error for MidiError {}

impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for MidiError {
    fn from(e: midir::ConnectError<T>) -> Self {
        MidiError::ConnectionError(e.kind().to_string())
    }
}

impl From<midir::PortInfoError> for MidiError {
    fn from(e: midir::PortInfoError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl From<midir::SendError> for MidiError {
    fn from(e: midir::SendError) -> Self {
        MidiError::SendError(e.to_string())
    }
}

/// Message types understood by the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    NoteOff,
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    /// MIDI Clock timing message
    Clock,
    /// MIDI Start message
    Start,
    /// MIDI Continue message
    Continue,
    /// MIDI Stop message
    Stop,
    ActiveSensing,
    SystemReset,
}

impl MessageKind {
    fn from_status(status: u8) -> Option<Self> {
        let kind = match status {
            0xF8 => MessageKind::Clock,
            0xFA => MessageKind::Start,
            0xFB => MessageKind::Continue,
            0xFC => MessageKind::Stop,
            0xFE => MessageKind::ActiveSensing,
            0xFF => MessageKind::SystemReset,
            _ => match status & 0xF0 {
                0x80 => MessageKind::NoteOff,
                0x90 => MessageKind::NoteOn,
                0xA0 => MessageKind::PolyPressure,
                0xB0 => MessageKind::ControlChange,
                0xC0 => MessageKind::ProgramChange,
                0xD0 => MessageKind::ChannelPressure,
                0xE0 => MessageKind::PitchBend,
                _ => return None,
            },
        };
        Some(kind)
    }

    fn status_nibble(self) -> u8 {
        match self {
            MessageKind::NoteOff => 0x80,
            MessageKind::NoteOn => 0x90,
            MessageKind::PolyPressure => 0xA0,
            MessageKind::ControlChange => 0xB0,
            MessageKind::ProgramChange => 0xC0,
            MessageKind::ChannelPressure => 0xD0,
            MessageKind::PitchBend => 0xE0,
            MessageKind::Clock => 0xF8,
            MessageKind::Start => 0xFA,
            MessageKind::Continue => 0xFB,
            MessageKind::Stop => 0xFC,
            MessageKind::ActiveSensing => 0xFE,
            MessageKind::SystemReset => 0xFF,
        }
    }

    /// Number of data bytes following the status byte
    fn data_len(self) -> usize {
        match self {
            MessageKind::ProgramChange | MessageKind::ChannelPressure => 1,
            k if k.is_realtime() => 0,
            _ => 2,
        }
    }

    pub fn is_realtime(self) -> bool {
        self.status_nibble() >= 0xF8
    }
}

/// A parsed MIDI message. Channels are 1-16; real-time messages use [`OMNI`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiMessage {
    pub kind: MessageKind,
    pub channel: u8,
    pub data1: u8,
    pub data2: u8,
}

impl MidiMessage {
    pub fn new(kind: MessageKind, channel: u8, data1: u8, data2: u8) -> Self {
        Self {
            kind,
            channel,
            data1,
            data2,
        }
    }

    pub fn realtime(kind: MessageKind) -> Self {
        Self::new(kind, OMNI, 0, 0)
    }

    pub fn clock() -> Self {
        Self::realtime(MessageKind::Clock)
    }

    pub fn start() -> Self {
        Self::realtime(MessageKind::Start)
    }

    /// True when this message addresses `channel`, either directly or as a real-time message
    pub fn is_for_channel(&self, channel: u8) -> bool {
        self.channel == channel || self.channel == OMNI
    }

    pub fn parse(data: &[u8]) -> Option<MidiMessage> {
        let (&status, rest) = data.split_first()?;
        let kind = MessageKind::from_status(status)?;

        if rest.len() < kind.data_len() {
            return None;
        }

        let channel = if kind.is_realtime() {
            OMNI
        } else {
            (status & 0x0F) + 1
        };
        let data1 = if kind.data_len() >= 1 { rest[0] } else { 0 };
        let data2 = if kind.data_len() >= 2 { rest[1] } else { 0 };

        Some(MidiMessage::new(kind, channel, data1, data2))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        if self.kind.is_realtime() {
            return vec![self.kind.status_nibble()];
        }

        let status = self.kind.status_nibble() | (self.channel.saturating_sub(1) & 0x0F);
        match self.kind.data_len() {
            1 => vec![status, self.data1],
            _ => vec![status, self.data1, self.data2],
        }
    }
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Trait defining the interface for MIDI engine implementations
pub trait MidiEngine {
    /// Sends a MIDI message to the output device
    fn send(&mut self, msg: &MidiMessage) -> Result<()>;

    /// Waits up to `timeout` for the next inbound message.
    ///
    /// `Ok(None)` means nothing usable arrived in time.
    fn poll(&mut self, timeout: Duration) -> Result<Option<MidiMessage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_realtime_messages_without_channel() {
        assert_eq!(MidiMessage::parse(&[0xF8]), Some(MidiMessage::clock()));
        assert_eq!(MidiMessage::parse(&[0xFA]), Some(MidiMessage::start()));
        assert_eq!(
            MidiMessage::parse(&[0xFC]),
            Some(MidiMessage::realtime(MessageKind::Stop))
        );
        assert_eq!(
            MidiMessage::parse(&[0xFB]),
            Some(MidiMessage::realtime(MessageKind::Continue))
        );
    }

    #[test]
    fn parses_channel_voice_messages_one_based() {
        let msg = MidiMessage::parse(&[0x93, 60, 100]).unwrap();
        assert_eq!(msg, MidiMessage::new(MessageKind::NoteOn, 4, 60, 100));

        let msg = MidiMessage::parse(&[0xC0, 7]).unwrap();
        assert_eq!(msg, MidiMessage::new(MessageKind::ProgramChange, 1, 7, 0));
    }

    #[test]
    fn rejects_truncated_and_unknown_data() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0x90, 60]), None);
        assert_eq!(MidiMessage::parse(&[0xF0, 0x7E, 0xF7]), None);
        assert_eq!(MidiMessage::parse(&[0x40, 0x40]), None);
    }

    #[test]
    fn encodes_back_to_wire_bytes() {
        assert_eq!(MidiMessage::clock().to_bytes(), vec![0xF8]);
        assert_eq!(
            MidiMessage::new(MessageKind::ControlChange, 16, 7, 127).to_bytes(),
            vec![0xBF, 7, 127]
        );
        assert_eq!(
            MidiMessage::new(MessageKind::ChannelPressure, 2, 90, 0).to_bytes(),
            vec![0xD1, 90]
        );
    }

    #[test]
    fn realtime_messages_address_every_channel() {
        assert!(MidiMessage::clock().is_for_channel(1));
        assert!(MidiMessage::clock().is_for_channel(16));

        let note = MidiMessage::new(MessageKind::NoteOn, 3, 60, 1);
        assert!(note.is_for_channel(3));
        assert!(!note.is_for_channel(4));
    }
}

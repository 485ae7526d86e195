//! MIDI functionality for clockshim
//!
//! This module provides MIDI communication capabilities, including:
//! - Core MIDI message types and error handling
//! - Real MIDI device communication via midir
//! - A scripted engine for testing
//!
//! The main components are:
//! - [`MidiEngine`] trait for sending and receiving MIDI messages
//! - [`MidirEngine`] for real MIDI device communication
//! - [`MockMidiEngine`] for testing
//!
mod engine;
pub mod midir_engine;
pub mod mock_engine;

// Re-export main types from engine
pub use engine::{MessageKind, MidiEngine, MidiError, MidiMessage, Result, OMNI};

// Re-export concrete implementations
pub use midir_engine::{list_ports, MidirEngine};
pub use mock_engine::MockMidiEngine;

// Set default engine type
pub type DefaultMidiEngine = MidirEngine;

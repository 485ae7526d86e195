use crate::midi::{MidiEngine, MidiError, MidiMessage, Result};
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError};
use log::{debug, info};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::time::Duration;

/// Relay engine backed by one midir input port and one midir output port
pub struct MidirEngine {
    #[allow(dead_code)]
    input: MidiInputConnection<()>,
    output: MidiOutputConnection,
    rx: Receiver<Vec<u8>>,
}

impl MidirEngine {
    /// Connects to the first input and output ports whose names contain the given strings
    pub fn connect(input_name: &str, output_name: &str) -> Result<Self> {
        let mut midi_in = MidiInput::new("clockshim-in")?;
        // Clock and Start are filtered by midir unless told otherwise
        midi_in.ignore(Ignore::None);

        let in_ports = midi_in.ports();
        let in_port = in_ports
            .iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(input_name)
            })
            .ok_or_else(|| {
                MidiError::ConnectionError(format!("Input device '{}' not found", input_name))
            })?;
        info!("Connecting to MIDI input port: {}", midi_in.port_name(in_port)?);

        let (tx, rx) = unbounded();
        let input = midi_in.connect(
            in_port,
            "clockshim-input",
            move |_stamp, message, _| {
                let _ = tx.send(message.to_vec());
            },
            (),
        )?;

        let midi_out = MidiOutput::new("clockshim-out")?;
        let out_ports = midi_out.ports();
        let out_port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(output_name)
            })
            .ok_or_else(|| {
                MidiError::ConnectionError(format!("Output device '{}' not found", output_name))
            })?;
        info!(
            "Connecting to MIDI output port: {}",
            midi_out.port_name(out_port)?
        );
        let output = midi_out.connect(out_port, "clockshim-output")?;

        Ok(MidirEngine { input, output, rx })
    }
}

impl MidiEngine for MidirEngine {
    fn send(&mut self, msg: &MidiMessage) -> Result<()> {
        self.output.send(&msg.to_bytes())?;
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Option<MidiMessage>> {
        match self.rx.recv_timeout(timeout) {
            Ok(data) => {
                let parsed = MidiMessage::parse(&data);
                if parsed.is_none() {
                    debug!("Dropping unsupported MIDI data: {:02X?}", data);
                }
                Ok(parsed)
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(MidiError::RecvError(
                "MIDI input callback disconnected".to_string(),
            )),
        }
    }
}

/// Names of the available input and output ports
#[cfg(not(feature = "test-mock"))]
pub fn list_ports() -> Result<(Vec<String>, Vec<String>)> {
    let midi_in = MidiInput::new("clockshim-port-lister")?;
    let inputs = midi_in
        .ports()
        .iter()
        .filter_map(|p| midi_in.port_name(p).ok())
        .collect();

    let midi_out = MidiOutput::new("clockshim-port-lister")?;
    let outputs = midi_out
        .ports()
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();

    Ok((inputs, outputs))
}

#[cfg(feature = "test-mock")]
pub fn list_ports() -> Result<(Vec<String>, Vec<String>)> {
    // Mock implementation for tests
    let ports = vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()];
    Ok((ports.clone(), ports))
}

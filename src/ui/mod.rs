//! User interface components
//!
//! This module provides the terminal panel for clockshim, including:
//! - Lamps mirroring the two indicators
//! - A relay status line (tempo, injection run, counters)
//!
//! The panel is built using the indicatif library for spinners.

mod panel;
mod progress;

pub use panel::PanelIndicators;
pub use progress::{create_lamp_spinner, create_status_spinner, format_status};

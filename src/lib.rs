pub mod cli;
pub mod config;
pub mod controls;
pub mod indicator;
pub mod injection;
pub mod logging;
pub mod midi;
pub mod relay;
pub mod scheduler;
pub mod tempo;
pub mod ui;

pub use cli::Args;
pub use relay::{Relay, RelaySettings, RelayStats};

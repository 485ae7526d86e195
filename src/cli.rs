use clap::Parser;
use dialoguer::Select;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI ports
    #[arg(long)]
    pub list_ports: bool,

    /// MIDI input port to read the clock from
    #[arg(short, long)]
    pub input: Option<String>,

    /// MIDI output port to relay to
    #[arg(short, long)]
    pub output: Option<String>,

    /// MIDI channel (1-16) where clock injection applies
    #[arg(short, long)]
    pub channel: Option<u8>,

    /// Configuration file (TOML)
    #[arg(long, default_value = "clockshim.toml")]
    pub config: String,

    /// Initial number of clocks to inject after each Start (0-15)
    #[arg(long)]
    pub count: Option<u8>,

    /// Initial injection delay in milliseconds (0-51)
    #[arg(long)]
    pub delay: Option<u8>,

    /// Log indicator changes instead of drawing the terminal panel
    #[arg(long)]
    pub no_panel: bool,
}

pub fn validate_port(port_name: &str, ports: &[String]) -> Result<(), String> {
    if !ports.iter().any(|p| p.contains(port_name)) {
        let mut error_msg = format!(
            "Error: Port '{}' not found in available ports:\n",
            port_name
        );
        for port in ports {
            error_msg.push_str(&format!("  - {}\n", port));
        }
        return Err(error_msg);
    }
    Ok(())
}

/// Asks the user to pick one of `ports`
pub fn choose_port(prompt: &str, ports: &[String]) -> Result<String, String> {
    if ports.is_empty() {
        return Err(format!("Error: No ports available for {}", prompt));
    }
    let index = Select::new()
        .with_prompt(prompt)
        .items(ports)
        .default(0)
        .interact()
        .map_err(|e| format!("Error: Port selection failed: {}", e))?;
    Ok(ports[index].clone())
}

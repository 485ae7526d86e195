use clap::Parser;
use clockshim::{
    cli::{choose_port, validate_port, Args},
    config::RelayConfig,
    controls::StdinControls,
    indicator::{IndicatorSink, LogIndicators},
    logging,
    midi::{list_ports, DefaultMidiEngine},
    ui::PanelIndicators,
    Relay,
};

fn main() {
    initialize_logging();
    let args = Args::parse();

    let (inputs, outputs) = list_ports().unwrap_or_else(|e| exit_with_error(&e.to_string()));

    if args.list_ports {
        list_available_ports(&inputs, &outputs);
        return;
    }

    let config = RelayConfig::load(&args).unwrap_or_else(|e| exit_with_error(&e.to_string()));

    let input = resolve_port("MIDI input (clock source)", config.input_port.as_deref(), &inputs);
    let output = resolve_port("MIDI output", config.output_port.as_deref(), &outputs);

    let engine = match DefaultMidiEngine::connect(&input, &output) {
        Ok(engine) => {
            log::info!("Relaying '{}' -> '{}'", input, output);
            println!("Relaying '{}' -> '{}'", input, output);
            engine
        }
        Err(e) => exit_with_error(&format!("Error connecting to MIDI devices: {}", e)),
    };

    print_controls_help();
    let controls = StdinControls::spawn(config.count_raw, config.delay_raw);

    if config.panel {
        run_relay(engine, controls, PanelIndicators::new(), &config);
    } else {
        run_relay(engine, controls, LogIndicators, &config);
    }
}

fn initialize_logging() {
    match logging::init_logger() {
        Ok(path) => log::info!("Application starting, logging to {}", path.display()),
        Err(e) => eprintln!("Logger initialization failed: {}", e),
    }
}

fn list_available_ports(inputs: &[String], outputs: &[String]) {
    println!("Available MIDI input ports:");
    for port in inputs {
        println!("  - {}", port);
    }
    println!("Available MIDI output ports:");
    for port in outputs {
        println!("  - {}", port);
    }
}

fn resolve_port(prompt: &str, configured: Option<&str>, ports: &[String]) -> String {
    let result = match configured {
        Some(name) => validate_port(name, ports).map(|_| name.to_string()),
        None => choose_port(prompt, ports),
    };
    result.unwrap_or_else(|e| exit_with_error(&e))
}

fn print_controls_help() {
    println!("Controls: i = inject, s = suppress next clock, count <0-15>, delay <0-51>, q = quit");
}

fn run_relay<S: IndicatorSink>(
    engine: DefaultMidiEngine,
    controls: StdinControls,
    indicators: S,
    config: &RelayConfig,
) {
    let mut relay = Relay::new(engine, controls, indicators, config.relay_settings());
    let result = relay.run();

    let stats = relay.stats();
    // Finishes the panel before anything else is printed
    drop(relay);
    println!(
        "Forwarded {}, suppressed {}, injected {} (+{} manual)",
        stats.forwarded, stats.suppressed, stats.auto_injected, stats.manual_injected
    );

    if let Err(e) = result {
        exit_with_error(&format!("Relay stopped: {}", e));
    }
}

fn exit_with_error(error_msg: &str) -> ! {
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    std::process::exit(1);
}

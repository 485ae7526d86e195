#[cfg(test)]
mod tests {
    use clap::Parser;
    use clockshim::cli::validate_port;
    use clockshim::Args;

    #[test]
    #[cfg(feature = "test-mock")]
    fn test_port_list() {
        use clockshim::midi::list_ports;

        let (inputs, outputs) = list_ports().unwrap();
        assert_eq!(inputs, vec!["Mock Device 1", "Mock Device 2"]);
        assert_eq!(outputs, inputs);
    }

    #[test]
    fn test_args_with_ports_and_channel() {
        let args = Args::parse_from([
            "test",
            "--input",
            "Mock Device 1",
            "--output",
            "Mock Device 2",
            "--channel",
            "10",
        ]);
        assert_eq!(args.input, Some("Mock Device 1".to_string()));
        assert_eq!(args.output, Some("Mock Device 2".to_string()));
        assert_eq!(args.channel, Some(10));
        assert!(!args.list_ports);
        assert!(!args.no_panel);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["test"]);
        assert_eq!(args.input, None);
        assert_eq!(args.output, None);
        assert_eq!(args.channel, None);
        assert_eq!(args.count, None);
        assert_eq!(args.delay, None);
        assert_eq!(args.config, "clockshim.toml");
    }

    #[test]
    fn test_args_injection_levels() {
        let args = Args::parse_from(["test", "--count", "3", "--delay", "12", "--no-panel"]);
        assert_eq!(args.count, Some(3));
        assert_eq!(args.delay, Some(12));
        assert!(args.no_panel);
    }

    #[test]
    fn test_valid_port_binding() {
        let ports = vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()];
        assert!(validate_port("Device 2", &ports).is_ok());
    }

    #[test]
    fn test_invalid_port_binding() {
        let ports = vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()];
        let err = validate_port("Nonexistent Device", &ports).unwrap_err();
        assert!(err.contains("Nonexistent Device"));
        assert!(err.contains("  - Mock Device 1"));
    }
}

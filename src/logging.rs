use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

/// Directory holding the relay's log files
pub fn log_dir() -> Result<PathBuf, Error> {
    // Get user's home directory and construct log path
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("clockshim")
        .join("logs"))
}

/// Log file for today, one per calendar day
pub fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("relay-{}.log", date.format("%Y-%m-%d"))
}

/// Sends all log output to a file so the terminal stays free for the panel
pub fn init_logger() -> Result<PathBuf, Error> {
    let log_dir = log_dir()?;

    // Create the log directory if it doesn't exist
    fs::create_dir_all(&log_dir)?;

    let path = log_dir.join(log_file_name(chrono::Local::now().date_naive()));
    let log_file = OpenOptions::new().create(true).append(true).open(&path)?;

    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Off)
        .build();

    WriteLogger::init(LevelFilter::Debug, config, log_file)
        .map_err(|e| Error::new(ErrorKind::Other, e))?;
    Ok(path)
}

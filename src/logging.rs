use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Where log lines go. The TUI owns the terminal, so it logs to a file.
pub enum LogTarget {
    File,
    Stderr,
}

pub fn log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topicdeck")
        .join("topicdeck.log")
}

/// Install the global subscriber. `RUST_LOG` wins over `level`.
pub fn init(target: LogTarget, level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match target {
        LogTarget::File => {
            let path = log_path();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        LogTarget::Stderr => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}

/// Map `-v` repetitions onto a level; without `-v` the configured one applies.
pub fn level_for(configured: &str, verbose: u8) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

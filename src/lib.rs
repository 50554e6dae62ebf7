// hwtop Library - Public API

// Re-export error types
pub mod error;
pub use error::{HwtopError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;

use std::fs::{self, File};
use std::path::PathBuf;

/// Initialize logging.
///
/// With `to_file` set, records go to `<data dir>/hwtop/hwtop.log` so they
/// never land on the TUI's alternate screen. Otherwise they go to stderr.
pub fn init_logging(to_file: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env();

    if to_file {
        match open_log_file() {
            Some(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // no log file: stay silent rather than draw over the TUI
            None => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    let _ = builder.try_init();
}

pub fn log_file_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("hwtop").join("hwtop.log"))
}

fn open_log_file() -> Option<File> {
    let path = log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    File::create(path).ok()
}

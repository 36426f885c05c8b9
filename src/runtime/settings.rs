use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

use crate::config;

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("platter: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("platter: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}

/// Send `log` output to a file; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the configured level. Returns the log file path, or
/// `None` when no file could be opened (logging is then disabled).
pub fn init_logging(settings: &config::LoggingSettings) -> Option<PathBuf> {
    let path = settings.file.clone().or_else(config::default_log_path)?;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("platter: cannot create {}: {e}", parent.display());
            return None;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("platter: cannot open log file {}: {e}", path.display());
            return None;
        }
    };

    let level = settings.level.trim();
    let filter = if level.is_empty() { "info" } else { level };

    let result = Builder::from_env(Env::default().default_filter_or(filter))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
    if let Err(e) = result {
        eprintln!("platter: logger already initialized: {e}");
    }

    Some(path)
}

//! Shot Director command line shell
//!
//! Reads newline-delimited JSON from stdin and feeds it to the running frame
//! loop. Lines starting with `:` are key presses (`:1`, `:2`, `:3`, `:space`).
//!
//! Optional first argument: path to a JSON config file.

use std::io::{self, BufRead};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shot_director::bridge::{commands, spawn_pose_logger};
use shot_director::config::{MonitorConfig, DEFAULT_LOG_FILTER};
use shot_director::prefs::{JsonFilePreferences, MemoryPreferences, PreferenceStore};
use shot_director::start_director;

/// Interval between pose and notification log lines
const POSE_LOG_INTERVAL: Duration = Duration::from_secs(3);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    info!("starting");

    let config = match std::env::args().nth(1) {
        Some(path) => match MonitorConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path, error = %e, "failed to load config");
                std::process::exit(1);
            }
        },
        None => MonitorConfig::default(),
    };

    let prefs: Box<dyn PreferenceStore> = match &config.preferences_path {
        Some(path) => match JsonFilePreferences::open(path) {
            Ok(prefs) => Box::new(prefs),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "preferences unavailable, keeping them in memory");
                Box::new(MemoryPreferences::new())
            }
        },
        None => Box::new(MemoryPreferences::new()),
    };

    let handle = start_director(config, prefs);

    let _pose_logger = spawn_pose_logger(&handle, POSE_LOG_INTERVAL);

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "failed to read stdin");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match line.strip_prefix(':') {
            Some(key) => commands::send_key(&handle, if key.eq_ignore_ascii_case("space") { " " } else { key }),
            None => commands::push_line(&handle, line),
        };
        if let Err(e) = result {
            warn!(line = %line, error = %e, "input rejected");
        }
    }

    info!("stdin closed, shutting down");
    handle.shutdown();
}

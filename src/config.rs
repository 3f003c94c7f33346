use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// all the pauses in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// before the first demo step
    pub settle: Duration,
    /// from one demo step starting to the next one starting
    pub step: Duration,
    /// how long a signal stays lit (and controls stay off) per activation
    pub hold: Duration,
    /// extra wait before re-sounding the signal the player just pressed,
    /// so two identical presses don't blur into one. zero turns it off
    pub echo_pause: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            settle: Duration::from_millis(250),
            step: Duration::from_millis(1000),
            hold: Duration::from_millis(150),
            echo_pause: Duration::from_millis(250),
        }
    }
}

impl Timing {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold > self.step {
            return Err(ConfigError::HoldExceedsStep {
                hold_ms: self.hold.as_millis(),
                step_ms: self.step.as_millis(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub timing: Timing,
    pub best_level_path: PathBuf,
    pub log_path: PathBuf,
    pub mute: bool,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timing: Timing::default(),
            best_level_path: PathBuf::from("log/best_level.txt"),
            log_path: PathBuf::from("log/simon.log"),
            mute: false,
            seed: None,
        }
    }
}

impl Config {
    /// defaults, then anything set in SIMON_* variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Config::default();

        if let Some(v) = lookup("SIMON_BEST_LEVEL_FILE") {
            cfg.best_level_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SIMON_LOG_FILE") {
            cfg.log_path = PathBuf::from(v);
        }
        if let Some(ms) = parsed::<u64>(&lookup, "SIMON_SETTLE_MS") {
            cfg.timing.settle = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed::<u64>(&lookup, "SIMON_STEP_MS") {
            cfg.timing.step = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed::<u64>(&lookup, "SIMON_HOLD_MS") {
            cfg.timing.hold = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed::<u64>(&lookup, "SIMON_ECHO_MS") {
            cfg.timing.echo_pause = Duration::from_millis(ms);
        }
        if let Some(mute) = parsed::<bool>(&lookup, "SIMON_MUTE") {
            cfg.mute = mute;
        }
        if let Some(seed) = parsed::<u64>(&lookup, "SIMON_SEED") {
            cfg.seed = Some(seed);
        }

        cfg
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

use std::io;
use thiserror::Error;

use crate::round::RoundPhase;
use crate::signal::Signal;

/// something went wrong making a signal audible/visible
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not sound {signal:?}: {reason}")]
    Audio { signal: Signal, reason: String },

    #[error("could not silence {signal:?}: {reason}")]
    Release { signal: Signal, reason: String },
}

/// best level could not be read or written
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("best level I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("best level file holds {content:?}, not a level")]
    Malformed { content: String },
}

/// an operation was asked for at the wrong point in the round
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("expected phase {expected:?}, round is {actual:?}")]
    InvalidPhase {
        expected: RoundPhase,
        actual: RoundPhase,
    },

    #[error("already have {level} signals for this level")]
    SequenceFull { level: u32 },

    #[error("round needs more input before it can be evaluated")]
    Incomplete,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("round engine has stopped")]
    Stopped,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("render hold {hold_ms}ms is longer than playback step {step_ms}ms")]
    HoldExceedsStep { hold_ms: u128, step_ms: u128 },
}

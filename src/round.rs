//! # round
//!
//! everything one round needs to know lives in RoundState; the engine task is
//! its only owner. phases go strictly
//!
//!   Idle --start--> Demoing --playback done--> AwaitingInput
//!        --enough input--> Evaluated --outcome applied--> Idle
//!
//! the expected sequence is only ever appended to while the player keeps
//! passing, so every round replays the whole history from the start.

use crate::error::RoundError;
use crate::signal::{Signal, SignalSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Demoing,
    AwaitingInput,
    Evaluated,
}

#[derive(Debug)]
pub struct RoundState {
    level: u32,
    best_level: u32,
    expected: Vec<Signal>,
    actual: Vec<Signal>,
    phase: RoundPhase,
}

impl RoundState {
    /// fresh process: level 1, whatever best level we managed to load
    pub fn new(best_level: u32) -> Self {
        RoundState {
            level: 1,
            best_level: best_level.max(1),
            expected: Vec::new(),
            actual: Vec::new(),
            phase: RoundPhase::Idle,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn best_level(&self) -> u32 {
        self.best_level
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn expected(&self) -> &[Signal] {
        &self.expected
    }

    pub fn actual(&self) -> &[Signal] {
        &self.actual
    }

    /// grow the expected sequence up to the current level and start the demo
    pub fn start_round(&mut self, source: &mut dyn SignalSource) -> Result<(), RoundError> {
        self.require(RoundPhase::Idle)?;
        self.actual.clear();
        // after a fail the level dropped back; the old history goes
        self.expected.truncate(self.level as usize);
        while self.expected.len() < self.level as usize {
            self.expected.push(source.next());
        }
        self.phase = RoundPhase::Demoing;
        Ok(())
    }

    /// playback has shown every step; hand over to the player
    pub fn finish_playback(&mut self) -> Result<(), RoundError> {
        self.require(RoundPhase::Demoing)?;
        self.actual.clear();
        self.phase = RoundPhase::AwaitingInput;
        Ok(())
    }

    pub fn record_input(&mut self, signal: Signal) -> Result<(), RoundError> {
        self.require(RoundPhase::AwaitingInput)?;
        if self.is_complete() {
            return Err(RoundError::SequenceFull { level: self.level });
        }
        self.actual.push(signal);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.actual.len() == self.level as usize
    }

    /// stop taking input; the evaluator takes it from here
    pub fn mark_evaluated(&mut self) -> Result<(), RoundError> {
        self.require(RoundPhase::AwaitingInput)?;
        if !self.is_complete() {
            return Err(RoundError::Incomplete);
        }
        self.phase = RoundPhase::Evaluated;
        Ok(())
    }

    /// drop the round in progress without touching the level
    pub fn abandon(&mut self) {
        self.actual.clear();
        self.phase = RoundPhase::Idle;
    }

    /// something broke mid-round; treat it like a fail
    pub fn abort_with_reset(&mut self) {
        self.reset_level();
        self.phase = RoundPhase::Idle;
    }

    /// returns true if this was a new best
    pub(crate) fn advance_level(&mut self) -> bool {
        self.level += 1;
        self.actual.clear();
        self.phase = RoundPhase::Idle;
        if self.level > self.best_level {
            self.best_level = self.level;
            true
        } else {
            false
        }
    }

    pub(crate) fn fail_level(&mut self) {
        self.reset_level();
        self.phase = RoundPhase::Idle;
    }

    fn reset_level(&mut self) {
        self.level = 1;
        self.expected.clear();
        self.actual.clear();
    }

    fn require(&self, expected: RoundPhase) -> Result<(), RoundError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(RoundError::InvalidPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::ScriptedSignals;
    use Signal::*;

    fn awaiting(level_script: &[Signal]) -> RoundState {
        let mut r = RoundState::new(1);
        let mut src = ScriptedSignals::new(level_script);
        r.start_round(&mut src).unwrap();
        r.finish_playback().unwrap();
        r
    }

    #[test]
    fn test_new_state_is_idle_level_one() {
        let r = RoundState::new(0);
        assert_eq!(r.level(), 1);
        assert_eq!(r.best_level(), 1);
        assert_eq!(r.phase(), RoundPhase::Idle);
        assert!(r.expected().is_empty());
    }

    #[test]
    fn test_start_grows_expected_to_level() {
        let mut r = RoundState::new(1);
        let mut src = ScriptedSignals::new(&[Red, Blue, Green]);
        r.start_round(&mut src).unwrap();
        assert_eq!(r.expected(), &[Red]);
        assert_eq!(r.phase(), RoundPhase::Demoing);
    }

    #[test]
    fn test_start_rejected_outside_idle() {
        let mut r = awaiting(&[Red]);
        let mut src = ScriptedSignals::new(&[Blue]);
        assert_eq!(
            r.start_round(&mut src),
            Err(RoundError::InvalidPhase {
                expected: RoundPhase::Idle,
                actual: RoundPhase::AwaitingInput,
            })
        );
        assert_eq!(r.expected(), &[Red]);
    }

    #[test]
    fn test_record_rejected_while_demoing() {
        let mut r = RoundState::new(1);
        let mut src = ScriptedSignals::new(&[Yellow]);
        r.start_round(&mut src).unwrap();
        assert!(r.record_input(Yellow).is_err());
        assert!(r.actual().is_empty());
    }

    #[test]
    fn test_record_rejects_over_length() {
        let mut r = awaiting(&[Green]);
        r.record_input(Green).unwrap();
        assert!(r.is_complete());
        assert_eq!(
            r.record_input(Red),
            Err(RoundError::SequenceFull { level: 1 })
        );
        assert_eq!(r.actual(), &[Green]);
    }

    #[test]
    fn test_mark_evaluated_needs_full_input() {
        let mut r = RoundState::new(1);
        let mut src = ScriptedSignals::new(&[Green, Red]);
        r.start_round(&mut src).unwrap();
        r.advance_level();
        r.start_round(&mut src).unwrap();
        r.finish_playback().unwrap();
        r.record_input(Green).unwrap();
        assert_eq!(r.mark_evaluated(), Err(RoundError::Incomplete));
        r.record_input(Red).unwrap();
        r.mark_evaluated().unwrap();
        assert_eq!(r.phase(), RoundPhase::Evaluated);
    }

    #[test]
    fn test_history_kept_across_passes() {
        let mut r = RoundState::new(1);
        let mut src = ScriptedSignals::new(&[Green, Red, Yellow, Blue]);
        for _ in 0..3 {
            r.start_round(&mut src).unwrap();
            r.finish_playback().unwrap();
            r.advance_level();
        }
        r.start_round(&mut src).unwrap();
        assert_eq!(r.expected(), &[Green, Red, Yellow, Blue]);
    }

    #[test]
    fn test_fail_rebuilds_from_scratch() {
        let mut r = RoundState::new(1);
        let mut src = ScriptedSignals::new(&[Green, Red, Yellow]);
        r.start_round(&mut src).unwrap();
        r.advance_level();
        r.fail_level();
        assert_eq!(r.level(), 1);
        assert!(r.expected().is_empty());
        r.start_round(&mut src).unwrap();
        // source carries on from where it was
        assert_eq!(r.expected(), &[Red]);
    }

    #[test]
    fn test_abandon_keeps_level() {
        let mut r = awaiting(&[Blue]);
        r.record_input(Blue).unwrap();
        r.abandon();
        assert_eq!(r.phase(), RoundPhase::Idle);
        assert_eq!(r.level(), 1);
        assert!(r.actual().is_empty());
        assert_eq!(r.expected(), &[Blue]);
    }
}

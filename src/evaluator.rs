use tracing::{info, warn};

use crate::error::RoundError;
use crate::round::{RoundPhase, RoundState};
use crate::signal::Signal;
use crate::store::PersistenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `level` is the level the player moves on to
    Passed { level: u32, new_best: bool },
    Failed,
}

/// exact, in-order match. the length check can't decide anything once a
/// round is complete but costs nothing
pub fn sequences_match(expected: &[Signal], actual: &[Signal]) -> bool {
    expected.len() == actual.len() && expected.iter().zip(actual).all(|(e, a)| e == a)
}

/// decide the round and apply it: next level (saving a new best) or back to 1.
/// a store that won't take the new best is logged and otherwise ignored
pub fn evaluate(
    round: &mut RoundState,
    store: &dyn PersistenceStore,
) -> Result<Outcome, RoundError> {
    if round.phase() != RoundPhase::Evaluated {
        return Err(RoundError::InvalidPhase {
            expected: RoundPhase::Evaluated,
            actual: round.phase(),
        });
    }

    if !sequences_match(round.expected(), round.actual()) {
        info!(level = round.level(), "round failed, back to level 1");
        round.fail_level();
        return Ok(Outcome::Failed);
    }

    let new_best = round.advance_level();
    info!(level = round.level(), new_best, "round passed");
    if new_best {
        if let Err(e) = store.write_best_level(round.best_level()) {
            warn!(best_level = round.best_level(), error = %e, "could not save best level");
        }
    }
    Ok(Outcome::Passed {
        level: round.level(),
        new_best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::ScriptedSignals;
    use crate::store::MemoryStore;
    use Signal::*;

    /// play rounds passing each one until expected == script, then enter `inputs`
    fn evaluated(script: &[Signal], inputs: &[Signal], best: u32) -> RoundState {
        let mut r = RoundState::new(best);
        let mut src = ScriptedSignals::new(script);
        let store = MemoryStore::new();
        for _ in 1..script.len() {
            r.start_round(&mut src).unwrap();
            r.finish_playback().unwrap();
            for s in r.expected().to_vec() {
                r.record_input(s).unwrap();
            }
            r.mark_evaluated().unwrap();
            evaluate(&mut r, &store).unwrap();
        }
        r.start_round(&mut src).unwrap();
        assert_eq!(r.expected(), script);
        r.finish_playback().unwrap();
        for s in inputs {
            r.record_input(*s).unwrap();
        }
        r.mark_evaluated().unwrap();
        r
    }

    #[test]
    fn test_match() {
        assert!(sequences_match(&[Green, Red], &[Green, Red]));
        assert!(!sequences_match(&[Green, Red], &[Red, Green]));
        assert!(!sequences_match(&[Green, Red], &[Green]));
        assert!(sequences_match(&[], &[]));
    }

    #[test]
    fn test_exact_match_passes_and_saves_best() {
        let mut r = evaluated(&[Green, Red], &[Green, Red], 1);
        let store = MemoryStore::new();
        let outcome = evaluate(&mut r, &store).unwrap();
        assert_eq!(
            outcome,
            Outcome::Passed {
                level: 3,
                new_best: true
            }
        );
        assert_eq!(r.level(), 3);
        assert_eq!(r.best_level(), 3);
        assert_eq!(r.phase(), RoundPhase::Idle);
        assert_eq!(store.writes(), vec![3]);
    }

    #[test]
    fn test_pass_below_best_does_not_save() {
        let mut r = evaluated(&[Green, Red], &[Green, Red], 9);
        let store = MemoryStore::new();
        let outcome = evaluate(&mut r, &store).unwrap();
        assert_eq!(
            outcome,
            Outcome::Passed {
                level: 3,
                new_best: false
            }
        );
        assert_eq!(r.best_level(), 9);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_mismatch_resets_to_one() {
        let mut r = evaluated(&[Green, Red, Yellow], &[Green, Red, Blue], 1);
        let best_before = r.best_level();
        let outcome = evaluate(&mut r, &MemoryStore::new()).unwrap();
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(r.level(), 1);
        assert!(r.actual().is_empty());
        assert!(r.expected().is_empty());
        assert_eq!(r.best_level(), best_before);
    }

    #[test]
    fn test_store_failure_is_not_fatal() {
        let mut r = evaluated(&[Blue], &[Blue], 1);
        let outcome = evaluate(&mut r, &MemoryStore::failing()).unwrap();
        assert_eq!(
            outcome,
            Outcome::Passed {
                level: 2,
                new_best: true
            }
        );
        assert_eq!(r.best_level(), 2);
    }

    #[test]
    fn test_rejects_unfinished_round() {
        let mut r = RoundState::new(1);
        assert!(evaluate(&mut r, &MemoryStore::new()).is_err());
        assert_eq!(r.level(), 1);
    }

    #[test]
    fn test_level_tracks_consecutive_passes() {
        let script = [Green, Red, Yellow, Blue, Blue, Red];
        let mut r = RoundState::new(1);
        let mut src = ScriptedSignals::new(&script);
        let store = MemoryStore::new();
        let mut best_seen = r.best_level();
        for l in 1..=script.len() as u32 {
            r.start_round(&mut src).unwrap();
            assert_eq!(r.expected().len(), l as usize);
            r.finish_playback().unwrap();
            for s in r.expected().to_vec() {
                r.record_input(s).unwrap();
            }
            r.mark_evaluated().unwrap();
            evaluate(&mut r, &store).unwrap();
            assert_eq!(r.level(), l + 1);
            assert!(r.best_level() >= best_seen);
            best_seen = r.best_level();
        }
        assert_eq!(store.writes(), vec![2, 3, 4, 5, 6, 7]);
    }
}

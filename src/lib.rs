//! # simon
//!
//! the machine plays a growing sequence of coloured signals, the player
//! repeats it, each success adds one more step.
//!
//! ## Design
//!
//! * the round engine is the only thing with real state: level, the expected
//!   sequence, what the player has entered so far, and the round phase
//! * one task owns all of that (see engine); everything else sends it
//!   commands and reads back snapshots and events
//! * demo playback and the player's presses go through the same renderer, so
//!   they look and sound the same
//! * abstract the collaborators so alternatives can plug in:
//!    - signal source, with trait for handing out the next signal
//!    - renderer, with trait for making a signal visible/audible
//!    - sound, with trait for making beeps
//!    - persistence, with trait for the best level
//!    - display and input, with traits for the terminal board
//! * reference timings: 250ms settle, 1000ms per demo step, 150ms hold,
//!   250ms pause before repeating the same press
//!
//! Model
//!
//! main
//!  |-- config (defaults, SIMON_* env, command line)
//!  |-- engine(timing, signal source, renderer(sound), store)
//!  |    |-- round state
//!  |    `-- evaluator
//!  `-- ui loop
//!       |-- display.draw(engine.snapshot())
//!       `-- input.poll_action() -> engine.start_round() / on_signal_activated()
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod input;
pub mod render;
pub mod round;
pub mod signal;
pub mod sound;
pub mod store;
pub mod ui;

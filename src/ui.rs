use std::error::Error;
use std::time::Duration;

use tracing::info;

use crate::display::Display;
use crate::engine::EngineHandle;
use crate::input::{Action, Input};

/// roughly 60 redraws a second while nothing is pressed
pub const FRAME: Duration = Duration::from_millis(16);

/// draw, poll, forward; until the player quits. this side never mutates the
/// round, it only reports what was pressed
pub fn run(
    engine: &EngineHandle,
    display: &mut dyn Display,
    input: &mut dyn Input,
    frame: Duration,
) -> Result<(), Box<dyn Error>> {
    loop {
        display.draw(&engine.snapshot())?;
        match input.poll_action(frame)? {
            Some(Action::Activate(signal)) => engine.on_signal_activated(signal)?,
            Some(Action::Play) => engine.start_round()?,
            Some(Action::Abandon) => engine.abandon()?,
            Some(Action::Quit) => {
                info!("player quit");
                return Ok(());
            }
            None => {}
        }
    }
}

//! # engine
//!
//! the round engine runs as one task that owns the RoundState outright.
//! everybody else (the board, the keyboard, tests) talks to it through an
//! EngineHandle: commands go in over a channel, snapshots and events come out.
//! that makes every phase check and the mutation that follows it atomic, with
//! no flags shared between threads.
//!
//! timing is a single pending wake-up. the demo is a chain of them:
//!
//!   settle -> step 0 on -> hold -> step 0 off -> ... -> step n-1 off -> step
//!          -> AwaitingInput
//!
//! and each accepted press is "(echo pause) -> on -> hold -> off". controls
//! stay off from the moment a press is accepted until its own hold is over.
//! abandoning a round just drops the pending wake-up.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::config::Timing;
use crate::error::{EngineError, RenderError};
use crate::evaluator::{self, Outcome};
use crate::render::{RenderHandle, SignalRenderer};
use crate::round::{RoundPhase, RoundState};
use crate::signal::{Signal, SignalSource};
use crate::store::PersistenceStore;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartRound,
    Activate(Signal),
    Abandon,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// not the player's turn
    WrongPhase(RoundPhase),
    /// previous press is still being shown
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    RoundStarted { level: u32 },
    StartRejected { phase: RoundPhase },
    PlaybackStep { index: usize, signal: Signal },
    AwaitingInput { level: u32 },
    InputAccepted { signal: Signal, entered: usize },
    InputRejected { signal: Signal, reason: Rejection },
    RoundEvaluated(Outcome),
    RoundAborted { reason: String },
    Abandoned,
}

/// what a UI needs to draw the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub level: u32,
    pub best_level: u32,
    pub phase: RoundPhase,
    pub lit: Option<Signal>,
    pub controls_enabled: bool,
    pub entered: usize,
    pub last_outcome: Option<Outcome>,
}

#[derive(Debug)]
enum Wake {
    /// show expected[i], or hand over to the player once past the end
    DemoStep(usize),
    DemoRelease(usize),
    /// echo pause is over
    InputRender(Signal),
    InputRelease,
}

struct Scheduled {
    at: Instant,
    wake: Wake,
}

/// a signal that's currently on. `handle` is None when the renderer refused
/// to activate but we're still showing the pulse
struct Lit {
    signal: Signal,
    handle: Option<RenderHandle>,
}

pub struct Engine {
    timing: Timing,
    round: RoundState,
    source: Box<dyn SignalSource>,
    renderer: Box<dyn SignalRenderer>,
    store: Arc<dyn PersistenceStore>,
    scheduled: Option<Scheduled>,
    lit: Option<Lit>,
    input_busy: bool,
    step_started: Instant,
    last_outcome: Option<Outcome>,
    snapshot: watch::Sender<Snapshot>,
    events: broadcast::Sender<EngineEvent>,
}

impl Engine {
    /// loads the best level from `store`; if that fails we start from 1
    pub fn new(
        timing: Timing,
        source: impl SignalSource + 'static,
        renderer: impl SignalRenderer + 'static,
        store: Arc<dyn PersistenceStore>,
    ) -> Self {
        let best_level = match store.read_best_level() {
            Ok(level) => level,
            Err(e) => {
                warn!(error = %e, "could not load best level, starting from 1");
                1
            }
        };
        let round = RoundState::new(best_level);
        let (snapshot, _) = watch::channel(Snapshot {
            level: round.level(),
            best_level: round.best_level(),
            phase: round.phase(),
            lit: None,
            controls_enabled: false,
            entered: 0,
            last_outcome: None,
        });
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Engine {
            timing,
            round,
            source: Box::new(source),
            renderer: Box::new(renderer),
            store,
            scheduled: None,
            lit: None,
            input_busy: false,
            step_started: Instant::now(),
            last_outcome: None,
            snapshot,
            events,
        }
    }

    /// start the engine task. must be called from inside a tokio runtime
    pub fn spawn(self) -> (EngineHandle, JoinHandle<()>) {
        let (commands, rx) = mpsc::unbounded_channel();
        let handle = EngineHandle {
            commands,
            snapshot: self.snapshot.subscribe(),
            events: self.events.clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!(
            level = self.round.level(),
            best_level = self.round.best_level(),
            "round engine started"
        );
        loop {
            let deadline = self.scheduled.as_ref().map(|s| s.at);
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(s) = self.scheduled.take() {
                        self.wake(s.wake);
                    }
                }
            }
            self.publish();
        }
        self.cancel_pending();
        self.round.abandon();
        self.publish();
        info!("round engine stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::StartRound => self.start_round(),
            Command::Activate(signal) => self.on_signal_activated(signal),
            Command::Abandon => {
                self.cancel_pending();
                self.round.abandon();
                info!(level = self.round.level(), "round abandoned");
                self.emit(EngineEvent::Abandoned);
            }
            // handled by the loop
            Command::Shutdown => {}
        }
    }

    fn start_round(&mut self) {
        if let Err(e) = self.round.start_round(&mut *self.source) {
            debug!(error = %e, "start ignored");
            self.emit(EngineEvent::StartRejected {
                phase: self.round.phase(),
            });
            return;
        }
        info!(level = self.round.level(), "round started");
        self.last_outcome = None;
        self.emit(EngineEvent::RoundStarted {
            level: self.round.level(),
        });
        self.schedule_in(self.timing.settle, Wake::DemoStep(0));
    }

    fn on_signal_activated(&mut self, signal: Signal) {
        let phase = self.round.phase();
        let rejection = if phase != RoundPhase::AwaitingInput {
            Some(Rejection::WrongPhase(phase))
        } else if self.input_busy {
            Some(Rejection::Busy)
        } else {
            None
        };
        if let Some(reason) = rejection {
            debug!(?signal, ?reason, "activation ignored");
            self.emit(EngineEvent::InputRejected { signal, reason });
            return;
        }

        self.input_busy = true;
        let repeat = self.round.actual().last() == Some(&signal);
        if repeat && !self.timing.echo_pause.is_zero() {
            self.schedule_in(self.timing.echo_pause, Wake::InputRender(signal));
        } else {
            self.render_input(signal);
        }
    }

    fn render_input(&mut self, signal: Signal) {
        let handle = match self.renderer.activate(signal) {
            Ok(h) => Some(h),
            Err(e) => {
                // the press still counts, it just goes unheard
                warn!(error = %e, "could not render player signal");
                None
            }
        };
        self.lit = Some(Lit { signal, handle });

        if let Err(e) = self.round.record_input(signal) {
            warn!(error = %e, "accepted activation was not recorded");
        } else {
            debug!(?signal, entered = self.round.actual().len(), "input recorded");
            self.emit(EngineEvent::InputAccepted {
                signal,
                entered: self.round.actual().len(),
            });
        }
        if self.round.is_complete() {
            if let Err(e) = self.round.mark_evaluated() {
                warn!(error = %e, "could not close round for evaluation");
            }
        }
        self.schedule_in(self.timing.hold, Wake::InputRelease);
    }

    fn wake(&mut self, wake: Wake) {
        match wake {
            Wake::DemoStep(index) => self.demo_step(index),
            Wake::DemoRelease(index) => {
                if let Err(e) = self.release_lit() {
                    error!(error = %e, index, "playback render failed");
                    self.abort_playback(e);
                    return;
                }
                let next = self.step_started + self.timing.step;
                self.schedule_at(next, Wake::DemoStep(index + 1));
            }
            Wake::InputRender(signal) => self.render_input(signal),
            Wake::InputRelease => {
                if let Err(e) = self.release_lit() {
                    warn!(error = %e, "could not release player signal");
                }
                self.input_busy = false;
                if self.round.phase() == RoundPhase::Evaluated {
                    self.evaluate();
                }
            }
        }
    }

    fn demo_step(&mut self, index: usize) {
        let signal = match self.round.expected().get(index) {
            Some(s) => *s,
            None => {
                if let Err(e) = self.round.finish_playback() {
                    warn!(error = %e, "playback finished outside the demo");
                    return;
                }
                debug!(level = self.round.level(), "playback done, player's turn");
                self.emit(EngineEvent::AwaitingInput {
                    level: self.round.level(),
                });
                return;
            }
        };

        self.step_started = Instant::now();
        match self.renderer.activate(signal) {
            Ok(handle) => {
                self.lit = Some(Lit {
                    signal,
                    handle: Some(handle),
                });
                debug!(index, ?signal, "playback step");
                self.emit(EngineEvent::PlaybackStep { index, signal });
                self.schedule_in(self.timing.hold, Wake::DemoRelease(index));
            }
            Err(e) => {
                error!(error = %e, index, "playback render failed");
                self.abort_playback(e);
            }
        }
    }

    fn evaluate(&mut self) {
        match evaluator::evaluate(&mut self.round, self.store.as_ref()) {
            Ok(outcome) => {
                self.last_outcome = Some(outcome);
                self.emit(EngineEvent::RoundEvaluated(outcome));
            }
            Err(e) => warn!(error = %e, "evaluation skipped"),
        }
    }

    /// playback can't go on; drop back to level 1 rather than leave the
    /// round stuck in the demo
    fn abort_playback(&mut self, cause: RenderError) {
        self.cancel_pending();
        self.round.abort_with_reset();
        self.last_outcome = None;
        self.emit(EngineEvent::RoundAborted {
            reason: cause.to_string(),
        });
    }

    /// forget any pending wake-up and turn off whatever is lit
    fn cancel_pending(&mut self) {
        self.scheduled = None;
        self.input_busy = false;
        if let Err(e) = self.release_lit() {
            warn!(error = %e, "could not release signal while cancelling");
        }
    }

    fn release_lit(&mut self) -> Result<(), RenderError> {
        match self.lit.take() {
            Some(Lit {
                handle: Some(handle),
                ..
            }) => self.renderer.release(handle),
            _ => Ok(()),
        }
    }

    fn schedule_in(&mut self, delay: std::time::Duration, wake: Wake) {
        self.schedule_at(Instant::now() + delay, wake);
    }

    fn schedule_at(&mut self, at: Instant, wake: Wake) {
        if let Some(old) = &self.scheduled {
            // only one thing is ever pending; anything else is a bug in here
            warn!(wake = ?old.wake, "replacing pending wake-up");
        }
        self.scheduled = Some(Scheduled { at, wake });
    }

    fn emit(&self, event: EngineEvent) {
        // nobody listening is fine
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        let phase = self.round.phase();
        self.snapshot.send_replace(Snapshot {
            level: self.round.level(),
            best_level: self.round.best_level(),
            phase,
            lit: self.lit.as_ref().map(|l| l.signal),
            controls_enabled: phase == RoundPhase::AwaitingInput && !self.input_busy,
            entered: self.round.actual().len(),
            last_outcome: self.last_outcome,
        });
    }
}

/// cheap to clone; every method returns straight away without waiting for
/// the engine to act
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<Snapshot>,
    events: broadcast::Sender<EngineEvent>,
}

impl EngineHandle {
    pub fn send(&self, cmd: Command) -> Result<(), EngineError> {
        self.commands.send(cmd).map_err(|_| EngineError::Stopped)
    }

    /// the "Play" / "Next Level" button
    pub fn start_round(&self) -> Result<(), EngineError> {
        self.send(Command::StartRound)
    }

    /// one of the four pads was pressed
    pub fn on_signal_activated(&self, signal: Signal) -> Result<(), EngineError> {
        self.send(Command::Activate(signal))
    }

    pub fn abandon(&self) -> Result<(), EngineError> {
        self.send(Command::Abandon)
    }

    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.send(Command::Shutdown)
    }

    /// latest published state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    /// only sees events sent after subscribing
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

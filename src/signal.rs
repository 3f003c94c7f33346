use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// one of the four coloured pads; position on the board doubles as the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Green,
    Red,
    Yellow,
    Blue,
}

/// how many distinct signals there are
pub const SIGNAL_COUNT: usize = 4;

/// board order: top-left, top-right, bottom-left, bottom-right
pub const ALL_SIGNALS: [Signal; SIGNAL_COUNT] =
    [Signal::Green, Signal::Red, Signal::Yellow, Signal::Blue];

impl Signal {
    pub fn index(self) -> usize {
        match self {
            Signal::Green => 0,
            Signal::Red => 1,
            Signal::Yellow => 2,
            Signal::Blue => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Signal> {
        ALL_SIGNALS.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Signal::Green => "green",
            Signal::Red => "red",
            Signal::Yellow => "yellow",
            Signal::Blue => "blue",
        }
    }
}

/// where the machine's half of the sequence comes from
pub trait SignalSource: Send {
    fn next(&mut self) -> Signal;
}

/// uniform over the four signals; no modulo games, gen_range does it properly
pub struct RandomSignals {
    rng: StdRng,
}

impl RandomSignals {
    pub fn new() -> Self {
        RandomSignals {
            rng: StdRng::from_entropy(),
        }
    }

    /// same seed, same game
    pub fn seeded(seed: u64) -> Self {
        RandomSignals {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for RandomSignals {
    fn next(&mut self) -> Signal {
        ALL_SIGNALS[self.rng.gen_range(0..SIGNAL_COUNT)]
    }
}

/// replays a fixed script, wrapping round at the end; handy for tests
pub struct ScriptedSignals {
    script: Vec<Signal>,
    pos: usize,
}

impl ScriptedSignals {
    pub fn new(script: &[Signal]) -> Self {
        assert!(!script.is_empty(), "ScriptedSignals needs at least one signal");
        ScriptedSignals {
            script: Vec::from(script),
            pos: 0,
        }
    }
}

impl SignalSource for ScriptedSignals {
    fn next(&mut self) -> Signal {
        let s = self.script[self.pos % self.script.len()];
        self.pos += 1;
        s
    }
}

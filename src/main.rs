use clap::Parser;
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use simon::config::Config;
use simon::display::BoardDisplay;
use simon::engine::Engine;
use simon::input::KeyboardInput;
use simon::render::ToneRenderer;
use simon::signal::RandomSignals;
use simon::sound::{Mute, SimpleBeep, Sound};
use simon::store::FileStore;
use simon::ui;

/// Simon says, in a terminal
#[derive(Parser, Debug)]
#[command(name = "simon", version)]
struct Args {
    /// where the best level is kept
    #[arg(long)]
    best_level_file: Option<PathBuf>,

    /// where log output goes; the terminal belongs to the board
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// no beeps
    #[arg(long)]
    mute: bool,

    /// fix the random sequence
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    settle_ms: Option<u64>,

    #[arg(long)]
    step_ms: Option<u64>,

    #[arg(long)]
    hold_ms: Option<u64>,

    /// pause before re-sounding a repeated press; 0 turns it off
    #[arg(long)]
    echo_ms: Option<u64>,
}

impl Args {
    fn apply(self, cfg: &mut Config) {
        if let Some(p) = self.best_level_file {
            cfg.best_level_path = p;
        }
        if let Some(p) = self.log_file {
            cfg.log_path = p;
        }
        if self.mute {
            cfg.mute = true;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(ms) = self.settle_ms {
            cfg.timing.settle = Duration::from_millis(ms);
        }
        if let Some(ms) = self.step_ms {
            cfg.timing.step = Duration::from_millis(ms);
        }
        if let Some(ms) = self.hold_ms {
            cfg.timing.hold = Duration::from_millis(ms);
        }
        if let Some(ms) = self.echo_ms {
            cfg.timing.echo_pause = Duration::from_millis(ms);
        }
    }
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // initialise
    let mut cfg = Config::from_env();
    Args::parse().apply(&mut cfg);
    cfg.timing.validate()?;
    init_logging(&cfg.log_path)?;

    let sound: Box<dyn Sound> = if cfg.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let source = match cfg.seed {
        Some(seed) => RandomSignals::seeded(seed),
        None => RandomSignals::new(),
    };
    let store = Arc::new(FileStore::new(cfg.best_level_path.clone()));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let (engine, task) = {
        let _guard = runtime.enter();
        Engine::new(cfg.timing, source, ToneRenderer::new(sound), store).spawn()
    };

    // the board owns the terminal until it's dropped
    let result = {
        let mut input = KeyboardInput::new()?;
        let mut display = BoardDisplay::new()?;
        ui::run(&engine, &mut display, &mut input, ui::FRAME)
    };

    // a stopped engine has nothing left to wait for
    if engine.shutdown().is_ok() {
        runtime.block_on(task)?;
    }
    result
}

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tracing::warn;
use tui::backend::CrosstermBackend;
use tui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

use crate::engine::Snapshot;
use crate::evaluator::Outcome;
use crate::round::RoundPhase;
use crate::signal::{Signal, ALL_SIGNALS};

/// Display draws the board from whatever the engine last published. it never
/// touches the round itself
pub trait Display {
    fn draw(&mut self, snapshot: &Snapshot) -> Result<(), io::Error>;
}

/// the play button's caption
pub fn button_label(snapshot: &Snapshot) -> &'static str {
    match snapshot.phase {
        RoundPhase::Demoing => "Playing",
        RoundPhase::AwaitingInput | RoundPhase::Evaluated => "Your turn",
        RoundPhase::Idle => match snapshot.last_outcome {
            Some(Outcome::Passed { .. }) => "Next Level",
            _ => "Play",
        },
    }
}

/// pad colour; lit pads get the bright variant
pub fn pad_colour(signal: Signal, lit: bool) -> Color {
    match (signal, lit) {
        (Signal::Green, false) => Color::Green,
        (Signal::Green, true) => Color::LightGreen,
        (Signal::Red, false) => Color::Red,
        (Signal::Red, true) => Color::LightRed,
        (Signal::Yellow, false) => Color::Yellow,
        (Signal::Yellow, true) => Color::LightYellow,
        (Signal::Blue, false) => Color::Blue,
        (Signal::Blue, true) => Color::LightBlue,
    }
}

pub fn progress_line(snapshot: &Snapshot) -> String {
    match snapshot.phase {
        RoundPhase::AwaitingInput | RoundPhase::Evaluated => {
            format!("{}/{}", snapshot.entered, snapshot.level)
        }
        _ => String::new(),
    }
}

// split a rect into a 2x2 grid, in board order
fn quadrants(area: Rect) -> Vec<Rect> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);
    rows.iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
                .split(*row)
        })
        .collect()
}

/// the board in a terminal, rendered using TUI and crossterm
pub struct BoardDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl BoardDisplay {
    pub fn new() -> Result<BoardDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(BoardDisplay { terminal })
    }
}

impl Drop for BoardDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.show_cursor() {
            warn!(error = %e, "could not restore cursor");
        }
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, LeaveAlternateScreen) {
            warn!(error = %e, "could not leave alternate screen");
        }
    }
}

impl Display for BoardDisplay {
    fn draw(&mut self, snapshot: &Snapshot) -> Result<(), io::Error> {
        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Min(8),
                        Constraint::Length(3),
                    ]
                    .as_ref(),
                )
                .split(f.size());

            let header = Paragraph::new(Spans::from(vec![
                Span::styled(
                    format!("Level {}", snapshot.level),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled(
                    format!("Best Level {}", snapshot.best_level),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().title("Simon").borders(Borders::ALL));
            f.render_widget(header, chunks[0]);

            for (signal, area) in ALL_SIGNALS.iter().zip(quadrants(chunks[1])) {
                let lit = snapshot.lit == Some(*signal);
                let mut style = Style::default().bg(pad_colour(*signal, lit));
                if lit {
                    style = style.add_modifier(Modifier::BOLD);
                }
                let pad = Paragraph::new(format!("{}", signal.index() + 1))
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).style(style));
                f.render_widget(pad, area);
            }

            let footer = Paragraph::new(Spans::from(vec![
                Span::styled(
                    format!("[ {} ]", button_label(snapshot)),
                    Style::default().add_modifier(Modifier::REVERSED),
                ),
                Span::raw(format!("  {}", progress_line(snapshot))),
                Span::raw("   space: play  1-4: pads  x: give up  q: quit"),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(footer, chunks[2]);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers what it was asked to draw
pub struct DummyDisplay {
    pub frames: Vec<Snapshot>,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay { frames: Vec::new() }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, snapshot: &Snapshot) -> Result<(), io::Error> {
        self.frames.push(snapshot.clone());
        Ok(())
    }
}

use std::{
    io::{self, Write},
    ops::Range,
};

use anyhow::{bail, Result};
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::Stylize,
    terminal::{Clear, ClearType},
};
use tracing::debug;

use crate::model::{Choice, ChoiceValue};

/// Most rows shown at once.
pub const PAGE_SIZE: usize = 10;

const HELP: &str = "↑/↓ or j/k to move, Enter to open, q/Esc to quit";

/// Where the selector gets its keystrokes from.
pub trait KeySource {
    fn next_key(&mut self) -> io::Result<KeyEvent>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Resolved(ChoiceValue),
    Cancelled,
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Ignore,
    Moved,
    Done(Selection),
}

/// One interactive menu session. `run` consumes it, so a finished
/// session can never be resumed.
pub struct Selector {
    choices: Vec<Choice>,
    cursor: usize,
    color: bool,
    drawn: u16,
}

impl Selector {
    pub fn new(choices: Vec<Choice>) -> Result<Self> {
        if choices.is_empty() {
            bail!("nothing to select from");
        }
        Ok(Self { choices, cursor: 0, color: true, drawn: 0 })
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn last_index(&self) -> usize {
        self.choices.len() - 1
    }

    /// Rows currently on screen: at most `PAGE_SIZE`, centred on the cursor
    /// unless that would run past either end.
    pub fn viewport(&self) -> Range<usize> {
        let len = self.choices.len();
        let size = len.min(PAGE_SIZE);
        let start = self.cursor.saturating_sub(size / 2).min(len - size);
        start..start + size
    }

    fn handle_key(&mut self, key: KeyEvent) -> Step {
        if key.kind == KeyEventKind::Release {
            return Step::Ignore;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => Step::Done(Selection::Cancelled),
            _ if ctrl || key.modifiers.contains(KeyModifiers::ALT) => Step::Ignore,
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                Step::Moved
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1).min(self.last_index());
                Step::Moved
            }
            KeyCode::Enter => Step::Done(Selection::Resolved(self.choices[self.cursor].value.clone())),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => Step::Done(Selection::Cancelled),
            _ => Step::Ignore,
        }
    }

    fn erase(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.drawn > 0 {
            queue!(out, MoveUp(self.drawn))?;
        }
        queue!(out, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
        self.drawn = 0;
        Ok(())
    }

    fn render(&mut self, out: &mut impl Write) -> io::Result<()> {
        self.erase(out)?;
        let window = self.viewport();
        let mut lines: Vec<String> = Vec::with_capacity(window.len() + 3);

        lines.push(if self.color {
            format!("{} {}", "Select a file".bold(), HELP.dark_grey())
        } else {
            format!("Select a file ({HELP})")
        });
        if window.start > 0 {
            lines.push(format!("  ↑ {} more", window.start));
        }
        for i in window.clone() {
            let label = &self.choices[i].label;
            lines.push(match (i == self.cursor, self.color) {
                (true, true) => format!("{} {label}", "❯".cyan().bold()),
                (true, false) => format!("❯ {label}"),
                (false, _) => format!("  {label}"),
            });
        }
        let below = self.choices.len() - window.end;
        if below > 0 {
            lines.push(format!("  ↓ {below} more"));
        }

        for line in &lines {
            write!(out, "{line}\r\n")?;
        }
        self.drawn = lines.len() as u16;
        out.flush()
    }

    /// Draws the menu and consumes keys until the user confirms or cancels.
    /// The menu is erased before returning.
    pub fn run(mut self, keys: &mut impl KeySource, out: &mut impl Write) -> io::Result<Selection> {
        self.render(out)?;
        loop {
            match self.handle_key(keys.next_key()?) {
                Step::Ignore => {}
                Step::Moved => self.render(out)?,
                Step::Done(selection) => {
                    self.erase(out)?;
                    out.flush()?;
                    debug!(?selection, choice = %self.choices[self.cursor].short_label, "selector finished");
                    return Ok(selection);
                }
            }
        }
    }
}

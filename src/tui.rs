use std::{
    io::{self, IsTerminal, Write},
    ops::{Deref, DerefMut},
};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, DisableLineWrap, EnableLineWrap},
};
use tracing::debug;

use crate::{
    app::Pick,
    error::AppError,
    model::Choice,
    ui::{KeySource, Selection, Selector},
};

/// A terminal the selector can take over: it reports whether it is
/// interactive, toggles raw mode and delivers keys.
pub trait Terminal: KeySource {
    fn is_interactive(&self) -> bool;
    fn enter_raw_mode(&mut self) -> io::Result<()>;
    fn leave_raw_mode(&mut self);
}

/// The controlling terminal, via crossterm. Draws its cursor changes to stderr.
pub struct Crossterm;

impl KeySource for Crossterm {
    /// Mouse, focus and resize events are skipped.
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            if let Event::Key(key) = event::read()? {
                return Ok(key);
            }
        }
    }
}

impl Terminal for Crossterm {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal() && io::stderr().is_terminal()
    }

    fn enter_raw_mode(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stderr(), cursor::Hide, DisableLineWrap) {
            self.leave_raw_mode();
            return Err(e);
        }
        Ok(())
    }

    fn leave_raw_mode(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), cursor::Show, EnableLineWrap);
    }
}

/// Holds a terminal in raw mode; dropping it restores normal input on
/// every exit path, including panics.
pub struct RawModeGuard<'a, T: Terminal> {
    term: &'a mut T,
}

impl<'a, T: Terminal> RawModeGuard<'a, T> {
    pub fn acquire(term: &'a mut T) -> io::Result<Self> {
        term.enter_raw_mode()?;
        debug!("raw mode on");
        Ok(Self { term })
    }
}

impl<T: Terminal> Deref for RawModeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.term
    }
}

impl<T: Terminal> DerefMut for RawModeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.term
    }
}

impl<T: Terminal> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        self.term.leave_raw_mode();
        debug!("raw mode off");
    }
}

/// Runs the selector on a terminal, drawing the menu to `out`.
pub struct TerminalPicker<T, W> {
    term: T,
    out: W,
    color: bool,
}

impl<T: Terminal, W: Write> TerminalPicker<T, W> {
    pub fn new(term: T, out: W, color: bool) -> Self {
        Self { term, out, color }
    }
}

impl<T: Terminal, W: Write> Pick for TerminalPicker<T, W> {
    fn pick(&mut self, choices: Vec<Choice>) -> Result<Selection> {
        if !self.term.is_interactive() {
            return Err(AppError::InteractiveUnsupported.into());
        }
        let selector = Selector::new(choices)?.with_color(self.color);

        let mut term = RawModeGuard::acquire(&mut self.term).map_err(|e| {
            debug!(error = %e, "cannot enter raw mode");
            AppError::InteractiveUnsupported
        })?;
        Ok(selector.run(&mut *term, &mut self.out)?)
    }
}

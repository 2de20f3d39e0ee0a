use std::{io::Write, path::PathBuf};

use anyhow::Result;
use tracing::info;

use crate::{
    cli::Locations,
    edit,
    model::{choices_for, Choice, ChoiceValue},
    scan,
    strategy::StrategyTable,
    ui::Selection,
};

/// Something that lets the user pick one of `choices`.
pub trait Pick {
    fn pick(&mut self, choices: Vec<Choice>) -> Result<Selection>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    NoFiles,
    Cancelled,
    Opened(PathBuf),
}

pub struct App<'a> {
    pub locations: Locations,
    pub strategies: &'a StrategyTable,
    pub color: bool,
}

impl App<'_> {
    /// Discover, select, open. Cancelling and finding nothing are not errors.
    pub fn run(&self, open_type: &str, picker: &mut impl Pick, out: &mut impl Write) -> Result<RunStatus> {
        let strategy = self.strategies.resolve(open_type)?;
        info!(open_type, strategy = %strategy.name, description = %strategy.description, "resolved open type");

        let files = scan::discover(&self.locations)?;
        if files.is_empty() {
            writeln!(out, "No shell configuration files found.")?;
            return Ok(RunStatus::NoFiles);
        }

        let path = match picker.pick(choices_for(&files, self.color))? {
            Selection::Resolved(ChoiceValue::File(path)) => path,
            Selection::Resolved(ChoiceValue::Quit) | Selection::Cancelled => {
                writeln!(out, "Operation cancelled.")?;
                return Ok(RunStatus::Cancelled);
            }
        };

        let outcome = edit::launch(&path, strategy)?;
        info!(?outcome, path = %path.display(), "opened");
        writeln!(out, "Opened {} with {}.", path.display(), strategy.name)?;
        Ok(RunStatus::Opened(path))
    }
}

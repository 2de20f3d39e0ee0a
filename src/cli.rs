use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "shellconf",
    version,
    about = "Find your zsh configuration files and open one in an editor"
)]
#[command(group(
    ArgGroup::new("mode")
        .args(["open_type", "update", "reinstall", "uninstall"])
        .multiple(false)
))]
pub struct Cli {
    /// How to open the selected file: default, vim, nano, code, subl
    #[arg(short, long, value_name = "TYPE")]
    pub open_type: Option<String>,

    /// Pull the latest sources and re-run the installer
    #[arg(short, long)]
    pub update: bool,

    /// Re-run the installer from the project directory
    #[arg(short, long)]
    pub reinstall: bool,

    /// Remove shellconf from this machine
    #[arg(long)]
    pub uninstall: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maintenance {
    Update,
    Reinstall,
    Uninstall,
}

impl Cli {
    pub fn open_type(&self) -> &str {
        self.open_type.as_deref().unwrap_or("default")
    }

    /// Set when a maintenance flag routes around the interactive flow.
    pub fn maintenance(&self) -> Option<Maintenance> {
        if self.update {
            Some(Maintenance::Update)
        } else if self.reinstall {
            Some(Maintenance::Reinstall)
        } else if self.uninstall {
            Some(Maintenance::Uninstall)
        } else {
            None
        }
    }
}

/// Exit status for a failed parse: help and version are not failures,
/// every usage error exits 1 like any other reported error.
pub fn usage_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// The two places configuration files are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    pub primary: PathBuf,
    pub secondary_dir: PathBuf,
}

impl Locations {
    pub fn from_env() -> Result<Self> {
        let home = env::var("HOME").context("HOME not set; cannot locate shell configuration")?;
        Ok(Self::resolve(
            PathBuf::from(home),
            non_empty_var("ZDOTDIR"),
            non_empty_var("XDG_CONFIG_HOME"),
        ))
    }

    fn resolve(home: PathBuf, zdotdir: Option<String>, xdg: Option<String>) -> Self {
        let primary = zdotdir.map(PathBuf::from).unwrap_or_else(|| home.clone()).join(".zshrc");
        let secondary_dir = xdg
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".config"))
            .join("zsh");
        Self { primary, secondary_dir }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

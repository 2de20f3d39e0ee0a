use std::{
    env,
    ffi::OsString,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{cli::{Locations, Maintenance}, error::AppError};

/// Lines the installer appends to the primary startup file.
pub const INSTALL_LINES: &[&str] = &[
    "# added by shellconf installer",
    "export PATH=\"$HOME/.shellconf/bin:$PATH\"",
];

fn maintenance_error(message: impl Into<String>, hint: Option<&str>) -> AppError {
    AppError::Maintenance { message: message.into(), hint: hint.map(str::to_string) }
}

/// `home` (the value of `SHELLCONF_HOME`) when set, else the nearest
/// ancestor of `exe` that holds `install.sh`.
fn find_project_dir(home: Option<OsString>, exe: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = home.filter(|v| !v.is_empty()) {
        let dir = PathBuf::from(dir);
        return dir.is_dir().then_some(dir);
    }
    exe?.ancestors().skip(1).find(|d| d.join("install.sh").is_file()).map(Path::to_path_buf)
}

fn require_project_dir(dir: Option<PathBuf>) -> Result<PathBuf, AppError> {
    dir.ok_or_else(|| {
        maintenance_error(
            "cannot find the shellconf project directory",
            Some("set SHELLCONF_HOME to the directory containing install.sh"),
        )
    })
}

fn run_step(step: &str, command: &mut Command) -> Result<(), AppError> {
    debug!(step, ?command, "running");
    let status = command
        .status()
        .map_err(|e| maintenance_error(format!("{step} could not start: {e}"), None))?;
    if !status.success() {
        let code = status.code().map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
        return Err(maintenance_error(format!("{step} failed with {code}"), None));
    }
    Ok(())
}

fn install(dir: &Path) -> Result<(), AppError> {
    run_step("install.sh", Command::new("sh").arg("install.sh").current_dir(dir))
}

/// Result of stripping installer lines from a startup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleanup {
    pub removed: usize,
    pub backup: Option<PathBuf>,
}

/// The line without its `\n` or `\r\n` terminator.
fn without_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Removes lines that are exactly one of the installer lines, keeping a
/// backup. Every other byte, line endings included, is written back as is.
/// Nothing is written when no line matches.
pub fn strip_install_lines(file: &Path) -> Result<Cleanup> {
    let text = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Cleanup { removed: 0, backup: None }),
        Err(e) => return Err(e).with_context(|| format!("reading {}", file.display())),
    };

    let (dropped, kept): (Vec<&str>, Vec<&str>) = text
        .split_inclusive('\n')
        .partition(|l| INSTALL_LINES.contains(&without_terminator(l)));
    if dropped.is_empty() {
        return Ok(Cleanup { removed: 0, backup: None });
    }

    let backup = backup_path(file);
    fs::copy(file, &backup).with_context(|| format!("backing up {}", file.display()))?;
    fs::write(file, kept.concat()).with_context(|| format!("writing {}", file.display()))?;
    info!(removed = dropped.len(), backup = %backup.display(), "stripped installer lines");
    Ok(Cleanup { removed: dropped.len(), backup: Some(backup) })
}

/// `<file>.shellconf.bak`, or the first free `<file>.shellconf.bak.N` when
/// earlier backups exist.
pub fn backup_path(file: &Path) -> PathBuf {
    let mut name = file.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".shellconf.bak");
    let first = file.with_file_name(&name);
    if !first.exists() {
        return first;
    }
    (1..)
        .map(|n| {
            let mut numbered = name.clone();
            numbered.push(format!(".{n}"));
            file.with_file_name(numbered)
        })
        .find(|p| !p.exists())
        .unwrap_or(first)
}

fn update(dir: &Path, out: &mut impl Write) -> Result<()> {
    run_step("git pull", Command::new("git").arg("-C").arg(dir).args(["pull", "--ff-only"]))?;
    install(dir)?;
    writeln!(out, "shellconf is up to date.")?;
    Ok(())
}

fn reinstall(dir: &Path, out: &mut impl Write) -> Result<()> {
    install(dir)?;
    writeln!(out, "shellconf has been reinstalled.")?;
    Ok(())
}

/// Runs the project's `uninstall.sh` when there is one, otherwise strips
/// the installer lines from `primary` and deletes `exe`.
fn uninstall(project: Option<&Path>, primary: &Path, exe: &Path, out: &mut impl Write) -> Result<()> {
    if let Some(dir) = project.filter(|d| d.join("uninstall.sh").is_file()) {
        run_step("uninstall.sh", Command::new("sh").arg("uninstall.sh").current_dir(dir))?;
        writeln!(out, "shellconf has been uninstalled.")?;
        return Ok(());
    }

    let cleanup = strip_install_lines(primary)?;
    if let Some(backup) = &cleanup.backup {
        writeln!(
            out,
            "Removed {} line(s) from {} (backup at {}).",
            cleanup.removed,
            primary.display(),
            backup.display()
        )?;
    }
    fs::remove_file(exe).with_context(|| format!("removing {}", exe.display()))?;
    writeln!(out, "shellconf has been uninstalled.")?;
    Ok(())
}

/// Entry point for the flags that bypass the interactive flow.
pub fn run(task: Maintenance, locations: &Locations, out: &mut impl Write) -> Result<()> {
    info!(?task, "maintenance");
    let exe = env::current_exe().context("locating the shellconf binary")?;
    let project = find_project_dir(env::var_os("SHELLCONF_HOME"), Some(&exe));
    match task {
        Maintenance::Update => update(&require_project_dir(project)?, out),
        Maintenance::Reinstall => reinstall(&require_project_dir(project)?, out),
        Maintenance::Uninstall => uninstall(project.as_deref(), &locations.primary, &exe, out),
    }
}

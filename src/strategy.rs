use std::{ffi::OsString, path::Path};

use lazy_static::lazy_static;

use crate::error::AppError;

/// Program and argument list ready to hand to `Command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

#[derive(Debug, Clone)]
pub enum CommandResolver {
    /// Run this program with the file path as its only argument.
    Literal(String),
    /// Compute program and arguments from the file path.
    Dynamic(fn(&Path) -> ResolvedCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoMode {
    Inherit,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnOptions {
    pub detached: bool,
    pub io: IoMode,
    pub use_shell: bool,
}

impl SpawnOptions {
    /// Takes over the terminal until the child exits.
    pub const FOREGROUND: Self = Self { detached: false, io: IoMode::Inherit, use_shell: false };
    /// Fire and forget.
    pub const BACKGROUND: Self = Self { detached: true, io: IoMode::Ignore, use_shell: false };
}

#[derive(Debug, Clone)]
pub struct OpenStrategy {
    pub name: String,
    pub description: String,
    pub resolver: CommandResolver,
    pub spawn: SpawnOptions,
    pub wait_for_exit: bool,
}

impl OpenStrategy {
    pub fn command_for(&self, path: &Path) -> ResolvedCommand {
        match &self.resolver {
            CommandResolver::Literal(program) => ResolvedCommand {
                program: program.into(),
                args: vec![path.as_os_str().to_owned()],
            },
            CommandResolver::Dynamic(resolve) => resolve(path),
        }
    }
}

/// The platform's "open with the associated application" launcher.
pub fn system_opener(path: &Path) -> ResolvedCommand {
    let file = path.as_os_str().to_owned();
    if cfg!(target_os = "macos") {
        ResolvedCommand { program: "open".into(), args: vec![file] }
    } else if cfg!(windows) {
        ResolvedCommand {
            program: "cmd".into(),
            args: vec!["/C".into(), "start".into(), "".into(), file],
        }
    } else {
        ResolvedCommand { program: "xdg-open".into(), args: vec![file] }
    }
}

/// Open strategies keyed by open-type identifier, in presentation order.
#[derive(Debug, Clone, Default)]
pub struct StrategyTable {
    entries: Vec<(String, OpenStrategy)>,
}

impl StrategyTable {
    pub fn builtin() -> Self {
        let gui = SpawnOptions { use_shell: cfg!(windows), ..SpawnOptions::BACKGROUND };
        let mut table = Self::default();
        table.insert(
            "default",
            OpenStrategy {
                name: "the default application".into(),
                description: "Open with the system's associated application".into(),
                resolver: CommandResolver::Dynamic(system_opener),
                spawn: SpawnOptions::BACKGROUND,
                wait_for_exit: false,
            },
        );
        table.insert(
            "vim",
            OpenStrategy {
                name: "Vim".into(),
                description: "Edit in Vim inside this terminal".into(),
                resolver: CommandResolver::Literal("vim".into()),
                spawn: SpawnOptions::FOREGROUND,
                wait_for_exit: true,
            },
        );
        table.insert(
            "nano",
            OpenStrategy {
                name: "Nano".into(),
                description: "Edit in Nano inside this terminal".into(),
                resolver: CommandResolver::Literal("nano".into()),
                spawn: SpawnOptions::FOREGROUND,
                wait_for_exit: true,
            },
        );
        table.insert(
            "code",
            OpenStrategy {
                name: "VS Code".into(),
                description: "Open in Visual Studio Code".into(),
                resolver: CommandResolver::Literal("code".into()),
                spawn: gui,
                wait_for_exit: false,
            },
        );
        table.insert(
            "subl",
            OpenStrategy {
                name: "Sublime Text".into(),
                description: "Open in Sublime Text".into(),
                resolver: CommandResolver::Literal("subl".into()),
                spawn: gui,
                wait_for_exit: false,
            },
        );
        table
    }

    /// Adds a strategy, replacing any existing one under the same key.
    pub fn insert(&mut self, key: impl Into<String>, strategy: OpenStrategy) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = strategy,
            None => self.entries.push((key, strategy)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn resolve(&self, open_type: &str) -> Result<&OpenStrategy, AppError> {
        self.entries
            .iter()
            .find(|(k, _)| k == open_type)
            .map(|(_, s)| s)
            .ok_or_else(|| AppError::UnknownOpenType {
                given: open_type.to_string(),
                valid: self.keys().map(str::to_string).collect(),
            })
    }
}

lazy_static! {
    pub static ref BUILTIN: StrategyTable = StrategyTable::builtin();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keys_in_order() {
        let keys: Vec<_> = BUILTIN.keys().collect();
        assert_eq!(keys, ["default", "vim", "nano", "code", "subl"]);
    }

    #[test]
    fn unknown_open_type_is_rejected() {
        match BUILTIN.resolve("emacs") {
            Err(AppError::UnknownOpenType { given, valid }) => {
                assert_eq!(given, "emacs");
                assert_eq!(valid.len(), 5);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn terminal_editors_wait() {
        for key in ["vim", "nano"] {
            let s = BUILTIN.resolve(key).unwrap();
            assert!(s.wait_for_exit);
            assert!(!s.spawn.detached);
            assert_eq!(s.spawn.io, IoMode::Inherit);
        }
        for key in ["default", "code", "subl"] {
            let s = BUILTIN.resolve(key).unwrap();
            assert!(!s.wait_for_exit);
            assert!(s.spawn.detached);
        }
    }

    #[test]
    fn literal_resolver_passes_path_as_sole_argument() {
        let s = BUILTIN.resolve("nano").unwrap();
        let cmd = s.command_for(Path::new("/home/u/.zshrc"));
        assert_eq!(cmd.program, OsString::from("nano"));
        assert_eq!(cmd.args, vec![OsString::from("/home/u/.zshrc")]);
    }

    #[test]
    fn default_uses_system_opener() {
        let s = BUILTIN.resolve("default").unwrap();
        let cmd = s.command_for(Path::new("/tmp/a.zsh"));
        assert_eq!(cmd.args.last(), Some(&OsString::from("/tmp/a.zsh")));
        if cfg!(target_os = "linux") {
            assert_eq!(cmd.program, OsString::from("xdg-open"));
        }
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut table = StrategyTable::builtin();
        let mut fake = table.resolve("vim").unwrap().clone();
        fake.name = "fake".into();
        table.insert("vim", fake);
        assert_eq!(table.keys().count(), 5);
        assert_eq!(table.resolve("vim").unwrap().name, "fake");
    }
}

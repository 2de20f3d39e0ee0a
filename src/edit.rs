use std::{
    path::Path,
    process::{Command, ExitStatus, Stdio},
};

use tracing::{debug, info};

use crate::{
    error::AppError,
    strategy::{IoMode, OpenStrategy, ResolvedCommand, SpawnOptions},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Started and left running.
    Spawned,
    /// Waited for and exited successfully.
    Completed,
}

#[cfg(unix)]
fn shell_command(cmd: &ResolvedCommand) -> Command {
    // Program and arguments travel as positional parameters, never spliced into the script.
    let mut command = Command::new("sh");
    command.arg("-c").arg("exec \"$0\" \"$@\"").arg(&cmd.program).args(&cmd.args);
    command
}

#[cfg(windows)]
fn shell_command(cmd: &ResolvedCommand) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(&cmd.program).args(&cmd.args);
    command
}

fn build_command(cmd: &ResolvedCommand, opts: SpawnOptions) -> Command {
    let mut command = if opts.use_shell {
        shell_command(cmd)
    } else {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        command
    };

    if opts.io == IoMode::Ignore {
        command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    }

    if opts.detached {
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const DETACHED_PROCESS: u32 = 0x0000_0008;
            command.creation_flags(DETACHED_PROCESS);
        }
    }
    command
}

fn describe_failure(name: &str, status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("{name} exited with status {code}"),
        None => format!("{name} was terminated by a signal"),
    }
}

/// Opens `path` with `strategy`, waiting for the child only when the
/// strategy asks for it.
pub fn launch(path: &Path, strategy: &OpenStrategy) -> Result<LaunchOutcome, AppError> {
    let cmd = strategy.command_for(path);
    debug!(program = ?cmd.program, args = ?cmd.args, spawn = ?strategy.spawn, "spawning");

    let launch_error = |message: String| AppError::Launch { strategy: strategy.name.clone(), message };

    let mut child = build_command(&cmd, strategy.spawn)
        .spawn()
        .map_err(|e| launch_error(format!("failed to launch {}: {e}", strategy.name)))?;

    if !strategy.wait_for_exit {
        info!(pid = child.id(), "launched without waiting");
        return Ok(LaunchOutcome::Spawned);
    }

    let status = child
        .wait()
        .map_err(|e| launch_error(format!("failed to wait for {}: {e}", strategy.name)))?;
    info!(?status, "child exited");
    if status.success() {
        Ok(LaunchOutcome::Completed)
    } else {
        Err(launch_error(describe_failure(&strategy.name, status)))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::strategy::CommandResolver;

    fn strategy(resolver: CommandResolver, wait_for_exit: bool) -> OpenStrategy {
        OpenStrategy {
            name: "Fake".into(),
            description: String::new(),
            resolver,
            spawn: if wait_for_exit { SpawnOptions::FOREGROUND } else { SpawnOptions::BACKGROUND },
            wait_for_exit,
        }
    }

    fn exit_0(_: &Path) -> ResolvedCommand {
        ResolvedCommand { program: "sh".into(), args: vec!["-c".into(), "exit 0".into()] }
    }

    fn exit_2(_: &Path) -> ResolvedCommand {
        ResolvedCommand { program: "sh".into(), args: vec!["-c".into(), "exit 2".into()] }
    }

    fn exit_3_later(_: &Path) -> ResolvedCommand {
        ResolvedCommand { program: "sh".into(), args: vec!["-c".into(), "sleep 0.2; exit 3".into()] }
    }

    #[test]
    fn waited_nonzero_exit_is_failure() {
        let err = launch(Path::new("/tmp/x"), &strategy(CommandResolver::Dynamic(exit_2), true))
            .unwrap_err();
        match err {
            AppError::Launch { strategy, message } => {
                assert_eq!(strategy, "Fake");
                assert_eq!(message, "Fake exited with status 2");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn waited_zero_exit_is_success() {
        let out = launch(Path::new("/tmp/x"), &strategy(CommandResolver::Dynamic(exit_0), true));
        assert_eq!(out.unwrap(), LaunchOutcome::Completed);
    }

    #[test]
    fn unwaited_reports_success_regardless_of_exit() {
        let out = launch(Path::new("/tmp/x"), &strategy(CommandResolver::Dynamic(exit_3_later), false));
        assert_eq!(out.unwrap(), LaunchOutcome::Spawned);
    }

    #[test]
    fn missing_program_is_launch_error() {
        let s = strategy(CommandResolver::Literal("shellconf-no-such-editor".into()), true);
        let err = launch(Path::new("/tmp/x"), &s).unwrap_err();
        assert!(err.to_string().starts_with("failed to launch Fake: "), "{err}");
    }

    #[test]
    fn dynamic_resolver_receives_path() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("target.zsh");
        std::fs::write(&file, "").unwrap();
        // `test -f <path>` only succeeds if the path arrived intact.
        let s = strategy(
            CommandResolver::Dynamic(|p| ResolvedCommand {
                program: "test".into(),
                args: vec!["-f".into(), p.as_os_str().to_owned()],
            }),
            true,
        );
        assert_eq!(launch(&file, &s).unwrap(), LaunchOutcome::Completed);
        assert!(launch(&tmp.path().join("absent"), &s).is_err());
    }

    #[test]
    fn shell_mode_runs_the_same_program() {
        let mut s = strategy(CommandResolver::Literal("true".into()), true);
        s.spawn.use_shell = true;
        assert_eq!(launch(Path::new("/tmp/with space"), &s).unwrap(), LaunchOutcome::Completed);
        s.resolver = CommandResolver::Literal("false".into());
        assert!(launch(Path::new("/tmp/x"), &s).is_err());
    }
}

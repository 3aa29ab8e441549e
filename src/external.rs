//! Launching commands and pipelines as child processes.

use crate::command::{self, COMMAND_NOT_FOUND, ExitCode, NOT_EXECUTABLE};
use crate::env::Environment;
use crate::error::ShellError;
use crate::parser::{Command, Pipeline};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};

/// Handle to a launched stage.
///
/// A stage whose program cannot be located or executed never gets a process;
/// its launch error has already been reported and it carries the status the
/// process would have exited with.
#[derive(Debug)]
pub enum Process {
    Running { program: String, child: Child },
    Failed(ExitCode),
}

impl Process {
    /// Block until the stage terminates and return its exit code.
    pub fn wait(self) -> Result<ExitCode, ShellError> {
        match self {
            Process::Running { program, mut child } => child
                .wait()
                .map(command::exit_code)
                .map_err(|source| ShellError::Wait { program, source }),
            Process::Failed(code) => Ok(code),
        }
    }
}

/// Start `command` as a child process.
///
/// The child's standard input and output are rewired to the command's
/// endpoints, if any, before its image is replaced; otherwise they are
/// inherited. The parent's copies of the endpoints are closed before this
/// function returns, so they stay open only inside the child.
///
/// An unknown program yields [`Process::Failed`] with status 127 and a
/// program that exists but cannot be executed yields status 126; both are
/// reported on stderr and are not errors for the caller.
///
/// # Errors
/// [`ShellError::Spawn`] when the process could not be created for lack of
/// resources.
pub fn launch(mut command: Command, env: &Environment) -> Result<Process, ShellError> {
    let (stdin, stdout) = command.take_endpoints();
    let program = command.program();

    let search_paths = env.get_var("PATH").unwrap_or_default();
    let Some(executable) = find_command_path(OsStr::new(&search_paths), Path::new(program))
    else {
        eprintln!("tinysh: {program}: command not found");
        return Ok(Process::Failed(COMMAND_NOT_FOUND));
    };

    let mut cmd = std::process::Command::new(executable.as_ref());
    cmd.arg0(program)
        .args(command.args())
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir);
    if let Some(endpoint) = stdin {
        cmd.stdin(Stdio::from(endpoint));
    }
    if let Some(endpoint) = stdout {
        cmd.stdout(Stdio::from(endpoint));
    }

    // `cmd` owns the endpoints; dropping it at return closes the parent's copies.
    match cmd.spawn() {
        Ok(child) => Ok(Process::Running {
            program: program.to_string(),
            child,
        }),
        Err(source) if is_resource_exhaustion(&source) => Err(ShellError::Spawn {
            program: program.to_string(),
            source,
        }),
        Err(source) if !env.current_dir.is_dir() => {
            eprintln!(
                "tinysh: {program}: cannot enter {}: {source}",
                env.current_dir.display()
            );
            Ok(Process::Failed(NOT_EXECUTABLE))
        }
        Err(source) if source.kind() == ErrorKind::NotFound && !executable.exists() => {
            eprintln!("tinysh: {program}: command not found");
            Ok(Process::Failed(COMMAND_NOT_FOUND))
        }
        Err(source) => {
            eprintln!("tinysh: {program}: {source}");
            Ok(Process::Failed(NOT_EXECUTABLE))
        }
    }
}

/// Launch a single command and wait for it.
pub fn run(command: Command, env: &Environment) -> Result<ExitCode, ShellError> {
    launch(command, env)?.wait()
}

/// Launch every stage of `pipeline`, then wait for all of them.
///
/// All stages run concurrently; the wait for every child is the only join
/// point. The returned status is the last stage's. If a stage cannot be
/// created, the endpoints of the stages not yet launched are closed and every
/// child already started is still waited for before the error is returned.
pub fn launch_pipeline(pipeline: Pipeline, env: &Environment) -> Result<ExitCode, ShellError> {
    launch_pipeline_with(pipeline, env, launch)
}

/// [`launch_pipeline`] with a custom per-stage launcher.
///
/// `launch_stage` receives each stage in order and owns its endpoints.
pub fn launch_pipeline_with<F>(
    pipeline: Pipeline,
    env: &Environment,
    mut launch_stage: F,
) -> Result<ExitCode, ShellError>
where
    F: FnMut(Command, &Environment) -> Result<Process, ShellError>,
{
    let mut pending: VecDeque<Command> = pipeline.into_stages().into();
    let mut processes = Vec::with_capacity(pending.len());

    while let Some(stage) = pending.pop_front() {
        match launch_stage(stage, env) {
            Ok(process) => processes.push(process),
            Err(err) => {
                // Unlaunched stages may hold the read end a running child writes to.
                pending.clear();
                if let Err(wait_err) = wait_all(processes) {
                    eprintln!("tinysh: {wait_err}");
                }
                return Err(err);
            }
        }
    }

    wait_all(processes)
}

/// Wait for every process, even after one of the waits failed.
///
/// Returns the last process's status, or the first wait error.
fn wait_all(processes: Vec<Process>) -> Result<ExitCode, ShellError> {
    let mut status = Ok(command::SUCCESS);
    for process in processes {
        let result = process.wait();
        if status.is_ok() {
            status = result;
        }
    }
    status
}

fn is_resource_exhaustion(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::OutOfMemory)
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo`: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing file.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    if path.starts_with("./") && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.is_file())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

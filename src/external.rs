use crate::command::{Command, ExitCode};
use crate::env::Environment;
use nix::errno::Errno;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus, Stdio};
use thiserror::Error;
use tracing::debug;

/// Exit status of a command whose redirect file could not be opened.
pub const REDIRECT_FAILURE: ExitCode = 1;

/// Exit status of a command whose program could not be found or executed.
pub const EXEC_FAILURE: ExitCode = 127;

/// Errors raised while turning a command into a running process.
///
/// Only the command fails; the shell itself keeps running.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to redirect input from '{path}': {source}")]
    RedirectInput { path: String, source: io::Error },
    #[error("failed to redirect output to '{path}': {source}")]
    RedirectOutput { path: String, source: io::Error },
    #[error("failed to execute command '{program}': {source}")]
    Exec { program: String, source: io::Error },
    #[error("no command to run")]
    EmptyCommand,
    #[error("fork failed ({0})")]
    Spawn(#[source] io::Error),
    #[error("failed to wait for process {pid}: {source}")]
    Wait { pid: u32, source: io::Error },
}

impl LaunchError {
    /// The exit status the failed command is reported with.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LaunchError::RedirectInput { .. } | LaunchError::RedirectOutput { .. } => {
                REDIRECT_FAILURE
            }
            LaunchError::Exec { .. } | LaunchError::EmptyCommand => EXEC_FAILURE,
            LaunchError::Spawn(_) | LaunchError::Wait { .. } => 1,
        }
    }
}

/// Everything needed to start one external program.
///
/// The argument vector handed to the OS (with its terminating sentinel) is built
/// by [`std::process::Command`] inside [`ExternalCommand::spawn`] and never
/// leaves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: OsString,
    args: Vec<OsString>,
    stdin_from: Option<PathBuf>,
    stdout_to: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<OsString>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
            stdin_from: None,
            stdout_to: None,
        }
    }

    /// Builds the spawn options for a parsed command, or `None` if it has no program.
    pub fn from_command(command: &Command) -> Option<Self> {
        let program = command.program()?;
        let mut external = Self::new(
            program,
            command.args().iter().map(OsString::from).collect(),
        );
        if let Some(path) = command.input_redirect() {
            external = external.stdin_from(path);
        }
        if let Some(path) = command.output_redirect() {
            external = external.stdout_to(path);
        }
        Some(external)
    }

    /// Read standard input from `path` instead of inheriting it.
    pub fn stdin_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin_from = Some(path.into());
        self
    }

    /// Write standard output to `path` (created or truncated) instead of inheriting it.
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_to = Some(path.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Starts the program and returns a handle to the running process.
    ///
    /// Input redirect is opened first, then output, then the program is
    /// located through `PATH`. The first step that fails decides the error.
    pub fn spawn(&self, env: &Environment) -> Result<Child, LaunchError> {
        let stdin = match &self.stdin_from {
            Some(path) => Stdio::from(File::open(path).map_err(|source| {
                LaunchError::RedirectInput {
                    path: path.display().to_string(),
                    source,
                }
            })?),
            None => Stdio::inherit(),
        };
        let stdout = match &self.stdout_to {
            Some(path) => Stdio::from(File::create(path).map_err(|source| {
                LaunchError::RedirectOutput {
                    path: path.display().to_string(),
                    source,
                }
            })?),
            None => Stdio::inherit(),
        };

        let search_paths = env.search_paths();
        let executable = find_command_path(&search_paths, Path::new(&self.program))
            .ok_or_else(|| self.exec_error(io::ErrorKind::NotFound.into()))?;

        let child = std::process::Command::new(&*executable)
            .arg0(&self.program)
            .args(&self.args)
            .stdin(stdin)
            .stdout(stdout)
            .env_clear()
            .envs(&env.vars)
            .current_dir(&env.current_dir)
            .spawn()
            .map_err(|source| {
                if is_exec_failure(&source) {
                    self.exec_error(source)
                } else {
                    LaunchError::Spawn(source)
                }
            })?;

        debug!(
            pid = child.id(),
            program = %executable.display(),
            "spawned process"
        );
        Ok(child)
    }

    fn exec_error(&self, source: io::Error) -> LaunchError {
        LaunchError::Exec {
            program: self.program.to_string_lossy().into_owned(),
            source,
        }
    }
}

/// Errors that mean the program itself could not be run, as opposed to the
/// process not being created at all.
fn is_exec_failure(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    ) || err.raw_os_error() == Some(Errno::ENOEXEC as i32)
}

/// Converts a finished process status into a shell exit code.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it names a file.
/// - `./foo`: returns it if it names a file in the current directory.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it names a file.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first file with an execute bit set. Files without one are skipped.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() || path.starts_with("./") {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(single), None) => find_in_path(search_paths, single.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}

//! Turning parsed commands into processes and cleaning up after them.
//!
//! The [`Launcher`] owns the [`Environment`] children are started with. A
//! foreground command is waited for before [`Launcher::execute`] returns; a
//! background command is left running and only collected by the final sweep in
//! [`Launcher::shutdown`].

use crate::command::{Command, ExitCode};
use crate::env::Environment;
use crate::external::{self, ExternalCommand, LaunchError};
use crate::parser::EXIT_KEYWORD;
use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use std::io::{self, Write};
use tracing::{debug, warn};

/// How a successfully launched command ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A foreground process ran to completion with this exit code.
    Exited(ExitCode),
    /// A background process was started with this process id.
    Background(u32),
    /// The command named the exit keyword; the shell should shut down.
    Exit,
}

/// Starts commands as child processes.
#[derive(Debug, Clone)]
pub struct Launcher {
    env: Environment,
}

impl Launcher {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Runs one command.
    ///
    /// Foreground commands block until the child exits. Background commands return
    /// as soon as the child is started. An error means the command never ran; the
    /// launcher stays usable.
    pub fn execute(&mut self, command: &Command) -> Result<Outcome, LaunchError> {
        let Some(external) = ExternalCommand::from_command(command) else {
            return Err(LaunchError::EmptyCommand);
        };
        if external.program() == EXIT_KEYWORD {
            return Ok(Outcome::Exit);
        }

        let mut child = external.spawn(&self.env)?;
        let pid = child.id();
        if command.background() {
            debug!(pid, "left process running in background");
            return Ok(Outcome::Background(pid));
        }

        let status = child
            .wait()
            .map_err(|source| LaunchError::Wait { pid, source })?;
        let code = external::exit_code(status);
        debug!(pid, code, "foreground process finished");
        Ok(Outcome::Exited(code))
    }

    /// Collects every child that has already terminated, without blocking.
    ///
    /// Each returned id is reaped exactly once; children still running are left
    /// alone and stay out of the result.
    pub fn reap(&mut self) -> Vec<u32> {
        let mut reaped = Vec::new();
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => break,
                Ok(status) => match status.pid() {
                    Some(pid) => {
                        debug!(pid = pid.as_raw(), ?status, "reaped child process");
                        reaped.push(pid.as_raw() as u32);
                    }
                    None => break,
                },
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => break,
                Err(err) => {
                    warn!(%err, "waitpid failed while reaping children");
                    break;
                }
            }
        }
        reaped
    }

    /// Reaps finished children, reports them on `out` and terminates the shell
    /// with a success status.
    ///
    /// Children that are still running are not waited for.
    pub fn shutdown(&mut self, out: &mut dyn Write) -> ! {
        let reaped = self.reap();
        if let Err(err) = report_shutdown(out, &reaped) {
            warn!(%err, "failed to report shutdown");
        }
        std::process::exit(0)
    }
}

pub(crate) fn report_shutdown(out: &mut dyn Write, reaped: &[u32]) -> io::Result<()> {
    for pid in reaped {
        writeln!(out, "Reaped child process with PID: {}", pid)?;
    }
    writeln!(out, "Exiting the shell...")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_keyword_reaches_launcher() {
        let mut cmd = Command::new();
        cmd.add_argument("exit").unwrap();
        cmd.add_argument("now").unwrap();

        let mut launcher = Launcher::new(Environment::new());
        assert_eq!(launcher.execute(&cmd).unwrap(), Outcome::Exit);
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let mut launcher = Launcher::new(Environment::new());
        let err = launcher.execute(&Command::new()).unwrap_err();
        assert!(matches!(err, LaunchError::EmptyCommand));
    }

    #[test]
    fn test_report_shutdown_lists_each_pid() {
        let mut out: Vec<u8> = Vec::new();
        report_shutdown(&mut out, &[101, 202]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Reaped child process with PID: 101\n\
             Reaped child process with PID: 202\n\
             Exiting the shell...\n"
        );
    }

    #[test]
    fn test_report_shutdown_without_children() {
        let mut out: Vec<u8> = Vec::new();
        report_shutdown(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Exiting the shell...\n");
    }
}

use crate::command::ExitCode;
use crate::env::Environment;
use crate::launcher::{Launcher, Outcome};
use crate::parser::{self, Action};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result};
use std::io::{self, Write};
use tracing::debug;

/// Prompt printed before each line unless overridden.
pub const DEFAULT_PROMPT: &str = "$$$ ";

/// Longest input line accepted; anything after it is dropped.
pub const MAX_LINE_LENGTH: usize = 256;

/// Whether the shell loop should keep reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The interactive shell: parses lines, launches them and reports problems.
///
/// Example
/// ```no_run
/// use minish::{Environment, Interpreter};
/// let mut sh = Interpreter::new(Environment::new());
/// sh.run_line("ls -la > listing.txt").unwrap();
/// sh.shutdown();
/// ```
pub struct Interpreter {
    launcher: Launcher,
    debug: bool,
    last_status: ExitCode,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self {
            launcher: Launcher::new(env),
            debug: false,
            last_status: 0,
        }
    }

    /// Print the parsed fields of every command before launching it.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Exit status of the most recent command: the foreground exit code, the
    /// launch failure's status, or 0 for a background launch.
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// Run a single line, reporting to the process's standard streams.
    pub fn run_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        self.run_line_with_output(line, &mut io::stdout(), &mut io::stderr())
    }

    /// Run a single line, writing shell messages to `out` and diagnostics to `err`.
    ///
    /// Launched programs still inherit the real standard streams unless redirected.
    /// Parse warnings and launch failures are reported, never returned; the `Err`
    /// case only covers failures to write to `out` or `err`.
    pub fn run_line_with_output(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> anyhow::Result<Flow> {
        let parsed = parser::parse(line);
        for warning in &parsed.warnings {
            writeln!(err, "Error: {}", warning)?;
        }

        let command = match parsed.action {
            Action::Empty => return Ok(Flow::Continue),
            Action::Exit => return Ok(Flow::Exit),
            Action::Run(command) => command,
        };
        debug!(?command, "launching");
        if self.debug {
            write!(out, "{}", command)?;
        }

        match self.launcher.execute(&command) {
            Ok(Outcome::Exit) => return Ok(Flow::Exit),
            Ok(Outcome::Background(pid)) => {
                writeln!(out, "Process running in background [PID: {}]", pid)?;
                self.last_status = 0;
            }
            Ok(Outcome::Exited(code)) => self.last_status = code,
            Err(e) => {
                writeln!(err, "Error: {}", e)?;
                self.last_status = e.exit_code();
            }
        }
        Ok(Flow::Continue)
    }

    /// Read-Eval-Print Loop over the terminal.
    ///
    /// Returns when the user types `exit` or closes the input; call
    /// [`Interpreter::shutdown`] afterwards.
    pub fn repl(&mut self, prompt: &str) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let line = truncate_line(&line, MAX_LINE_LENGTH);
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line)?;
                    }
                    match self.run_line(line) {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Exit) => break,
                        Err(e) => eprintln!("Error: {:#}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    /// Reap finished background children and exit the process.
    pub fn shutdown(&mut self) -> ! {
        self.launcher.shutdown(&mut io::stdout())
    }
}

/// Cuts `line` to at most `max` bytes without splitting a character.
pub fn truncate_line(line: &str, max: usize) -> &str {
    if line.len() <= max {
        return line;
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

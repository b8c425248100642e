use std::fmt;
use thiserror::Error;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Maximum number of argument tokens a single command can hold.
pub const MAX_ARGS: usize = 32;

/// Returned by [`Command::add_argument`] when the argument list is full.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("too many arguments, maximum allowed is {max}")]
pub struct TooManyArguments {
    /// The capacity that was exceeded.
    pub max: usize,
    /// The argument that was dropped.
    pub dropped: String,
}

/// One fully parsed command line.
///
/// A `Command` is filled in by the parser, handed to the launcher once and then
/// dropped. The program name is the first argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    arguments: Vec<String>,
    input_redirect: Option<String>,
    output_redirect: Option<String>,
    background: bool,
}

impl Command {
    /// Create an empty command with no arguments, no redirects and foreground execution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument, keeping the list within [`MAX_ARGS`].
    ///
    /// On overflow the argument is not stored and the error carries it back.
    pub fn add_argument(&mut self, arg: impl Into<String>) -> Result<(), TooManyArguments> {
        let arg = arg.into();
        if self.arguments.len() >= MAX_ARGS {
            return Err(TooManyArguments {
                max: MAX_ARGS,
                dropped: arg,
            });
        }
        self.arguments.push(arg);
        Ok(())
    }

    /// All arguments, program name included.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The program to run, i.e. the first argument.
    pub fn program(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    /// Arguments passed to the program, without the program name.
    pub fn args(&self) -> &[String] {
        self.arguments.get(1..).unwrap_or_default()
    }

    pub fn set_input_redirect(&mut self, path: impl Into<String>) {
        self.input_redirect = Some(path.into());
    }

    pub fn set_output_redirect(&mut self, path: impl Into<String>) {
        self.output_redirect = Some(path.into());
    }

    pub fn set_background(&mut self, background: bool) {
        self.background = background;
    }

    pub fn input_redirect(&self) -> Option<&str> {
        self.input_redirect.as_deref()
    }

    pub fn output_redirect(&self) -> Option<&str> {
        self.output_redirect.as_deref()
    }

    pub fn background(&self) -> bool {
        self.background
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

/// Debug dump of every parsed field, one per line.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "InputRedirect: [{}]",
            self.input_redirect.as_deref().unwrap_or("NULL")
        )?;
        writeln!(
            f,
            "OutputRedirect: [{}]",
            self.output_redirect.as_deref().unwrap_or("NULL")
        )?;
        writeln!(f, "Background: [{}]", u8::from(self.background))?;
        writeln!(f, "ArgumentCount: [{}]", self.arguments.len())?;
        for (i, arg) in self.arguments.iter().enumerate() {
            writeln!(f, "ArgumentVector[{}]: [{}]", i, arg)?;
        }
        Ok(())
    }
}

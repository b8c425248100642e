//! A minimal interactive command shell.
//!
//! Each input line is split into tokens, parsed into a [`Command`] (arguments,
//! optional `<` and `>` redirects, optional trailing `&`) and started as a child
//! process. Foreground commands are waited for; background commands are left
//! running and swept up when the shell exits.
//!
//! The pieces can be used on their own: [`parser::parse`] is a pure function of
//! the line, and [`Launcher`] runs already parsed commands. [`Interpreter`] ties
//! them to a terminal line reader.

pub mod command;
pub mod env;
mod external;
mod interpreter;
pub mod launcher;
pub mod lexer;
pub mod parser;

pub use command::{Command, ExitCode, MAX_ARGS};
pub use env::Environment;
pub use external::{
    EXEC_FAILURE, ExternalCommand, LaunchError, REDIRECT_FAILURE, find_command_path,
};
pub use interpreter::{DEFAULT_PROMPT, Flow, Interpreter, MAX_LINE_LENGTH, truncate_line};
pub use launcher::{Launcher, Outcome};

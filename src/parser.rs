use crate::command::{Command, TooManyArguments};
use crate::lexer::split_into_tokens;
use thiserror::Error;
use tracing::trace;

/// Keyword that terminates the shell when it is the first token.
pub const EXIT_KEYWORD: &str = "exit";

const INPUT_REDIRECT: char = '<';
const OUTPUT_REDIRECT: char = '>';
const BACKGROUND: &str = "&";

/// Kind of redirection
///
/// Defines the direction of an I/O redirection (`<`, `>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// Input redirection (`<`): reads standard input from a file.
    Input,
    /// Output redirection (`>`): writes standard output to a file, truncating it.
    Output,
}

impl RedirectKind {
    fn symbol(self) -> char {
        match self {
            RedirectKind::Input => INPUT_REDIRECT,
            RedirectKind::Output => OUTPUT_REDIRECT,
        }
    }

    fn direction(self) -> &'static str {
        match self {
            RedirectKind::Input => "input",
            RedirectKind::Output => "output",
        }
    }
}

/// Recoverable problems found while parsing a line.
///
/// None of these abort parsing: the offending construct is dropped and the rest
/// of the line is still turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    /// A redirect operator was the last token, so there is no file name.
    #[error("no {} file specified after '{}'", .0.direction(), .0.symbol())]
    MissingRedirectTarget(RedirectKind),
    /// `&` was followed by more tokens; they were dropped and the command runs in the foreground.
    #[error("'&' must be at the very end of the command")]
    MisplacedBackground,
    /// The argument list was full.
    #[error(transparent)]
    TooManyArguments(#[from] TooManyArguments),
    /// The line contained only redirects or operators.
    #[error("no command specified")]
    MissingCommand,
}

/// What the shell should do with a parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to run: the line was blank or had no program name.
    Empty,
    /// The line started with the exit keyword.
    Exit,
    /// Launch this command.
    Run(Command),
}

/// Result of parsing one line: the action plus any warnings to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub action: Action,
    pub warnings: Vec<ParseWarning>,
}

impl Parsed {
    fn new(action: Action) -> Self {
        Parsed {
            action,
            warnings: Vec::new(),
        }
    }
}

struct CommandBuilder<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
    command: Command,
    warnings: Vec<ParseWarning>,
}

impl<'a> CommandBuilder<'a> {
    fn from(tokens: Vec<&'a str>) -> Self {
        CommandBuilder {
            tokens,
            pos: 0,
            command: Command::new(),
            warnings: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn consume(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn build(mut self) -> Parsed {
        while let Some(token) = self.consume() {
            if let Some(rest) = token.strip_prefix(INPUT_REDIRECT) {
                self.parse_redirect(RedirectKind::Input, rest);
            } else if let Some(rest) = token.strip_prefix(OUTPUT_REDIRECT) {
                self.parse_redirect(RedirectKind::Output, rest);
            } else if token == BACKGROUND {
                self.parse_background();
                break;
            } else if let Err(e) = self.command.add_argument(token) {
                self.warnings.push(e.into());
            }
        }

        let action = if self.command.is_empty() {
            self.warnings.push(ParseWarning::MissingCommand);
            Action::Empty
        } else {
            Action::Run(self.command)
        };
        Parsed {
            action,
            warnings: self.warnings,
        }
    }

    /// Handles both `<file` and `< file` (and the `>` forms).
    fn parse_redirect(&mut self, kind: RedirectKind, attached: &'a str) {
        let target = if attached.is_empty() {
            self.consume()
        } else {
            Some(attached)
        };

        match (target, kind) {
            (Some(path), RedirectKind::Input) => self.command.set_input_redirect(path),
            (Some(path), RedirectKind::Output) => self.command.set_output_redirect(path),
            (None, _) => self.warnings.push(ParseWarning::MissingRedirectTarget(kind)),
        }
    }

    fn parse_background(&mut self) {
        if self.peek().is_none() {
            self.command.set_background(true);
        } else {
            self.warnings.push(ParseWarning::MisplacedBackground);
        }
    }
}

/// Parses one raw input line.
///
/// This is a pure function of `line`: parsing the same line twice yields equal
/// results. Blank lines produce [`Action::Empty`] with no warnings.
pub fn parse(line: &str) -> Parsed {
    let tokens = split_into_tokens(line);
    match tokens.first() {
        None => return Parsed::new(Action::Empty),
        Some(&first) if first == EXIT_KEYWORD => return Parsed::new(Action::Exit),
        Some(_) => {}
    }

    let parsed = CommandBuilder::from(tokens).build();
    trace!(?parsed, "parsed line");
    parsed
}

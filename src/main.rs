use argh::FromArgs;
use minish::{DEFAULT_PROMPT, Environment, Interpreter};
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// A minimal interactive shell with file redirection and background commands.
struct Args {
    #[argh(switch, short = 'd')]
    /// print the parsed fields of every command before running it.
    debug: bool,

    #[argh(option, default = "String::from(DEFAULT_PROMPT)")]
    /// text shown before each input line.
    prompt: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Args = argh::from_env();
    let mut shell = Interpreter::new(Environment::new()).with_debug(args.debug);
    if let Err(err) = shell.repl(&args.prompt) {
        tracing::error!(%err, "line editor failed");
    }
    shell.shutdown()
}

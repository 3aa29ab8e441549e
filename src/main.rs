use anyhow::Context;
use argh::FromArgs;
use std::process::ExitCode;
use tinysh::{Environment, Interpreter, signals};

#[derive(FromArgs)]
/// A minimal command interpreter with pipelines and if/then/else/fi statements.
struct Args {
    /// execute the given lines and exit with the status of the last command
    #[argh(option, short = 'c')]
    command: Option<String>,

    /// print each command on stderr before it is launched
    #[argh(switch, short = 'x')]
    xtrace: bool,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    match run(args) {
        Ok(status) => ExitCode::from((status & 0xff) as u8),
        Err(e) => {
            eprintln!("tinysh: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<i32> {
    let mut interpreter = Interpreter::new(Environment::new()).with_xtrace(args.xtrace);

    if let Some(script) = args.command {
        return Ok(interpreter.run_script(&script)?);
    }

    let interrupted = signals::install().context("cannot install signal handlers")?;
    Ok(interpreter.repl(&interrupted)?)
}

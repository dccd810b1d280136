use anyhow::{Context, Result};
use clap::Parser;
use keycalc::Config;
use keycalc::session::{Response, Session};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pocket calculator for the terminal.
///
/// Type keys such as `12 + 3 =`, `±`, `%`, `.` or `AC`. Lines may also be
/// the commands `copy`, `tape` or `quit`.
#[derive(Parser)]
#[command(name = "keycalc", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print each response as a JSON line
    #[arg(long)]
    json: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keys to evaluate once instead of starting an interactive session
    input: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load_default(),
    }
    .context("Failed to load configuration")?;

    let mut session = Session::new(config);

    if !cli.input.is_empty() {
        let line = cli.input.join(" ");
        let response = session.handle_line(&line)?;
        print_response(&session, &response, cli.json)?;
        return Ok(());
    }

    run_interactive(&mut session, cli.json)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_interactive(session: &mut Session, json: bool) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal() && !json;
    let prompt = session.config().display.prompt.clone();

    if interactive {
        print!("{prompt}");
        io::stdout().flush()?;
    }

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read input")?;
        if !line.trim().is_empty() {
            match session.handle_line(&line) {
                Ok(Response::Quit) => break,
                Ok(response) => print_response(session, &response, json)?,
                Err(err) => eprintln!("error: {err}"),
            }
        }

        if interactive {
            print!("{prompt}");
            io::stdout().flush()?;
        }
    }

    Ok(())
}

fn print_response(session: &Session, response: &Response, json: bool) -> Result<()> {
    if json {
        let value = match response {
            Response::Readout(readout) => serde_json::to_value(readout)?,
            Response::Tape(entries) => serde_json::json!({ "tape": entries }),
            Response::Copied(text) => serde_json::json!({ "copied": text }),
            Response::Quit => return Ok(()),
        };
        println!("{value}");
        return Ok(());
    }

    match response {
        Response::Readout(readout) => println!("{}", session.render(readout)),
        Response::Tape(entries) if entries.is_empty() => println!("(tape is empty)"),
        Response::Tape(entries) => {
            for entry in entries {
                println!("{} {}", entry.trace, entry.result);
            }
        }
        Response::Copied(text) => println!("Copied {text}"),
        Response::Quit => {}
    }
    Ok(())
}

//! CLI entry point: one argument-less command-line surface; patterns are
//! positional arguments, the request comes in on stdin, the response goes
//! out on stdout.

use std::env;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use gopackagesdriver::context::RequestContext;
use gopackagesdriver::error::DriverError;
use gopackagesdriver::protocol::Request;

const PROGRAM_NAME: &str = "gopackagesdriver";

pub fn main() {
    let exit_code = main_inner();
    std::process::exit(exit_code);
}

fn main_inner() -> i32 {
    env_logger::init();

    match run(env::args().skip(1).collect()) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}: {:#}", PROGRAM_NAME, err);
            1
        }
    }
}

fn run(args: Vec<String>) -> Result<()> {
    let parsed = parse_args(args)?;
    if parsed.early_exit {
        return Ok(());
    }
    let patterns = parsed.patterns;

    let mut stdin = String::new();
    io::stdin().read_to_string(&mut stdin).context("could not read request from stdin")?;
    let request: Request = serde_json::from_str(&stdin)
        .map_err(|e| DriverError::Input(format!("malformed request JSON on stdin: {}", e)))?;

    let ctx = RequestContext::from_env()?;
    let response = gopackagesdriver::run_request(&ctx, &patterns, &request)?;

    let body = serde_json::to_string(&response).context("could not serialize response")?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(body.as_bytes()).context("could not write response to stdout")?;
    handle.write_all(b"\n").context("could not write response to stdout")?;
    Ok(())
}

struct ParsedArgs {
    patterns: Vec<String>,
    /// Set for `--help`/`--version`: the message has already been printed,
    /// `run` should exit 0 without reading a request.
    early_exit: bool,
}

/// No argument takes a value (mirroring `go/packages`' minimal
/// `flag.NewFlagSet` surface); any `-`/`--`-prefixed token that isn't
/// `--help`/`--version` is a fatal "unrecognized flag" error.
fn parse_args(args: Vec<String>) -> Result<ParsedArgs> {
    let mut patterns = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", help());
                return Ok(ParsedArgs { patterns: Vec::new(), early_exit: true });
            }
            "--version" | "-V" => {
                println!("{} {}", PROGRAM_NAME, env!("CARGO_PKG_VERSION"));
                return Ok(ParsedArgs { patterns: Vec::new(), early_exit: true });
            }
            flag if flag.starts_with('-') => {
                anyhow::bail!("unrecognized flag {:?}", flag);
            }
            pattern => patterns.push(pattern.to_owned()),
        }
    }
    Ok(ParsedArgs { patterns, early_exit: false })
}

fn help() -> &'static str {
    r#"
    gopackagesdriver [patterns...]

    Reads a go/packages driver request from stdin and writes the resolved
    package graph to stdout.

    --version or -V to print the version
    --help or -h for this message
    "#
}

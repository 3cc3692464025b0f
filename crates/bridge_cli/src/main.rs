//! gen-bridge - generate Closure bridge modules for TypeScript web components
//!
//! Usage:
//!   gen-bridge [OPTIONS] <SOURCE>...
//!
//! Environment variables:
//! - `BRIDGE_LOG` - Log level (default: "info")
//!
//! Exit status is 2 when the component itself cannot be bridged and 1 for
//! every other failure.

use anyhow::{bail, Context, Result};
use bridge_gen::{BridgeBuilder, BridgeConfig, BridgeError, BuildStatus};
use std::env;
use std::process::ExitCode;
use std::path::PathBuf;
use tracing::debug;

const USAGE: &str = "\
Generate Closure bridge modules for TypeScript web components

Usage: gen-bridge [OPTIONS] <SOURCE>...

Options:
  -c, --component <NAME>  Component class name (default: the HTMLElement subclass)
  -o, --output <PATH>     Output path (single source only)
      --config <PATH>     TOML configuration file
      --stdout            Print the bridge instead of writing it
      --check             Fail if the bridge on disk is out of date
      --emit-contract     Print the extracted contract as JSON
  -h, --help              Print help";

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct BridgeCommand {
    sources: Vec<PathBuf>,
    component: Option<String>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    stdout: bool,
    check: bool,
    emit_contract: bool,
    help: bool,
}

impl BridgeCommand {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cmd = BridgeCommand::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--component" | "-c" => {
                    if i + 1 < args.len() {
                        cmd.component = Some(args[i + 1].clone());
                        i += 2;
                    } else {
                        bail!("--component requires a class name");
                    }
                }
                "--output" | "-o" => {
                    if i + 1 < args.len() {
                        cmd.output = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--output requires a path");
                    }
                }
                "--config" => {
                    if i + 1 < args.len() {
                        cmd.config = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--config requires a path");
                    }
                }
                "--stdout" => {
                    cmd.stdout = true;
                    i += 1;
                }
                "--check" => {
                    cmd.check = true;
                    i += 1;
                }
                "--emit-contract" => {
                    cmd.emit_contract = true;
                    i += 1;
                }
                "--help" | "-h" => {
                    cmd.help = true;
                    i += 1;
                }
                arg if !arg.starts_with('-') => {
                    cmd.sources.push(PathBuf::from(arg));
                    i += 1;
                }
                _ => {
                    bail!("Unknown flag: {}", args[i]);
                }
            }
        }

        if cmd.help {
            return Ok(cmd);
        }
        if cmd.sources.is_empty() {
            bail!("no source file given\n\n{}", USAGE);
        }
        if cmd.output.is_some() && cmd.sources.len() > 1 {
            bail!("--output can only be used with a single source file");
        }
        if cmd.stdout && cmd.check {
            bail!("--stdout and --check cannot be combined");
        }
        if cmd.emit_contract && cmd.check {
            bail!("--emit-contract and --check cannot be combined");
        }

        Ok(cmd)
    }
}

fn run(args: &[String]) -> Result<()> {
    let cmd = BridgeCommand::parse(args)?;
    if cmd.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = match &cmd.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    debug!(?config, "using configuration");

    for source in &cmd.sources {
        let mut builder = BridgeBuilder::new(source)
            .config(config.clone())
            .check(cmd.check);
        if let Some(component) = &cmd.component {
            builder = builder.component(component);
        }
        if let Some(output) = &cmd.output {
            builder = builder.output(output);
        }

        if cmd.stdout || cmd.emit_contract {
            let (contract, text) = builder
                .generate()
                .with_context(|| format!("generating bridge for {}", source.display()))?;
            if cmd.emit_contract {
                println!("{}", contract.to_json()?);
            }
            if cmd.stdout {
                print!("{}", text);
            }
            continue;
        }

        let output = builder
            .build()
            .with_context(|| format!("generating bridge for {}", source.display()))?;
        if output.status == BuildStatus::Stale {
            bail!(
                "{} is out of date; rerun gen-bridge {}",
                output.output_path.display(),
                source.display()
            );
        }
    }

    Ok(())
}

/// Exit status for a failed run
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<BridgeError>() {
        Some(e) if e.is_contract_error() => 2,
        _ => 1,
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so --stdout output stays clean
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("BRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_status(&err))
        }
    }
}

//! Command-line entry point.
//!
//! Validates the single URL argument, wires the console reporter into the
//! prober, and maps outcomes to process exit codes: 2 for usage or URL
//! validation failures, 0 otherwise whether or not a flag was found.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;

use flagprobe::{ConsoleReporter, Prober, validate_target};

/// Probe a URL with a fixed sequence of HTTP methods, scanning each response
/// body and header set for a CTF-style flag token.
#[derive(Parser)]
#[command(name = "flagprobe", version, about)]
struct Cli {
    /// Fully-qualified target URL (scheme and host required)
    url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    // Usage output is part of the tool's stdout contract, so clap errors are
    // rendered manually instead of letting clap exit on its own.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            print!("{err}");
            return ExitCode::from(2);
        }
    };

    let target = match validate_target(&cli.url) {
        Ok(target) => target,
        Err(err) => {
            println!("[!] Invalid URL ({err}). Include scheme (http:// or https://).");
            return ExitCode::from(2);
        }
    };

    let prober = match Prober::builder().with_handler(Arc::new(ConsoleReporter)).build() {
        Ok(prober) => prober,
        Err(err) => {
            eprintln!("flagprobe error: {err}");
            return ExitCode::FAILURE;
        }
    };

    prober.probe(&target).await;
    ExitCode::SUCCESS
}

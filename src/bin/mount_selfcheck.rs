use std::process::ExitCode;

use clap::{error::ErrorKind, Parser};
use mount_harness::harness::selfcheck::{run_self_checks, BuildInfo};
use tracing::debug;

/// Verifies the harness without a mount or driver framework attached.
#[derive(Parser, Debug)]
#[command(name = "mount-selfcheck", long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show system information
    #[arg(short, long)]
    info: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            let _ = e.print();
            return code;
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    println!("Mount Self Check v{}", env!("CARGO_PKG_VERSION"));

    if args.info {
        println!("\n=== System Information ===");
        println!("{}", BuildInfo::current());
        println!("===========================\n");
    }
    if args.verbose {
        debug!("Verbose mode enabled");
    }

    println!("\n=== Running All Tests ===");
    let results = run_self_checks().await;
    for result in &results {
        let tag = if result.passed { "SUCCESS" } else { "ERROR" };
        println!("{}: {} - {}", tag, result.name, result.detail);
    }

    let passed = results.iter().filter(|r| r.passed).count();
    println!("\n=== Test Results ===");
    println!("Tests run: {}", results.len());
    println!("Tests passed: {}", passed);
    println!("Tests failed: {}", results.len() - passed);

    let all_passed = passed == results.len();
    if all_passed {
        println!("Result: ALL TESTS PASSED");
    } else {
        println!("Result: SOME TESTS FAILED");
    }

    println!("\nMount Self Check finished");
    if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

//! Check a generated claims CSV.
//!
//! Reads `lloyds_us_claims_data.csv` (or the first positional argument) back
//! in and prints the timeline invariant table and per-kind defect counts.
//! Exits with status 2 when any invariant fails.

use claimgen::analysis::DatasetReport;
use claimgen::error::GeneratorError;
use claimgen::output;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "lloyds_us_claims_data.csv".to_string());

    match run(&path) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("error: cannot analyse {path}: {e}");
            eprintln!("Run `cargo run --release` first to generate the dataset.");
            std::process::exit(1);
        }
    }
}

fn run(path: &str) -> Result<bool, GeneratorError> {
    let records = output::read_file(path)?;
    println!("{path}: {} records", records.len());
    println!();

    let report = DatasetReport::build(&records);
    print!("{report}");
    Ok(report.passed())
}

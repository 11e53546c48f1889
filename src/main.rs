use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use claimgen::analysis::DatasetReport;
use claimgen::config::GeneratorConfig;
use claimgen::error::GeneratorError;
use claimgen::generator::generate_dataset;
use claimgen::output::{self, OutputFormat};

const DEFAULT_OUTPUT_STEM: &str = "lloyds_us_claims_data";

struct Args {
    rows: Option<usize>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    format: OutputFormat,
    reference: Option<PathBuf>,
    runs: Option<u64>,
    output_dir: Option<PathBuf>,
    quiet: bool,
    verify: bool,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self, GeneratorError> {
        let mut parsed = Args {
            rows: None,
            seed: None,
            output: None,
            format: OutputFormat::default(),
            reference: None,
            runs: None,
            output_dir: None,
            quiet: false,
            verify: false,
        };

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--quiet" => parsed.quiet = true,
                "--verify" => parsed.verify = true,
                "--rows" | "--seed" | "--output" | "--format" | "--reference" | "--runs"
                | "--output-dir" => {
                    i += 1;
                    let value = args.get(i).ok_or_else(|| {
                        GeneratorError::invalid_argument(format!("{flag} requires a value"))
                    })?;
                    match flag {
                        "--rows" => parsed.rows = Some(parse_number(flag, value)?),
                        "--seed" => parsed.seed = Some(parse_number(flag, value)?),
                        "--output" => parsed.output = Some(PathBuf::from(value)),
                        "--format" => parsed.format = value.parse()?,
                        "--reference" => parsed.reference = Some(PathBuf::from(value)),
                        "--runs" => {
                            let n: u64 = parse_number(flag, value)?;
                            if n == 0 {
                                return Err(GeneratorError::invalid_argument("--runs must be at least 1"));
                            }
                            parsed.runs = Some(n);
                        }
                        _ => parsed.output_dir = Some(PathBuf::from(value)),
                    }
                }
                other => {
                    return Err(GeneratorError::invalid_argument(format!("unknown flag '{other}'")));
                }
            }
            i += 1;
        }

        if parsed.runs.is_some() && parsed.output.is_some() {
            return Err(GeneratorError::invalid_argument(
                "--output names a single file; use --output-dir with --runs",
            ));
        }
        Ok(parsed)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, GeneratorError> {
    value
        .parse()
        .map_err(|_| GeneratorError::invalid_argument(format!("{flag} expects a non-negative integer, got '{value}'")))
}

/// Structured logs on stderr. `RUST_LOG` wins over the default level.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let quiet = args.iter().any(|a| a == "--quiet");
    init_tracing(if quiet { "warn" } else { "info" });

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "claimgen failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), GeneratorError> {
    let args = Args::parse(args)?;

    let mut config = GeneratorConfig::canonical();
    if let Some(path) = &args.reference {
        config = config.with_reference_file(path)?;
        tracing::info!(path = %path.display(), "loaded reference tables");
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    config.seed = match args.seed {
        Some(seed) => seed,
        None => {
            let seed: u64 = rand::random();
            tracing::info!(seed, "no --seed given, drew a fresh one");
            seed
        }
    };
    config.validate()?;

    match args.runs {
        Some(n) => run_many(&config, n, &args),
        None => run_once(&config, &args),
    }
}

fn run_once(config: &GeneratorConfig, args: &Args) -> Result<(), GeneratorError> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{DEFAULT_OUTPUT_STEM}.{}", args.format.extension())));

    let records = generate_dataset(config)?;
    output::write_file(&records, args.format, &path)?;

    if !args.quiet {
        println!("Wrote {} records to {} (seed {})", records.len(), path.display(), config.seed);
    }
    if args.verify {
        println!();
        print!("{}", DatasetReport::build(&records));
    }
    Ok(())
}

struct RunOutcome {
    seed: u64,
    path: PathBuf,
    rows: usize,
    report: Option<DatasetReport>,
}

fn run_many(config: &GeneratorConfig, n: u64, args: &Args) -> Result<(), GeneratorError> {
    let dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)?;

    let start_seed = config.seed;
    let mut outcomes = (0..n)
        .into_par_iter()
        .map(|i| -> Result<RunOutcome, GeneratorError> {
            let mut config = config.clone();
            config.seed = start_seed.wrapping_add(i);
            let records = generate_dataset(&config)?;
            let path = dir.join(format!("claims_seed_{}.{}", config.seed, args.format.extension()));
            output::write_file(&records, args.format, &path)?;
            Ok(RunOutcome {
                seed: config.seed,
                path,
                rows: records.len(),
                report: args.verify.then(|| DatasetReport::build(&records)),
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;
    outcomes.sort_by_key(|o| o.seed);

    if !args.quiet {
        for o in &outcomes {
            println!("Seed {}: {} records -> {}", o.seed, o.rows, o.path.display());
        }
    }
    if args.verify {
        print_run_table(&outcomes);
    }
    Ok(())
}

fn print_run_table(outcomes: &[RunOutcome]) {
    println!("\n=== Per-run verification ===");
    println!("{:>20} | {:>8} | {:>10} | {:>9} | {:>7}", "Seed", "Rows", "Violations", "Defects", "Defect%");
    println!("{}", "-".repeat(20 + 3 + 8 + 3 + 10 + 3 + 9 + 3 + 7));
    for o in outcomes {
        let Some(report) = &o.report else { continue };
        println!(
            "{:>20} | {:>8} | {:>10} | {:>9} | {:>6.1}%",
            o.seed,
            o.rows,
            report.violations.len(),
            report.defects.defective(),
            report.defects.rate() * 100.0,
        );
    }
    let failed = outcomes.iter().filter_map(|o| o.report.as_ref()).filter(|r| !r.passed()).count();
    if failed == 0 {
        println!("  All timeline invariants: PASS");
    } else {
        println!("  {failed} run(s) with timeline violations: FAIL");
    }
}

//! Dump the compiled-in reference tables.
//!
//! Writes the canonical `{ "reference": …, "events": … }` document to stdout
//! (pass `--compact` for a single line), ready to be edited and fed back with
//! `claimgen --reference <file>`. A per-state seasonal event summary goes to
//! stderr.

use std::env;

use claimgen::config::ReferenceFile;
use claimgen::error::GeneratorError;
use claimgen::reference::SeasonalEventTable;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GeneratorError> {
    let compact = env::args().skip(1).any(|a| a == "--compact");
    let catalog = ReferenceFile::canonical();

    let json = if compact {
        serde_json::to_string(&catalog)?
    } else {
        serde_json::to_string_pretty(&catalog)?
    };
    println!("{json}");

    summarize(&catalog);
    Ok(())
}

/// Chance that a claim lost in `month` in `state` is tied to some event.
/// Events are tried in order and the first success wins, so the chance is
/// one minus the product of the per-event misses.
fn firing_chance(events: &SeasonalEventTable, state: &str, month: u32) -> f64 {
    let season = claimgen::reference::Season::from_month(month);
    let miss: f64 = events
        .candidates(state, season)
        .iter()
        .filter(|e| e.applies_in(month))
        .map(|e| 1.0 - e.probability)
        .product();
    1.0 - miss
}

fn summarize(catalog: &ReferenceFile) {
    let ReferenceFile { reference, events } = catalog;

    let with_events = events.states().count();
    eprintln!(
        "reference_catalog: {} states in pool, {} with seasonal events",
        reference.states.len(),
        with_events
    );

    for state in events.states() {
        eprintln!("  state={state}");
        for (season, defs) in events.seasons(state) {
            for e in defs {
                let months: Vec<String> = e.months.iter().map(u32::to_string).collect();
                eprintln!(
                    "    {:<7} cause={:<5} p={:.2}  severity={:<12} months=[{}]",
                    format!("{season:?}"),
                    e.cause,
                    e.probability,
                    format!("{:?}", e.severity),
                    months.join(",")
                );
            }
        }
        let by_month: Vec<String> = (1..=12)
            .map(|m| format!("{:.0}%", firing_chance(events, state, m) * 100.0))
            .collect();
        eprintln!("    event share by month: {}", by_month.join(" "));
    }

    let quiet: Vec<&str> = reference
        .states
        .iter()
        .map(String::as_str)
        .filter(|s| events.seasons(s).next().is_none())
        .collect();
    if !quiet.is_empty() {
        eprintln!("  no seasonal events: {}", quiet.join(", "));
    }
}

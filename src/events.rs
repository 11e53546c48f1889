use chrono::{Datelike, NaiveDate};
use rand::Rng;

use crate::reference::{EventDefinition, Season, SeasonalEventTable};

/// Pick the seasonal catastrophe (if any) that a claim in `state` with a loss
/// on `loss_date` belongs to.
///
/// Definitions are tried in table order. A definition whose months do not
/// include the loss month is skipped without consuming randomness; otherwise
/// one uniform draw decides whether it fires. The first one that fires wins,
/// even if a later definition has a higher probability.
pub fn correlate<'t>(
    table: &'t SeasonalEventTable,
    state: &str,
    loss_date: NaiveDate,
    rng: &mut impl Rng,
) -> Option<&'t EventDefinition> {
    let month = loss_date.month();
    let season = Season::from_month(month);
    let found = table
        .candidates(state, season)
        .iter()
        .find(|event| event.applies_in(month) && rng.random::<f64>() < event.probability);
    if let Some(event) = found {
        tracing::trace!(state, %loss_date, cause = %event.cause, "seasonal event correlated");
    }
    found
}

/// Claim-value scale for an optional event; uncorrelated claims are unscaled.
pub fn claim_multiplier(event: Option<&EventDefinition>) -> u32 {
    event.map_or(1, |e| e.severity.claim_multiplier())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::reference::Severity;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ev(cause: &str, probability: f64, months: &[u32], severity: Severity) -> EventDefinition {
        EventDefinition {
            cause: cause.to_string(),
            description: format!("{cause} damage"),
            probability,
            months: months.to_vec(),
            severity,
        }
    }

    /// Florida summer hurricanes fire at ≈80 % among eligible months.
    #[test]
    fn florida_hurricane_rate_converges() {
        let table = SeasonalEventTable::canonical();
        let mut rng = rng();
        let n = 20_000;
        let hits = (0..n)
            .filter(|_| {
                correlate(&table, "FL", date(2023, 8, 14), &mut rng)
                    .is_some_and(|e| e.cause == "HURR")
            })
            .count();
        let rate = hits as f64 / n as f64;
        assert!((0.78..=0.82).contains(&rate), "HURR rate {rate:.3} outside [0.78, 0.82]");
    }

    #[test]
    fn hurricane_never_fires_outside_its_months() {
        let table = SeasonalEventTable::canonical();
        let mut rng = rng();
        for month in [1, 2, 3, 4, 5, 10, 11, 12] {
            for _ in 0..500 {
                let event = correlate(&table, "FL", date(2023, month, 10), &mut rng);
                assert!(
                    event.is_none_or(|e| e.cause != "HURR"),
                    "HURR fired in month {month}"
                );
            }
        }
    }

    #[test]
    fn first_match_wins_over_higher_probability() {
        let mut table = SeasonalEventTable::new();
        table.insert("TX", Season::Summer, ev("ALWAYS", 1.0, &[7], Severity::Low));
        table.insert("TX", Season::Summer, ev("LATER", 1.0, &[7], Severity::Catastrophic));
        let mut rng = rng();
        for _ in 0..100 {
            let event = correlate(&table, "TX", date(2022, 7, 1), &mut rng).unwrap();
            assert_eq!(event.cause, "ALWAYS");
        }
    }

    #[test]
    fn ineligible_first_entry_falls_through() {
        let mut table = SeasonalEventTable::new();
        table.insert("TX", Season::Summer, ev("AUGUST", 1.0, &[8], Severity::High));
        table.insert("TX", Season::Summer, ev("JULY", 1.0, &[7], Severity::Medium));
        let mut rng = rng();
        let event = correlate(&table, "TX", date(2022, 7, 20), &mut rng).unwrap();
        assert_eq!(event.cause, "JULY");
    }

    #[test]
    fn ineligible_entries_do_not_consume_randomness() {
        let mut table = SeasonalEventTable::new();
        table.insert("TX", Season::Summer, ev("AUGUST", 0.5, &[8], Severity::High));

        let mut a = rng();
        let mut b = rng();
        assert!(correlate(&table, "TX", date(2022, 7, 20), &mut a).is_none());
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }

    #[test]
    fn state_without_table_has_no_event() {
        let table = SeasonalEventTable::canonical();
        let mut rng = rng();
        assert!(correlate(&table, "NY", date(2023, 8, 1), &mut rng).is_none());
    }

    #[test]
    fn zero_probability_never_fires() {
        let mut table = SeasonalEventTable::new();
        table.insert("CA", Season::Summer, ev("NEVER", 0.0, &[7, 8, 9], Severity::High));
        let mut rng = rng();
        assert!((0..1_000).all(|_| correlate(&table, "CA", date(2021, 8, 1), &mut rng).is_none()));
    }

    #[test]
    fn multiplier_defaults_to_one() {
        assert_eq!(claim_multiplier(None), 1);
        let cat = ev("HURR", 0.8, &[7], Severity::Catastrophic);
        assert_eq!(claim_multiplier(Some(&cat)), 5);
    }
}

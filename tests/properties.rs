use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use claimgen::analysis::{summarize_defects, verify_timeline};
use claimgen::calendar::{TemporalSampler, sample_date};
use claimgen::columns::standardize_column_name;
use claimgen::config::GeneratorConfig;
use claimgen::financials::monetary_value;
use claimgen::generator::generate_dataset;

fn config(seed: u64, rows: usize, defect_probability: f64) -> GeneratorConfig {
    let mut config = GeneratorConfig::canonical();
    config.seed = seed;
    config.rows = rows;
    config.defect_probability = defect_probability;
    config.today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    config
}

/// Header-like text: printable ASCII with plenty of separators.
fn label_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ,./()_'%-]{0,64}"
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..8_000).prop_map(|d| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Days::new(d))
}

proptest! {
    #[test]
    fn standardize_is_idempotent(label in label_strategy()) {
        let once = standardize_column_name(&label);
        prop_assert_eq!(standardize_column_name(&once), once.clone());
        prop_assert!(!once.starts_with('_') && !once.ends_with('_'));
        prop_assert!(!once.contains("__"));
        prop_assert!(!once.chars().any(|c| c.is_whitespace() || "/(),.-".contains(c)));
    }

    #[test]
    fn sample_date_stays_in_bounds(lower in date_strategy(), span in 0u64..3_000, seed in any::<u64>()) {
        let upper = lower + Days::new(span);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let d = sample_date(lower, upper, &mut rng);
        prop_assert!(lower <= d && d <= upper, "{} not in [{}, {}]", d, lower, upper);
    }

    #[test]
    fn timeline_ordering_holds_for_any_window(
        epoch in date_strategy(),
        extra_days in 0u64..2_000,
        seed in any::<u64>(),
    ) {
        let today = epoch + Days::new(extra_days);
        let sampler = TemporalSampler::new(epoch, today).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        for _ in 0..20 {
            let t = sampler.sample(&mut rng);
            prop_assert_eq!(t.risk_end, t.risk_start + Days::new(365));
            prop_assert!(t.risk_start <= t.loss_date && t.loss_date <= t.risk_end);
            prop_assert!(t.loss_date <= t.notification_date);
            prop_assert!(t.notification_date <= t.loss_date + Days::new(30));
            prop_assert!(t.loss_date <= t.reporting_period_end);
        }
    }

    #[test]
    fn monetary_value_stays_within_variation(nominal in 0.0f64..5e6, variation in 0.0f64..0.5, seed in any::<u64>()) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let v = monetary_value(nominal, variation, &mut rng) as f64;
        prop_assert!(v >= nominal * (1.0 - variation) - 1.0);
        prop_assert!(v <= nominal * (1.0 + variation));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn generated_datasets_satisfy_timeline_invariants(seed in any::<u64>()) {
        let records = generate_dataset(&config(seed, 60, 0.1)).unwrap();
        let violations = verify_timeline(&records);
        prop_assert!(violations.is_empty(), "seed {}: {}", seed, violations[0]);
    }

    #[test]
    fn clean_datasets_have_no_detectable_defects(seed in any::<u64>()) {
        let records = generate_dataset(&config(seed, 60, 0.0)).unwrap();
        prop_assert_eq!(summarize_defects(&records).defective(), 0);
    }

    #[test]
    fn same_seed_reproduces_dataset(seed in any::<u64>()) {
        let a = generate_dataset(&config(seed, 15, 0.1)).unwrap();
        let b = generate_dataset(&config(seed, 15, 0.1)).unwrap();
        prop_assert_eq!(a, b);
    }
}

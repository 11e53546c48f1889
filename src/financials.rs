use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Default relative noise applied by [`monetary_value`].
pub const DEFAULT_VARIATION: f64 = 0.2;
/// Upper bound (exclusive) of the base claim value draw.
pub const MAX_BASE_CLAIM_VALUE: f64 = 1_000_000.0;

/// Share of `base × multiplier` paid as indemnity this month.
const INDEMNITY_SHARE: f64 = 0.4;
const PREVIOUSLY_PAID_SHARE: f64 = 0.8;
const INDEMNITY_RESERVE_SHARE: f64 = 0.8;
const EXPENSE_RESERVE_SHARE: f64 = 0.5;

/// Jitter `nominal` by up to ±`variation` of itself and floor the result:
/// `floor(nominal + U(-1, 1) · nominal · variation)`.
pub fn monetary_value(nominal: f64, variation: f64, rng: &mut impl Rng) -> i64 {
    let noise = Uniform::new(-1.0, 1.0).expect("valid unit interval");
    (nominal + noise.sample(rng) * nominal * variation).floor() as i64
}

/// [`monetary_value`] with the default ±20 % variation.
pub fn jitter(nominal: f64, rng: &mut impl Rng) -> i64 {
    monetary_value(nominal, DEFAULT_VARIATION, rng)
}

/// Paid / previously paid / reserve split for one cost category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryAmounts {
    pub paid_this_month: i64,
    pub previously_paid: i64,
    pub reserve: i64,
}

impl CategoryAmounts {
    /// Derive the previously-paid and reserve figures from this month's
    /// payment. Both are fresh draws around a fixed share of `paid_this_month`.
    fn from_paid(paid_this_month: i64, reserve_share: f64, rng: &mut impl Rng) -> Self {
        let paid = paid_this_month as f64;
        CategoryAmounts {
            paid_this_month,
            previously_paid: jitter(paid * PREVIOUSLY_PAID_SHARE, rng),
            reserve: jitter(paid * reserve_share, rng),
        }
    }

    /// Can be negative when more was paid before than this month.
    pub fn change_this_month(&self) -> i64 {
        self.paid_this_month - self.previously_paid
    }

    pub fn total_incurred(&self) -> i64 {
        self.paid_this_month + self.previously_paid + self.reserve
    }
}

/// Every monetary field of one claim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Financials {
    pub base_claim_value: f64,
    pub claim_multiplier: u32,
    pub indemnity: CategoryAmounts,
    pub fees: CategoryAmounts,
    pub expenses: CategoryAmounts,
    pub attorney_coverage_fees: CategoryAmounts,
    pub adjusters_fees: CategoryAmounts,
    pub defence_fees: CategoryAmounts,
    pub tpa_fees: CategoryAmounts,
    /// `floor(base × multiplier)`. Computed independently of the category
    /// cascade, so it does not equal the sum of the per-category totals.
    pub total_incurred: i64,
    pub deductible: i64,
    pub sums_insured: i64,
    pub medicare_conditional_payment: i64,
}

impl Financials {
    /// Draw a base claim value uniformly from `[0, 1_000_000)` and derive the
    /// cascade from it.
    pub fn sample(claim_multiplier: u32, rng: &mut impl Rng) -> Self {
        let base = rng.random_range(0.0..MAX_BASE_CLAIM_VALUE);
        Self::derive(base, claim_multiplier, rng)
    }

    /// Indemnity is jittered from `base × multiplier × 0.4`; every other paid
    /// category is a re-jittered share of indemnity.
    pub fn derive(base_claim_value: f64, claim_multiplier: u32, rng: &mut impl Rng) -> Self {
        let scaled = base_claim_value * claim_multiplier as f64;

        let indemnity_paid = jitter(scaled * INDEMNITY_SHARE, rng);
        let ind = indemnity_paid as f64;
        let fees_paid = jitter(ind * 0.10, rng);
        let expenses_paid = jitter(ind * 0.05, rng);
        let attorney_paid = jitter(ind * 0.15, rng);
        let adjusters_paid = jitter(ind * 0.08, rng);
        let tpa_paid = jitter(ind * 0.03, rng);
        let defence_paid = jitter(ind * 0.12, rng);

        Financials {
            base_claim_value,
            claim_multiplier,
            indemnity: CategoryAmounts::from_paid(indemnity_paid, INDEMNITY_RESERVE_SHARE, rng),
            fees: CategoryAmounts::from_paid(fees_paid, EXPENSE_RESERVE_SHARE, rng),
            expenses: CategoryAmounts::from_paid(expenses_paid, EXPENSE_RESERVE_SHARE, rng),
            attorney_coverage_fees: CategoryAmounts::from_paid(attorney_paid, EXPENSE_RESERVE_SHARE, rng),
            adjusters_fees: CategoryAmounts::from_paid(adjusters_paid, EXPENSE_RESERVE_SHARE, rng),
            defence_fees: CategoryAmounts::from_paid(defence_paid, EXPENSE_RESERVE_SHARE, rng),
            tpa_fees: CategoryAmounts::from_paid(tpa_paid, EXPENSE_RESERVE_SHARE, rng),
            total_incurred: scaled.floor() as i64,
            deductible: jitter(base_claim_value * 0.05, rng),
            sums_insured: jitter(base_claim_value * 10.0, rng),
            medicare_conditional_payment: jitter(base_claim_value * 0.1, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    fn within(value: i64, nominal: f64, variation: f64) -> bool {
        let v = value as f64;
        v >= (nominal * (1.0 - variation)).floor() && v <= nominal * (1.0 + variation)
    }

    #[test]
    fn monetary_value_stays_within_variation() {
        let mut rng = rng();
        for _ in 0..10_000 {
            let v = monetary_value(1_000.0, 0.2, &mut rng);
            assert!((800..=1_200).contains(&v), "{v} outside [800, 1200]");
        }
    }

    #[test]
    fn monetary_value_of_zero_is_zero() {
        let mut rng = rng();
        assert_eq!(monetary_value(0.0, 0.2, &mut rng), 0);
    }

    #[test]
    fn zero_variation_floors_nominal() {
        let mut rng = rng();
        assert_eq!(monetary_value(1_234.9, 0.0, &mut rng), 1_234);
    }

    /// base=100_000, catastrophic ×5 → indemnity ≈ 200_000 ± 20 %.
    #[test]
    fn catastrophic_indemnity_near_nominal() {
        let mut rng = rng();
        for _ in 0..1_000 {
            let f = Financials::derive(100_000.0, 5, &mut rng);
            assert!(
                within(f.indemnity.paid_this_month, 200_000.0, 0.2),
                "indemnity {} outside 200_000 ± 20 %",
                f.indemnity.paid_this_month
            );
        }
    }

    #[test]
    fn flat_total_incurred_ignores_cascade() {
        let mut rng = rng();
        let f = Financials::derive(123_456.7, 3, &mut rng);
        assert_eq!(f.total_incurred, 370_370);
        assert_ne!(
            f.total_incurred,
            f.indemnity.total_incurred() + f.fees.total_incurred()
        );
    }

    #[test]
    fn dependent_fees_are_shares_of_indemnity() {
        let mut rng = rng();
        for _ in 0..1_000 {
            let f = Financials::derive(500_000.0, 1, &mut rng);
            let ind = f.indemnity.paid_this_month as f64;
            assert!(within(f.fees.paid_this_month, ind * 0.10, 0.2));
            assert!(within(f.expenses.paid_this_month, ind * 0.05, 0.2));
            assert!(within(f.attorney_coverage_fees.paid_this_month, ind * 0.15, 0.2));
            assert!(within(f.adjusters_fees.paid_this_month, ind * 0.08, 0.2));
            assert!(within(f.tpa_fees.paid_this_month, ind * 0.03, 0.2));
            assert!(within(f.defence_fees.paid_this_month, ind * 0.12, 0.2));
        }
    }

    #[test]
    fn previously_paid_and_reserve_track_paid() {
        let mut rng = rng();
        for _ in 0..1_000 {
            let f = Financials::derive(750_000.0, 2, &mut rng);
            let ind = f.indemnity.paid_this_month as f64;
            assert!(within(f.indemnity.previously_paid, ind * 0.8, 0.2));
            assert!(within(f.indemnity.reserve, ind * 0.8, 0.2));
            let fees = f.fees.paid_this_month as f64;
            assert!(within(f.fees.previously_paid, fees * 0.8, 0.2));
            assert!(within(f.fees.reserve, fees * 0.5, 0.2));
        }
    }

    #[test]
    fn category_aggregates() {
        let c = CategoryAmounts { paid_this_month: 100, previously_paid: 130, reserve: 40 };
        assert_eq!(c.change_this_month(), -30);
        assert_eq!(c.total_incurred(), 270);
    }

    #[test]
    fn sampled_base_in_range() {
        let mut rng = rng();
        for _ in 0..1_000 {
            let f = Financials::sample(1, &mut rng);
            assert!((0.0..MAX_BASE_CLAIM_VALUE).contains(&f.base_claim_value));
            assert!(f.indemnity.paid_this_month >= 0);
        }
    }
}

use chrono::{Days, Months, NaiveDate};
use rand::Rng;

use crate::error::GeneratorError;

/// Length of one reporting period.
pub const REPORTING_PERIOD_MONTHS: u32 = 3;
/// Length of every risk window, in days (not calendar years).
pub const RISK_WINDOW_DAYS: u64 = 365;
/// Latest a claim can be notified after the loss.
pub const NOTIFICATION_WINDOW_DAYS: u64 = 30;

/// The dates that tie one claim to its reporting period and risk window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimTimeline {
    pub reporting_period_start: NaiveDate,
    pub reporting_period_end: NaiveDate,
    pub risk_start: NaiveDate,
    pub risk_end: NaiveDate,
    pub loss_date: NaiveDate,
    pub notification_date: NaiveDate,
}

/// Quarter-end boundaries from `epoch` up to and including `today`.
pub fn reporting_periods(epoch: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut current = epoch;
    while current <= today {
        out.push(current);
        current = current + Months::new(REPORTING_PERIOD_MONTHS);
    }
    out
}

/// Uniform date in `[lower, upper]` at day precision. A degenerate window
/// (`upper < lower`) collapses to `lower`.
pub fn sample_date(lower: NaiveDate, upper: NaiveDate, rng: &mut impl Rng) -> NaiveDate {
    let span = (upper - lower).num_days();
    if span <= 0 {
        return lower;
    }
    lower + Days::new(rng.random_range(0..=span) as u64)
}

/// Samples claim timelines against a fixed calendar.
#[derive(Debug, Clone)]
pub struct TemporalSampler {
    epoch: NaiveDate,
    today: NaiveDate,
    periods: Vec<NaiveDate>,
}

impl TemporalSampler {
    pub fn new(epoch: NaiveDate, today: NaiveDate) -> Result<Self, GeneratorError> {
        let periods = reporting_periods(epoch, today);
        if periods.is_empty() {
            return Err(GeneratorError::invalid_config(format!(
                "today ({today}) is before the reporting epoch ({epoch})"
            )));
        }
        Ok(TemporalSampler { epoch, today, periods })
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    /// Draw one consistent timeline:
    ///
    /// 1. reporting period end uniformly from the quarter list, start 3 months earlier;
    /// 2. risk start in `[epoch, min(period end, today)]`, risk end 365 days later;
    /// 3. loss in `[risk start, min(risk end, period end)]`;
    /// 4. notification in `[loss, min(loss + 30 days, period end)]`.
    pub fn sample(&self, rng: &mut impl Rng) -> ClaimTimeline {
        let reporting_period_end = self.periods[rng.random_range(0..self.periods.len())];
        let reporting_period_start = reporting_period_end - Months::new(REPORTING_PERIOD_MONTHS);

        let risk_start = sample_date(self.epoch, reporting_period_end.min(self.today), rng);
        let risk_end = risk_start + Days::new(RISK_WINDOW_DAYS);

        let loss_date = sample_date(risk_start, risk_end.min(reporting_period_end), rng);
        let notification_date = sample_date(
            loss_date,
            (loss_date + Days::new(NOTIFICATION_WINDOW_DAYS)).min(reporting_period_end),
            rng,
        );

        ClaimTimeline {
            reporting_period_start,
            reporting_period_end,
            risk_start,
            risk_end,
            loss_date,
            notification_date,
        }
    }

    /// Any date between the epoch and today; unrelated to any claim.
    pub fn sample_unrelated(&self, rng: &mut impl Rng) -> NaiveDate {
        sample_date(self.epoch, self.today, rng)
    }
}

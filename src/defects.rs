use std::fmt;

use rand::Rng;

use crate::calendar::TemporalSampler;
use crate::record::{ClaimRecord, fields};
use crate::types::FieldValue;

/// Share of records that receive exactly one defect.
pub const DEFECT_PROBABILITY: f64 = 0.1;

/// The closed set of data-quality defects the generator can inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Defect {
    /// UMR replaced with `PENDING`.
    PendingMarketReference,
    /// Loss date written with `/` separators.
    SlashedLossDate,
    /// Risk inception date written day-first (`DD-MM-YYYY`).
    ReversedInceptionDate,
    BlankCurrency,
    /// Total incurred replaced with `TBC`.
    PlaceholderTotalIncurred,
    BlankCauseOfLoss,
    /// Location-of-risk state replaced with `XX`.
    UnknownRiskRegion,
    BlankTpaName,
    /// Agreement number replaced with `TBC`.
    PlaceholderAgreementNumber,
    /// Reporting period start and end exchanged.
    SwappedReportingPeriod,
    BlankReportingPeriodStart,
    /// Reporting period end replaced with an unrelated date.
    DetachedReportingPeriodEnd,
}

impl Defect {
    pub const ALL: [Defect; 12] = [
        Defect::PendingMarketReference,
        Defect::SlashedLossDate,
        Defect::ReversedInceptionDate,
        Defect::BlankCurrency,
        Defect::PlaceholderTotalIncurred,
        Defect::BlankCauseOfLoss,
        Defect::UnknownRiskRegion,
        Defect::BlankTpaName,
        Defect::PlaceholderAgreementNumber,
        Defect::SwappedReportingPeriod,
        Defect::BlankReportingPeriodStart,
        Defect::DetachedReportingPeriodEnd,
    ];

    /// Uniform choice among the twelve kinds.
    pub fn sample(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Whether this defect deliberately breaks the reporting-period relation
    /// `start == end − 3 months`.
    pub fn breaks_reporting_period(self) -> bool {
        matches!(
            self,
            Defect::SwappedReportingPeriod
                | Defect::BlankReportingPeriodStart
                | Defect::DetachedReportingPeriodEnd
        )
    }

    /// Corrupt `record` in place. Only the fields this defect names are touched.
    pub fn apply(self, record: &mut ClaimRecord, sampler: &TemporalSampler, rng: &mut impl Rng) {
        match self {
            Defect::PendingMarketReference => {
                record.set(fields::UMR, "PENDING");
            }
            Defect::SlashedLossDate => rewrite_date(record, fields::DATE_OF_LOSS_FROM, slashed),
            Defect::ReversedInceptionDate => rewrite_date(record, fields::RISK_INCEPTION_DATE, reversed),
            Defect::BlankCurrency => {
                record.set(fields::ORIGINAL_CURRENCY, FieldValue::Missing);
            }
            Defect::PlaceholderTotalIncurred => {
                record.set(fields::TOTAL_INCURRED, "TBC");
            }
            Defect::BlankCauseOfLoss => {
                record.set(fields::CAUSE_OF_LOSS_CODE, FieldValue::Missing);
            }
            Defect::UnknownRiskRegion => {
                record.set(fields::LOCATION_OF_RISK_STATE, "XX");
            }
            Defect::BlankTpaName => {
                record.set(fields::TPA_NAME, FieldValue::Missing);
            }
            Defect::PlaceholderAgreementNumber => {
                record.set(fields::AGREEMENT_NO, "TBC");
            }
            Defect::SwappedReportingPeriod => {
                record.swap(fields::REPORTING_PERIOD_START, fields::REPORTING_PERIOD_END);
            }
            Defect::BlankReportingPeriodStart => {
                record.set(fields::REPORTING_PERIOD_START, FieldValue::Missing);
            }
            Defect::DetachedReportingPeriodEnd => {
                record.set(fields::REPORTING_PERIOD_END, sampler.sample_unrelated(rng));
            }
        }
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Defect::PendingMarketReference => "pending market reference",
            Defect::SlashedLossDate => "slash-separated loss date",
            Defect::ReversedInceptionDate => "reversed inception date",
            Defect::BlankCurrency => "blank currency",
            Defect::PlaceholderTotalIncurred => "placeholder total incurred",
            Defect::BlankCauseOfLoss => "blank cause of loss",
            Defect::UnknownRiskRegion => "unknown risk region",
            Defect::BlankTpaName => "blank TPA name",
            Defect::PlaceholderAgreementNumber => "placeholder agreement number",
            Defect::SwappedReportingPeriod => "swapped reporting period",
            Defect::BlankReportingPeriodStart => "blank reporting period start",
            Defect::DetachedReportingPeriodEnd => "detached reporting period end",
        };
        f.write_str(label)
    }
}

/// With chance `probability` (normally [`DEFECT_PROBABILITY`]) pick one
/// defect uniformly and apply it. Returns the defect applied, if any.
pub fn maybe_inject(
    record: &mut ClaimRecord,
    probability: f64,
    sampler: &TemporalSampler,
    rng: &mut impl Rng,
) -> Option<Defect> {
    if !rng.random_bool(probability) {
        return None;
    }
    let defect = Defect::sample(rng);
    defect.apply(record, sampler, rng);
    Some(defect)
}

/// Rewrite a date cell's text. Blank or non-text cells are left as they are.
fn rewrite_date(record: &mut ClaimRecord, label: &str, rewrite: fn(&str) -> String) {
    if let Some(FieldValue::Text(date)) = record.get(label) {
        if date.is_empty() {
            return;
        }
        let rewritten = rewrite(date);
        record.set(label, rewritten);
    }
}

fn slashed(date: &str) -> String {
    date.replace('-', "/")
}

fn reversed(date: &str) -> String {
    date.split('-').rev().collect::<Vec<_>>().join("-")
}

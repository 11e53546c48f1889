//! Offline checks over a normalized dataset: which calendar invariants hold,
//! and which records carry a recognizable defect signature.
//!
//! Everything here reads records the way a downstream consumer would, by
//! normalized column name, so it works equally on freshly generated records
//! and on rows read back from a CSV file.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, Months, NaiveDate};

use crate::calendar::{NOTIFICATION_WINDOW_DAYS, REPORTING_PERIOD_MONTHS, RISK_WINDOW_DAYS};
use crate::columns::standardize_column_name;
use crate::defects::Defect;
use crate::record::{ClaimRecord, fields};
use crate::types::{FieldValue, RecordId};

/// Normalized names of the columns the checks read.
struct Columns {
    umr: String,
    tpa_name: String,
    agreement_no: String,
    reporting_period_start: String,
    reporting_period_end: String,
    original_currency: String,
    location_of_risk_state: String,
    risk_inception: String,
    risk_expiry: String,
    cause_of_loss: String,
    loss_date: String,
    notification_date: String,
    total_incurred: String,
}

impl Columns {
    fn normalized() -> Self {
        let n = standardize_column_name;
        Columns {
            umr: n(fields::UMR),
            tpa_name: n(fields::TPA_NAME),
            agreement_no: n(fields::AGREEMENT_NO),
            reporting_period_start: n(fields::REPORTING_PERIOD_START),
            reporting_period_end: n(fields::REPORTING_PERIOD_END),
            original_currency: n(fields::ORIGINAL_CURRENCY),
            location_of_risk_state: n(fields::LOCATION_OF_RISK_STATE),
            risk_inception: n(fields::RISK_INCEPTION_DATE),
            risk_expiry: n(fields::RISK_EXPIRY_DATE),
            cause_of_loss: n(fields::CAUSE_OF_LOSS_CODE),
            loss_date: n(fields::DATE_OF_LOSS_FROM),
            notification_date: n(fields::DATE_CLAIM_ADVISED),
            total_incurred: n(fields::TOTAL_INCURRED),
        }
    }
}

fn text<'r>(record: &'r ClaimRecord, label: &str) -> &'r str {
    match record.get(label) {
        Some(FieldValue::Text(s)) => s,
        _ => "",
    }
}

fn missing(record: &ClaimRecord, label: &str) -> bool {
    record.get(label).is_none_or(FieldValue::is_missing)
}

fn date(record: &ClaimRecord, label: &str) -> Option<NaiveDate> {
    record.get(label).and_then(FieldValue::as_date)
}

fn record_id(record: &ClaimRecord) -> RecordId {
    let id = record.get(fields::ID).and_then(FieldValue::as_integer).unwrap_or(0);
    RecordId(id.max(0) as u64)
}

/// Recognize which of the twelve defects `record` carries, if any.
///
/// Expects normalized labels. A record with no recognizable signature
/// returns `None`; a detached reporting-period end that happens to land on
/// the correct date is indistinguishable from a clean record.
pub fn detect_defect(record: &ClaimRecord) -> Option<Defect> {
    detect_with(&Columns::normalized(), record)
}

fn detect_with(c: &Columns, record: &ClaimRecord) -> Option<Defect> {
    if text(record, &c.umr) == "PENDING" {
        return Some(Defect::PendingMarketReference);
    }
    if text(record, &c.loss_date).contains('/') {
        return Some(Defect::SlashedLossDate);
    }
    if !missing(record, &c.risk_inception) && date(record, &c.risk_inception).is_none() {
        return Some(Defect::ReversedInceptionDate);
    }
    if missing(record, &c.original_currency) {
        return Some(Defect::BlankCurrency);
    }
    if record
        .get(&c.total_incurred)
        .is_some_and(|v| !v.is_missing() && v.as_integer().is_none())
    {
        return Some(Defect::PlaceholderTotalIncurred);
    }
    if missing(record, &c.cause_of_loss) {
        return Some(Defect::BlankCauseOfLoss);
    }
    if text(record, &c.location_of_risk_state) == "XX" {
        return Some(Defect::UnknownRiskRegion);
    }
    if missing(record, &c.tpa_name) {
        return Some(Defect::BlankTpaName);
    }
    if text(record, &c.agreement_no) == "TBC" {
        return Some(Defect::PlaceholderAgreementNumber);
    }
    if missing(record, &c.reporting_period_start) {
        return Some(Defect::BlankReportingPeriodStart);
    }
    if let (Some(start), Some(end)) = (
        date(record, &c.reporting_period_start),
        date(record, &c.reporting_period_end),
    ) {
        let quarter = Months::new(REPORTING_PERIOD_MONTHS);
        if start == end + quarter {
            return Some(Defect::SwappedReportingPeriod);
        }
        if start != end - quarter {
            return Some(Defect::DetachedReportingPeriodEnd);
        }
    }
    None
}

/// Per-kind defect counts over a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectSummary {
    pub records: usize,
    pub by_kind: BTreeMap<Defect, usize>,
}

impl DefectSummary {
    pub fn defective(&self) -> usize {
        self.by_kind.values().sum()
    }

    pub fn rate(&self) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        self.defective() as f64 / self.records as f64
    }
}

pub fn summarize_defects(records: &[ClaimRecord]) -> DefectSummary {
    let columns = Columns::normalized();
    let mut summary = DefectSummary { records: records.len(), ..Default::default() };
    for record in records {
        if let Some(defect) = detect_with(&columns, record) {
            *summary.by_kind.entry(defect).or_insert(0) += 1;
        }
    }
    summary
}

/// A calendar invariant that does not hold for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineViolation {
    /// Risk expiry is not exactly 365 days after inception.
    RiskWindowLength { id: RecordId, risk_start: NaiveDate, risk_end: NaiveDate },
    /// Reporting period start is not exactly 3 months before its end.
    ReportingPeriodLength { id: RecordId, start: NaiveDate, end: NaiveDate },
    LossBeforeRiskStart { id: RecordId, loss: NaiveDate, risk_start: NaiveDate },
    LossAfterRiskEnd { id: RecordId, loss: NaiveDate, risk_end: NaiveDate },
    LossAfterReportingPeriod { id: RecordId, loss: NaiveDate, period_end: NaiveDate },
    NotificationBeforeLoss { id: RecordId, notification: NaiveDate, loss: NaiveDate },
    /// Notified more than 30 days after the loss.
    NotificationTooLate { id: RecordId, notification: NaiveDate, loss: NaiveDate },
}

impl fmt::Display for TimelineViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RiskWindowLength { id, risk_start, risk_end } => {
                write!(f, "RiskWindowLength id={id}: start={risk_start} end={risk_end}")
            }
            Self::ReportingPeriodLength { id, start, end } => {
                write!(f, "ReportingPeriodLength id={id}: start={start} end={end}")
            }
            Self::LossBeforeRiskStart { id, loss, risk_start } => {
                write!(f, "LossBeforeRiskStart id={id}: loss={loss} risk_start={risk_start}")
            }
            Self::LossAfterRiskEnd { id, loss, risk_end } => {
                write!(f, "LossAfterRiskEnd id={id}: loss={loss} risk_end={risk_end}")
            }
            Self::LossAfterReportingPeriod { id, loss, period_end } => {
                write!(f, "LossAfterReportingPeriod id={id}: loss={loss} period_end={period_end}")
            }
            Self::NotificationBeforeLoss { id, notification, loss } => {
                write!(f, "NotificationBeforeLoss id={id}: notified={notification} loss={loss}")
            }
            Self::NotificationTooLate { id, notification, loss } => {
                write!(f, "NotificationTooLate id={id}: notified={notification} loss={loss}")
            }
        }
    }
}

/// Check the calendar invariants of every record.
///
/// Cells that do not parse as ISO dates are skipped rather than reported:
/// they are defects, counted by [`summarize_defects`]. Reporting-period
/// checks are also skipped for records whose detected defect deliberately
/// breaks the period.
pub fn verify_timeline(records: &[ClaimRecord]) -> Vec<TimelineViolation> {
    let c = Columns::normalized();
    let mut out = Vec::new();

    for record in records {
        let id = record_id(record);
        let period_intact = detect_with(&c, record).is_none_or(|d| !d.breaks_reporting_period());

        let risk_start = date(record, &c.risk_inception);
        let risk_end = date(record, &c.risk_expiry);
        let loss = date(record, &c.loss_date);
        let notification = date(record, &c.notification_date);
        let period_start = date(record, &c.reporting_period_start);
        let period_end = date(record, &c.reporting_period_end);

        if let (Some(risk_start), Some(risk_end)) = (risk_start, risk_end)
            && risk_end != risk_start + Days::new(RISK_WINDOW_DAYS)
        {
            out.push(TimelineViolation::RiskWindowLength { id, risk_start, risk_end });
        }

        if period_intact
            && let (Some(start), Some(end)) = (period_start, period_end)
            && start != end - Months::new(REPORTING_PERIOD_MONTHS)
        {
            out.push(TimelineViolation::ReportingPeriodLength { id, start, end });
        }

        if let Some(loss) = loss {
            if let Some(risk_start) = risk_start
                && loss < risk_start
            {
                out.push(TimelineViolation::LossBeforeRiskStart { id, loss, risk_start });
            }
            if let Some(risk_end) = risk_end
                && loss > risk_end
            {
                out.push(TimelineViolation::LossAfterRiskEnd { id, loss, risk_end });
            }
            if period_intact
                && let Some(period_end) = period_end
                && loss > period_end
            {
                out.push(TimelineViolation::LossAfterReportingPeriod { id, loss, period_end });
            }
            if let Some(notification) = notification {
                if notification < loss {
                    out.push(TimelineViolation::NotificationBeforeLoss { id, notification, loss });
                } else if notification > loss + Days::new(NOTIFICATION_WINDOW_DAYS) {
                    out.push(TimelineViolation::NotificationTooLate { id, notification, loss });
                }
            }
        }
    }

    out
}

/// Violations shown individually before the report truncates the list.
const LISTED_VIOLATIONS: usize = 20;

/// Invariant status and defect counts for one dataset, rendered as the
/// PASS/FAIL table printed by `claimgen --verify` and the `analyse` binary.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub violations: Vec<TimelineViolation>,
    pub defects: DefectSummary,
}

impl DatasetReport {
    pub fn build(records: &[ClaimRecord]) -> Self {
        DatasetReport {
            violations: verify_timeline(records),
            defects: summarize_defects(records),
        }
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    fn status(&self, variant: fn(&TimelineViolation) -> bool) -> &'static str {
        if self.violations.iter().any(variant) { "FAIL" } else { "PASS" }
    }
}

impl fmt::Display for DatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TimelineViolation as V;

        writeln!(f, "=== Timeline invariants ===")?;
        let rows: [(&str, fn(&TimelineViolation) -> bool); 7] = [
            ("Risk window is 365 days", |v| matches!(v, V::RiskWindowLength { .. })),
            ("Reporting period is one quarter", |v| matches!(v, V::ReportingPeriodLength { .. })),
            ("Loss on or after risk inception", |v| matches!(v, V::LossBeforeRiskStart { .. })),
            ("Loss on or before risk expiry", |v| matches!(v, V::LossAfterRiskEnd { .. })),
            ("Loss within reporting period", |v| matches!(v, V::LossAfterReportingPeriod { .. })),
            ("Notification on or after loss", |v| matches!(v, V::NotificationBeforeLoss { .. })),
            ("Notification within 30 days", |v| matches!(v, V::NotificationTooLate { .. })),
        ];
        for (i, (name, variant)) in rows.iter().enumerate() {
            writeln!(f, "  [{}] {:<34} {}", i + 1, format!("{name}:"), self.status(*variant))?;
        }
        if self.violations.is_empty() {
            writeln!(f, "  All timeline invariants: PASS")?;
        } else {
            writeln!(f, "\n  {} violation(s):", self.violations.len())?;
            for v in self.violations.iter().take(LISTED_VIOLATIONS) {
                writeln!(f, "    {v}")?;
            }
            if self.violations.len() > LISTED_VIOLATIONS {
                writeln!(f, "    ... and {} more", self.violations.len() - LISTED_VIOLATIONS)?;
            }
        }

        let d = &self.defects;
        writeln!(f, "\n=== Defects ===")?;
        writeln!(
            f,
            "  {} of {} records defective ({:.1}%)",
            d.defective(),
            d.records,
            d.rate() * 100.0
        )?;
        for (defect, count) in &d.by_kind {
            writeln!(f, "  {:<30} {count:>6}", defect.to_string())?;
        }
        Ok(())
    }
}

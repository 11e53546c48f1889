use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::calendar::ClaimTimeline;
use crate::financials::{CategoryAmounts, Financials};
use crate::reference::{EventDefinition, ReferenceData};
use crate::types::{FieldValue, RecordId};

/// Labels that other stages read or rewrite after assembly.
pub mod fields {
    pub const ID: &str = "id";
    pub const TPA_NAME: &str = "TPA Name";
    pub const AGREEMENT_NO: &str = "Agreement No";
    pub const UMR: &str = "Unique Market Reference (UMR)";
    pub const REPORTING_PERIOD_START: &str = "Reporting Period Start Date";
    pub const REPORTING_PERIOD_END: &str = "Reporting Period (End Date)";
    pub const ORIGINAL_CURRENCY: &str = "Original Currency";
    pub const INSURED_STATE: &str = "Insured State, Province, Territory, Canton etc.";
    pub const LOCATION_OF_RISK_STATE: &str = "Location of risk State, Province, Territory, Canton";
    pub const RISK_INCEPTION_DATE: &str = "Risk Inception Date";
    pub const RISK_EXPIRY_DATE: &str = "Risk Expiry Date";
    pub const CAUSE_OF_LOSS_CODE: &str = "Cause of Loss Code";
    pub const LOSS_DESCRIPTION: &str = "Loss Description";
    pub const DATE_OF_LOSS_FROM: &str = "Date of Loss (From)";
    pub const DATE_CLAIM_ADVISED: &str = "Date Claim First Advised/Date Claim Made";
    pub const CLAIM_STATUS: &str = "Claim Status";
    pub const DATE_CLOSED: &str = "Date Closed";
    pub const PAID_INDEMNITY: &str = "Paid this month - Indemnity";
    pub const TOTAL_INCURRED: &str = "Total Incurred";
    pub const NOTES: &str = "Notes";
}

/// One generated claim: an ordered list of labelled cells.
///
/// Order is insertion order and is the column order of the output, so every
/// record from the same assembler shares one schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ClaimRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ClaimRecord { fields: Vec::with_capacity(capacity) }
    }

    /// Append a field. Labels are expected to be unique; use [`set`](Self::set)
    /// to overwrite.
    pub fn push(&mut self, label: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((label.into(), value.into()));
    }

    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    /// Replace the value under `label` in place, returning the old value.
    /// Unknown labels are appended.
    pub fn set(&mut self, label: &str, value: impl Into<FieldValue>) -> Option<FieldValue> {
        let value = value.into();
        match self.fields.iter_mut().find(|(l, _)| l == label) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((label.to_string(), value));
                None
            }
        }
    }

    /// Exchange the values of two fields. No-op if either label is absent.
    pub fn swap(&mut self, a: &str, b: &str) {
        let ia = self.fields.iter().position(|(l, _)| l == a);
        let ib = self.fields.iter().position(|(l, _)| l == b);
        if let (Some(ia), Some(ib)) = (ia, ib) {
            let va = std::mem::replace(&mut self.fields[ia].1, FieldValue::Missing);
            let vb = std::mem::replace(&mut self.fields[ib].1, va);
            self.fields[ia].1 = vb;
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rebuild the record with every label passed through `rename`; values and
    /// order are kept.
    pub fn rename_labels(&self, mut rename: impl FnMut(&str) -> String) -> ClaimRecord {
        ClaimRecord {
            fields: self.fields.iter().map(|(l, v)| (rename(l), v.clone())).collect(),
        }
    }
}

impl FromIterator<(String, FieldValue)> for ClaimRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        ClaimRecord { fields: iter.into_iter().collect() }
    }
}

impl Serialize for ClaimRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Everything decided about a claim before its fields are filled in.
#[derive(Debug, Clone)]
pub struct ClaimDraft<'a> {
    pub id: RecordId,
    pub state: &'a str,
    pub timeline: ClaimTimeline,
    pub event: Option<&'a EventDefinition>,
    pub financials: Financials,
    pub today: NaiveDate,
}

// Probabilities of the independent yes/no and optional attributes.
const CLOSED_PROBABILITY: f64 = 0.2;
const REFER_TO_UNDERWRITERS_PROBABILITY: f64 = 0.1;
const DENIAL_PROBABILITY: f64 = 0.05;
const MEDICARE_INJURY_PROBABILITY: f64 = 0.3;
const MEDICARE_CHECK_PROBABILITY: f64 = 0.95;
const MEDICARE_PAYMENT_PROBABILITY: f64 = 0.3;
const MEDICARE_MSP_COMPLETED_PROBABILITY: f64 = 0.8;
const REGISTRATION_PROBABILITY: f64 = 0.3;
const PATIENT_PROBABILITY: f64 = 0.3;
const EX_GRATIA_PROBABILITY: f64 = 0.05;
const PEER_REVIEW_PROBABILITY: f64 = 0.3;

const STANDARD_LOSS_DESCRIPTION: &str = "Standard property damage";
const COUNTRY: &str = "USA";
const CURRENCY: &str = "USD";

fn pick<'a>(values: &'a [String], rng: &mut impl Rng) -> &'a str {
    values.choose(rng).map_or("", String::as_str)
}

fn yes_no(probability: f64, rng: &mut impl Rng) -> &'static str {
    if rng.random_bool(probability) { "Y" } else { "N" }
}

/// `PREFIX` followed by a six-digit number.
fn reference_number(prefix: &str, rng: &mut impl Rng) -> String {
    format!("{prefix}{}", rng.random_range(100_000..1_000_000))
}

/// `PREFIX` followed by a zero-padded number below 100 000.
fn padded_reference(prefix: &str, rng: &mut impl Rng) -> String {
    format!("{prefix}{:05}", rng.random_range(0..99_999))
}

fn days_after(date: NaiveDate, max_days: u64, rng: &mut impl Rng) -> NaiveDate {
    date + Days::new(rng.random_range(0..=max_days))
}

fn days_before(date: NaiveDate, max_days: u64, rng: &mut impl Rng) -> NaiveDate {
    date - Days::new(rng.random_range(0..=max_days))
}

fn address(reference: &ReferenceData, state: &str, rng: &mut impl Rng) -> String {
    let number = rng.random_range(1..=9_999);
    let street = pick(&reference.streets, rng);
    let city = pick(reference.cities_for(state), rng);
    format!("{number} {street}, {city}")
}

fn zip_code(reference: &ReferenceData, state: &str, rng: &mut impl Rng) -> String {
    format!("{}{:03}", reference.zip_prefix_for(state), rng.random_range(0..999))
}

fn push_category(record: &mut ClaimRecord, section: &str, category: &str, amount: i64) {
    record.push(format!("{section} - {category}"), amount);
}

/// Fill every output field of one claim.
///
/// Attributes not derived from `draft` (names, flags, addresses, expert and
/// medical sub-records) are independent draws from `reference`.
pub fn assemble(draft: &ClaimDraft<'_>, reference: &ReferenceData, rng: &mut impl Rng) -> ClaimRecord {
    let ClaimDraft { id, state, timeline: t, event, financials: f, today } = *draft;
    let mut r = ClaimRecord::with_capacity(112);

    let is_closed = rng.random_bool(CLOSED_PROBABILITY);
    let closed_date = is_closed.then(|| days_after(t.notification_date, 180, rng));

    // ── Identifiers and agreement ────────────────────────────────────────────
    r.push(fields::ID, id.0 as i64);
    r.push("Field", reference_number("FIELD", rng));
    r.push("Coverholder Name", pick(&reference.coverholders, rng));
    r.push(fields::TPA_NAME, pick(&reference.tpa_names, rng));
    r.push(fields::AGREEMENT_NO, reference_number("AGR", rng));
    r.push(fields::UMR, format!("B{}", rng.random_range(1_000_000..10_000_000)));
    r.push("Binding authority or coverholder appointment agreement inception date", t.risk_start);
    r.push("Binding authority or coverholder appointment agreement expiry date", t.risk_end);
    r.push(fields::REPORTING_PERIOD_START, t.reporting_period_start);
    r.push(fields::REPORTING_PERIOD_END, t.reporting_period_end);
    r.push("Class of Business", pick(&reference.classes_of_business, rng));
    r.push("Lloyd's Risk Code", pick(&reference.risk_codes, rng));
    r.push("Section No", rng.random_range(1..=5).to_string());
    r.push(fields::ORIGINAL_CURRENCY, CURRENCY);
    r.push("Settlement Currency", CURRENCY);
    r.push("Rate of Exchange", "1");
    r.push("Certificate Reference", reference_number("CERT", rng));
    r.push("Claim Reference / Number", reference_number("CLM", rng));

    // ── Insured, risk and loss ───────────────────────────────────────────────
    r.push("Insured Full Name or Company Name", format!("Company {} Inc.", rng.random_range(0..1_000)));
    r.push(fields::INSURED_STATE, state);
    r.push("Insured Country", COUNTRY);
    r.push(fields::LOCATION_OF_RISK_STATE, state);
    r.push("Location of risk Country", COUNTRY);
    r.push(fields::RISK_INCEPTION_DATE, t.risk_start);
    r.push(fields::RISK_EXPIRY_DATE, t.risk_end);
    r.push("Period of Cover - Narrative", "Annual");
    r.push("Location of loss State, Province, Territory, Canton", state);
    r.push("Location of loss Country", COUNTRY);
    let cause = match event {
        Some(e) => e.cause.as_str(),
        None => pick(&reference.cause_codes, rng),
    };
    r.push(fields::CAUSE_OF_LOSS_CODE, cause);
    r.push(fields::LOSS_DESCRIPTION, event.map_or(STANDARD_LOSS_DESCRIPTION, |e| e.description.as_str()));
    r.push(fields::DATE_OF_LOSS_FROM, t.loss_date);
    r.push("Date of Loss to", t.loss_date);
    r.push(fields::DATE_CLAIM_ADVISED, t.notification_date);
    r.push(fields::CLAIM_STATUS, if is_closed { "Closed" } else { "Open" });
    r.push("Refer to Underwriters", yes_no(REFER_TO_UNDERWRITERS_PROBABILITY, rng));
    r.push("Denial", yes_no(DENIAL_PROBABILITY, rng));
    r.push("Claimant Name", format!("Claimant {}", rng.random_range(0..1_000)));
    r.push("Loss County", format!("County {}", rng.random_range(0..50)));
    r.push("State of Filing", state);
    r.push("PCS Code", format!("PCS{:03}", rng.random_range(0..999)));

    // ── Medicare ─────────────────────────────────────────────────────────────
    r.push("Medicare United States Bodily Injury", yes_no(MEDICARE_INJURY_PROBABILITY, rng));
    r.push("Medicare Eligibility Check Performance", yes_no(MEDICARE_CHECK_PROBABILITY, rng));
    r.push("Medicare Outcome of Eligibility Status Check", pick(&reference.medicare_outcomes, rng));
    let conditional = rng
        .random_bool(MEDICARE_PAYMENT_PROBABILITY)
        .then(|| f.medicare_conditional_payment.to_string());
    r.push("Medicare Conditional Payments", conditional);
    let msp = if rng.random_bool(MEDICARE_MSP_COMPLETED_PROBABILITY) { "Completed" } else { "In Progress" };
    r.push("Medicare MSP Compliance Services", msp);

    // ── Indemnity and fees ───────────────────────────────────────────────────
    push_indemnity_and_fees(&mut r, &f.indemnity, &f.fees);

    // ── Policy ───────────────────────────────────────────────────────────────
    r.push("Coverholder PIN", padded_reference("PIN", rng));
    r.push("Type of Insurance (Direct, or Type of RI)", pick(&reference.insurance_types, rng));
    r.push("Policy or Group Ref", reference_number("POL", rng));

    // ── Addresses ────────────────────────────────────────────────────────────
    r.push("Insured Address", address(reference, state, rng));
    r.push("Insured Postcode / Zip Code or similar", zip_code(reference, state, rng));
    r.push("Location of Risk Location ID", padded_reference("LOC", rng));
    r.push("Location of Risk Address", address(reference, state, rng));
    r.push("Location of Risk Postcode / Zip Code or similar", zip_code(reference, state, rng));
    r.push("Location of loss Address", address(reference, state, rng));
    r.push("Location of loss Postcode / Zip Code or similar", zip_code(reference, state, rng));

    // ── Deductible, sums insured, catastrophe ────────────────────────────────
    r.push("Deductible Amount", f.deductible);
    r.push("Deductible Basis", pick(&reference.deductible_bases, rng));
    r.push("Sums Insured Amount", f.sums_insured);
    r.push(fields::DATE_CLOSED, closed_date);
    r.push("Lloyd's Cat Code", pick(&reference.cat_codes, rng));
    r.push("Catastrophe Name", pick(&reference.cat_names, rng));

    // ── Expenses ─────────────────────────────────────────────────────────────
    let expense_categories: [(&str, &CategoryAmounts); 5] = [
        ("Expenses", &f.expenses),
        ("Attorney Coverage Fees", &f.attorney_coverage_fees),
        ("Adjusters Fees", &f.adjusters_fees),
        ("Defence Fees", &f.defence_fees),
        ("TPA Fees", &f.tpa_fees),
    ];
    for (name, amounts) in expense_categories {
        push_category(&mut r, "Paid this month", name, amounts.paid_this_month);
    }
    for (name, amounts) in expense_categories {
        push_category(&mut r, "Previously Paid", name, amounts.previously_paid);
    }
    for (name, amounts) in expense_categories {
        push_category(&mut r, "Reserve", name, amounts.reserve);
    }
    r.push(fields::TOTAL_INCURRED, f.total_incurred);

    // ── Vehicle / aircraft ───────────────────────────────────────────────────
    let registration = rng.random_bool(REGISTRATION_PROBABILITY).then(|| {
        let prefix = pick(&reference.registration_prefixes, rng);
        format!("{prefix}{:04}", rng.random_range(0..9_999))
    });
    r.push("Name or Reg No of Aircraft Vehicle, Vessel etc.", registration);
    r.push("% Ceded (Reinsurance)", rng.random_range(0..100i64));

    // ── Medical ──────────────────────────────────────────────────────────────
    r.push("Plan", pick(&reference.plans, rng));
    let patient = rng
        .random_bool(PATIENT_PROBABILITY)
        .then(|| format!("Patient {}", rng.random_range(0..1_000)));
    r.push("Patient Name", patient);
    r.push("Treatment Type", pick(&reference.treatment_types, rng));
    r.push("Country of Treatment", COUNTRY);
    r.push("Date of Treatment", days_after(t.loss_date, 30, rng));

    // ── Expert ───────────────────────────────────────────────────────────────
    r.push("Expert - Role", pick(&reference.expert_roles, rng));
    r.push("Expert Firm / Company Name", pick(&reference.expert_firms, rng));
    r.push("Expert Reference No etc.", padded_reference("EXP", rng));
    r.push("Expert Address", address(reference, state, rng));
    r.push("Expert State, Province, Territory, Canton etc.", state);
    r.push("Expert Postcode / Zip Code or similar", zip_code(reference, state, rng));
    r.push("Expert Country", COUNTRY);

    // ── Handling dates and notes ─────────────────────────────────────────────
    let notes = match event {
        Some(e) => format!("{}. Claim under review.", e.description),
        None => "Standard claim processing".to_string(),
    };
    r.push(fields::NOTES, notes);
    r.push("Date Claim Opened", days_before(t.notification_date, 2, rng));
    r.push("Ex gratia payment", yes_no(EX_GRATIA_PROBABILITY, rng));
    r.push("Claim First Notification Acknowledgement Date", days_after(t.notification_date, 1, rng));
    r.push("Date First Reserve Established", days_after(t.notification_date, 5, rng));
    r.push("Diary date", days_after(today, 30, rng));
    let peer_review = rng
        .random_bool(PEER_REVIEW_PROBABILITY)
        .then(|| days_after(today, 60, rng));
    r.push("Peer review date", peer_review);

    r
}

fn push_indemnity_and_fees(r: &mut ClaimRecord, indemnity: &CategoryAmounts, fees: &CategoryAmounts) {
    push_category(r, "Paid this month", "Indemnity", indemnity.paid_this_month);
    push_category(r, "Paid this month", "Fees", fees.paid_this_month);
    push_category(r, "Previously Paid", "Indemnity", indemnity.previously_paid);
    push_category(r, "Previously Paid", "Fees", fees.previously_paid);
    push_category(r, "Reserve", "Indemnity", indemnity.reserve);
    push_category(r, "Reserve", "Fees", fees.reserve);
    push_category(r, "Change this month", "Indemnity", indemnity.change_this_month());
    push_category(r, "Change this month", "Fees", fees.change_this_month());
    push_category(r, "Total Incurred", "Indemnity", indemnity.total_incurred());
    push_category(r, "Total Incurred", "Fees", fees.total_incurred());
}

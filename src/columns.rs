use crate::record::{ClaimRecord, fields};

/// Characters dropped outright from a label.
const STRIPPED: [char; 5] = ['/', '(', ')', ',', '.'];

/// Turn a human-readable header into a `snake_case`-like token.
///
/// Lowercase; drop `/(),.`; whitespace runs and hyphens become `_`; repeated
/// underscores collapse; leading and trailing underscores are trimmed.
/// Other punctuation (apostrophes, `%`) is kept. The transform is idempotent.
///
/// ```
/// use claimgen::columns::standardize_column_name;
/// assert_eq!(
///     standardize_column_name("Insured State, Province, Territory, Canton etc."),
///     "insured_state_province_territory_canton_etc"
/// );
/// ```
pub fn standardize_column_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars().flat_map(char::to_lowercase) {
        if STRIPPED.contains(&c) {
            continue;
        }
        if c.is_whitespace() || c == '-' || c == '_' {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }
    out.trim_matches('_').to_string()
}

/// Normalize every label of `record` except the row identifier.
pub fn normalize_record(record: &ClaimRecord) -> ClaimRecord {
    record.rename_labels(|label| {
        if label == fields::ID {
            label.to_string()
        } else {
            standardize_column_name(label)
        }
    })
}

/// Normalize a whole generated collection.
pub fn normalize_records(records: &[ClaimRecord]) -> Vec<ClaimRecord> {
    records.iter().map(normalize_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insured_state_example() {
        assert_eq!(
            standardize_column_name("Insured State, Province, Territory, Canton etc."),
            "insured_state_province_territory_canton_etc"
        );
    }

    #[test]
    fn hyphenated_financial_labels() {
        assert_eq!(standardize_column_name("Paid this month - Indemnity"), "paid_this_month_indemnity");
        assert_eq!(standardize_column_name("Expert - Role"), "expert_role");
        assert_eq!(standardize_column_name("Period of Cover - Narrative"), "period_of_cover_narrative");
    }

    #[test]
    fn strips_slashes_and_parentheses() {
        assert_eq!(
            standardize_column_name("Date Claim First Advised/Date Claim Made"),
            "date_claim_first_adviseddate_claim_made"
        );
        assert_eq!(standardize_column_name("Reporting Period (End Date)"), "reporting_period_end_date");
        assert_eq!(
            standardize_column_name("Unique Market Reference (UMR)"),
            "unique_market_reference_umr"
        );
        assert_eq!(
            standardize_column_name("Insured Postcode / Zip Code or similar"),
            "insured_postcode_zip_code_or_similar"
        );
    }

    #[test]
    fn keeps_other_punctuation() {
        assert_eq!(standardize_column_name("Lloyd's Risk Code"), "lloyd's_risk_code");
        assert_eq!(standardize_column_name("% Ceded (Reinsurance)"), "%_ceded_reinsurance");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(standardize_column_name("  - Notes - "), "notes");
        assert_eq!(standardize_column_name("__a__b__"), "a_b");
    }

    #[test]
    fn idempotent_on_examples() {
        for label in [
            "Insured State, Province, Territory, Canton etc.",
            "Name or Reg No of Aircraft Vehicle, Vessel etc.",
            "Type of Insurance (Direct, or Type of RI)",
            "Paid this month - Attorney Coverage Fees",
        ] {
            let once = standardize_column_name(label);
            assert_eq!(standardize_column_name(&once), once);
        }
    }

    #[test]
    fn id_is_left_alone() {
        let mut r = ClaimRecord::new();
        r.push("id", 1i64);
        r.push("Claim Status", "Open");
        let n = normalize_record(&r);
        assert_eq!(n.labels().collect::<Vec<_>>(), vec!["id", "claim_status"]);
        assert!(n.values().eq(r.values()));
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Catastrophe severity tier of a seasonal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Catastrophic,
}

impl Severity {
    /// Scale applied to the base claim value when an event of this tier fires.
    pub fn claim_multiplier(self) -> u32 {
        match self {
            Severity::Catastrophic => 5,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}

/// Calendar quarter label used to key the seasonal event table.
///
/// Fixed quarter lookup, not astronomical seasons: Jan–Mar is winter,
/// Apr–Jun spring, Jul–Sep summer, Oct–Dec fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// `month` is 1-based (1 = January).
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=3 => Season::Winter,
            4..=6 => Season::Spring,
            7..=9 => Season::Summer,
            _ => Season::Fall,
        }
    }
}

/// A probabilistic catastrophe that can be attached to a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Cause-of-loss code written into the record (e.g. `HURR`).
    pub cause: String,
    pub description: String,
    /// Chance in [0, 1] that an eligible claim is tied to this event.
    pub probability: f64,
    /// Calendar months (1–12) in which the event can fire.
    pub months: Vec<u32>,
    pub severity: Severity,
}

impl EventDefinition {
    pub fn applies_in(&self, month: u32) -> bool {
        self.months.contains(&month)
    }
}

/// State code → season → ordered event definitions.
/// States without an entry never produce a correlated event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonalEventTable {
    by_state: BTreeMap<String, BTreeMap<Season, Vec<EventDefinition>>>,
}

impl SeasonalEventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` to the end of the (state, season) list; order is the
    /// order of evaluation.
    pub fn insert(&mut self, state: &str, season: Season, event: EventDefinition) {
        self.by_state
            .entry(state.to_string())
            .or_default()
            .entry(season)
            .or_default()
            .push(event);
    }

    /// Candidate events for `state` in `season`, in evaluation order.
    /// Empty when the state or season has no entry.
    pub fn candidates(&self, state: &str, season: Season) -> &[EventDefinition] {
        self.by_state
            .get(state)
            .and_then(|seasons| seasons.get(&season))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.by_state.keys().map(String::as_str)
    }

    pub fn seasons(&self, state: &str) -> impl Iterator<Item = (Season, &[EventDefinition])> {
        self.by_state
            .get(state)
            .into_iter()
            .flat_map(|seasons| seasons.iter().map(|(s, evs)| (*s, evs.as_slice())))
    }

    /// Canonical table: Texas hail/tornado/freeze, Florida hurricanes and
    /// surge, California wildfire and winter flooding.
    pub fn canonical() -> Self {
        fn ev(cause: &str, probability: f64, description: &str, months: &[u32], severity: Severity) -> EventDefinition {
            EventDefinition {
                cause: cause.to_string(),
                description: description.to_string(),
                probability,
                months: months.to_vec(),
                severity,
            }
        }

        let mut table = SeasonalEventTable::new();

        // ── Texas ─────────────────────────────────────────────────────────────
        table.insert("TX", Season::Spring, ev("HAIL", 0.7, "Large hail damage to property", &[3, 4, 5], Severity::High));
        table.insert("TX", Season::Spring, ev("TORN", 0.4, "Tornado damage", &[4, 5], Severity::Catastrophic));
        table.insert("TX", Season::Summer, ev("HAIL", 0.4, "Hail storm damage", &[6, 7, 8], Severity::Medium));
        table.insert("TX", Season::Summer, ev("WIND", 0.5, "Hurricane wind damage", &[7, 8, 9], Severity::High));
        table.insert("TX", Season::Winter, ev("FRST", 0.6, "Freeze damage to property", &[12, 1, 2], Severity::Medium));

        // ── Florida ───────────────────────────────────────────────────────────
        table.insert("FL", Season::Summer, ev("HURR", 0.8, "Hurricane surge damage", &[6, 7, 8, 9], Severity::Catastrophic));
        table.insert("FL", Season::Summer, ev("FLOOD", 0.7, "Storm surge flooding", &[7, 8, 9], Severity::High));
        table.insert("FL", Season::Spring, ev("WIND", 0.5, "Severe thunderstorm", &[3, 4, 5], Severity::Medium));

        // ── California ────────────────────────────────────────────────────────
        table.insert("CA", Season::Summer, ev("FIRE", 0.8, "Wildfire destruction", &[6, 7, 8, 9], Severity::Catastrophic));
        table.insert("CA", Season::Winter, ev("MUD", 0.5, "Mudslide after rain", &[12, 1, 2], Severity::High));
        table.insert("CA", Season::Winter, ev("FLOOD", 0.6, "Atmospheric river flooding", &[1, 2, 3], Severity::High));

        table
    }
}

/// Candidate values for every randomly drawn attribute that is not driven by
/// the timeline, the event table or the financial cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub expert_roles: Vec<String>,
    pub expert_firms: Vec<String>,
    pub treatment_types: Vec<String>,
    pub deductible_bases: Vec<String>,
    pub insurance_types: Vec<String>,
    pub cat_codes: Vec<String>,
    pub cat_names: Vec<String>,
    pub plans: Vec<String>,
    pub streets: Vec<String>,
    /// State code → representative cities. Unknown states use `fallback_state`.
    pub cities: BTreeMap<String, Vec<String>>,
    /// State code → first two digits of the zip code.
    pub zip_prefixes: BTreeMap<String, String>,
    pub fallback_state: String,
    pub fallback_zip_prefix: String,
    pub coverholders: Vec<String>,
    pub tpa_names: Vec<String>,
    pub cause_codes: Vec<String>,
    pub classes_of_business: Vec<String>,
    pub risk_codes: Vec<String>,
    /// Pool the insured/loss state is drawn from.
    pub states: Vec<String>,
    pub medicare_outcomes: Vec<String>,
    pub registration_prefixes: Vec<String>,
}

impl ReferenceData {
    /// Cities for `state`, falling back to the configured fallback state.
    pub fn cities_for(&self, state: &str) -> &[String] {
        self.cities
            .get(state)
            .or_else(|| self.cities.get(&self.fallback_state))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn zip_prefix_for(&self, state: &str) -> &str {
        self.zip_prefixes
            .get(state)
            .map(String::as_str)
            .unwrap_or(&self.fallback_zip_prefix)
    }

    /// Names of any candidate list that is empty. Drawing from an empty list
    /// would have nothing to return, so such tables are rejected up front.
    pub fn empty_categories(&self) -> Vec<&'static str> {
        let no_cities = Vec::new();
        let lists: [(&'static str, &Vec<String>); 18] = [
            ("expert_roles", &self.expert_roles),
            ("expert_firms", &self.expert_firms),
            ("treatment_types", &self.treatment_types),
            ("deductible_bases", &self.deductible_bases),
            ("insurance_types", &self.insurance_types),
            ("cat_codes", &self.cat_codes),
            ("cat_names", &self.cat_names),
            ("plans", &self.plans),
            ("streets", &self.streets),
            ("coverholders", &self.coverholders),
            ("tpa_names", &self.tpa_names),
            ("cause_codes", &self.cause_codes),
            ("classes_of_business", &self.classes_of_business),
            ("risk_codes", &self.risk_codes),
            ("states", &self.states),
            ("medicare_outcomes", &self.medicare_outcomes),
            ("registration_prefixes", &self.registration_prefixes),
            ("fallback_cities", self.cities.get(&self.fallback_state).unwrap_or(&no_cities)),
        ];
        lists
            .into_iter()
            .filter(|(_, values)| values.is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Canonical US claims book.
    pub fn canonical() -> Self {
        fn list(values: &[&str]) -> Vec<String> {
            values.iter().map(|s| s.to_string()).collect()
        }

        let cities = BTreeMap::from([
            ("TX".to_string(), list(&["Houston", "Dallas", "Austin", "San Antonio", "Fort Worth"])),
            ("FL".to_string(), list(&["Miami", "Orlando", "Tampa", "Jacksonville", "Naples"])),
            ("CA".to_string(), list(&["Los Angeles", "San Francisco", "San Diego", "Sacramento", "San Jose"])),
            ("NY".to_string(), list(&["New York", "Buffalo", "Albany", "Rochester", "Syracuse"])),
        ]);

        let zip_prefixes = [("TX", "75"), ("FL", "33"), ("CA", "90"), ("NY", "10"), ("IL", "60"), ("GA", "30"), ("LA", "70")]
            .into_iter()
            .map(|(state, prefix)| (state.to_string(), prefix.to_string()))
            .collect();

        ReferenceData {
            expert_roles: list(&["Loss Adjuster", "Attorney", "Engineer", "Medical Expert", "Forensic Accountant"]),
            expert_firms: list(&["Sedgwick Experts", "Crawford Technical Services", "Envista Forensics", "JS Held", "Baker Tilly"]),
            treatment_types: list(&["Surgery", "Physical Therapy", "Emergency Care", "Rehabilitation", "Diagnostic Testing"]),
            deductible_bases: list(&["Each and Every Loss", "Annual Aggregate", "Per Occurrence", "Per Claim", "Per Event"]),
            insurance_types: list(&["Direct", "Facultative", "Treaty", "Quota Share", "Excess of Loss"]),
            cat_codes: list(&["HU", "EQ", "FL", "WS", "FR", "TR"]),
            cat_names: list(&["Hurricane Ian", "Hurricane Nicole", "Texas Winter Storm", "California Wildfires", "Kentucky Tornadoes"]),
            plans: list(&["Standard", "Enhanced", "Premium", "Basic", "Comprehensive"]),
            streets: list(&["Main St", "Oak Ave", "Maple Rd", "Washington Blvd", "Park Lane"]),
            cities,
            zip_prefixes,
            fallback_state: "TX".to_string(),
            fallback_zip_prefix: "75".to_string(),
            // Blank and "TBD" coverholders are deliberate: real bordereaux carry them.
            coverholders: list(&["US Risk LLC", "American Cover Co", "Global MGA Inc", "", "TBD"]),
            tpa_names: list(&["Claims TPA US", "Sedgwick", "Crawford & Company", "GB"]),
            cause_codes: list(&["FIRE", "FLOOD", "LIAB", "PROP", "AUTO"]),
            classes_of_business: list(&["Property", "Casualty", "Marine", "Aviation", "Energy"]),
            risk_codes: list(&["PR", "CX", "AV", "BB", "CC", "D2", "E2", "E3", "EF", "FF"]),
            states: list(&["TX", "FL", "CA", "NY", "IL", "GA", "LA"]),
            medicare_outcomes: list(&["Eligible", "Not Eligible", "Pending"]),
            registration_prefixes: list(&["N", "G-", "VH-"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_quarters() {
        let seasons: Vec<Season> = (1..=12).map(Season::from_month).collect();
        assert_eq!(
            seasons,
            vec![
                Season::Winter, Season::Winter, Season::Winter,
                Season::Spring, Season::Spring, Season::Spring,
                Season::Summer, Season::Summer, Season::Summer,
                Season::Fall, Season::Fall, Season::Fall,
            ]
        );
    }

    #[test]
    fn severity_multipliers() {
        assert_eq!(Severity::Catastrophic.claim_multiplier(), 5);
        assert_eq!(Severity::High.claim_multiplier(), 3);
        assert_eq!(Severity::Medium.claim_multiplier(), 2);
        assert_eq!(Severity::Low.claim_multiplier(), 1);
    }

    #[test]
    fn canonical_florida_summer_order() {
        let table = SeasonalEventTable::canonical();
        let causes: Vec<&str> = table
            .candidates("FL", Season::Summer)
            .iter()
            .map(|e| e.cause.as_str())
            .collect();
        assert_eq!(causes, vec!["HURR", "FLOOD"]);
    }

    #[test]
    fn states_without_entries_have_no_candidates() {
        let table = SeasonalEventTable::canonical();
        assert!(table.candidates("NY", Season::Summer).is_empty());
        assert!(table.candidates("FL", Season::Fall).is_empty());
    }

    #[test]
    fn event_table_json_shape() {
        let mut table = SeasonalEventTable::new();
        table.insert(
            "FL",
            Season::Summer,
            EventDefinition {
                cause: "HURR".to_string(),
                description: "Hurricane".to_string(),
                probability: 0.8,
                months: vec![7],
                severity: Severity::Catastrophic,
            },
        );
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["FL"]["summer"][0]["cause"], "HURR");
        assert_eq!(value["FL"]["summer"][0]["severity"], "catastrophic");

        let back: SeasonalEventTable = serde_json::from_value(value).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn unknown_state_uses_fallbacks() {
        let data = ReferenceData::canonical();
        assert_eq!(data.cities_for("IL"), data.cities_for("TX"));
        assert_eq!(data.zip_prefix_for("IL"), "60");
        assert_eq!(data.zip_prefix_for("WA"), "75");
    }

    #[test]
    fn canonical_reference_has_no_empty_lists() {
        assert!(ReferenceData::canonical().empty_categories().is_empty());
    }

    #[test]
    fn empty_list_is_reported() {
        let mut data = ReferenceData::canonical();
        data.tpa_names.clear();
        assert_eq!(data.empty_categories(), vec!["tpa_names"]);
    }
}

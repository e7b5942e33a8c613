use crate::money::monthly;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Serialize as SerializeDerive;
use std::collections::BTreeMap;
use tanf_model::Household;

/// Household inputs echoed back with every evaluation.
#[derive(Debug, Clone, PartialEq, SerializeDerive)]
pub struct HouseholdSummary {
    pub num_adults: u8,
    pub num_children: u8,
    pub earned_income: f64,
    pub unearned_income: f64,
    pub is_tanf_enrolled: bool,
    pub resources: f64,
}

impl From<&Household> for HouseholdSummary {
    fn from(household: &Household) -> Self {
        Self {
            num_adults: household.num_adults,
            num_children: household.num_children,
            earned_income: household.earned_income,
            unearned_income: household.unearned_income,
            is_tanf_enrolled: household.is_tanf_enrolled,
            resources: household.resources,
        }
    }
}

/// Components of the benefit computation, each kept as an annual amount.
///
/// Serialized as `<name>_annual` / `<name>_monthly` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    entries: Vec<(&'static str, f64)>,
}

impl Breakdown {
    pub(crate) fn push(&mut self, name: &'static str, annual: f64) {
        self.entries.push((name, annual));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn annual(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, annual)| *annual)
    }

    pub fn monthly(&self, name: &str) -> Option<f64> {
        self.annual(name).map(monthly)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() * 2))?;
        for (name, annual) in &self.entries {
            map.serialize_entry(&format!("{name}_annual"), annual)?;
            map.serialize_entry(&format!("{name}_monthly"), &monthly(*annual))?;
        }
        map.end()
    }
}

/// Eligibility flags reported by the simulator, plus the counterfactual probes run
/// for households that came out ineligible.
#[derive(Debug, Clone, Default, PartialEq, SerializeDerive)]
pub struct EligibilityChecks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub economic: Option<bool>,
    #[serde(flatten)]
    pub probes: BTreeMap<&'static str, bool>,
}

impl EligibilityChecks {
    pub fn has_flags(&self) -> bool {
        self.overall.is_some() || self.demographic.is_some() || self.economic.is_some()
    }

    pub fn probe(&self, flag: &str) -> Option<bool> {
        self.probes.get(flag).copied()
    }
}

#[derive(Debug, Clone, PartialEq, SerializeDerive)]
pub struct PovertyContext {
    pub fpg_annual: f64,
    pub fpg_monthly: f64,
    pub income_pct_fpg: f64,
    pub income_plus_tanf_pct_fpg: f64,
    pub tanf_pct_fpg: f64,
}

#[derive(Debug, Clone, PartialEq, SerializeDerive)]
pub struct EvaluationResult {
    pub tanf_monthly: f64,
    pub tanf_annual: f64,
    pub eligible: bool,
    pub state: String,
    pub state_name: String,
    pub year: i32,
    pub household: HouseholdSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility_checks: Option<EligibilityChecks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poverty_context: Option<PovertyContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
}

#[derive(Debug, Clone, PartialEq, SerializeDerive)]
pub struct SweepPoint {
    pub total_income_monthly: i64,
    pub tanf_monthly: f64,
    pub eligible: bool,
}

/// One income level of a multi-program sweep. A program that was not requested is
/// absent; a requested program the simulator could not compute reports `0.0`.
#[derive(Debug, Clone, Default, PartialEq, SerializeDerive)]
pub struct CombinedPoint {
    pub total_income_monthly: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tanf_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snap_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eitc_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctc_monthly: Option<f64>,
    pub total_benefits_monthly: f64,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, SerializeDerive)]
pub struct StateRecord {
    pub state: String,
    pub state_name: String,
    pub tanf_monthly: f64,
    pub tanf_annual: f64,
    pub eligible: bool,
    /// Set when the state could not be evaluated; the amounts are then zero.
    #[serde(skip_serializing_if = "is_false")]
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, SerializeDerive)]
pub struct StateComparison {
    /// Highest monthly benefit in the batch, for chart scaling.
    pub max_benefit: f64,
    pub states: Vec<StateRecord>,
}

#[derive(Debug, Clone, PartialEq, SerializeDerive)]
pub struct ScenarioDelta {
    pub tanf_monthly: f64,
    pub tanf_annual: f64,
    pub eligible_changed: bool,
}

#[derive(Debug, Clone, PartialEq, SerializeDerive)]
pub struct ScenarioComparison {
    pub scenario_a: EvaluationResult,
    pub scenario_b: EvaluationResult,
    /// `scenario_b` minus `scenario_a`.
    pub difference: ScenarioDelta,
}

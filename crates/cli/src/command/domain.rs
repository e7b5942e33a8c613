use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tanf_calculator::{
    CalculatorError, CombinedPoint, HouseholdSummary, Program, StateRecord, SweepPoint,
};
use tanf_model::{Household, ValidationError, DEFAULT_YEAR, MAX_SWEEP_POINTS};
use tanf_protocol::{ErrorEnvelope, NextAction};

pub const DEFAULT_INCOME_MIN: f64 = 0.0;
pub const DEFAULT_INCOME_MAX: f64 = 50_000.0;
pub const DEFAULT_INCOME_STEP: f64 = 1_000.0;
pub const DEFAULT_COMBINED_INCOME_STEP: f64 = 2_000.0;

#[derive(Debug, Deserialize, Serialize)]
pub struct CommandRequest {
    pub action: CommandAction,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Calculate,
    CalculateRange,
    CalculateCombinedRange,
    CalculateAllStates,
    CalculateComparison,
    States,
    Counties,
    Capabilities,
}

impl CommandAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            CommandAction::Calculate => "calculate",
            CommandAction::CalculateRange => "calculate_range",
            CommandAction::CalculateCombinedRange => "calculate_combined_range",
            CommandAction::CalculateAllStates => "calculate_all_states",
            CommandAction::CalculateComparison => "calculate_comparison",
            CommandAction::States => "states",
            CommandAction::Counties => "counties",
            CommandAction::Capabilities => "capabilities",
        }
    }

    /// Actions whose payload carries a household at the top level.
    pub const fn takes_household(self) -> bool {
        matches!(
            self,
            CommandAction::Calculate
                | CommandAction::CalculateRange
                | CommandAction::CalculateCombinedRange
                | CommandAction::CalculateAllStates
        )
    }
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_actions: Vec<NextAction>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl CommandResponse {
    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|error| error.code.as_str())
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Clone)]
pub struct Hint {
    #[serde(rename = "type")]
    pub kind: HintKind,
    pub text: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    Info,
    Action,
    Warn,
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub code: String,
    pub hint: Option<String>,
    pub hints: Vec<Hint>,
    pub next_actions: Vec<NextAction>,
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_states: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulator: Option<String>,
}

pub struct CommandOutcome {
    pub data: Value,
    pub hints: Vec<Hint>,
    pub meta: ResponseMeta,
    pub next_actions: Vec<NextAction>,
}

impl CommandOutcome {
    pub fn from_value<T: Serialize>(value: T) -> Result<Self> {
        Ok(Self {
            data: serde_json::to_value(value)?,
            hints: Vec::new(),
            meta: ResponseMeta::default(),
            next_actions: Vec::new(),
        })
    }
}

pub fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(Into::into)
}

/// Fills `year` from the configured default when the caller left it out.
pub fn apply_default_year(payload: &mut Value, year: i32) {
    if let Some(object) = payload.as_object_mut() {
        object.entry("year").or_insert_with(|| json!(year));
    }
}

fn default_income_max() -> f64 {
    DEFAULT_INCOME_MAX
}

fn default_income_step() -> f64 {
    DEFAULT_INCOME_STEP
}

fn default_combined_income_step() -> f64 {
    DEFAULT_COMBINED_INCOME_STEP
}

fn default_year() -> i32 {
    DEFAULT_YEAR
}

fn default_one() -> u8 {
    1
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RangePayload {
    #[serde(flatten)]
    pub household: Household,
    #[serde(default)]
    pub income_min: f64,
    #[serde(default = "default_income_max")]
    pub income_max: f64,
    #[serde(default = "default_income_step")]
    pub income_step: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CombinedRangePayload {
    #[serde(flatten)]
    pub household: Household,
    #[serde(default)]
    pub income_min: f64,
    #[serde(default = "default_income_max")]
    pub income_max: f64,
    #[serde(default = "default_combined_income_step")]
    pub income_step: f64,
    /// All programs when absent.
    #[serde(default)]
    pub include_programs: Option<Vec<Program>>,
}

/// A household without a location; it is placed in every state in turn.
#[derive(Debug, Deserialize, Serialize)]
pub struct AllStatesPayload {
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default = "default_one")]
    pub num_adults: u8,
    #[serde(default = "default_one")]
    pub num_children: u8,
    #[serde(default)]
    pub earned_income: f64,
    #[serde(default)]
    pub unearned_income: f64,
    #[serde(default)]
    pub child_ages: Option<Vec<u32>>,
    #[serde(default)]
    pub is_tanf_enrolled: bool,
    #[serde(default)]
    pub resources: f64,
}

impl AllStatesPayload {
    pub fn into_household(self) -> Household {
        let mut household = Household::new("");
        household.year = self.year;
        household.num_adults = self.num_adults;
        household.num_children = self.num_children;
        household.earned_income = self.earned_income;
        household.unearned_income = self.unearned_income;
        household.child_ages = self.child_ages;
        household.is_tanf_enrolled = self.is_tanf_enrolled;
        household.resources = self.resources;
        household
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ComparisonPayload {
    pub scenario_a: Household,
    pub scenario_b: Household,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CountiesPayload {
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RangeHousehold {
    pub num_adults: u8,
    pub num_children: u8,
    pub is_tanf_enrolled: bool,
    pub resources: f64,
}

#[derive(Debug, Serialize)]
pub struct RangeOutput {
    pub state: String,
    pub state_name: String,
    pub year: i32,
    pub household: RangeHousehold,
    pub county: Option<String>,
    pub data: Vec<SweepPoint>,
}

#[derive(Debug, Serialize)]
pub struct CombinedRangeOutput {
    pub state: String,
    pub programs_available: Vec<Program>,
    pub data: Vec<CombinedPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllStatesHousehold {
    pub num_adults: u8,
    pub num_children: u8,
    pub earned_income: f64,
    pub unearned_income: f64,
}

impl From<&HouseholdSummary> for AllStatesHousehold {
    fn from(summary: &HouseholdSummary) -> Self {
        Self {
            num_adults: summary.num_adults,
            num_children: summary.num_children,
            earned_income: summary.earned_income,
            unearned_income: summary.unearned_income,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AllStatesOutput {
    pub year: i32,
    pub household: AllStatesHousehold,
    pub max_benefit: f64,
    pub states: Vec<StateRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateEntry {
    pub code: String,
    pub name: String,
    pub requires_county: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatesOutput {
    pub states: Vec<StateEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountyEntry {
    pub code: String,
    pub name: String,
    pub region: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountiesOutput {
    pub counties: Vec<CountyEntry>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn has_cause<E: std::error::Error + 'static>(err: &anyhow::Error) -> Option<&E> {
    err.chain().find_map(|cause| cause.downcast_ref::<E>())
}

pub fn classify_error(err: &anyhow::Error, action: Option<CommandAction>) -> ErrorClassification {
    let mut hints = Vec::new();
    let mut next_actions = Vec::new();
    let code;

    if let Some(validation) = has_cause::<ValidationError>(err) {
        code = "invalid_request";
        match validation {
            ValidationError::UnsupportedState(_) => {
                hints.push(Hint {
                    kind: HintKind::Action,
                    text: "Use a two-letter code listed by action=states.".to_string(),
                });
                next_actions.push(NextAction {
                    action: CommandAction::States.as_str().to_string(),
                    payload: json!({}),
                    reason: "List the supported states.".to_string(),
                });
            }
            ValidationError::UnknownCounty { state, .. } => {
                hints.push(Hint {
                    kind: HintKind::Action,
                    text: "Use a county code listed by action=counties.".to_string(),
                });
                next_actions.push(NextAction {
                    action: CommandAction::Counties.as_str().to_string(),
                    payload: json!({ "state": state }),
                    reason: format!("List the counties of {state}."),
                });
            }
            ValidationError::NonPositiveStep(_)
            | ValidationError::InvertedRange { .. }
            | ValidationError::TooManyPoints { .. } => {
                hints.push(Hint {
                    kind: HintKind::Action,
                    text: format!(
                        "Use 0 <= income_min <= income_max, income_step > 0 and at most {MAX_SWEEP_POINTS} points."
                    ),
                });
            }
            _ => {
                hints.push(Hint {
                    kind: HintKind::Action,
                    text: "Check the household fields: 1-2 adults, 0-10 children, one age per child, non-negative amounts."
                        .to_string(),
                });
            }
        }
    } else if has_cause::<serde_json::Error>(err).is_some() {
        code = "invalid_payload";
        let action = action.map(CommandAction::as_str).unwrap_or("the action");
        hints.push(Hint {
            kind: HintKind::Action,
            text: format!("Payload does not match {action}; check field names and types."),
        });
    } else if has_cause::<CalculatorError>(err).is_some() {
        code = "simulation_error";
        hints.push(Hint {
            kind: HintKind::Warn,
            text: "The benefit simulator could not compute this household. Check --simulator-url / TANF_SIMULATOR_URL, or retry later."
                .to_string(),
        });
    } else {
        code = "internal";
    }

    ErrorClassification {
        code: code.to_string(),
        hint: hints.first().map(|h| h.text.clone()),
        hints,
        next_actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as AnyhowContext;

    #[test]
    fn action_names_round_trip() {
        for action in [
            CommandAction::Calculate,
            CommandAction::CalculateRange,
            CommandAction::CalculateCombinedRange,
            CommandAction::CalculateAllStates,
            CommandAction::CalculateComparison,
            CommandAction::States,
            CommandAction::Counties,
            CommandAction::Capabilities,
        ] {
            let value = serde_json::to_value(action).unwrap();
            assert_eq!(value, json!(action.as_str()));
        }
    }

    #[test]
    fn range_payload_applies_defaults() {
        let payload: RangePayload = parse_payload(json!({"state": "CA"})).unwrap();
        assert_eq!(payload.household.num_children, 1);
        assert_eq!(payload.income_min, 0.0);
        assert_eq!(payload.income_max, 50_000.0);
        assert_eq!(payload.income_step, 1_000.0);

        let combined: CombinedRangePayload =
            parse_payload(json!({"state": "CA", "include_programs": ["snap"]})).unwrap();
        assert_eq!(combined.income_step, 2_000.0);
        assert_eq!(combined.include_programs, Some(vec![Program::Snap]));
    }

    #[test]
    fn default_year_only_fills_missing_year() {
        let mut payload = json!({"state": "CA"});
        apply_default_year(&mut payload, 2024);
        assert_eq!(payload["year"], 2024);

        let mut payload = json!({"state": "CA", "year": 2026});
        apply_default_year(&mut payload, 2024);
        assert_eq!(payload["year"], 2026);
    }

    #[test]
    fn classifies_validation_through_context() {
        let err = anyhow::Error::from(ValidationError::UnsupportedState("ZZ".to_string()))
            .context("scenario_a");
        let classification = classify_error(&err, Some(CommandAction::CalculateComparison));
        assert_eq!(classification.code, "invalid_request");
        assert_eq!(classification.next_actions[0].action, "states");
    }

    #[test]
    fn classifies_malformed_payload() {
        let err = parse_payload::<CountiesPayload>(json!({}))
            .context("counties")
            .unwrap_err();
        let classification = classify_error(&err, Some(CommandAction::Counties));
        assert_eq!(classification.code, "invalid_payload");
        assert!(classification.hint.unwrap().contains("counties"));
    }

    #[test]
    fn unknown_program_is_a_payload_error() {
        let err = parse_payload::<CombinedRangePayload>(
            json!({"state": "CA", "include_programs": ["wic"]}),
        )
        .unwrap_err();
        assert_eq!(classify_error(&err, None).code, "invalid_payload");
    }
}

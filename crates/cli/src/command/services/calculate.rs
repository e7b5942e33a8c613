use crate::command::context::CommandContext;
use crate::command::domain::{
    parse_payload, CombinedRangeOutput, CombinedRangePayload, CommandOutcome, Hint, HintKind,
    RangeHousehold, RangeOutput, RangePayload,
};
use anyhow::Result;
use serde_json::Value;
use tanf_calculator::{programs_available, EligibilityChecks, Program};
use tanf_model::{jurisdiction, Household, IncomeRange};

pub(super) async fn single(payload: Value, ctx: &CommandContext) -> Result<CommandOutcome> {
    let household: Household = parse_payload(payload)?;
    household.validate()?;
    let result = ctx.calculator.evaluate(&household).await?;
    let hints = result
        .eligibility_checks
        .as_ref()
        .map(barrier_hints)
        .unwrap_or_default();
    let mut outcome = CommandOutcome::from_value(result)?;
    outcome.hints = hints;
    Ok(outcome)
}

/// Names the single input that stands between the household and eligibility.
fn barrier_hints(checks: &EligibilityChecks) -> Vec<Hint> {
    [
        ("eligible_with_zero_income", "income"),
        ("eligible_with_zero_resources", "resources"),
    ]
    .into_iter()
    .filter(|(flag, _)| checks.probe(flag) == Some(true))
    .map(|(_, input)| Hint {
        kind: HintKind::Info,
        text: format!("Not eligible as entered, but eligible if {input} were zero."),
    })
    .collect()
}

pub(super) async fn range(payload: Value, ctx: &CommandContext) -> Result<CommandOutcome> {
    let payload: RangePayload = parse_payload(payload)?;
    let household = payload.household;
    household.validate()?;
    let range = IncomeRange::new(payload.income_min, payload.income_max, payload.income_step);
    range.validate()?;

    let data = ctx.calculator.sweep(&household, range).await?;
    let points = data.len();
    let output = RangeOutput {
        state_name: jurisdiction::state_name(&household.state).to_string(),
        year: household.year,
        household: RangeHousehold {
            num_adults: household.num_adults,
            num_children: household.num_children,
            is_tanf_enrolled: household.is_tanf_enrolled,
            resources: household.resources,
        },
        county: household.county,
        state: household.state,
        data,
    };
    let mut outcome = CommandOutcome::from_value(output)?;
    outcome.meta.points = Some(points);
    Ok(outcome)
}

pub(super) async fn combined_range(payload: Value, ctx: &CommandContext) -> Result<CommandOutcome> {
    let payload: CombinedRangePayload = parse_payload(payload)?;
    let household = payload.household;
    household.validate()?;
    let range = IncomeRange::new(payload.income_min, payload.income_max, payload.income_step);
    range.validate()?;
    let programs = payload
        .include_programs
        .unwrap_or_else(|| Program::ALL.to_vec());

    let data = ctx
        .calculator
        .combined_sweep(&household, range, &programs)
        .await?;
    let points = data.len();
    let output = CombinedRangeOutput {
        state: household.state,
        programs_available: programs_available(&data),
        data,
    };
    let mut outcome = CommandOutcome::from_value(output)?;
    outcome.meta.points = Some(points);
    Ok(outcome)
}

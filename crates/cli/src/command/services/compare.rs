use crate::command::context::CommandContext;
use crate::command::domain::{
    parse_payload, AllStatesOutput, AllStatesPayload, CommandOutcome, ComparisonPayload, Hint,
    HintKind,
};
use anyhow::{Context as AnyhowContext, Result};
use serde_json::Value;
use tanf_calculator::HouseholdSummary;

pub(super) async fn all_states(payload: Value, ctx: &CommandContext) -> Result<CommandOutcome> {
    let payload: AllStatesPayload = parse_payload(payload)?;
    let household = payload.into_household();
    household.validate_composition()?;

    let comparison = ctx.calculator.compare_states(&household).await?;
    let failed = comparison.states.iter().filter(|record| record.error).count();
    let output = AllStatesOutput {
        year: household.year,
        household: (&HouseholdSummary::from(&household)).into(),
        max_benefit: comparison.max_benefit,
        states: comparison.states,
    };

    let mut outcome = CommandOutcome::from_value(output)?;
    outcome.meta.failed_states = Some(failed);
    if failed > 0 {
        outcome.hints.push(Hint {
            kind: HintKind::Warn,
            text: format!(
                "{failed} state(s) could not be simulated; they report a zero benefit with error=true."
            ),
        });
    }
    Ok(outcome)
}

pub(super) async fn scenarios(payload: Value, ctx: &CommandContext) -> Result<CommandOutcome> {
    let payload: ComparisonPayload = parse_payload(payload)?;
    payload.scenario_a.validate().context("scenario_a")?;
    payload.scenario_b.validate().context("scenario_b")?;

    let comparison = ctx
        .calculator
        .compare_scenarios(&payload.scenario_a, &payload.scenario_b)
        .await?;
    CommandOutcome::from_value(comparison)
}

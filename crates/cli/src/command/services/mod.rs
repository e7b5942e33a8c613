mod calculate;
mod capabilities;
mod catalog;
mod compare;

use crate::command::context::CommandContext;
use crate::command::domain::{CommandAction, CommandOutcome};
use anyhow::Result;
use serde_json::Value;

pub struct Services;

impl Services {
    pub async fn route(
        &self,
        action: CommandAction,
        payload: Value,
        ctx: &CommandContext,
    ) -> Result<CommandOutcome> {
        match action {
            CommandAction::Calculate => calculate::single(payload, ctx).await,
            CommandAction::CalculateRange => calculate::range(payload, ctx).await,
            CommandAction::CalculateCombinedRange => calculate::combined_range(payload, ctx).await,
            CommandAction::CalculateAllStates => compare::all_states(payload, ctx).await,
            CommandAction::CalculateComparison => compare::scenarios(payload, ctx).await,
            CommandAction::States => catalog::states(),
            CommandAction::Counties => catalog::counties(payload),
            CommandAction::Capabilities => capabilities::describe(ctx),
        }
    }
}

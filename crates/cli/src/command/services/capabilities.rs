use crate::command::context::CommandContext;
use crate::command::domain::{
    CommandAction, CommandOutcome, DEFAULT_COMBINED_INCOME_STEP, DEFAULT_INCOME_MAX,
    DEFAULT_INCOME_MIN, DEFAULT_INCOME_STEP,
};
use anyhow::Result;
use tanf_calculator::Program;
use tanf_model::jurisdiction::{STATES, TABLE_VERSION};
use tanf_model::MAX_SWEEP_POINTS;
use tanf_protocol::{
    Capabilities, CapabilitiesServer, CapabilitiesVersions, NextAction, RequestDefaults,
    CAPABILITIES_SCHEMA_VERSION,
};

pub(super) fn describe(ctx: &CommandContext) -> Result<CommandOutcome> {
    let output = Capabilities {
        schema_version: CAPABILITIES_SCHEMA_VERSION,
        server: CapabilitiesServer {
            name: "tanf-cli".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        versions: CapabilitiesVersions {
            command_api: "v1".to_string(),
            jurisdiction_tables: TABLE_VERSION,
        },
        defaults: RequestDefaults {
            year: ctx.default_year,
            num_adults: 1,
            num_children: 1,
            income_min: DEFAULT_INCOME_MIN,
            income_max: DEFAULT_INCOME_MAX,
            income_step: DEFAULT_INCOME_STEP,
            combined_income_step: DEFAULT_COMBINED_INCOME_STEP,
            max_sweep_points: MAX_SWEEP_POINTS,
        },
        simulator: ctx.simulator_url.clone(),
        programs: Program::ALL.iter().map(|p| p.as_str().to_string()).collect(),
        states: STATES.iter().map(|info| info.code.to_string()).collect(),
        start_route: NextAction {
            action: CommandAction::States.as_str().to_string(),
            payload: serde_json::json!({}),
            reason: "Pick a state code, then call calculate with a household.".to_string(),
        },
    };

    CommandOutcome::from_value(output)
}

use crate::command::domain::{
    parse_payload, CommandOutcome, CountiesOutput, CountiesPayload, CountyEntry, StateEntry,
    StatesOutput,
};
use anyhow::Result;
use serde_json::Value;
use tanf_model::jurisdiction::{self, STATES};
use tanf_model::ValidationError;

pub(super) fn states() -> Result<CommandOutcome> {
    let states = STATES
        .iter()
        .map(|info| StateEntry {
            code: info.code.to_string(),
            name: info.name.to_string(),
            requires_county: info.requires_county,
        })
        .collect();
    CommandOutcome::from_value(StatesOutput { states })
}

/// Counties of a state. Supported states without a county table get an empty list.
pub(super) fn counties(payload: Value) -> Result<CommandOutcome> {
    let CountiesPayload { state } = parse_payload(payload)?;
    let Some(info) = jurisdiction::state_info(&state) else {
        return Err(ValidationError::UnsupportedState(state).into());
    };

    let counties = jurisdiction::counties(info.code)
        .unwrap_or_default()
        .iter()
        .map(|county| CountyEntry {
            code: county.code.to_string(),
            name: county.name.to_string(),
            region: county.region,
        })
        .collect();
    CommandOutcome::from_value(CountiesOutput {
        counties,
        required: info.requires_county,
        note: jurisdiction::region_note(info.code).map(str::to_string),
    })
}

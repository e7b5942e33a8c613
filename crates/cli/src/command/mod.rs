mod context;
pub mod domain;
mod services;

pub use domain::{
    classify_error, CommandAction, CommandRequest, CommandResponse, CommandStatus, ResponseMeta,
};

use crate::config::Settings;
use anyhow::Result;
use context::CommandContext;
use domain::{apply_default_year, CommandOutcome};
use services::Services;
use std::sync::Arc;
use std::time::Instant;
use tanf_calculator::{Calculator, CalculatorOptions};
use tanf_protocol::ErrorEnvelope;
use tanf_simulator::{BenefitSimulator, PolicyEngineConfig, PolicyEngineSimulator};

pub struct CommandHandler {
    services: Services,
    ctx: CommandContext,
}

impl CommandHandler {
    /// Handler backed by the PolicyEngine HTTP API.
    pub fn new(settings: &Settings) -> Result<Self> {
        let config = PolicyEngineConfig {
            base_url: settings.simulator_url.clone(),
            timeout: settings.simulator_timeout,
            ..PolicyEngineConfig::default()
        };
        let simulator = PolicyEngineSimulator::new(&config)?;
        log::debug!("Simulator endpoint: {}", simulator.endpoint());
        Ok(Self::with_simulator(Arc::new(simulator), settings))
    }

    pub fn with_simulator(simulator: Arc<dyn BenefitSimulator>, settings: &Settings) -> Self {
        let calculator = Calculator::with_options(
            simulator,
            CalculatorOptions {
                max_concurrency: settings.max_concurrency,
            },
        );
        Self {
            services: Services,
            ctx: CommandContext::new(
                calculator,
                settings.default_year,
                settings.simulator_url.clone(),
            ),
        }
    }

    pub fn simulator_url(&self) -> &str {
        &self.ctx.simulator_url
    }

    pub async fn execute(&self, request: CommandRequest) -> CommandResponse {
        let started = Instant::now();
        let CommandRequest {
            action,
            mut payload,
        } = request;

        if action.takes_household() {
            apply_default_year(&mut payload, self.ctx.default_year);
        } else if action == CommandAction::CalculateComparison {
            for key in ["scenario_a", "scenario_b"] {
                if let Some(scenario) = payload.get_mut(key) {
                    apply_default_year(scenario, self.ctx.default_year);
                }
            }
        }

        log::debug!("Executing {}", action.as_str());
        let outcome: Result<CommandOutcome> = self.services.route(action, payload, &self.ctx).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(outcome) => {
                let mut meta = outcome.meta;
                meta.duration_ms = meta.duration_ms.or(Some(duration_ms));
                CommandResponse {
                    status: CommandStatus::Ok,
                    message: None,
                    error: None,
                    hints: outcome.hints,
                    next_actions: outcome.next_actions,
                    data: outcome.data,
                    meta,
                }
            }
            Err(err) => {
                log::warn!("{} failed: {err:#}", action.as_str());
                let mut response = error_response(err, Some(action), duration_ms);
                if response.error_code() == Some("simulation_error") {
                    response.meta.simulator = Some(self.ctx.simulator_url.clone());
                }
                response
            }
        }
    }
}

pub(crate) fn error_response(
    err: anyhow::Error,
    action: Option<CommandAction>,
    duration_ms: u64,
) -> CommandResponse {
    let message = format!("{err:#}");
    let classification = classify_error(&err, action);
    CommandResponse {
        status: CommandStatus::Error,
        message: Some(message.clone()),
        error: Some(ErrorEnvelope {
            code: classification.code,
            message,
            details: None,
            hint: classification.hint,
            next_actions: classification.next_actions.clone(),
        }),
        hints: classification.hints,
        next_actions: classification.next_actions,
        data: serde_json::Value::Null,
        meta: ResponseMeta {
            duration_ms: Some(duration_ms),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tanf_model::{resolve_variable, Situation};
    use tanf_simulator::{Simulation, SimulationError};

    /// Pays 6 000 a year through the state variable and knows nothing else.
    /// States in `failing` cannot be simulated at all.
    #[derive(Default)]
    struct FlatSimulator {
        failing: &'static [&'static str],
    }

    struct FlatSimulation {
        variable: Option<&'static str>,
    }

    impl BenefitSimulator for FlatSimulator {
        fn simulate(&self, situation: &Situation) -> tanf_simulator::Result<Box<dyn Simulation>> {
            let state = situation
                .households
                .values()
                .next()
                .and_then(|entity| entity.variables.get("state_name"))
                .and_then(|values| values.values().next())
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string();
            let variable =
                (!self.failing.contains(&state.as_str())).then(|| resolve_variable(&state));
            Ok(Box::new(FlatSimulation { variable }))
        }
    }

    #[async_trait]
    impl Simulation for FlatSimulation {
        async fn calculate(&self, variable: &str, _year: i32) -> tanf_simulator::Result<f64> {
            if Some(variable) == self.variable {
                Ok(6_000.0)
            } else {
                Err(SimulationError::UnknownVariable(variable.to_string()))
            }
        }
    }

    fn handler() -> CommandHandler {
        CommandHandler::with_simulator(Arc::new(FlatSimulator::default()), &Settings::default())
    }

    fn request(value: serde_json::Value) -> CommandRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn calculate_fills_default_year() {
        let response = handler()
            .execute(request(json!({
                "action": "calculate",
                "payload": {"state": "NY", "num_children": 2}
            })))
            .await;

        assert_eq!(response.status, CommandStatus::Ok);
        assert_eq!(response.data["tanf_monthly"], 500.0);
        assert_eq!(response.data["year"], tanf_model::DEFAULT_YEAR);
        assert!(response.data.get("breakdown").is_none());
        assert!(response.meta.duration_ms.is_some());
    }

    #[tokio::test]
    async fn unsupported_state_points_to_states() {
        let response = handler()
            .execute(request(json!({
                "action": "calculate",
                "payload": {"state": "ZZ"}
            })))
            .await;

        assert!(response.is_error());
        assert_eq!(response.error_code(), Some("invalid_request"));
        assert_eq!(response.next_actions[0].action, "states");
    }

    #[tokio::test]
    async fn zero_step_is_rejected_before_simulating() {
        let response = handler()
            .execute(request(json!({
                "action": "calculate_range",
                "payload": {"state": "NY", "income_step": 0}
            })))
            .await;

        assert_eq!(response.error_code(), Some("invalid_request"));
    }

    #[tokio::test]
    async fn comparison_scenarios_get_default_year() {
        let response = handler()
            .execute(request(json!({
                "action": "calculate_comparison",
                "payload": {
                    "scenario_a": {"state": "NY"},
                    "scenario_b": {"state": "NY", "is_tanf_enrolled": true}
                }
            })))
            .await;

        assert_eq!(response.status, CommandStatus::Ok);
        assert_eq!(response.data["scenario_b"]["year"], tanf_model::DEFAULT_YEAR);
        assert_eq!(response.data["difference"]["tanf_monthly"], 0.0);
    }

    #[tokio::test]
    async fn failed_states_are_flagged_in_place() {
        let simulator = FlatSimulator {
            failing: &["AK"],
        };
        let response = CommandHandler::with_simulator(Arc::new(simulator), &Settings::default())
            .execute(request(json!({
                "action": "calculate_all_states",
                "payload": {"num_children": 1}
            })))
            .await;

        assert_eq!(response.status, CommandStatus::Ok);
        assert_eq!(response.meta.failed_states, Some(1));
        let states = response.data["states"].as_array().unwrap();
        let alaska = states.iter().find(|s| s["state"] == "AK").unwrap();
        assert_eq!(alaska["error"], true);
        assert_eq!(alaska["tanf_monthly"], 0.0);
        assert_eq!(
            response.hints[0].text,
            "1 state(s) could not be simulated; they report a zero benefit with error=true."
        );
    }
}

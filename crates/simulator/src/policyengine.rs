use crate::error::{Result, SimulationError};
use crate::variables::entity_of;
use crate::{BenefitSimulator, Simulation};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tanf_model::{EntityKind, Situation};

pub const DEFAULT_BASE_URL: &str = "https://api.policyengine.org";
const DEFAULT_COUNTRY: &str = "us";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct PolicyEngineConfig {
    pub base_url: String,
    pub country: String,
    /// Applies to each variable query on its own.
    pub timeout: Duration,
}

impl Default for PolicyEngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PolicyEngineConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/calculate",
            self.base_url.trim_end_matches('/'),
            self.country
        )
    }
}

/// Client for the PolicyEngine household calculation API.
///
/// Each query posts the situation with the requested variable left as `null` and
/// reads the computed value back from the same place in the response.
#[derive(Clone)]
pub struct PolicyEngineSimulator {
    client: Client,
    endpoint: String,
}

impl PolicyEngineSimulator {
    pub fn new(config: &PolicyEngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| SimulationError::Client(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl BenefitSimulator for PolicyEngineSimulator {
    fn simulate(&self, situation: &Situation) -> Result<Box<dyn Simulation>> {
        Ok(Box::new(PolicyEngineSimulation {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            household: serde_json::to_value(situation)?,
        }))
    }
}

struct PolicyEngineSimulation {
    client: Client,
    endpoint: String,
    household: Value,
}

#[async_trait]
impl Simulation for PolicyEngineSimulation {
    async fn calculate(&self, variable: &str, year: i32) -> Result<f64> {
        let entity = entity_of(variable);
        let body = request_body(&self.household, entity, variable, year);

        log::debug!("simulator query: {variable} ({year}) -> {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|source| SimulationError::Transport {
                variable: variable.to_string(),
                source,
            })?;

        let status = response.status();
        let payload: Value =
            response
                .json()
                .await
                .map_err(|source| SimulationError::Transport {
                    variable: variable.to_string(),
                    source,
                })?;

        if payload.get("status").and_then(Value::as_str) == Some("error") {
            return Err(rejection(variable, error_message(&payload)));
        }
        if !status.is_success() {
            return Err(SimulationError::Http {
                variable: variable.to_string(),
                status: status.as_u16(),
                message: error_message(&payload),
            });
        }

        read_value(&payload, entity, variable, year)
    }
}

/// An engine rejection; naming an unmodeled variable is reported as such.
fn rejection(variable: &str, message: String) -> SimulationError {
    if message.contains(variable) && message.to_ascii_lowercase().contains("does not exist") {
        return SimulationError::UnknownVariable(variable.to_string());
    }
    SimulationError::Rejected {
        variable: variable.to_string(),
        message,
    }
}

fn error_message(payload: &Value) -> String {
    payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| payload.to_string())
}

/// Situation with `variable` requested (set to `null`) on the builder's unit.
fn request_body(household: &Value, entity: EntityKind, variable: &str, year: i32) -> Value {
    let mut household = household.clone();
    if let Some(id) = entity.unit_id() {
        if let Some(unit) = household
            .get_mut(entity.plural())
            .and_then(|units| units.get_mut(id))
            .and_then(Value::as_object_mut)
        {
            let periods = unit
                .entry(variable.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(periods) = periods.as_object_mut() {
                periods.entry(year.to_string()).or_insert(Value::Null);
            }
        }
    }
    json!({ "household": household })
}

fn read_value(payload: &Value, entity: EntityKind, variable: &str, year: i32) -> Result<f64> {
    let missing = || SimulationError::MissingValue {
        variable: variable.to_string(),
        year,
    };
    let unit_id = entity.unit_id().ok_or_else(missing)?;
    let value = payload
        .get("result")
        .and_then(|result| result.get(entity.plural()))
        .and_then(|units| units.get(unit_id))
        .and_then(|unit| unit.get(variable))
        .and_then(|periods| periods.get(year.to_string()))
        .ok_or_else(missing)?;

    match value {
        Value::Number(number) => number.as_f64().ok_or_else(|| SimulationError::NotNumeric {
            variable: variable.to_string(),
            value: number.to_string(),
        }),
        Value::Bool(flag) => Ok(if *flag { 1.0 } else { 0.0 }),
        Value::Null => Err(missing()),
        other => Err(SimulationError::NotNumeric {
            variable: variable.to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use pretty_assertions::assert_eq;
    use tanf_model::{build_situation, Household};

    fn situation_value() -> Value {
        serde_json::to_value(build_situation(&Household::new("CA"))).unwrap()
    }

    #[test]
    fn endpoint_joins_base_url_and_country() {
        let config = PolicyEngineConfig {
            base_url: "http://127.0.0.1:9000/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/us/calculate");
    }

    #[test]
    fn request_marks_variable_as_null_on_its_unit() {
        let body = request_body(&situation_value(), EntityKind::SpmUnit, "ca_tanf", 2025);
        assert_eq!(
            body["household"]["spm_units"]["spm_unit"]["ca_tanf"],
            json!({"2025": null})
        );

        let body = request_body(&situation_value(), EntityKind::TaxUnit, "eitc", 2025);
        assert_eq!(
            body["household"]["tax_units"]["tax_unit"]["eitc"],
            json!({"2025": null})
        );
        assert!(body["household"]["spm_units"]["spm_unit"].get("eitc").is_none());
    }

    #[test]
    fn reads_numbers_and_booleans() {
        let payload = json!({
            "status": "ok",
            "result": {"spm_units": {"spm_unit": {
                "ca_tanf": {"2025": 10_800.5},
                "is_tanf_eligible": {"2025": false}
            }}}
        });
        assert_eq!(
            read_value(&payload, EntityKind::SpmUnit, "ca_tanf", 2025).unwrap(),
            10_800.5
        );
        assert_eq!(
            read_value(&payload, EntityKind::SpmUnit, "is_tanf_eligible", 2025).unwrap(),
            0.0
        );
        assert!(matches!(
            read_value(&payload, EntityKind::SpmUnit, "snap", 2025),
            Err(SimulationError::MissingValue { .. })
        ));
    }

    async fn mock_engine(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn round_trips_through_http_api() {
        let app = Router::new().route(
            "/us/calculate",
            post(|Json(body): Json<Value>| async move {
                let mut result = body["household"].clone();
                result["spm_units"]["spm_unit"]["ca_tanf"]["2025"] = json!(12_000.0);
                Json(json!({"status": "ok", "message": null, "result": result}))
            }),
        );
        let base_url = mock_engine(app).await;
        let simulator = PolicyEngineSimulator::new(&PolicyEngineConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();

        let simulation = simulator
            .simulate(&build_situation(&Household::new("CA")))
            .unwrap();
        assert_eq!(simulation.calculate("ca_tanf", 2025).await.unwrap(), 12_000.0);
    }

    #[tokio::test]
    async fn unknown_variable_rejections_are_typed() {
        let app = Router::new().route(
            "/us/calculate",
            post(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"status": "error", "message": "Variable xx_tanf does not exist"})),
                )
            }),
        );
        let base_url = mock_engine(app).await;
        let simulator = PolicyEngineSimulator::new(&PolicyEngineConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();
        let simulation = simulator
            .simulate(&build_situation(&Household::new("CA")))
            .unwrap();

        let err = simulation.calculate("xx_tanf", 2025).await.unwrap_err();
        assert!(matches!(err, SimulationError::UnknownVariable(variable) if variable == "xx_tanf"));
    }

    #[test]
    fn only_missing_variables_become_unknown() {
        assert!(matches!(
            rejection("ca_tanf", "Variable ca_tanf does not exist".to_string()),
            SimulationError::UnknownVariable(_)
        ));
        match rejection("ca_tanf", "Household is malformed".to_string()) {
            SimulationError::Rejected { variable, message } => {
                assert_eq!(variable, "ca_tanf");
                assert_eq!(message, "Household is malformed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Shared helpers: an isolated `tanf` command and an in-process stand-in for the
//! PolicyEngine household API.

#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::Command;
use std::sync::{mpsc, Arc};

/// `tanf` with every TANF_* variable cleared.
pub fn tanf() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tanf"));
    for key in [
        "TANF_CONFIG",
        "TANF_SIMULATOR_URL",
        "TANF_SIMULATOR_TIMEOUT_SECS",
        "TANF_MAX_CONCURRENCY",
        "TANF_DEFAULT_YEAR",
        "TANF_AUTH_TOKEN",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

/// Answers every requested (null) variable from `values`; any other variable is
/// rejected the way the real API rejects unknown variables. Returns the base URL.
pub fn mock_engine(values: &[(&str, f64)]) -> String {
    let values: Arc<HashMap<String, f64>> = Arc::new(
        values
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect(),
    );
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            let app = Router::new()
                .route("/us/calculate", post(calculate))
                .with_state(values);
            axum::serve(listener, app).await.unwrap();
        });
    });
    let addr = rx.recv().unwrap();
    format!("http://{addr}")
}

async fn calculate(
    State(values): State<Arc<HashMap<String, f64>>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut household = body["household"].clone();
    let mut unknown = None;
    if let Some(groups) = household.as_object_mut() {
        for units in groups.values_mut().filter_map(Value::as_object_mut) {
            for unit in units.values_mut().filter_map(Value::as_object_mut) {
                for (variable, periods) in unit.iter_mut() {
                    let Some(periods) = periods.as_object_mut() else {
                        continue;
                    };
                    for value in periods.values_mut().filter(|value| value.is_null()) {
                        match values.get(variable) {
                            Some(known) => *value = json!(known),
                            None => unknown = Some(variable.clone()),
                        }
                    }
                }
            }
        }
    }

    match unknown {
        Some(variable) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": format!("unknown variable {variable}")})),
        ),
        None => (
            StatusCode::OK,
            Json(json!({"status": "ok", "result": household})),
        ),
    }
}

use crate::command::{
    CommandAction, CommandHandler, CommandRequest, CommandResponse, CommandStatus, ResponseMeta,
};
use crate::server_security::{AuthToken, AUTH_TOKEN_ENV};
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, Response as HttpResponse, StatusCode},
    response::Response,
    routing::{get, post, MethodRouter},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tanf_protocol::{serialize_json, ErrorEnvelope};

pub(crate) struct HttpState {
    pub handler: CommandHandler,
    pub auth_token: Option<AuthToken>,
}

/// `/command` speaks the Command API envelope; the other routes take a bare
/// payload and answer with the bare result.
pub(crate) fn router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/command", post(command))
        .route("/health", get(health))
        .route("/calculate", rest_route(CommandAction::Calculate))
        .route("/calculate-range", rest_route(CommandAction::CalculateRange))
        .route("/calculate-combined-range", rest_route(CommandAction::CalculateCombinedRange))
        .route("/calculate-all-states", rest_route(CommandAction::CalculateAllStates))
        .route("/calculate-comparison", rest_route(CommandAction::CalculateComparison))
        .route("/states", get(states))
        .route("/counties/:state", get(counties))
        .with_state(state)
}

fn is_authorized(headers: &HeaderMap, token: &AuthToken) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| token.accepts(value))
}

fn check_auth(state: &HttpState, headers: &HeaderMap) -> Option<Response> {
    let token = state.auth_token.as_ref()?;
    if is_authorized(headers, token) {
        return None;
    }
    let response = error_response(
        "unauthorized",
        "Missing or invalid Authorization header".to_string(),
    );
    Some(build_response(StatusCode::UNAUTHORIZED, &response))
}

pub(crate) fn error_response(code: &str, message: String) -> CommandResponse {
    let hint = match code {
        "unauthorized" => format!(
            "The server was started with an auth token; send Authorization: Bearer <token>. To disable auth, unset {AUTH_TOKEN_ENV} and restart the server."
        ),
        "invalid_request" | "invalid_payload" => {
            "Verify the body is valid JSON and matches the Command API schema.".to_string()
        }
        _ => "Check the request against the Command API schema.".to_string(),
    };

    CommandResponse {
        status: CommandStatus::Error,
        message: Some(message.clone()),
        error: Some(ErrorEnvelope::new(code, message).with_hint(hint)),
        hints: Vec::new(),
        next_actions: Vec::new(),
        data: Value::Null,
        meta: ResponseMeta::default(),
    }
}

pub(crate) fn build_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let bytes = match serialize_json(body) {
        Ok(text) => text.into_bytes(),
        Err(err) => {
            log::error!("Failed to serialize HTTP response: {err}");
            return bare(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut builder = HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json");
    if status == StatusCode::UNAUTHORIZED {
        builder = builder.header("www-authenticate", "Bearer");
    }
    builder
        .body(Body::from(bytes))
        .unwrap_or_else(|_| bare(StatusCode::INTERNAL_SERVER_ERROR))
}

fn bare(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

/// HTTP status for a failed command on the REST routes.
fn failure_status(response: &CommandResponse) -> StatusCode {
    match response.error_code() {
        Some("invalid_request" | "invalid_payload") => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn command(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    let request: CommandRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            let response =
                error_response("invalid_request", format!("Invalid JSON request: {err}"));
            return build_response(StatusCode::BAD_REQUEST, &response);
        }
    };
    let response = state.handler.execute(request).await;
    build_response(StatusCode::OK, &response)
}

async fn health(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    let report = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "simulator": state.handler.simulator_url(),
    });
    build_response(StatusCode::OK, &report)
}

async fn rest(state: &HttpState, action: CommandAction, payload: Value) -> Response {
    let response = state
        .handler
        .execute(CommandRequest { action, payload })
        .await;
    if response.is_error() {
        return build_response(failure_status(&response), &response);
    }
    build_response(StatusCode::OK, &response.data)
}

fn rest_route(action: CommandAction) -> MethodRouter<Arc<HttpState>> {
    post(
        move |state: State<Arc<HttpState>>, headers: HeaderMap, body: Bytes| {
            rest_post(state, headers, body, action)
        },
    )
}

async fn rest_post(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: Bytes,
    action: CommandAction,
) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    let payload: Value = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(err) => {
                let response =
                    error_response("invalid_payload", format!("Invalid JSON body: {err}"));
                return build_response(StatusCode::BAD_REQUEST, &response);
            }
        }
    };
    rest(&state, action, payload).await
}

async fn states(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    rest(&state, CommandAction::States, json!({})).await
}

async fn counties(
    State(state): State<Arc<HttpState>>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Some(denied) = check_auth(&state, &headers) {
        return denied;
    }
    rest(&state, CommandAction::Counties, json!({ "state": code })).await
}

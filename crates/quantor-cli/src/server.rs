//! JSON-RPC 2.0 server mode for quantor
//!
//! Enables external tools to use quantor as a calculation backend.
//! Reads JSON-RPC requests from stdin, writes responses to stdout.

use quantor_core::{registry, Engine, Value};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};

/// JSON-RPC 2.0 request
#[derive(Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Option<serde_json::Value>,
    id: serde_json::Value,
}

/// JSON-RPC 2.0 response
#[derive(Serialize)]
struct Response {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: serde_json::Value,
}

/// JSON-RPC error object
#[derive(Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

/// Structured evaluation result
#[derive(Serialize)]
struct EvalResult {
    #[serde(rename = "type")]
    result_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uncertainty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    display: String,
}

#[derive(Deserialize)]
struct EvalParams {
    expr: String,
}

#[derive(Deserialize)]
struct EvalLinesParams {
    lines: Vec<String>,
}

/// Params for convert: a quantity string and a target unit string
#[derive(Deserialize)]
struct ConvertParams {
    quantity: String,
    unit: String,
}

/// Variable info for get_variables response
#[derive(Serialize)]
struct VariableInfo {
    name: String,
    value: EvalResult,
}

// JSON-RPC error codes
const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;
const CONVERSION_ERROR: i32 = -32000;

impl Response {
    fn success(id: serde_json::Value, result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(result) => Self {
                jsonrpc: "2.0",
                result: Some(result),
                error: None,
                id,
            },
            Err(e) => Self::error(id, INTERNAL_ERROR, format!("Failed to encode result: {e}")),
        }
    }

    fn error(id: serde_json::Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }
}

/// Convert Value to structured EvalResult
fn value_to_result(value: &Value) -> EvalResult {
    let unit = value.unit_symbol();
    EvalResult {
        result_type: value.kind(),
        value: value.as_f64(),
        unit: (!unit.is_empty()).then_some(unit),
        uncertainty: value.uncertainty().and_then(|u| u.to_f64()),
        message: match value {
            Value::Error(msg) => Some(msg.clone()),
            _ => None,
        },
        display: value.to_string(),
    }
}

fn parse_params<T: for<'de> Deserialize<'de>>(
    id: &serde_json::Value,
    params: Option<serde_json::Value>,
) -> Result<T, Response> {
    match params {
        Some(p) => serde_json::from_value(p)
            .map_err(|e| Response::error(id.clone(), INVALID_PARAMS, format!("Invalid params: {e}"))),
        None => Err(Response::error(id.clone(), INVALID_PARAMS, "Missing params")),
    }
}

/// Handle a single JSON-RPC request
fn handle_request(engine: &mut Engine, input: &str) -> Response {
    let request: Request = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => {
            return Response::error(
                serde_json::Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            );
        }
    };

    if request.jsonrpc != "2.0" {
        return Response::error(request.id, INVALID_REQUEST, "Invalid JSON-RPC version");
    }

    tracing::debug!(method = %request.method, "rpc request");
    match request.method.as_str() {
        "eval" => handle_eval(engine, request.id, request.params),
        "eval_lines" => handle_eval_lines(engine, request.id, request.params),
        "convert" => handle_convert(request.id, request.params),
        "clear" => handle_clear(engine, request.id),
        "get_variables" => handle_get_variables(engine, request.id),
        _ => Response::error(
            request.id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        ),
    }
}

/// Evaluate a single expression
fn handle_eval(
    engine: &mut Engine,
    id: serde_json::Value,
    params: Option<serde_json::Value>,
) -> Response {
    let params: EvalParams = match parse_params(&id, params) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let value = engine.eval(&params.expr);
    Response::success(id, value_to_result(&value))
}

/// Evaluate multiple lines (preserves variables)
fn handle_eval_lines(
    engine: &mut Engine,
    id: serde_json::Value,
    params: Option<serde_json::Value>,
) -> Response {
    let params: EvalLinesParams = match parse_params(&id, params) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let results: Vec<EvalResult> = params
        .lines
        .iter()
        .map(|line| value_to_result(&engine.eval(line)))
        .collect();

    Response::success(id, results)
}

/// Convert a quantity string to a unit string without touching the session
fn handle_convert(id: serde_json::Value, params: Option<serde_json::Value>) -> Response {
    let params: ConvertParams = match parse_params(&id, params) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let converted = registry()
        .parse_quantity(&params.quantity)
        .and_then(|q| q.to_parsed(&params.unit));
    match converted {
        Ok(q) => Response::success(id, value_to_result(&Value::Quantity(q))),
        Err(e) => Response::error(id, CONVERSION_ERROR, e.to_string()),
    }
}

/// Clear variables and history
fn handle_clear(engine: &mut Engine, id: serde_json::Value) -> Response {
    engine.clear();
    Response::success(id, serde_json::json!({"message": "Cleared"}))
}

/// List defined variables
fn handle_get_variables(engine: &mut Engine, id: serde_json::Value) -> Response {
    let results: Vec<VariableInfo> = engine
        .variables()
        .into_iter()
        .map(|(name, value)| VariableInfo {
            name: name.to_string(),
            value: value_to_result(value),
        })
        .collect();
    Response::success(id, results)
}

/// Run the JSON-RPC server loop
pub fn run_server(engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let response = handle_request(engine, &line);
        let json = serde_json::to_string(&response)?;
        writeln!(stdout, "{json}")?;
        stdout.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(engine: &mut Engine, request: serde_json::Value) -> serde_json::Value {
        let response = handle_request(engine, &request.to_string());
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_eval_result_shape() {
        let mut engine = Engine::new();
        let response = call(
            &mut engine,
            serde_json::json!({"jsonrpc": "2.0", "method": "eval", "params": {"expr": "(20 ± 2 m) ^ 2"}, "id": 1}),
        );
        let result = &response["result"];
        assert_eq!(result["type"], "quantity");
        assert_eq!(result["value"], 400.0);
        assert_eq!(result["uncertainty"], 80.0);
        assert_eq!(result["unit"], "m²");

        let response = call(
            &mut engine,
            serde_json::json!({"jsonrpc": "2.0", "method": "eval", "params": {"expr": "1.234(56) m"}, "id": 7}),
        );
        assert_eq!(response["result"]["uncertainty"], 0.056);

        let response = call(
            &mut engine,
            serde_json::json!({"jsonrpc": "2.0", "method": "eval", "params": {"expr": "4 m"}, "id": 8}),
        );
        assert!(response["result"].get("uncertainty").is_none());
    }

    #[test]
    fn test_convert() {
        let mut engine = Engine::new();
        let response = call(
            &mut engine,
            serde_json::json!({"jsonrpc": "2.0", "method": "convert", "params": {"quantity": "400 J", "unit": "kJ"}, "id": 2}),
        );
        assert_eq!(response["result"]["value"], 0.4);

        let response = call(
            &mut engine,
            serde_json::json!({"jsonrpc": "2.0", "method": "convert", "params": {"quantity": "4 m", "unit": "s"}, "id": 3}),
        );
        assert_eq!(response["error"]["code"], CONVERSION_ERROR);
    }

    #[test]
    fn test_protocol_errors() {
        let mut engine = Engine::new();
        let response = serde_json::to_value(handle_request(&mut engine, "not json")).unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);

        let response = call(
            &mut engine,
            serde_json::json!({"jsonrpc": "1.0", "method": "eval", "id": 4}),
        );
        assert_eq!(response["error"]["code"], INVALID_REQUEST);

        let response = call(
            &mut engine,
            serde_json::json!({"jsonrpc": "2.0", "method": "nope", "id": 5}),
        );
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = call(
            &mut engine,
            serde_json::json!({"jsonrpc": "2.0", "method": "eval", "id": 6}),
        );
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }
}

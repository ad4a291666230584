//! Integration tests for JSON-RPC server mode
//!
//! These tests drive the real binary the way an editor plugin would,
//! sending an eval call on every keystroke.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

/// Send a JSON-RPC request and read one response line
fn send_request(stdin: &mut impl Write, stdout: &mut impl BufRead, request: Value) -> Value {
    writeln!(stdin, "{}", request).unwrap();
    stdin.flush().unwrap();

    let mut response = String::new();
    stdout.read_line(&mut response).unwrap();
    serde_json::from_str(&response).unwrap()
}

fn eval_request(expr: &str, id: u32) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "eval",
        "params": {"expr": expr},
        "id": id
    })
}

fn get_result(response: &Value) -> &Value {
    response.get("result").expect("expected result in response")
}

fn get_display(response: &Value) -> &str {
    get_result(response)
        .get("display")
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn get_type(response: &Value) -> &str {
    get_result(response)
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn spawn_server() -> std::process::Child {
    Command::new(env!("CARGO_BIN_EXE_quantor"))
        .arg("--server")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn server")
}

/// User types "400 J to kJ" character by character
#[test]
fn test_incremental_conversion() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let keystrokes = [
        "4", "40", "400", "400 ", "400 J", "400 J ", "400 J t", "400 J to", "400 J to ",
        "400 J to k", "400 J to kJ",
    ];

    for (i, partial) in keystrokes.iter().enumerate() {
        let response = send_request(&mut stdin, &mut stdout, eval_request(partial, i as u32));
        // Every keystroke gets an answer, even if it is an error
        assert_eq!(response["id"], i as u32);

        if *partial == "400" {
            assert_eq!(get_type(&response), "number");
        }
        if *partial == "400 J" {
            assert_eq!(get_type(&response), "quantity");
            assert_eq!(get_display(&response), "400 J");
        }
        if *partial == "400 J to kJ" {
            assert_eq!(get_display(&response), "0.4 kJ");
        }
    }

    drop(stdin);
    child.wait().unwrap();
}

#[test]
fn test_uncertainty_fields() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let response = send_request(&mut stdin, &mut stdout, eval_request("(20 ± 2 m) + (30 ± 5 m)", 1));
    let result = get_result(&response);
    assert_eq!(result["type"], "quantity");
    assert_eq!(result["value"], 50.0);
    assert_eq!(result["unit"], "m");
    let uncertainty = result["uncertainty"].as_f64().unwrap();
    assert!((uncertainty - 5.3852).abs() < 1e-4, "got {uncertainty}");

    drop(stdin);
    child.wait().unwrap();
}

/// Error recovery: user types something invalid, then fixes it
#[test]
fn test_error_recovery() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let response = send_request(&mut stdin, &mut stdout, eval_request("10 +", 1));
    assert_eq!(get_type(&response), "error");

    let response = send_request(&mut stdin, &mut stdout, eval_request("1 m + 1 s", 2));
    assert_eq!(get_type(&response), "error");
    assert!(get_result(&response)["message"].is_string());

    let response = send_request(&mut stdin, &mut stdout, eval_request("unknown_var", 3));
    assert_eq!(get_type(&response), "error");

    let response = send_request(&mut stdin, &mut stdout, eval_request("unknown_var = 42 m", 4));
    assert_eq!(get_display(&response), "42 m");

    let response = send_request(&mut stdin, &mut stdout, eval_request("unknown_var + 8 m", 5));
    assert_eq!(get_display(&response), "50 m");

    drop(stdin);
    child.wait().unwrap();
}

#[test]
fn test_eval_lines_batch() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let request = json!({
        "jsonrpc": "2.0",
        "method": "eval_lines",
        "params": {
            "lines": [
                "dist = 100 m",
                "time = 10 s",
                "speed = dist / time",
                "",
                "50 @ °C + 50 K"
            ]
        },
        "id": 1
    });

    let response = send_request(&mut stdin, &mut stdout, request);
    let results = response.get("result").unwrap().as_array().unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(results[0]["type"], "quantity");
    assert_eq!(results[2]["display"], "10 m s⁻¹");
    assert_eq!(results[3]["type"], "empty");
    assert_eq!(results[4]["type"], "temperature");
    assert_eq!(results[4]["display"], "100 °C");

    drop(stdin);
    child.wait().unwrap();
}

#[test]
fn test_clear_and_get_variables() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    send_request(&mut stdin, &mut stdout, eval_request("x = 100 kg", 1));
    send_request(&mut stdin, &mut stdout, eval_request("y = 2 s", 2));

    let request = json!({"jsonrpc": "2.0", "method": "get_variables", "id": 3});
    let response = send_request(&mut stdin, &mut stdout, request);
    let vars = get_result(&response).as_array().unwrap();
    assert_eq!(vars.len(), 2);
    assert_eq!(vars[0]["name"], "x");
    assert_eq!(vars[0]["value"]["display"], "100 kg");

    let request = json!({"jsonrpc": "2.0", "method": "clear", "id": 4});
    let response = send_request(&mut stdin, &mut stdout, request);
    assert_eq!(get_result(&response)["message"], "Cleared");

    let response = send_request(&mut stdin, &mut stdout, eval_request("x", 5));
    assert_eq!(get_type(&response), "error");

    drop(stdin);
    child.wait().unwrap();
}

#[test]
fn test_convert_method() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let request = json!({
        "jsonrpc": "2.0",
        "method": "convert",
        "params": {"quantity": "1.5 km", "unit": "m"},
        "id": 1
    });
    let response = send_request(&mut stdin, &mut stdout, request);
    assert_eq!(get_result(&response)["value"], 1500.0);
    assert_eq!(get_result(&response)["unit"], "m");

    drop(stdin);
    child.wait().unwrap();
}

/// The plain CLI evaluates a single expression
#[test]
fn test_single_expression_mode() {
    let output = Command::new(env!("CARGO_BIN_EXE_quantor"))
        .args(["-q", "4 m * 1 s-1"])
        .output()
        .expect("failed to run quantor");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "4 m s⁻¹");
}

//! Test that the physics.qtr worked examples evaluate correctly

use quantor_core::{Engine, Value};

const SAMPLE_FILE: &str = include_str!("../../../physics.qtr");

#[test]
fn test_sample_file_evaluates_without_errors() {
    let mut engine = Engine::new();
    let mut errors = Vec::new();

    for (line_num, line) in SAMPLE_FILE.lines().enumerate() {
        if let Value::Error(msg) = engine.eval(line) {
            errors.push(format!("Line {}: '{}' -> Error: {}", line_num + 1, line, msg));
        }
    }

    if !errors.is_empty() {
        panic!("physics.qtr has {} errors:\n{}", errors.len(), errors.join("\n"));
    }
}

#[test]
fn test_sample_file_keeps_variables() {
    let mut engine = Engine::new();
    for line in SAMPLE_FILE.lines() {
        engine.eval(line);
    }
    let names: Vec<&str> = engine.variables().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["dist", "g0", "speed", "time", "work"]);
}

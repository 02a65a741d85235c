//! belts - command-line front end for beltflow
//!
//! Reads one network request as JSON on stdin and writes one feasibility
//! report on stdout, pretty-printed with sorted keys. Malformed or invalid
//! requests produce a diagnostic on stderr, a failing exit status, and no
//! report. An infeasible network is a successful run.
//!
//! Diagnostics go through `env_logger` on stderr; set `RUST_LOG=debug` to
//! trace the pipeline.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use beltflow_core::{FeasibilityChecker, FeasibilityError, FeasibilityReport, Network, SolverConfig};
use log::debug;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read request: {0}")]
    Read(#[source] io::Error),

    #[error("Invalid Input: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Feasibility(#[from] FeasibilityError),

    #[error("Failed to write report: {0}")]
    Write(#[source] io::Error),
}

fn read_network<R: Read>(mut reader: R) -> Result<Network, CliError> {
    let mut input = String::new();
    reader.read_to_string(&mut input).map_err(CliError::Read)?;
    let network = serde_json::from_str(&input)?;
    Ok(network)
}

/// Pretty JSON with four-space indentation and lexicographically sorted keys
fn render_report(report: &FeasibilityReport) -> Result<Vec<u8>, CliError> {
    // Going through Value sorts object keys
    let value = serde_json::to_value(report)?;

    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

fn run<R: Read, W: Write>(reader: R, mut writer: W) -> Result<FeasibilityReport, CliError> {
    let network = read_network(reader)?;
    let checker = FeasibilityChecker::new(SolverConfig::default())?;
    let report = checker.check(&network)?;
    debug!("Report status: {}", report.status());

    let rendered = render_report(&report)?;
    writer.write_all(&rendered).map_err(CliError::Write)?;
    writer.flush().map_err(CliError::Write)?;
    Ok(report)
}

/// Single user-facing diagnostic line; the log only sees it at debug level
fn report_failure<W: Write>(mut stderr: W, err: &CliError) {
    debug!("Request failed: {:?}", err);
    // Nothing left to report to if stderr itself is gone
    let _ = writeln!(stderr, "{}", err);
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(io::stdin().lock(), io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(io::stderr().lock(), &err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn run_json(request: &str) -> Result<(Value, String), CliError> {
        let mut output = Vec::new();
        run(request.as_bytes(), &mut output)?;
        let text = String::from_utf8(output).unwrap();
        Ok((serde_json::from_str(&text).unwrap(), text))
    }

    #[test]
    fn test_feasible_request() {
        let request = json!({
            "nodes": {"a": {}, "t": {}},
            "edges": [
                {"from": "s1", "to": "a", "lo": 0, "hi": 50},
                {"from": "s2", "to": "a", "lo": 0, "hi": 50},
                {"from": "a", "to": "t", "lo": 0, "hi": 100}
            ],
            "sources": {"s1": 50, "s2": 30},
            "sink": "t"
        });

        let (value, _) = run_json(&request.to_string()).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "ok",
                "max_flow_per_min": 80,
                "flows": [
                    {"from": "a", "to": "t", "flow": 80},
                    {"from": "s1", "to": "a", "flow": 50},
                    {"from": "s2", "to": "a", "flow": 30}
                ]
            })
        );
    }

    #[test]
    fn test_unused_branch_is_left_out() {
        let request = json!({
            "nodes": {"a": {}, "b": {}, "t": {}},
            "edges": [
                {"from": "s1", "to": "a", "lo": 0, "hi": 100},
                {"from": "s1", "to": "b", "lo": 0, "hi": 100},
                {"from": "a", "to": "t", "lo": 0, "hi": 100},
                {"from": "b", "to": "t", "lo": 0, "hi": 100}
            ],
            "sources": {"s1": 50},
            "sink": "t"
        });

        let (value, text) = run_json(&request.to_string()).unwrap();
        assert_eq!(
            value["flows"],
            json!([
                {"from": "a", "to": "t", "flow": 50},
                {"from": "s1", "to": "a", "flow": 50}
            ])
        );
        assert!(!text.contains("\"flow\": 0"));
    }

    #[test]
    fn test_infeasible_request_is_sorted_and_indented() {
        let request = r#"{
            "nodes": {"a": {}, "b": {}, "t": {}},
            "edges": [
                {"from": "s1", "to": "a", "lo": 0, "hi": 100},
                {"from": "a", "to": "b", "lo": 0, "hi": 70},
                {"from": "b", "to": "t", "lo": 0, "hi": 100}
            ],
            "sources": {"s1": 100},
            "sink": "t"
        }"#;

        let (value, text) = run_json(request).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "infeasible",
                "cut_reachable": ["a", "s1"],
                "deficit": {
                    "demand_balance": 30,
                    "tight_nodes": [],
                    "tight_edges": [{"from": "a", "to": "b"}]
                }
            })
        );

        let cut = text.find("\"cut_reachable\"").unwrap();
        let deficit = text.find("\"deficit\"").unwrap();
        let status = text.find("\"status\"").unwrap();
        assert!(cut < deficit && deficit < status);
        assert!(text.contains("\n    \"status\": \"infeasible\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_malformed_request_writes_nothing() {
        let mut output = Vec::new();
        let result = run("{not json".as_bytes(), &mut output);
        assert!(matches!(result, Err(CliError::Parse(_))));
        assert!(output.is_empty());

        let result = run(r#"{"nodes": {}, "edges": []}"#.as_bytes(), &mut output);
        assert!(matches!(result, Err(CliError::Parse(_))));
        assert!(output.is_empty());
    }

    #[test]
    fn test_invalid_network_writes_nothing() {
        let request = json!({
            "nodes": {"t": {}},
            "edges": [{"from": "s1", "to": "t", "lo": 5, "hi": 1}],
            "sources": {"s1": 1},
            "sink": "t"
        });
        let mut output = Vec::new();
        let result = run(request.to_string().as_bytes(), &mut output);
        assert!(matches!(result, Err(CliError::Feasibility(FeasibilityError::Network(_)))));
        assert!(output.is_empty());
    }

    #[test]
    fn test_fractional_amounts_keep_their_fraction() {
        let request = json!({
            "nodes": {"t": {}},
            "edges": [{"from": "s1", "to": "t", "lo": 0, "hi": 10}],
            "sources": {"s1": 2.5},
            "sink": "t"
        });
        let (value, _) = run_json(&request.to_string()).unwrap();
        assert_eq!(value["max_flow_per_min"], json!(2.5));
        assert_eq!(value["flows"][0]["flow"], json!(2.5));
    }

    #[test]
    fn test_error_messages() {
        let parse = run("[]".as_bytes(), Vec::new()).unwrap_err();
        assert!(parse.to_string().starts_with("Invalid Input"));
    }

    #[test]
    fn test_failure_is_reported_once() {
        let err = run("{not json".as_bytes(), Vec::new()).unwrap_err();
        let mut stderr = Vec::new();
        report_failure(&mut stderr, &err);

        let text = String::from_utf8(stderr).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert_eq!(text.matches("Invalid Input").count(), 1);
    }
}

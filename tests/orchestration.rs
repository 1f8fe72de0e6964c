//! Orchestration tests: local generation guards, request-token staleness,
//! and the non-2xx error-body mapping.

use sds_console::app::{App, AppEvent};
use sds_console::client::{Liveness, api_error};
use sds_console::config::Config;
use sds_console::error::SdsConsoleError;
use sds_console::report::{GenerateResponse, ValidationResponse};
use serde_json::json;

fn app() -> App {
    App::new(&Config::default())
}

#[test]
fn empty_input_never_reaches_the_network() {
    // generate_blocker returning Some is the contract that no request task
    // gets spawned for this action
    let app = app();
    assert_eq!(app.generate_blocker(), Some("enter a SMILES string"));

    let mut app = self::app();
    app.push_char(' ');
    assert_eq!(app.generate_blocker(), Some("enter a SMILES string"));
}

#[test]
fn validation_feedback_matches_the_wire_examples() {
    let positive: ValidationResponse = serde_json::from_value(json!({
        "valid": true,
        "canonical_smiles": "CCO",
        "molecular_formula": "C2H6O",
        "molecular_weight": 46.07
    }))
    .unwrap();
    let lines = positive.summary_lines();
    assert_eq!(lines[0], "Canonical: CCO");
    assert!(lines[1].contains("C2H6O") && lines[1].contains("46.07"));

    let negative: ValidationResponse =
        serde_json::from_value(json!({"valid": false, "error": "bad token"})).unwrap();
    assert_eq!(negative.summary_lines(), vec!["Invalid: bad token"]);
}

#[test]
fn only_the_latest_issued_token_wins() {
    let mut app = app();
    app.push_char('C');

    let stale = app.next_validate_token();
    let latest = app.next_validate_token();

    let stale_result: ValidationResponse =
        serde_json::from_value(json!({"valid": false, "error": "superseded"})).unwrap();
    let latest_result: ValidationResponse =
        serde_json::from_value(json!({"valid": true, "canonical_smiles": "C"})).unwrap();

    // latest resolves first, stale afterwards; the stale one must not
    // overwrite (the redesigned last-issued-wins behavior)
    app.apply(AppEvent::Validation {
        token: latest,
        result: Ok(latest_result),
    });
    app.apply(AppEvent::Validation {
        token: stale,
        result: Ok(stale_result),
    });
    assert!(app.validation.as_ref().unwrap().valid);
}

#[test]
fn stale_generation_failure_is_invisible() {
    let mut app = app();
    app.push_char('C');
    let stale = app.begin_generate();
    app.generating = false;
    let latest = app.begin_generate();

    app.apply(AppEvent::Generation {
        token: stale,
        smiles: "C".to_string(),
        result: Err(SdsConsoleError::Http {
            message: "connection reset".to_string(),
        }),
    });
    assert!(app.status.is_none());
    assert!(app.generating);

    let report: GenerateResponse = serde_json::from_value(json!({
        "sds": {"Section1": {"title": "Identification", "data": {"Name": "Methane"}}}
    }))
    .unwrap();
    app.apply(AppEvent::Generation {
        token: latest,
        smiles: "C".to_string(),
        result: Ok(report.into_document()),
    });
    assert!(!app.generating);
    assert_eq!(app.report.as_ref().unwrap().sections.len(), 1);
}

#[test]
fn liveness_has_three_observable_states() {
    let mut app = app();
    assert!(app.liveness.is_none());
    for state in [
        Liveness::ReachableOk,
        Liveness::ReachableError,
        Liveness::Unreachable,
    ] {
        app.apply(AppEvent::Health(state));
        assert_eq!(app.liveness, Some(state));
    }
}

#[test]
fn error_bodies_map_to_messages_with_status_fallback() {
    match api_error(400, r#"{"error": "unbalanced parentheses"}"#) {
        SdsConsoleError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "unbalanced parentheses");
        }
        other => panic!("unexpected: {other:?}"),
    }
    match api_error(502, "upstream exploded, not json") {
        SdsConsoleError::Api { message, .. } => assert_eq!(message, "HTTP 502"),
        other => panic!("unexpected: {other:?}"),
    }
}

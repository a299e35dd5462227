use errmail::{ProjectParams, Propagation, RaisedError, Severity};

use crate::helpers::test_fixtures::reporting_with;

fn checkout_params() -> ProjectParams {
    ProjectParams {
        prefix: Some("CO".to_string()),
        to: Some("a@b.com".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_raised_errors_flow_to_the_listening_project() {
    let (transport, mut reporting) = reporting_with(&["checkout"]);
    reporting.register("checkout", checkout_params());
    reporting.listen("checkout", Severity::Warning);

    let outcome = reporting.raise(RaisedError::new(
        Severity::Error,
        "Null pointer",
        "/app/checkout.php",
        42,
    ));

    assert_eq!(outcome, Propagation::Continue);
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[CO] Null pointer");
    assert!(sent[0].body.contains("/app/checkout.php"));
}

#[test]
fn test_suppressed_errors_are_never_forwarded() {
    let (transport, mut reporting) = reporting_with(&["checkout"]);
    reporting.register("checkout", checkout_params());
    reporting.listen("checkout", Severity::Notice);

    let outcome = reporting.raise(
        RaisedError::new(Severity::Error, "boom", "/app/a.rs", 7).suppressed(),
    );

    assert_eq!(outcome, Propagation::Continue);
    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_errors_below_the_threshold_are_ignored() {
    let (transport, mut reporting) = reporting_with(&["checkout"]);
    reporting.register("checkout", checkout_params());
    reporting.listen("checkout", Severity::Error);

    let _ = reporting.raise(RaisedError::new(Severity::Notice, "meh", "/app/a.rs", 1));
    let _ = reporting.raise(RaisedError::new(Severity::Warning, "hmm", "/app/a.rs", 2));
    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_stop_uninstalls_the_handler() {
    let (transport, mut reporting) = reporting_with(&["checkout"]);
    reporting.register("checkout", checkout_params());

    reporting.listen("checkout", Severity::Notice);
    reporting.stop();

    let _ = reporting.raise(RaisedError::new(Severity::Error, "boom", "/app/a.rs", 7));
    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_raising_without_a_listener_is_a_no_op() {
    let (transport, mut reporting) = reporting_with(&["checkout"]);
    reporting.register("checkout", checkout_params());

    let outcome = reporting.raise(RaisedError::new(Severity::Error, "boom", "/app/a.rs", 7));
    assert_eq!(outcome, Propagation::Continue);
    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_listening_updates_the_current_project_pointer() {
    let (_, mut reporting) = reporting_with(&["checkout"]);
    reporting.register("checkout", checkout_params());

    assert!(reporting.current_project().is_none());
    reporting.listen("checkout", Severity::Warning);
    assert_eq!(reporting.current_project(), Some("checkout"));
}

#[test]
fn test_raised_errors_carry_a_captured_stack() {
    let (transport, mut reporting) = reporting_with(&["checkout"]);
    reporting.register("checkout", checkout_params());
    reporting.listen("checkout", Severity::Notice);

    let _ = reporting.raise(RaisedError::new(Severity::Error, "boom", "/app/a.rs", 7));

    let body = &transport.sent()[0].body;
    // The error-site stack payload is populated, not an empty array
    assert!(body.contains("\"stack\": ["));
    assert!(!body.contains("\"stack\": []"));
}

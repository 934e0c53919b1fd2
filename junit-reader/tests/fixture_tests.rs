// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use junit_reader::{FailureKind, ReportReadError, parse_report_file};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn surefire_report() {
    let suites = parse_report_file(&fixture("surefire_report.xml"))
        .expect("parsing surefire_report.xml succeeds");
    assert_eq!(suites.len(), 1);

    let suite = &suites[0];
    assert_eq!(
        (suite.tests, suite.failures, suite.errors, suite.skipped),
        (4, 1, 1, 1)
    );
    assert_eq!(suite.time, 0.132);

    let names: Vec<_> = suite.testcases.iter().map(|case| case.name.as_str()).collect();
    assert_eq!(
        names,
        ["passingTest", "methodTest", "erroringTest", "skippedTest"]
    );

    let failure = suite.testcases[1].failure.as_ref().expect("methodTest failed");
    assert_eq!(failure.kind, FailureKind::Failure);
    assert_eq!(failure.message(), Some("failure_message"));
    assert!(
        failure
            .details_or_default()
            .contains("at org.dummy.ClassTest.methodTest(ClassTest.java:3)"),
        "CDATA body is kept"
    );

    let error = suite.testcases[2].failure.as_ref().expect("erroringTest errored");
    assert_eq!(error.kind, FailureKind::Error);

    assert!(suite.testcases[3].skipped);
    assert_eq!(suite.failed_testcases().count(), 2);
}

#[test]
fn gradle_aggregate() {
    let suites = parse_report_file(&fixture("gradle_aggregate.xml"))
        .expect("parsing gradle_aggregate.xml succeeds");
    assert_eq!(suites.len(), 2);
    assert_eq!(suites[0].name, "com.example.FirstTest");
    assert_eq!(
        suites[0].extra.get("timestamp").map(String::as_str),
        Some("2024-01-01T00:00:00")
    );

    let failing = &suites[1].testcases[1];
    assert_eq!(failing.classname, "com.example.SecondTest$Nested");
    assert_eq!(
        failing.failure.as_ref().and_then(|failure| failure.message()),
        Some("expected: <1> but was: <2>")
    );
}

#[test]
fn truncated_report() {
    let path = fixture("truncated.xml");
    let err = parse_report_file(&path).expect_err("truncated.xml is not well-formed");
    assert!(
        matches!(err, ReportReadError::Malformed { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.path(), path.as_path());
}

#[test]
fn missing_report() {
    let path = fixture("does-not-exist.xml");
    let err = parse_report_file(&path).expect_err("file does not exist");
    assert!(matches!(err, ReportReadError::Io { .. }), "unexpected error: {err:?}");
}

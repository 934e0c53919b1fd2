// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use indexmap::map::IndexMap;

/// Represents a single testsuite.
///
/// A `TestSuite` groups together several [`TestCase`] instances, along with counters reported by
/// the test framework. The counters are taken as-is from the report: they are not recomputed from
/// the test cases.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct TestSuite {
    /// The name of this testsuite.
    pub name: String,

    /// The total number of tests in this testsuite.
    pub tests: usize,

    /// The total number of tests in this suite that failed.
    ///
    /// A "failure" is usually some sort of *expected* issue in a test.
    pub failures: usize,

    /// The total number of tests in this suite that errored.
    ///
    /// An "error" is usually some sort of *unexpected* issue in a test.
    pub errors: usize,

    /// The total number of tests in this suite that were skipped.
    pub skipped: usize,

    /// The overall time taken by the testsuite, in seconds.
    pub time: f64,

    /// The testcases that form this testsuite, in document order.
    pub testcases: Vec<TestCase>,

    /// Other attributes set on the element, such as "hostname" or "timestamp".
    pub extra: IndexMap<String, String>,
}

impl TestSuite {
    /// Creates a new, empty `TestSuite`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns an iterator over the test cases that did not pass.
    pub fn failed_testcases(&self) -> impl Iterator<Item = &TestCase> {
        self.testcases.iter().filter(|case| case.failure.is_some())
    }
}

/// Represents a single testcase.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct TestCase {
    /// The name of the testcase, typically the test method.
    pub name: String,

    /// The "classname" of the testcase.
    ///
    /// Typically, this is the fully qualified, dot-separated name of the class containing the
    /// test. `classname` + `name` together should uniquely identify and locate a test.
    pub classname: String,

    /// The time it took to execute this testcase, in seconds.
    pub time: Option<f64>,

    /// Whether a `<skipped>` marker was present.
    pub skipped: bool,

    /// The failure recorded for this testcase, if any.
    pub failure: Option<Failure>,

    /// Other attributes set on the element, such as "file" or "line".
    pub extra: IndexMap<String, String>,
}

impl TestCase {
    /// Creates a new testcase with no failure.
    pub fn new(name: impl Into<String>, classname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classname: classname.into(),
            ..Default::default()
        }
    }

    /// Sets the failure for this testcase.
    pub fn set_failure(&mut self, failure: Failure) -> &mut Self {
        self.failure = Some(failure);
        self
    }
}

/// The details of a failed testcase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Failure {
    /// Whether this was read from a `<failure>` or an `<error>` element.
    pub kind: FailureKind,

    /// The failure message, from the `message` attribute.
    pub message: Option<String>,

    /// The "type" of failure that occurred.
    pub ty: Option<String>,

    /// The text body of the element, typically a stack trace.
    pub details: Option<String>,
}

impl Failure {
    /// Text used in place of an absent failure body.
    pub const NO_DETAILS: &'static str = "No details";

    /// Creates a new `Failure` of the given kind with no message or details.
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            message: None,
            ty: None,
            details: None,
        }
    }

    /// Sets the message.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the description (text node).
    pub fn set_details(&mut self, details: impl Into<String>) -> &mut Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the message, or `None` if it is absent or empty.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|message| !message.is_empty())
    }

    /// Returns the failure body, or [`Self::NO_DETAILS`] if it is absent or blank.
    pub fn details_or_default(&self) -> &str {
        match self.details.as_deref() {
            Some(details) if !details.trim().is_empty() => details,
            _ => Self::NO_DETAILS,
        }
    }
}

/// The element a [`Failure`] was read from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// An expected failure, such as a failed assertion. Read from `<failure>`.
    Failure,

    /// An unexpected error. Read from `<error>`.
    Error,
}

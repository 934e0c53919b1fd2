// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregating parsed reports into counts and annotations.

use crate::{
    annotation::{Annotation, AnnotationLevel},
    config::MaxAnnotations,
    locator::LocateSource,
};
use camino::Utf8Path;
use junit_reader::{ReportReadError, TestCase, TestSuite};

/// The path used for the run-level annotation.
pub const SUMMARY_ANNOTATION_PATH: &str = "test";

/// Running totals and annotations for one invocation.
///
/// A `RunSummary` is fed every suite of every report with [`Self::handle_suite`], then read out.
/// Counts always reflect every suite seen, but the number of annotations is capped by
/// [`MaxAnnotations`].
#[derive(Clone, Debug)]
pub struct RunSummary {
    max_annotations: MaxAnnotations,
    test_count: usize,
    skipped_count: usize,
    failed_count: usize,
    errored_count: usize,
    total_duration_secs: f64,
    annotations: Vec<Annotation>,
}

impl RunSummary {
    /// Creates an empty summary.
    pub fn new(max_annotations: MaxAnnotations) -> Self {
        Self {
            max_annotations,
            test_count: 0,
            skipped_count: 0,
            failed_count: 0,
            errored_count: 0,
            total_duration_secs: 0.0,
            annotations: Vec::new(),
        }
    }

    /// Reads the report at `report_path` and handles each of its suites in document order.
    pub fn handle_report_file(
        &mut self,
        report_path: &Utf8Path,
        locator: &dyn LocateSource,
    ) -> Result<(), ReportReadError> {
        let suites = junit_reader::parse_report_file(report_path)?;
        tracing::debug!("read {} suites from {report_path}", suites.len());
        for suite in &suites {
            self.handle_suite(suite, report_path, locator);
        }
        Ok(())
    }

    /// Adds a suite's counters, then annotates its failing test cases in order.
    pub fn handle_suite(
        &mut self,
        suite: &TestSuite,
        report_path: &Utf8Path,
        locator: &dyn LocateSource,
    ) {
        self.test_count += suite.tests;
        self.skipped_count += suite.skipped;
        self.failed_count += suite.failures;
        self.errored_count += suite.errors;
        self.total_duration_secs += suite.time;

        for testcase in &suite.testcases {
            self.handle_case(testcase, report_path, locator);
        }
    }

    /// Appends an annotation for `testcase` if it failed and the cap allows it.
    ///
    /// This does not touch the counts: those come from the suite.
    pub fn handle_case(
        &mut self,
        testcase: &TestCase,
        report_path: &Utf8Path,
        locator: &dyn LocateSource,
    ) {
        let Some(failure) = &testcase.failure else {
            return;
        };
        if self.max_annotations.is_reached(self.annotations.len()) {
            tracing::debug!(
                "not annotating {}: limit of {} annotations reached",
                testcase.name,
                self.max_annotations,
            );
            return;
        }

        let location = locator.locate(report_path, &testcase.classname, &testcase.name);
        let message = match failure.message() {
            Some(message) => format!("Junit test {} failed {message}", testcase.name),
            None => format!("Junit test {} failed", testcase.name),
        };

        self.annotations.push(Annotation::new(
            location.path,
            location.line,
            AnnotationLevel::Failure,
            &testcase.name,
            message,
            failure.details_or_default(),
        ));
    }

    /// Returns true if any test failed or errored. Skipped tests don't count.
    pub fn is_failed(&self) -> bool {
        self.failed_count + self.errored_count > 0
    }

    /// Returns the one-line summary of the run.
    pub fn format_summary(&self) -> String {
        format!(
            "Junit Results ran {} in {} seconds {} Errored, {} Failed, {} Skipped",
            self.test_count,
            self.total_duration_secs,
            self.errored_count,
            self.failed_count,
            self.skipped_count,
        )
    }

    /// Returns an annotation carrying [`Self::format_summary`], not tied to any source file.
    pub fn summary_annotation(&self) -> Annotation {
        let level = if self.is_failed() {
            AnnotationLevel::Failure
        } else {
            AnnotationLevel::Notice
        };
        Annotation::new(
            SUMMARY_ANNOTATION_PATH,
            0,
            level,
            "Junit Results",
            self.format_summary(),
            "",
        )
    }

    /// Returns the annotations to publish, with the run-level annotation first if
    /// `include_summary` is set.
    pub fn to_annotations(&self, include_summary: bool) -> Vec<Annotation> {
        let mut annotations = Vec::with_capacity(self.annotations.len() + 1);
        if include_summary {
            annotations.push(self.summary_annotation());
        }
        annotations.extend(self.annotations.iter().cloned());
        annotations
    }

    /// The per-test annotations recorded so far.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The total number of tests.
    pub fn test_count(&self) -> usize {
        self.test_count
    }

    /// The number of skipped tests.
    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    /// The number of failed tests.
    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    /// The number of errored tests.
    pub fn errored_count(&self) -> usize {
        self.errored_count
    }

    /// The sum of suite durations, in seconds.
    pub fn total_duration_secs(&self) -> f64 {
        self.total_duration_secs
    }
}

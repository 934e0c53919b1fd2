// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `junit-annotate` failures.
///
/// Unknown or unexpected failures will always result in exit code 1.
pub enum JunitAnnotateExitCode {}

impl JunitAnnotateExitCode {
    /// No errors occurred. Failing tests also exit with this code unless `--fail-on-failure` is
    /// passed.
    pub const OK: i32 = 0;

    /// Failing tests were found and `--fail-on-failure` was passed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// A report could not be read or was not well-formed XML.
    pub const REPORT_PARSE_FAILED: i32 = 101;

    /// Publishing results to the check-runs API, or to standard output, failed.
    pub const PUBLISH_FAILED: i32 = 102;

    /// A user issue happened while setting up the invocation, such as an invalid config file or
    /// report glob.
    pub const SETUP_ERROR: i32 = 96;
}

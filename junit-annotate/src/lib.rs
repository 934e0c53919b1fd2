// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publish JUnit test results as GitHub check-run annotations.
//!
//! `junit-annotate` reads JUnit XML reports, counts passed, failed, errored and skipped tests,
//! finds the source line of each failing test, and publishes the result to the check run of the
//! current GitHub Actions job. Outside of a workflow, or without a token, the annotations are
//! printed as workflow commands instead.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::JunitAnnotateExitCode;

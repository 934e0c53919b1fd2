// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read JUnit reports in Rust.
//!
//! Both report shapes seen in the wild are supported: a single `<testsuite>` root, and a
//! `<testsuites>` root wrapping any number of `<testsuite>` elements. Either way, the result is a
//! flat list of [`TestSuite`]s in document order.
//!
//! ```
//! let xml = br#"<testsuite name="suite" tests="1"><testcase name="t" classname="a.B"/></testsuite>"#;
//! let suites = junit_reader::parse_report(xml).unwrap();
//! assert_eq!(suites.len(), 1);
//! assert_eq!(suites[0].testcases[0].classname, "a.B");
//! ```

#![warn(missing_docs)]

mod deserialize;
mod errors;
mod report;

pub use deserialize::{parse_report, parse_report_file};
pub use errors::*;
pub use report::*;

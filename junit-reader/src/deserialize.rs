// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deserialize a JUnit report into [`TestSuite`]s.

use crate::{
    Failure, FailureKind, MalformedReportError, MalformedReportKind, ReportReadError, TestCase,
    TestSuite,
};
use camino::Utf8Path;
use indexmap::IndexMap;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::borrow::Cow;

const TESTSUITES_TAG: &[u8] = b"testsuites";
const TESTSUITE_TAG: &[u8] = b"testsuite";
const TESTCASE_TAG: &[u8] = b"testcase";
const FAILURE_TAG: &[u8] = b"failure";
const ERROR_TAG: &[u8] = b"error";
const SKIPPED_TAG: &[u8] = b"skipped";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses a JUnit report into the test suites it contains.
///
/// A `<testsuite>` root produces exactly one suite, while a `<testsuites>` root produces one suite
/// per child, in document order. A well-formed document with any other root element produces no
/// suites.
///
/// Counters that are missing or not numeric are read as zero. Only the first `<failure>` or
/// `<error>` child of a test case is recorded.
pub fn parse_report(xml: impl AsRef<[u8]>) -> Result<Vec<TestSuite>, MalformedReportError> {
    let xml = xml.as_ref();
    let xml = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);
    if let Err(err) = std::str::from_utf8(xml) {
        return Err(MalformedReportError::new(
            Some(err.valid_up_to() as u64),
            err.into(),
        ));
    }

    let mut reader = Reader::from_reader(xml);
    let mut parser = ReportParser::default();

    loop {
        let event = reader.read_event().map_err(|err| {
            MalformedReportError::new(Some(reader.error_position() as u64), err.into())
        })?;
        let position = reader.buffer_position() as u64;
        let at = |kind: MalformedReportKind| MalformedReportError::new(Some(position), kind);

        match event {
            Event::Start(e) => parser.open(&e).map_err(at)?,
            Event::Empty(e) => {
                parser.open(&e).map_err(at)?;
                parser.close(e.local_name().as_ref()).map_err(at)?;
            }
            Event::End(e) => parser.close(e.local_name().as_ref()).map_err(at)?,
            Event::Text(e) => {
                if parser.is_capturing_text() {
                    let text = e.unescape().map_err(|err| at(err.into()))?;
                    parser.push_text(&text);
                }
            }
            Event::CData(e) => {
                if parser.is_capturing_text() {
                    parser.push_text(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    parser
        .finish()
        .map_err(|kind| MalformedReportError::new(None, kind))
}

/// Reads and parses the JUnit report at `path`.
///
/// See [`parse_report`] for how the document is interpreted.
pub fn parse_report_file(path: &Utf8Path) -> Result<Vec<TestSuite>, ReportReadError> {
    let bytes = std::fs::read(path).map_err(|err| ReportReadError::io(path, err))?;
    parse_report(bytes).map_err(|err| ReportReadError::malformed(path, err))
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum RootShape {
    Testsuite,
    Testsuites,
    Other,
}

#[derive(Debug, Default)]
struct ReportParser {
    /// Names of the currently open elements, outermost first.
    open_elements: Vec<String>,
    root: Option<RootShape>,
    root_closed: bool,
    /// Suites in the order their start tags appear.
    suites: Vec<TestSuite>,
    /// Indexes into `suites` of the currently open `<testsuite>` elements.
    open_suites: Vec<usize>,
    current_case: Option<TestCase>,
    /// The depth of the `<failure>` or `<error>` element whose text is being recorded.
    failure_depth: Option<usize>,
}

impl ReportParser {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), MalformedReportKind> {
        let name = e.local_name();
        let name = name.as_ref();

        let root = match self.root {
            Some(root) => {
                if self.open_elements.is_empty() {
                    return Err(MalformedReportKind::MultipleRootElements {
                        name: String::from_utf8_lossy(name).into_owned(),
                    });
                }
                root
            }
            None => {
                let root = match name {
                    TESTSUITE_TAG => RootShape::Testsuite,
                    TESTSUITES_TAG => RootShape::Testsuites,
                    _ => {
                        tracing::debug!(
                            "ignoring report with unrecognized root element `<{}>`",
                            String::from_utf8_lossy(name),
                        );
                        RootShape::Other
                    }
                };
                self.root = Some(root);
                root
            }
        };

        self.open_elements
            .push(String::from_utf8_lossy(name).into_owned());

        if root == RootShape::Other {
            // Still track nesting so well-formedness is checked, but read nothing.
            return Ok(());
        }

        match name {
            TESTSUITE_TAG => self.open_suite(e)?,
            TESTCASE_TAG if !self.open_suites.is_empty() => self.open_case(e)?,
            FAILURE_TAG => self.open_failure(e, FailureKind::Failure)?,
            ERROR_TAG => self.open_failure(e, FailureKind::Error)?,
            SKIPPED_TAG => {
                if let Some(case) = &mut self.current_case {
                    case.skipped = true;
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<(), MalformedReportKind> {
        let depth = self.open_elements.len();
        match self.open_elements.pop() {
            Some(open) if open.as_bytes() == name => {}
            _ => {
                return Err(MalformedReportKind::UnexpectedEndTag {
                    name: String::from_utf8_lossy(name).into_owned(),
                });
            }
        }

        if self.open_elements.is_empty() {
            self.root_closed = true;
        }
        if self.root == Some(RootShape::Other) {
            return Ok(());
        }

        match name {
            TESTSUITE_TAG => {
                self.open_suites.pop();
            }
            TESTCASE_TAG => {
                if let (Some(case), Some(&index)) =
                    (self.current_case.take(), self.open_suites.last())
                {
                    self.suites[index].testcases.push(case);
                }
            }
            FAILURE_TAG | ERROR_TAG if self.failure_depth == Some(depth) => {
                self.failure_depth = None;
            }
            _ => {}
        }

        Ok(())
    }

    fn open_suite(&mut self, e: &BytesStart<'_>) -> Result<(), MalformedReportKind> {
        let mut suite = TestSuite::default();
        for (key, value) in read_attributes(e)? {
            match key.as_str() {
                "name" => suite.name = value,
                "tests" => suite.tests = parse_count(&value),
                "failures" => suite.failures = parse_count(&value),
                "errors" => suite.errors = parse_count(&value),
                "skipped" => suite.skipped = parse_count(&value),
                "time" => suite.time = parse_seconds(&value).unwrap_or(0.0),
                _ => {
                    suite.extra.insert(key, value);
                }
            }
        }
        // A nested suite is listed after its parent: suites are kept in start-tag order.
        self.open_suites.push(self.suites.len());
        self.suites.push(suite);
        Ok(())
    }

    fn open_case(&mut self, e: &BytesStart<'_>) -> Result<(), MalformedReportKind> {
        let mut case = TestCase::default();
        for (key, value) in read_attributes(e)? {
            match key.as_str() {
                "name" => case.name = value,
                "classname" => case.classname = value,
                "time" => case.time = parse_seconds(&value),
                _ => {
                    case.extra.insert(key, value);
                }
            }
        }
        self.current_case = Some(case);
        Ok(())
    }

    fn open_failure(
        &mut self,
        e: &BytesStart<'_>,
        kind: FailureKind,
    ) -> Result<(), MalformedReportKind> {
        let Some(case) = &mut self.current_case else {
            return Ok(());
        };
        // Only the first failure of a test case is meaningful.
        if case.failure.is_some() {
            return Ok(());
        }

        let mut failure = Failure::new(kind);
        for (key, value) in read_attributes(e)? {
            match key.as_str() {
                "message" => failure.message = Some(value),
                "type" => failure.ty = Some(value),
                _ => {}
            }
        }
        case.failure = Some(failure);
        self.failure_depth = Some(self.open_elements.len());
        Ok(())
    }

    fn is_capturing_text(&self) -> bool {
        self.failure_depth.is_some() && self.failure_depth == Some(self.open_elements.len())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(failure) = self
            .current_case
            .as_mut()
            .and_then(|case| case.failure.as_mut())
        {
            failure.details.get_or_insert_with(String::new).push_str(text);
        }
    }

    fn finish(self) -> Result<Vec<TestSuite>, MalformedReportKind> {
        if let Some(name) = self.open_elements.last() {
            return Err(MalformedReportKind::UnclosedElement { name: name.clone() });
        }
        if self.root.is_none() {
            return Err(MalformedReportKind::NoRootElement);
        }
        debug_assert!(self.root_closed, "root is closed once all elements are");
        Ok(self.suites)
    }
}

fn read_attributes(e: &BytesStart<'_>) -> Result<IndexMap<String, String>, MalformedReportKind> {
    let mut attributes = IndexMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value: Cow<'_, str> = attr.unescape_value()?;
        attributes.insert(key, value.into_owned());
    }
    Ok(attributes)
}

/// Reads a counter attribute. Anything that isn't a non-negative number counts as zero.
fn parse_count(value: &str) -> usize {
    let value = value.trim();
    if let Ok(count) = value.parse::<usize>() {
        return count;
    }
    match value.parse::<f64>() {
        Ok(count) if count.is_finite() && count >= 0.0 => count as usize,
        _ => 0,
    }
}

/// Reads a duration. Anything that isn't a non-negative number is treated as absent.
fn parse_seconds(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && seconds.is_sign_positive())
}

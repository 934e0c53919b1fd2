// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use thiserror::Error;

/// An error that occurs when a report is not well-formed XML.
///
/// Returned by [`parse_report`](crate::parse_report).
#[derive(Debug, Error)]
#[error("JUnit report is not well-formed XML{}: {kind}", DisplayPosition(.position))]
pub struct MalformedReportError {
    position: Option<u64>,
    kind: MalformedReportKind,
}

impl MalformedReportError {
    pub(crate) fn new(position: Option<u64>, kind: MalformedReportKind) -> Self {
        Self { position, kind }
    }

    /// Returns the byte offset at which the problem was detected, if known.
    pub fn position(&self) -> Option<u64> {
        self.position
    }

    /// Returns the kind of problem found.
    pub fn kind(&self) -> &MalformedReportKind {
        &self.kind
    }
}

/// The reason a report was rejected as malformed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MalformedReportKind {
    /// The underlying XML reader rejected the input.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// The input is not valid UTF-8.
    #[error(transparent)]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// An attribute could not be read.
    #[error(transparent)]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document has no root element.
    #[error("no root element found")]
    NoRootElement,

    /// A second root element was found after the first one was closed.
    #[error("found a second root element `<{name}>`")]
    MultipleRootElements {
        /// The name of the extra root element.
        name: String,
    },

    /// The input ended while elements were still open.
    #[error("unexpected end of input, `<{name}>` is not closed")]
    UnclosedElement {
        /// The innermost element left open.
        name: String,
    },

    /// An end tag was found with no matching start tag.
    #[error("unexpected closing tag `</{name}>`")]
    UnexpectedEndTag {
        /// The name of the closing tag.
        name: String,
    },
}

struct DisplayPosition<'a>(&'a Option<u64>);

impl fmt::Display for DisplayPosition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(position) => write!(f, " (at byte {position})"),
            None => Ok(()),
        }
    }
}

/// An error that occurs while reading a report from disk.
///
/// Returned by [`parse_report_file`](crate::parse_report_file).
#[derive(Debug, Error)]
pub enum ReportReadError {
    /// The report could not be read.
    #[error("failed to read JUnit report at `{path}`")]
    Io {
        /// The path of the report.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// The report was read but is not well-formed.
    #[error("failed to parse JUnit report at `{path}`")]
    Malformed {
        /// The path of the report.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: MalformedReportError,
    },
}

impl ReportReadError {
    pub(crate) fn io(path: &Utf8Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            err,
        }
    }

    pub(crate) fn malformed(path: &Utf8Path, err: MalformedReportError) -> Self {
        Self::Malformed {
            path: path.to_owned(),
            err,
        }
    }

    /// Returns the path of the report that could not be read.
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Io { path, .. } | Self::Malformed { path, .. } => path,
        }
    }
}

// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Annotations: the unit of feedback attached to a file and line.

use serde::Serialize;
use std::fmt;

/// A single annotation, in the shape the check-runs API expects.
///
/// Field names serialize exactly as `path`, `start_line`, `end_line`, `start_column`,
/// `end_column`, `annotation_level`, `title`, `message` and `raw_details`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Annotation {
    /// Repository-relative path of the annotated file, or a best-effort fallback.
    pub path: String,

    /// 1-based first line, or 0 if the line could not be resolved.
    pub start_line: usize,

    /// 1-based last line, or 0 if the line could not be resolved.
    pub end_line: usize,

    /// Always 0: columns are not resolved.
    pub start_column: usize,

    /// Always 0: columns are not resolved.
    pub end_column: usize,

    /// The severity of the annotation.
    pub annotation_level: AnnotationLevel,

    /// A short title, such as the failing test's name.
    pub title: String,

    /// A one-line summary.
    pub message: String,

    /// Free-form details, such as a stack trace.
    pub raw_details: String,
}

impl Annotation {
    /// Creates an annotation spanning the single line `line` of `path`.
    pub fn new(
        path: impl Into<String>,
        line: usize,
        annotation_level: AnnotationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
        raw_details: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            start_line: line,
            end_line: line,
            start_column: 0,
            end_column: 0,
            annotation_level,
            title: title.into(),
            message: message.into(),
            raw_details: raw_details.into(),
        }
    }
}

/// The severity of an [`Annotation`].
///
/// These are the levels the check-runs API accepts. Run summaries only produce `Notice` and
/// `Failure`; `Warning` is available to callers building their own annotations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    /// Informational.
    Notice,

    /// Something to look at.
    Warning,

    /// Something failed.
    Failure,
}

impl AnnotationLevel {
    /// Returns the name used by the check-runs API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for AnnotationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

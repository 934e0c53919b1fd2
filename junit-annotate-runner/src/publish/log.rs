// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    annotation::{Annotation, AnnotationLevel},
    errors::PublishError,
    summary::RunSummary,
};
use std::io::Write;

/// Publishes annotations as GitHub Actions workflow commands.
///
/// Used when there is no token or no workflow context to publish a check run with. When the
/// output is a GitHub Actions log, the runner still turns these lines into annotations.
#[derive(Debug)]
pub struct LogPublisher<W> {
    writer: W,
}

impl<W: Write> LogPublisher<W> {
    /// Creates a new publisher writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the summary line and one workflow command per annotation.
    pub fn publish(
        &mut self,
        summary: &RunSummary,
        annotations: &[Annotation],
    ) -> Result<(), PublishError> {
        self.write_all(summary, annotations)
            .map_err(|err| PublishError::Write { err })
    }

    /// Consumes the publisher, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_all(
        &mut self,
        summary: &RunSummary,
        annotations: &[Annotation],
    ) -> std::io::Result<()> {
        writeln!(self.writer, "{}", summary.format_summary())?;
        for annotation in annotations {
            writeln!(self.writer, "{}", WorkflowCommand(annotation))?;
        }
        self.writer.flush()
    }
}

/// Displays an annotation as a workflow command.
struct WorkflowCommand<'a>(&'a Annotation);

impl std::fmt::Display for WorkflowCommand<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let annotation = self.0;
        let command = match annotation.annotation_level {
            AnnotationLevel::Failure => "error",
            AnnotationLevel::Warning => "warning",
            AnnotationLevel::Notice => "notice",
        };

        write!(
            f,
            "::{command} file={},line={}",
            escape_property(&annotation.path),
            annotation.start_line,
        )?;
        if !annotation.title.is_empty() {
            write!(f, ",title={}", escape_property(&annotation.title))?;
        }
        write!(f, "::{}", escape_data(&annotation.message))
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    exit_codes::JunitAnnotateExitCode,
    output::{NO_HEADING_TARGET, StderrStyles},
};
use junit_annotate_runner::errors::{ConfigParseError, DiscoverError, PublishError};
use junit_reader::ReportReadError;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages: the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error that ends a junit-annotate run.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine the current directory")]
    CurrentDirFailed {
        #[source]
        err: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        #[source]
        err: camino::FromPathBufError,
    },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("report discovery error")]
    DiscoverError {
        #[from]
        err: DiscoverError,
    },
    #[error("report read error")]
    ReportReadError {
        #[from]
        err: ReportReadError,
    },
    #[error("publish error")]
    PublishError {
        #[from]
        err: PublishError,
    },
    #[error("test run failed")]
    TestRunFailed,
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::DiscoverError { .. } => JunitAnnotateExitCode::SETUP_ERROR,
            Self::ReportReadError { .. } => JunitAnnotateExitCode::REPORT_PARSE_FAILED,
            Self::PublishError { .. } => JunitAnnotateExitCode::PUBLISH_FAILED,
            Self::TestRunFailed => JunitAnnotateExitCode::TEST_RUN_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { err } => {
                tracing::error!("could not determine the current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { err } => {
                tracing::error!("current directory is not valid UTF-8");
                Some(err as &dyn Error)
            }
            Self::ConfigParseError { err } => {
                tracing::error!(
                    "failed to parse config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::DiscoverError { err } => match err {
                DiscoverError::InvalidGlob { glob, err } => {
                    tracing::error!("invalid report glob `{}`", glob.style(styles.bold));
                    Some(err as &dyn Error)
                }
                other => {
                    tracing::error!("failed to search for reports");
                    Some(other as &dyn Error)
                }
            },
            Self::ReportReadError { err } => {
                tracing::error!("failed to read report `{}`", err.path().style(styles.bold));
                err.source()
            }
            Self::PublishError { err } => {
                tracing::error!("failed to publish test results");
                Some(err as &dyn Error)
            }
            Self::TestRunFailed => {
                tracing::error!("test run failed");
                None
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use junit_annotate_runner::discovery::discover_reports;

    #[test]
    fn exit_codes() {
        let dir = camino_tempfile::tempdir().unwrap();
        let discover_error: ExpectedError = discover_reports(dir.path(), "[")
            .expect_err("glob is invalid")
            .into();
        assert_eq!(
            discover_error.process_exit_code(),
            JunitAnnotateExitCode::SETUP_ERROR
        );

        let read_error: ExpectedError =
            junit_reader::parse_report_file(&dir.path().join("TEST-missing.xml"))
                .expect_err("file is missing")
                .into();
        assert_eq!(
            read_error.process_exit_code(),
            JunitAnnotateExitCode::REPORT_PARSE_FAILED
        );

        assert_eq!(
            ExpectedError::TestRunFailed.process_exit_code(),
            JunitAnnotateExitCode::TEST_RUN_FAILED
        );
    }
}

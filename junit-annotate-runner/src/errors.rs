// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by junit-annotate.

use camino::Utf8PathBuf;
use config::ConfigError;
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse junit-annotate config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }
}

/// Error returned while parsing a
/// [`MaxAnnotations`](crate::config::MaxAnnotations) value from a string.
#[derive(Clone, Debug, Error)]
#[error("unrecognized value for max-annotations: {input}\n(expected an integer, `all` or `unbounded`)")]
pub struct MaxAnnotationsParseError {
    input: String,
}

impl MaxAnnotationsParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An error that occurred while looking for report files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoverError {
    /// The report glob could not be compiled.
    #[error("invalid report glob `{glob}`")]
    InvalidGlob {
        /// The glob as passed in.
        glob: String,

        /// The underlying error.
        #[source]
        err: globset::Error,
    },

    /// The directory tree could not be walked.
    #[error("failed to walk `{root}`")]
    Walk {
        /// The root of the walk.
        root: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: walkdir::Error,
    },
}

/// An error that occurred while publishing results to a check run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PublishError {
    /// A request to the check-runs API failed.
    #[error("{operation} request to `{url}` failed")]
    Request {
        /// What the request was doing.
        operation: &'static str,

        /// The URL requested.
        url: String,

        /// The underlying error.
        #[source]
        err: Box<ureq::Error>,
    },

    /// A check-runs API response could not be decoded.
    #[error("failed to decode {operation} response from `{url}`")]
    Decode {
        /// What the request was doing.
        operation: &'static str,

        /// The URL requested.
        url: String,

        /// The underlying error.
        #[source]
        err: Box<ureq::Error>,
    },

    /// `GITHUB_REPOSITORY` was not of the form `owner/repo`.
    #[error("invalid repository `{repository}` (expected `owner/repo`)")]
    InvalidRepository {
        /// The value that was found.
        repository: String,
    },

    /// Writing workflow commands failed.
    #[error("failed to write annotations to output")]
    Write {
        /// The underlying error.
        #[source]
        err: std::io::Error,
    },
}

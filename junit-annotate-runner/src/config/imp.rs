// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::MaxAnnotations;
use crate::errors::ConfigParseError;
use camino::Utf8Path;
use config::{Config, File, FileFormat};
use serde::Deserialize;

/// The glob used to find reports when none is configured.
pub const DEFAULT_REPORT_GLOB: &str = "**/TEST-*.xml";

/// Resolved configuration for a junit-annotate invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnnotateConfig {
    /// Glob, relative to the search root, matching the reports to read.
    pub report_glob: String,

    /// Cap on the number of per-test annotations.
    pub max_annotations: MaxAnnotations,

    /// Whether to prepend a run-level annotation carrying the summary line.
    pub include_summary: bool,

    /// If set, create a new check run with this name instead of updating the job's check run.
    pub check_name: Option<String>,

    /// Whether failing tests should make the process exit with an error.
    pub fail_on_failure: bool,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            report_glob: DEFAULT_REPORT_GLOB.to_owned(),
            max_annotations: MaxAnnotations::DEFAULT,
            include_summary: true,
            check_name: None,
            fail_on_failure: false,
        }
    }
}

impl AnnotateConfig {
    /// The path, relative to the search root, where the config file is looked for by default.
    pub const CONFIG_PATH: &'static str = ".config/junit-annotate.toml";

    /// Reads configuration for the given search root.
    ///
    /// If `config_file` is `None`, [`Self::CONFIG_PATH`] under `root` is read if it exists. An
    /// explicitly passed config file must exist.
    pub fn from_sources(
        root: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, required) = match config_file {
            Some(config_file) => (config_file.to_owned(), true),
            None => (root.join(Self::CONFIG_PATH), false),
        };

        let deserialized = Self::read_file(&config_file, required)
            .map_err(|err| ConfigParseError::new(&config_file, err))?;
        Ok(Self::default().apply_deserialized(deserialized))
    }

    fn read_file(
        config_file: &Utf8Path,
        required: bool,
    ) -> Result<DeserializedConfig, config::ConfigError> {
        let config = Config::builder()
            .add_source(File::new(config_file.as_str(), FileFormat::Toml).required(required))
            .build()?;
        let deserialized = config.try_deserialize::<DeserializedConfig>()?;
        tracing::debug!("read config from {config_file}: {deserialized:?}");
        Ok(deserialized)
    }

    fn apply_deserialized(mut self, deserialized: DeserializedConfig) -> Self {
        let DeserializedConfig {
            path,
            max_annotations,
            include_summary,
            check_name,
            fail_on_failure,
        } = deserialized;

        if let Some(path) = path {
            self.report_glob = path;
        }
        if let Some(max_annotations) = max_annotations {
            self.max_annotations = max_annotations;
        }
        if let Some(include_summary) = include_summary {
            self.include_summary = include_summary;
        }
        if check_name.is_some() {
            self.check_name = check_name;
        }
        if let Some(fail_on_failure) = fail_on_failure {
            self.fail_on_failure = fail_on_failure;
        }
        self
    }

    /// Applies overrides (typically from the command line) on top of this configuration.
    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        let ConfigOverrides {
            report_glob,
            max_annotations,
            include_summary,
            check_name,
            fail_on_failure,
        } = overrides;

        if let Some(report_glob) = report_glob {
            self.report_glob = report_glob;
        }
        if let Some(max_annotations) = max_annotations {
            self.max_annotations = max_annotations;
        }
        if let Some(include_summary) = include_summary {
            self.include_summary = include_summary;
        }
        if let Some(check_name) = check_name.filter(|name| !name.is_empty()) {
            self.check_name = Some(check_name);
        }
        if fail_on_failure {
            self.fail_on_failure = true;
        }
        self
    }
}

/// Values that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Overrides [`AnnotateConfig::report_glob`].
    pub report_glob: Option<String>,
    /// Overrides [`AnnotateConfig::max_annotations`].
    pub max_annotations: Option<MaxAnnotations>,
    /// Overrides [`AnnotateConfig::include_summary`].
    pub include_summary: Option<bool>,
    /// Overrides [`AnnotateConfig::check_name`]. Empty names are ignored.
    pub check_name: Option<String>,
    /// Turns on [`AnnotateConfig::fail_on_failure`].
    pub fail_on_failure: bool,
}

/// The config file, as deserialized.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct DeserializedConfig {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    max_annotations: Option<MaxAnnotations>,
    #[serde(default)]
    include_summary: Option<bool>,
    #[serde(default)]
    check_name: Option<String>,
    #[serde(default)]
    fail_on_failure: Option<bool>,
}

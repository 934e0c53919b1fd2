// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line parsing and the top-level flow of a run.

use crate::{
    ExpectedError,
    errors::Result,
    exit_codes::JunitAnnotateExitCode,
    output::{OutputContext, OutputOpts},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{
    Args, Parser,
    builder::{BoolishValueParser, FalseyValueParser},
};
use junit_annotate_runner::{
    config::{AnnotateConfig, ConfigOverrides, MaxAnnotations},
    discovery::discover_reports,
    locator::SourceLocator,
    publish::{CheckRunPublisher, GithubContext, LogPublisher, UreqCheckRunsClient},
    summary::RunSummary,
};
use std::io::Write;

/// Publish JUnit test results as GitHub check-run annotations.
///
/// Reads JUnit XML reports, summarizes them, and attaches an annotation to the source line of
/// each failing test. Inside a GitHub Actions job with a token, results are published to the
/// job's check run; otherwise they are printed as workflow commands.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct JunitAnnotateApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(flatten)]
    annotate: AnnotateOpts,
}

impl JunitAnnotateApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self) -> Result<i32> {
        let stdout = std::io::stdout();
        self.annotate
            .exec(&|name| std::env::var(name).ok(), &mut stdout.lock())
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Annotation options")]
struct AnnotateOpts {
    /// Glob matching the reports to read, relative to the root [default: **/TEST-*.xml]
    #[arg(long, value_name = "GLOB", env = "INPUT_PATH")]
    path: Option<String>,

    /// Maximum number of failing tests to annotate (0 or `unbounded` for no limit) [default: 10]
    #[arg(long, value_name = "N", env = "INPUT_NUMFAILURES")]
    max_annotations: Option<MaxAnnotations>,

    /// Token for the check-runs API [env: INPUT_ACCESS-TOKEN, GITHUB_TOKEN]
    #[arg(
        long,
        value_name = "TOKEN",
        env = "INPUT_ACCESS-TOKEN",
        hide_env = true,
        hide_env_values = true
    )]
    access_token: Option<String>,

    /// Whether to add an annotation with the run summary [default: true]
    #[arg(
        long,
        value_name = "BOOL",
        env = "INPUT_INCLUDESUMMARY",
        value_parser = BoolishValueParser::new()
    )]
    include_summary: Option<bool>,

    /// Create a new check run with this name, rather than updating the job's check run
    #[arg(long, value_name = "NAME", env = "INPUT_CHECKNAME")]
    check_name: Option<String>,

    /// Exit with a non-zero code if any test failed or errored
    #[arg(
        long,
        env = "INPUT_FAILONFAILURE",
        action = clap::ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    fail_on_failure: bool,

    /// Directory to search for reports and sources [default: current directory]
    #[arg(long, value_name = "DIR")]
    root: Option<Utf8PathBuf>,

    /// Config file [default: <root>/.config/junit-annotate.toml if it exists]
    #[arg(long, value_name = "PATH", env = "JUNIT_ANNOTATE_CONFIG")]
    config_file: Option<Utf8PathBuf>,
}

impl AnnotateOpts {
    fn exec(self, env: &dyn Fn(&str) -> Option<String>, stdout: &mut dyn Write) -> Result<i32> {
        let Self {
            path,
            max_annotations,
            access_token,
            include_summary,
            check_name,
            fail_on_failure,
            root,
            config_file,
        } = self;

        let root = match root {
            Some(root) if root.is_absolute() => root,
            Some(root) => current_dir()?.join(root),
            None => current_dir()?,
        };
        let config = AnnotateConfig::from_sources(&root, config_file.as_deref())?.apply_overrides(
            ConfigOverrides {
                report_glob: path,
                max_annotations,
                include_summary,
                check_name,
                fail_on_failure,
            },
        );
        tracing::debug!("resolved config: {config:?}");

        let summary = summarize(&root, &config)?;
        tracing::info!("{}", summary.format_summary());
        let annotations = summary.to_annotations(config.include_summary);

        let token = access_token.or_else(|| env("GITHUB_TOKEN"));
        match GithubContext::from_lookup(token.as_deref(), env)? {
            Some(context) => {
                let (sha, job) = (context.sha.clone(), context.job.clone());
                let mut publisher =
                    CheckRunPublisher::new(UreqCheckRunsClient::new(context), sha, job);
                if let Some(check_name) = &config.check_name {
                    publisher = publisher.with_check_name(check_name);
                }
                publisher.publish(&summary, &annotations)?;
            }
            None => {
                tracing::info!(
                    "no access token or GitHub Actions context found, printing annotations"
                );
                LogPublisher::new(stdout).publish(&summary, &annotations)?;
            }
        }

        if config.fail_on_failure && summary.is_failed() {
            return Err(ExpectedError::TestRunFailed);
        }
        Ok(JunitAnnotateExitCode::OK)
    }
}

/// Reads every report under `root` into a summary.
fn summarize(root: &Utf8Path, config: &AnnotateConfig) -> Result<RunSummary> {
    let reports = discover_reports(root, &config.report_glob)?;
    let locator = SourceLocator::new(root);

    let mut summary = RunSummary::new(config.max_annotations);
    for report in &reports {
        summary.handle_report_file(report, &locator)?;
    }
    Ok(summary)
}

fn current_dir() -> Result<Utf8PathBuf> {
    let dir = std::env::current_dir().map_err(|err| ExpectedError::CurrentDirFailed { err })?;
    Utf8PathBuf::try_from(dir).map_err(|err| ExpectedError::CurrentDirInvalidUtf8 { err })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::{Utf8TempDir, tempdir};
    use clap::error::ErrorKind;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const REPORT: &str = indoc! {r#"
        <testsuite name="org.dummy.ClassTest" tests="2" failures="1" time="0.25">
          <testcase name="passingTest" classname="org.dummy.ClassTest"/>
          <testcase name="methodTest" classname="org.dummy.ClassTest">
            <failure message="expected true"/>
          </testcase>
        </testsuite>
    "#};

    const SOURCE: &str = indoc! {"
        package org.dummy;

        class ClassTest {
            void methodTest() {}
        }
    "};

    fn project() -> Utf8TempDir {
        let dir = tempdir().unwrap();
        let files = [
            ("build/test-results/TEST-org.dummy.ClassTest.xml", REPORT),
            ("src/test/java/org/dummy/ClassTest.java", SOURCE),
        ];
        for (relative, contents) in files {
            let path = dir.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
        dir
    }

    fn run(args: &[&str]) -> (Result<i32>, String) {
        let app = JunitAnnotateApp::try_parse_from(
            std::iter::once("junit-annotate").chain(args.iter().copied()),
        )
        .unwrap_or_else(|err| panic!("{args:?} should parse: {err}"));

        let mut stdout = Vec::new();
        let result = app.annotate.exec(&|_| None, &mut stdout);
        (result, String::from_utf8(stdout).unwrap())
    }

    #[test]
    fn argument_parsing() {
        let valid: &[&[&str]] = &[
            &[],
            &["--path", "build/**/*.xml", "--max-annotations", "5"],
            &["--max-annotations", "unbounded", "--include-summary", "no"],
            &["--include-summary", "true", "--fail-on-failure"],
            &["--check-name", "JUnit", "--root", "some/dir", "-v", "--color", "never"],
        ];
        for args in valid {
            if let Err(error) = JunitAnnotateApp::try_parse_from(
                std::iter::once("junit-annotate").chain(args.iter().copied()),
            ) {
                panic!("{args:?} should have successfully parsed, but didn't: {error}");
            }
        }

        let invalid: &[(&[&str], ErrorKind)] = &[
            (&["--max-annotations", "lots"], ErrorKind::ValueValidation),
            (&["--include-summary", "maybe"], ErrorKind::ValueValidation),
            (&["--color", "sometimes"], ErrorKind::InvalidValue),
            (&["--unknown"], ErrorKind::UnknownArgument),
        ];
        for (args, kind) in invalid {
            match JunitAnnotateApp::try_parse_from(
                std::iter::once("junit-annotate").chain(args.iter().copied()),
            ) {
                Ok(_) => panic!("{args:?} should have errored out but successfully parsed"),
                Err(error) => assert_eq!(error.kind(), *kind, "error kind for {args:?}"),
            }
        }
    }

    #[test]
    fn prints_workflow_commands_without_context() {
        let dir = project();
        let (result, stdout) = run(&["--root", dir.path().as_str()]);

        assert_eq!(result.expect("run succeeds"), JunitAnnotateExitCode::OK);
        insta::assert_snapshot!(stdout, @r"
        Junit Results ran 2 in 0.25 seconds 0 Errored, 1 Failed, 0 Skipped
        ::error file=test,line=0,title=Junit Results::Junit Results ran 2 in 0.25 seconds 0 Errored, 1 Failed, 0 Skipped
        ::error file=src/test/java/org/dummy/ClassTest.java,line=4,title=methodTest::Junit test methodTest failed expected true
        ");
    }

    #[test]
    fn relative_root_annotates_nearest_module() {
        let dir = tempdir().unwrap();
        for module in ["module2", "very_long_module1"] {
            let source = dir
                .path()
                .join(module)
                .join("src/test/java/org/dummy/ClassTest.java");
            std::fs::create_dir_all(source.parent().unwrap()).unwrap();
            std::fs::write(source, SOURCE).unwrap();
        }
        let report = dir
            .path()
            .join("very_long_module1/build/test-results/TEST-org.dummy.ClassTest.xml");
        std::fs::create_dir_all(report.parent().unwrap()).unwrap();
        std::fs::write(report, REPORT).unwrap();

        let cwd = current_dir().unwrap();
        let root = pathdiff::diff_utf8_paths(dir.path(), &cwd).expect("both paths are absolute");
        let (result, stdout) = run(&["--root", root.as_str(), "--include-summary", "false"]);

        assert_eq!(result.expect("run succeeds"), JunitAnnotateExitCode::OK);
        assert!(
            stdout.contains(
                "file=very_long_module1/src/test/java/org/dummy/ClassTest.java,line=4,"
            ),
            "{stdout}"
        );
    }

    #[test]
    fn config_file_and_overrides() {
        let dir = project();
        let config_file = dir.path().join("annotate.toml");
        std::fs::write(&config_file, "include-summary = false\nfail-on-failure = true\n").unwrap();

        let (result, stdout) = run(&[
            "--root",
            dir.path().as_str(),
            "--config-file",
            config_file.as_str(),
        ]);
        let err = result.expect_err("failing tests fail the run");
        assert!(matches!(err, ExpectedError::TestRunFailed), "{err:?}");
        assert_eq!(err.process_exit_code(), JunitAnnotateExitCode::TEST_RUN_FAILED);
        assert!(
            !stdout.contains("file=test,"),
            "summary annotation is disabled: {stdout}"
        );
        assert!(stdout.contains("title=methodTest"), "{stdout}");
    }

    #[test]
    fn passing_run_with_fail_on_failure() {
        let dir = tempdir().unwrap();
        let report = dir.path().join("TEST-passing.xml");
        std::fs::write(
            &report,
            r#"<testsuite name="ok" tests="1"><testcase name="a" classname="A"/></testsuite>"#,
        )
        .unwrap();

        let (result, stdout) = run(&["--root", dir.path().as_str(), "--fail-on-failure"]);
        assert_eq!(result.expect("passing run succeeds"), JunitAnnotateExitCode::OK);
        assert!(stdout.contains("::notice file=test,line=0"), "{stdout}");
    }

    #[test]
    fn malformed_report_fails() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("TEST-broken.xml"), "<testsuite>").unwrap();

        let (result, stdout) = run(&["--root", dir.path().as_str()]);
        let err = result.expect_err("malformed report fails the run");
        assert_eq!(
            err.process_exit_code(),
            JunitAnnotateExitCode::REPORT_PARSE_FAILED
        );
        assert_eq!(stdout, "", "nothing is published");
    }

    #[test]
    fn missing_config_file_is_setup_error() {
        let dir = project();
        let (result, _) = run(&[
            "--root",
            dir.path().as_str(),
            "--config-file",
            dir.path().join("missing.toml").as_str(),
        ]);
        assert_eq!(
            result.expect_err("config file is missing").process_exit_code(),
            JunitAnnotateExitCode::SETUP_ERROR
        );
    }
}

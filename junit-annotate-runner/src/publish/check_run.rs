// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{annotation::Annotation, errors::PublishError, summary::RunSummary};
use serde::{Deserialize, Serialize};

/// The title of the check-run output.
pub const CHECK_RUN_TITLE: &str = "Junit Results";

/// The maximum number of annotations the check-runs API accepts per request.
pub const ANNOTATIONS_PER_REQUEST: usize = 50;

/// A check run, as returned by the API. Only the fields used here are deserialized.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CheckRun {
    /// The check run's ID.
    pub id: u64,

    /// The check run's name. For check runs created by GitHub Actions, this is the job ID.
    pub name: String,
}

/// The `output` object of a check run.
#[derive(Clone, Debug, Serialize)]
pub struct CheckRunOutput<'a> {
    /// The output title.
    pub title: &'a str,

    /// The output summary, in Markdown.
    pub summary: &'a str,

    /// Annotations to add to the check run. The API appends these to existing annotations.
    pub annotations: &'a [Annotation],
}

impl<'a> CheckRunOutput<'a> {
    /// Creates an output with the standard title.
    pub fn new(summary: &'a str, annotations: &'a [Annotation]) -> Self {
        Self {
            title: CHECK_RUN_TITLE,
            summary,
            annotations,
        }
    }
}

/// The body of a request creating a check run.
#[derive(Clone, Debug, Serialize)]
pub struct CreateCheckRun<'a> {
    /// The name of the check run.
    pub name: &'a str,

    /// The commit to attach the check run to.
    pub head_sha: &'a str,

    /// Always `completed`: the run is over by the time results are published.
    pub status: &'static str,

    /// `success` or `failure`.
    pub conclusion: &'static str,

    /// The output, carrying the first batch of annotations.
    pub output: CheckRunOutput<'a>,
}

/// The body of a request updating a check run.
#[derive(Clone, Debug, Serialize)]
pub struct UpdateCheckRun<'a> {
    /// The output, carrying one batch of annotations.
    pub output: CheckRunOutput<'a>,
}

/// Access to the check-runs API.
///
/// The HTTP implementation is [`UreqCheckRunsClient`](super::UreqCheckRunsClient).
pub trait CheckRunsClient {
    /// Lists the check runs for `sha` named `name`.
    fn list_for_ref(&self, sha: &str, name: &str) -> Result<Vec<CheckRun>, PublishError>;

    /// Creates a check run.
    fn create(&self, request: &CreateCheckRun<'_>) -> Result<CheckRun, PublishError>;

    /// Updates the check run `check_run_id`.
    fn update(&self, check_run_id: u64, request: &UpdateCheckRun<'_>) -> Result<(), PublishError>;
}

/// What [`CheckRunPublisher::publish`] did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PublishOutcome {
    /// The job's existing check run was updated.
    Updated {
        /// The ID of the check run.
        check_run_id: u64,
    },

    /// A new check run was created.
    Created {
        /// The ID of the check run.
        check_run_id: u64,
    },

    /// No check run matching the job could be found, so nothing was published.
    CheckRunNotFound,
}

/// Publishes a [`RunSummary`] to a check run.
#[derive(Debug)]
pub struct CheckRunPublisher<C> {
    client: C,
    sha: String,
    job: String,
    check_name: Option<String>,
}

impl<C: CheckRunsClient> CheckRunPublisher<C> {
    /// Creates a publisher that updates the check run of `job` at commit `sha`.
    pub fn new(client: C, sha: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            client,
            sha: sha.into(),
            job: job.into(),
            check_name: None,
        }
    }

    /// Makes the publisher create a new, completed check run named `check_name` instead.
    pub fn with_check_name(mut self, check_name: impl Into<String>) -> Self {
        self.check_name = Some(check_name.into());
        self
    }

    /// Returns the client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Publishes `summary` along with `annotations`.
    ///
    /// Annotations are sent [`ANNOTATIONS_PER_REQUEST`] at a time: the first batch with the
    /// request that creates or updates the check run, the rest as follow-up updates.
    pub fn publish(
        &self,
        summary: &RunSummary,
        annotations: &[Annotation],
    ) -> Result<PublishOutcome, PublishError> {
        let summary_text = summary.format_summary();
        let mut batches = annotations.chunks(ANNOTATIONS_PER_REQUEST);
        let first_batch = batches.next().unwrap_or_default();

        let outcome = match &self.check_name {
            Some(check_name) => {
                let conclusion = if summary.is_failed() {
                    "failure"
                } else {
                    "success"
                };
                let check_run = self.client.create(&CreateCheckRun {
                    name: check_name,
                    head_sha: &self.sha,
                    status: "completed",
                    conclusion,
                    output: CheckRunOutput::new(&summary_text, first_batch),
                })?;
                tracing::info!("created check run `{check_name}` ({})", check_run.id);
                PublishOutcome::Created {
                    check_run_id: check_run.id,
                }
            }
            None => {
                let check_runs = self.client.list_for_ref(&self.sha, &self.job)?;
                let Some(check_run) = check_runs.iter().find(|run| run.name == self.job) else {
                    tracing::info!(
                        "can not identify test suite: no check run named `{}` for {}. \
                         This can happen for pull requests from a forked repository.",
                        self.job,
                        self.sha,
                    );
                    return Ok(PublishOutcome::CheckRunNotFound);
                };
                self.client.update(
                    check_run.id,
                    &UpdateCheckRun {
                        output: CheckRunOutput::new(&summary_text, first_batch),
                    },
                )?;
                tracing::info!("updated check run `{}` ({})", check_run.name, check_run.id);
                PublishOutcome::Updated {
                    check_run_id: check_run.id,
                }
            }
        };

        if let PublishOutcome::Updated { check_run_id } | PublishOutcome::Created { check_run_id } =
            outcome
        {
            for batch in batches {
                self.client.update(
                    check_run_id,
                    &UpdateCheckRun {
                        output: CheckRunOutput::new(&summary_text, batch),
                    },
                )?;
            }
            tracing::debug!(
                "published {} annotations to check run {check_run_id}",
                annotations.len()
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{annotation::AnnotationLevel, config::MaxAnnotations};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// A request seen by [`RecordingClient`], with the body as JSON.
    #[derive(Debug, PartialEq)]
    enum Recorded {
        List { sha: String, name: String },
        Create(serde_json::Value),
        Update(u64, serde_json::Value),
    }

    #[derive(Default)]
    struct RecordingClient {
        existing: Vec<CheckRun>,
        requests: RefCell<Vec<Recorded>>,
    }

    impl RecordingClient {
        fn with_existing(existing: Vec<CheckRun>) -> Self {
            Self {
                existing,
                requests: RefCell::default(),
            }
        }

        fn update_batch_sizes(&self) -> Vec<usize> {
            self.requests
                .borrow()
                .iter()
                .filter_map(|request| match request {
                    Recorded::Create(body) | Recorded::Update(_, body) => {
                        Some(body["output"]["annotations"].as_array().unwrap().len())
                    }
                    Recorded::List { .. } => None,
                })
                .collect()
        }
    }

    impl CheckRunsClient for RecordingClient {
        fn list_for_ref(&self, sha: &str, name: &str) -> Result<Vec<CheckRun>, PublishError> {
            self.requests.borrow_mut().push(Recorded::List {
                sha: sha.to_owned(),
                name: name.to_owned(),
            });
            Ok(self.existing.clone())
        }

        fn create(&self, request: &CreateCheckRun<'_>) -> Result<CheckRun, PublishError> {
            self.requests
                .borrow_mut()
                .push(Recorded::Create(serde_json::to_value(request).unwrap()));
            Ok(CheckRun {
                id: 99,
                name: request.name.to_owned(),
            })
        }

        fn update(
            &self,
            check_run_id: u64,
            request: &UpdateCheckRun<'_>,
        ) -> Result<(), PublishError> {
            self.requests.borrow_mut().push(Recorded::Update(
                check_run_id,
                serde_json::to_value(request).unwrap(),
            ));
            Ok(())
        }
    }

    fn annotations(count: usize) -> Vec<Annotation> {
        (0..count)
            .map(|index| {
                Annotation::new(
                    "src/Test.java",
                    index + 1,
                    AnnotationLevel::Failure,
                    format!("test{index}"),
                    format!("Junit test test{index} failed"),
                    "No details",
                )
            })
            .collect()
    }

    fn job_check_runs() -> Vec<CheckRun> {
        vec![
            CheckRun {
                id: 1,
                name: "lint".to_owned(),
            },
            CheckRun {
                id: 2,
                name: "test".to_owned(),
            },
        ]
    }

    #[test]
    fn updates_job_check_run() {
        let publisher =
            CheckRunPublisher::new(RecordingClient::with_existing(job_check_runs()), "abc", "test");
        let summary = RunSummary::new(MaxAnnotations::DEFAULT);
        let annotations = annotations(1);

        let outcome = publisher.publish(&summary, &annotations).unwrap();
        assert_eq!(outcome, PublishOutcome::Updated { check_run_id: 2 });

        let requests = publisher.client().requests.borrow();
        assert_eq!(
            requests[0],
            Recorded::List {
                sha: "abc".to_owned(),
                name: "test".to_owned(),
            }
        );
        assert_eq!(
            requests[1],
            Recorded::Update(
                2,
                serde_json::json!({
                    "output": {
                        "title": "Junit Results",
                        "summary": "Junit Results ran 0 in 0 seconds 0 Errored, 0 Failed, 0 Skipped",
                        "annotations": [{
                            "path": "src/Test.java",
                            "start_line": 1,
                            "end_line": 1,
                            "start_column": 0,
                            "end_column": 0,
                            "annotation_level": "failure",
                            "title": "test0",
                            "message": "Junit test test0 failed",
                            "raw_details": "No details",
                        }],
                    },
                })
            )
        );
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn missing_check_run_is_not_an_error() {
        let publisher = CheckRunPublisher::new(
            RecordingClient::with_existing(vec![CheckRun {
                id: 1,
                name: "lint".to_owned(),
            }]),
            "abc",
            "test",
        );
        let summary = RunSummary::new(MaxAnnotations::DEFAULT);

        let outcome = publisher.publish(&summary, &annotations(3)).unwrap();
        assert_eq!(outcome, PublishOutcome::CheckRunNotFound);
        assert_eq!(
            publisher.client().requests.borrow().len(),
            1,
            "only the list request is made"
        );
    }

    #[test]
    fn create_mode() {
        let publisher = CheckRunPublisher::new(RecordingClient::default(), "abc", "test")
            .with_check_name("JUnit Tests");
        let summary = RunSummary::new(MaxAnnotations::DEFAULT);

        let outcome = publisher.publish(&summary, &annotations(0)).unwrap();
        assert_eq!(outcome, PublishOutcome::Created { check_run_id: 99 });

        let requests = publisher.client().requests.borrow();
        assert_eq!(requests.len(), 1, "no list request in create mode");
        let Recorded::Create(body) = &requests[0] else {
            panic!("expected a create request, found {:?}", requests[0]);
        };
        assert_eq!(body["name"], "JUnit Tests");
        assert_eq!(body["head_sha"], "abc");
        assert_eq!(body["status"], "completed");
        assert_eq!(body["conclusion"], "success");
        assert_eq!(body["output"]["annotations"], serde_json::json!([]));
    }

    #[test]
    fn create_mode_failure_conclusion() {
        let mut suite = junit_reader::TestSuite::new("failing");
        suite.failures = 1;
        let mut summary = RunSummary::new(MaxAnnotations::DEFAULT);
        summary.handle_suite(
            &suite,
            camino::Utf8Path::new("TEST-failing.xml"),
            &crate::locator::SourceLocator::new("."),
        );

        let publisher = CheckRunPublisher::new(RecordingClient::default(), "abc", "test")
            .with_check_name("JUnit Tests");
        publisher.publish(&summary, &[]).unwrap();

        let requests = publisher.client().requests.borrow();
        let Recorded::Create(body) = &requests[0] else {
            panic!("expected a create request, found {:?}", requests[0]);
        };
        assert_eq!(body["conclusion"], "failure");
    }

    #[test]
    fn annotations_are_batched() {
        let publisher =
            CheckRunPublisher::new(RecordingClient::with_existing(job_check_runs()), "abc", "test");
        let summary = RunSummary::new(MaxAnnotations::Unbounded);

        publisher.publish(&summary, &annotations(120)).unwrap();
        assert_eq!(publisher.client().update_batch_sizes(), [50, 50, 20]);
        assert!(
            publisher
                .client()
                .requests
                .borrow()
                .iter()
                .skip(1)
                .all(|request| matches!(request, Recorded::Update(2, _))),
            "every batch goes to the job's check run"
        );
    }

    #[test]
    fn create_mode_batches_follow_up_updates() {
        let publisher = CheckRunPublisher::new(RecordingClient::default(), "abc", "test")
            .with_check_name("JUnit Tests");
        let summary = RunSummary::new(MaxAnnotations::Unbounded);

        publisher.publish(&summary, &annotations(51)).unwrap();
        let requests = publisher.client().requests.borrow();
        assert!(matches!(requests[0], Recorded::Create(_)));
        assert!(matches!(requests[1], Recorded::Update(99, _)));
        assert_eq!(publisher.client().update_batch_sizes(), [50, 1]);
    }
}

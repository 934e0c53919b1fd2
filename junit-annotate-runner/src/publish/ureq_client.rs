// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{CheckRun, CheckRunsClient, CreateCheckRun, GithubContext, UpdateCheckRun};
use crate::errors::PublishError;
use serde::Deserialize;
use ureq::{Agent, RequestBuilder};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("junit-annotate/", env!("CARGO_PKG_VERSION"));

/// A blocking [`CheckRunsClient`] for the GitHub REST API.
#[derive(Debug)]
pub struct UreqCheckRunsClient {
    agent: Agent,
    context: GithubContext,
}

#[derive(Deserialize)]
struct ListCheckRunsResponse {
    check_runs: Vec<CheckRun>,
}

impl UreqCheckRunsClient {
    /// Creates a client for the repository in `context`.
    pub fn new(context: GithubContext) -> Self {
        Self {
            agent: Agent::new_with_defaults(),
            context,
        }
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        request
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.context.token))
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

fn request_error(operation: &'static str, url: &str) -> impl FnOnce(ureq::Error) -> PublishError {
    move |err| PublishError::Request {
        operation,
        url: url.to_owned(),
        err: Box::new(err),
    }
}

fn decode_error(operation: &'static str, url: &str) -> impl FnOnce(ureq::Error) -> PublishError {
    move |err| PublishError::Decode {
        operation,
        url: url.to_owned(),
        err: Box::new(err),
    }
}

impl CheckRunsClient for UreqCheckRunsClient {
    fn list_for_ref(&self, sha: &str, name: &str) -> Result<Vec<CheckRun>, PublishError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{sha}/check-runs",
            self.context.api_url, self.context.owner, self.context.repo
        );
        tracing::debug!("listing check runs named `{name}` at {url}");

        let mut response = self
            .authorize(self.agent.get(&url))
            .query("check_name", name)
            .query("per_page", "100")
            .call()
            .map_err(request_error("list check runs", &url))?;
        let body: ListCheckRunsResponse = response
            .body_mut()
            .read_json()
            .map_err(decode_error("list check runs", &url))?;
        Ok(body.check_runs)
    }

    fn create(&self, request: &CreateCheckRun<'_>) -> Result<CheckRun, PublishError> {
        let url = self.context.check_runs_url();
        tracing::debug!(
            "creating check run `{}` with {} annotations",
            request.name,
            request.output.annotations.len()
        );

        let mut response = self
            .authorize(self.agent.post(&url))
            .send_json(request)
            .map_err(request_error("create check run", &url))?;
        response
            .body_mut()
            .read_json()
            .map_err(decode_error("create check run", &url))
    }

    fn update(&self, check_run_id: u64, request: &UpdateCheckRun<'_>) -> Result<(), PublishError> {
        let url = format!("{}/{check_run_id}", self.context.check_runs_url());
        tracing::debug!(
            "updating check run {check_run_id} with {} annotations",
            request.output.annotations.len()
        );

        self.authorize(self.agent.patch(&url))
            .send_json(request)
            .map_err(request_error("update check run", &url))?;
        Ok(())
    }
}

// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::PublishError;

/// The API URL used when `GITHUB_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// What the check-run publisher needs to know about the current workflow run.
#[derive(Clone, Eq, PartialEq)]
pub struct GithubContext {
    /// The repository owner.
    pub owner: String,

    /// The repository name.
    pub repo: String,

    /// The commit the check runs are attached to.
    pub sha: String,

    /// The job ID, which is also the name of the job's check run.
    pub job: String,

    /// The base URL of the REST API, without a trailing slash.
    pub api_url: String,

    /// The token used to authenticate.
    pub token: String,
}

impl GithubContext {
    /// Reads the context from the process environment, with `token` from the command line.
    ///
    /// Returns `Ok(None)` if any required part is missing, for example when running outside
    /// GitHub Actions.
    pub fn from_env(token: Option<&str>) -> Result<Option<Self>, PublishError> {
        Self::from_lookup(token, |name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`], but reads variables through `lookup`.
    pub fn from_lookup(
        token: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, PublishError> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let Some(token) = token.filter(|token| !token.is_empty()) else {
            tracing::debug!("no access token provided");
            return Ok(None);
        };
        let (Some(repository), Some(sha), Some(job)) = (
            var("GITHUB_REPOSITORY"),
            var("GITHUB_SHA"),
            var("GITHUB_JOB"),
        ) else {
            tracing::debug!("GITHUB_REPOSITORY, GITHUB_SHA or GITHUB_JOB not set");
            return Ok(None);
        };

        let (owner, repo) = match repository.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                (owner.to_owned(), repo.to_owned())
            }
            _ => return Err(PublishError::InvalidRepository { repository }),
        };
        let api_url = var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());

        Ok(Some(Self {
            owner,
            repo,
            sha,
            job,
            api_url: api_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
        }))
    }

    /// Returns the URL of the check-runs collection for this repository.
    pub fn check_runs_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/check-runs",
            self.api_url, self.owner, self.repo
        )
    }
}

impl std::fmt::Debug for GithubContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubContext")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("sha", &self.sha)
            .field("job", &self.job)
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

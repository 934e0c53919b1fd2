// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publishing a run's results.
//!
//! Results go to a GitHub check run when a token and workflow context are available
//! ([`CheckRunPublisher`]), and to workflow commands on standard output otherwise
//! ([`LogPublisher`]).

mod check_run;
mod context;
mod log;
mod ureq_client;

pub use check_run::*;
pub use context::*;
pub use log::*;
pub use ureq_client::*;

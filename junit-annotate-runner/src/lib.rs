// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core functionality for junit-annotate: turn JUnit reports into GitHub check-run annotations.
//!
//! The flow of a run is:
//!
//! 1. [`discovery::discover_reports`] finds report files under a root.
//! 2. Each report is parsed with [`junit_reader`] and fed to a [`summary::RunSummary`], which
//!    keeps running totals and asks a [`locator::LocateSource`] where each failing test lives.
//! 3. The summary and its annotations are handed to a publisher in [`publish`].

#![warn(missing_docs)]

pub mod annotation;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod locator;
pub mod publish;
pub mod summary;

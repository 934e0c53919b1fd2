// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for junit-annotate.
//!
//! Settings come from an optional TOML file (by default `.config/junit-annotate.toml` under the
//! search root), with command-line values layered on top.

mod imp;
mod max_annotations;

pub use imp::*;
pub use max_annotations::*;

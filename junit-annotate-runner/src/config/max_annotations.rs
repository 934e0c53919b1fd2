// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::MaxAnnotationsParseError;
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// The maximum number of per-test annotations produced for a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MaxAnnotations {
    /// Stop producing annotations once this many have been recorded.
    Count(usize),

    /// Produce an annotation for every failing test.
    Unbounded,
}

impl MaxAnnotations {
    /// The default cap.
    pub const DEFAULT: Self = Self::Count(10);

    /// Builds a `MaxAnnotations` from a signed count, where anything `<= 0` means no cap.
    pub fn from_count(count: i64) -> Self {
        match usize::try_from(count) {
            Ok(count) if count > 0 => Self::Count(count),
            _ => Self::Unbounded,
        }
    }

    /// Returns true if `recorded` annotations already reach the cap.
    pub fn is_reached(&self, recorded: usize) -> bool {
        match self {
            Self::Count(max) => recorded >= *max,
            Self::Unbounded => false,
        }
    }
}

impl Default for MaxAnnotations {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for MaxAnnotations {
    type Err = MaxAnnotationsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }

        let count = s
            .parse::<i64>()
            .map_err(|_| MaxAnnotationsParseError::new(s))?;
        Ok(Self::from_count(count))
    }
}

impl fmt::Display for MaxAnnotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(max) => write!(f, "{max}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for MaxAnnotations {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl serde::de::Visitor<'_> for V {
            type Value = MaxAnnotations;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an integer or the string \"unbounded\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(|_| {
                    serde::de::Error::invalid_value(
                        serde::de::Unexpected::Str(v),
                        &"an integer or the string \"unbounded\"",
                    )
                })
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(MaxAnnotations::from_count(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(usize::try_from(v)
                    .ok()
                    .filter(|&v| v > 0)
                    .map_or(MaxAnnotations::Unbounded, MaxAnnotations::Count))
            }
        }

        deserializer.deserialize_any(V)
    }
}

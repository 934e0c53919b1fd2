// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping failing tests back to the source file and line that define them.
//!
//! The lookup is a heuristic. A fully-qualified class name such as `org.dummy.ClassTest` becomes
//! the fragment `org/dummy/ClassTest`, and every file under a `src` directory whose path ends
//! with `org/dummy/ClassTest.<ext>` is a candidate. In a multi-module tree several modules may
//! define the same class, so the candidate nearest to the report file wins. The line is the first
//! one containing the method name as a substring: this is not syntax-aware, and comments or
//! overloads can produce false positives.

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobMatcher};
use std::{fmt, sync::OnceLock};
use walkdir::WalkDir;

/// Where a failing test was found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceLocation {
    /// The file, relative to the search root and `/`-separated. If no file was found, this is the
    /// class name converted to a path fragment.
    pub path: String,

    /// The 1-based line, or 0 if it could not be determined.
    pub line: usize,
}

impl SourceLocation {
    fn unresolved(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: 0,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// Resolves a test to a [`SourceLocation`].
///
/// Implementations never fail: anything that cannot be resolved degrades to a best-effort
/// location.
pub trait LocateSource {
    /// Locates the test `method_name` in `classname`, as referenced by the report at
    /// `report_path`.
    fn locate(&self, report_path: &Utf8Path, classname: &str, method_name: &str)
    -> SourceLocation;
}

/// Locates sources by searching a directory tree.
///
/// The tree is walked once, on first use, and the resulting file index is reused for every
/// subsequent lookup.
#[derive(Debug)]
pub struct SourceLocator {
    root: Utf8PathBuf,
    files: OnceLock<Vec<Utf8PathBuf>>,
}

impl SourceLocator {
    /// Creates a new locator searching under `root`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: OnceLock::new(),
        }
    }

    /// Returns all files under the root, relative to it, in traversal order.
    fn files(&self) -> &[Utf8PathBuf] {
        self.files.get_or_init(|| index_files(&self.root))
    }

    fn find_candidate(&self, report_path: &Utf8Path, fragment: &str) -> Option<&Utf8Path> {
        let matcher = candidate_matcher(fragment)?;
        let report_dir = self
            .report_path_under_root(report_path)
            .parent()
            .map(Utf8Path::to_owned)?;

        let mut best: Option<(usize, &Utf8Path)> = None;
        for file in self.files().iter().filter(|file| matcher.is_match(file)) {
            let distance = self.distance(&report_dir, file);
            tracing::debug!("candidate {file} for {fragment} at distance {distance}");
            // Strictly less: on ties the first file in traversal order wins.
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, file.as_path()));
            }
        }

        best.map(|(_, file)| file)
    }

    /// The number of path segments between `report_dir` and the root-relative `file`.
    fn distance(&self, report_dir: &Utf8Path, file: &Utf8Path) -> usize {
        let file = self.root.join(file);
        match pathdiff::diff_utf8_paths(&file, report_dir) {
            Some(relative) => relative.components().count(),
            None => file.components().count(),
        }
    }

    /// Puts `path` on the same footing as `self.root.join(file)`.
    ///
    /// Paths that are absolute or already start with the root (as returned by
    /// [`discover_reports`](crate::discovery::discover_reports)) are kept as-is. Anything else
    /// is taken to be relative to the root.
    fn report_path_under_root(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() || path.starts_with(&self.root) {
            path.to_owned()
        } else {
            self.root.join(path)
        }
    }
}

impl LocateSource for SourceLocator {
    fn locate(
        &self,
        report_path: &Utf8Path,
        classname: &str,
        method_name: &str,
    ) -> SourceLocation {
        let fragment = class_fragment(classname);
        if fragment.is_empty() {
            return SourceLocation::unresolved(fragment);
        }

        let Some(file) = self.find_candidate(report_path, &fragment) else {
            tracing::debug!("no source file found for {classname}, using {fragment}");
            return SourceLocation::unresolved(fragment);
        };

        let line = find_line(&self.root.join(file), method_name);
        let location = SourceLocation {
            path: slash_path(file),
            line,
        };
        tracing::debug!("located {classname}.{method_name} at {location}");
        location
    }
}

/// Converts a fully-qualified class name to a path fragment.
///
/// `org.dummy.ClassTest$Inner` becomes `org/dummy/ClassTest`.
fn class_fragment(classname: &str) -> String {
    let outer = classname.split('$').next().unwrap_or_default();
    outer.replace('.', "/")
}

/// Builds a matcher for `**/src/**/<fragment>.*`, where `*` does not cross `/`.
fn candidate_matcher(fragment: &str) -> Option<GlobMatcher> {
    let pattern = format!("**/src/**/{}.*", globset::escape(fragment));
    match GlobBuilder::new(&pattern)
        .literal_separator(true)
        .backslash_escape(false)
        .build()
    {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(err) => {
            tracing::debug!("skipping lookup for {fragment}: invalid pattern {pattern}: {err}");
            None
        }
    }
}

/// Returns the 1-based index of the first line of `file` containing `method_name`, or 0.
fn find_line(file: &Utf8Path, method_name: &str) -> usize {
    if method_name.is_empty() {
        return 0;
    }

    let contents = match std::fs::read(file) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::debug!("failed to read {file}, leaving line unresolved: {err}");
            return 0;
        }
    };

    String::from_utf8_lossy(&contents)
        .lines()
        .position(|line| line.contains(method_name))
        .map_or(0, |index| index + 1)
}

fn index_files(root: &Utf8Path) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("skipping unreadable entry under {root}: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            continue;
        };
        if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_owned());
        }
    }

    tracing::debug!("indexed {} files under {root}", files.len());
    files
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

pub(crate) fn slash_path(path: &Utf8Path) -> String {
    path.components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

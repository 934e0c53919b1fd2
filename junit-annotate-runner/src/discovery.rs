// Copyright (c) The junit-annotate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Finding report files.

use crate::errors::DiscoverError;
use camino::{Utf8Path, Utf8PathBuf};
use globset::GlobBuilder;
use walkdir::WalkDir;

/// Returns every file under `root` whose root-relative path matches `glob`.
///
/// `*` does not match `/`, but `**` matches any number of directories. Hidden directories are not
/// searched unless the glob names them explicitly. Paths are returned joined onto `root`, sorted
/// and deduplicated.
pub fn discover_reports(root: &Utf8Path, glob: &str) -> Result<Vec<Utf8PathBuf>, DiscoverError> {
    let glob_pattern = glob.strip_prefix("./").unwrap_or(glob);
    let matcher = GlobBuilder::new(glob_pattern)
        .literal_separator(true)
        .build()
        .map_err(|err| DiscoverError::InvalidGlob {
            glob: glob.to_owned(),
            err,
        })?
        .compile_matcher();
    let include_hidden = glob_pattern
        .split('/')
        .any(|segment| segment.starts_with('.'));

    let mut reports = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || include_hidden
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'))
        });

    for entry in walker {
        let entry = entry.map_err(|err| DiscoverError::Walk {
            root: root.to_owned(),
            err,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            tracing::debug!("skipping non-UTF-8 path under {root}");
            continue;
        };
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        if matcher.is_match(relative) {
            reports.push(path);
        }
    }

    reports.sort_unstable();
    reports.dedup();

    if reports.is_empty() {
        tracing::warn!("no reports found under {root} matching `{glob}`");
    } else {
        tracing::debug!("found {} reports under {root}", reports.len());
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::tempdir;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn touch(root: &Utf8Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "<testsuite/>").unwrap();
    }

    #[test_case("**/TEST-*.xml", &[
        "TEST-root.xml",
        "a/build/TEST-a.xml",
        "b/build/test-results/TEST-b.xml",
    ] ; "default glob")]
    #[test_case("*/build/TEST-*.xml", &["a/build/TEST-a.xml"] ; "star does not cross separators")]
    #[test_case("./TEST-*.xml", &["TEST-root.xml"] ; "leading dot slash")]
    #[test_case(".reports/*.xml", &[".reports/TEST-hidden.xml"] ; "explicit hidden directory")]
    #[test_case("**/*.json", &[] ; "no matches")]
    fn discovers_matching_reports(glob: &str, expected: &[&str]) {
        let dir = tempdir().unwrap();
        for relative in [
            "TEST-root.xml",
            "a/build/TEST-a.xml",
            "a/build/other.xml",
            "b/build/test-results/TEST-b.xml",
            ".reports/TEST-hidden.xml",
        ] {
            touch(dir.path(), relative);
        }

        let reports = discover_reports(dir.path(), glob).expect("discovery succeeds");
        let relative: Vec<_> = reports
            .iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().as_str())
            .collect();
        assert_eq!(relative, expected);
    }

    #[test]
    fn invalid_glob() {
        let dir = tempdir().unwrap();
        let err = discover_reports(dir.path(), "reports/[a-").expect_err("glob is invalid");
        assert!(
            matches!(err, DiscoverError::InvalidGlob { ref glob, .. } if glob == "reports/[a-"),
            "unexpected error: {err:?}"
        );
    }
}

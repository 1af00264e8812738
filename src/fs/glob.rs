// src/fs/glob.rs

//! One-shot expansion of input glob patterns.
//!
//! Patterns are matched against paths relative to the project root and are
//! expanded exactly once, when the task graph is built.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

use super::{normalize_path, FileSystem};

/// Whether `s` contains glob metacharacters.
pub fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// Longest leading run of components without metacharacters.
///
/// `base/prime/**/*.so` walks from `base/prime` instead of the whole root.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for part in pattern.split('/') {
        if is_glob_pattern(part) {
            break;
        }
        prefix.push(part);
    }
    prefix
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    // `*` stays within one path component; `**` crosses directories.
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Collect all files under `root` whose root-relative path matches `pattern`.
///
/// Results are returned as full paths (joined onto `root`), sorted so that
/// the expansion is stable across runs. Directories are descended into but
/// never returned themselves.
pub fn expand_pattern(fs: &dyn FileSystem, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = pattern.trim_start_matches("./");
    let matcher = compile(pattern)?;

    let start = root.join(literal_prefix(pattern));
    if !fs.is_dir(&start) {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut stack = vec![start];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if matcher.is_match(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Of `candidates` (paths already joined onto `root`), those whose
/// root-relative path matches `pattern`, sorted.
///
/// Used for paths that are declared but may not exist yet.
pub fn match_paths<'a>(
    root: &Path,
    pattern: &str,
    candidates: impl IntoIterator<Item = &'a Path>,
) -> Result<Vec<PathBuf>> {
    let matcher = compile(pattern.trim_start_matches("./"))?;
    let root = normalize_path(root);

    let mut matched: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|candidate| {
            let path = normalize_path(candidate);
            let rel = if root == Path::new(".") {
                path.as_path()
            } else {
                match path.strip_prefix(&root) {
                    Ok(rel) => rel,
                    Err(_) => return false,
                }
            };
            matcher.is_match(rel.to_string_lossy().replace('\\', "/"))
        })
        .map(Path::to_path_buf)
        .collect();

    matched.sort();
    Ok(matched)
}

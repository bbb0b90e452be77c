//! Expansion of command line arguments into workbook paths

use anyhow::{Context, Result};
use globset::GlobBuilder;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// Resolve each argument to the files it names.
///
/// Arguments that exist on disk are taken as-is. Anything else is treated as
/// a glob pattern and must match at least one file. The result is sorted and
/// free of duplicates.
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for input in inputs {
        let path = Path::new(input);
        if path.exists() || !input.contains(GLOB_CHARS) {
            files.insert(path.to_path_buf());
            continue;
        }

        let matches = expand_glob(input)?;
        if matches.is_empty() {
            anyhow::bail!("Cannot open file \"{}\": No such file or directory", input);
        }
        files.extend(matches);
    }
    Ok(files.into_iter().collect())
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("Invalid glob pattern: {}", pattern))?
        .compile_matcher();
    let root = literal_prefix(Path::new(pattern));
    let relative = root == Path::new(".") && !pattern.starts_with("./");

    let mut matches = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        // Unreadable directories are skipped rather than failing the whole glob.
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = if relative {
            entry.path().strip_prefix(".").unwrap_or(entry.path())
        } else {
            entry.path()
        };
        if matcher.is_match(path) {
            matches.push(path.to_path_buf());
        }
    }
    Ok(matches)
}

/// Longest leading run of path components without glob metacharacters
fn literal_prefix(pattern: &Path) -> PathBuf {
    let mut prefix = PathBuf::new();
    for component in pattern.components() {
        if let Component::Normal(part) = component
            && part.to_string_lossy().contains(GLOB_CHARS)
        {
            break;
        }
        prefix.push(component);
    }
    if prefix.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        prefix
    }
}

// src/source/walk.rs
// =============================================================================
// This module finds Markdown files and reads them into lines.
//
// How it works:
// 1. Start with the target path in a queue
// 2. If it is a Markdown file, collect it
// 3. If it is a directory, queue its entries (sorted, so runs are repeatable)
// 4. Repeat until the queue is empty
//
// Skipped:
// - node_modules and .git directories
// - directories we have already visited (symlink loops)
//
// A file that cannot be read is logged and contributes no lines; it never
// stops the run.
//
// Rust concepts:
// - VecDeque: breadth-first traversal
// - HashSet: visited directories (by canonical path)
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::model::{SourceLine, SourceLocation};

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];
const SKIPPED_DIRECTORIES: [&str; 2] = ["node_modules", ".git"];

/// All the text the checker will look at.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub files: Vec<PathBuf>,
    pub lines: Vec<SourceLine>,
}

/// Finds Markdown files under `target` (or `target` itself if it is one).
///
/// Fails only if `target` itself cannot be inspected.
pub fn find_markdown_files(target: &Path) -> io::Result<Vec<PathBuf>> {
    let metadata = fs::metadata(target)?;
    if metadata.is_file() {
        return Ok(if is_markdown(target) {
            vec![target.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut files = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(target.to_path_buf());

    // Track visited directories to avoid walking the same one twice
    let mut visited = HashSet::new();

    while let Some(dir) = queue.pop_front() {
        let key = fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if !visited.insert(key) {
            continue;
        }

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Could not read directory");
                continue;
            }
        };

        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                if !is_skipped_dir(&path) {
                    queue.push_back(path);
                }
            } else if path.is_file() && is_markdown(&path) {
                files.push(path);
            }
        }
    }

    debug!(count = files.len(), "Found markdown files");
    Ok(files)
}

/// Reads one file into located lines. Read errors give an empty list.
pub fn read_lines(path: &Path) -> Vec<SourceLine> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .enumerate()
            .map(|(i, text)| SourceLine::new(text, SourceLocation::new(path, i + 1)))
            .collect(),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Error reading file");
            Vec::new()
        }
    }
}

/// Finds and reads every Markdown file under `target`.
pub fn load_corpus(target: &Path) -> io::Result<Corpus> {
    let files = find_markdown_files(target)?;
    let lines = files.iter().flat_map(|f| read_lines(f)).collect();
    Ok(Corpus { files, lines })
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MARKDOWN_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| SKIPPED_DIRECTORIES.contains(&name))
        .unwrap_or(false)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why breadth-first?
//    - Top-level docs (README.md) come before deeply nested ones
//    - When a URL appears in several files, the location we report is the
//      first one in this order, so shallow files win
//
// 2. Why sort directory entries?
//    - fs::read_dir order depends on the filesystem
//    - Sorting makes "first location" stable between runs and machines
//
// 3. Why canonicalize for the visited set?
//    - A symlink can point back up the tree; without it we would loop
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_finds_markdown_breadth_first_and_skips_vendor_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/guide")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("README.md"), "# Readme").unwrap();
        fs::write(root.join("docs/guide/deep.md"), "deep").unwrap();
        fs::write(root.join("docs/intro.markdown"), "intro").unwrap();
        fs::write(root.join("docs/notes.txt"), "not markdown").unwrap();
        fs::write(root.join("node_modules/pkg/README.md"), "vendored").unwrap();
        fs::write(root.join(".git/HEAD.md"), "git").unwrap();

        let files = find_markdown_files(root).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("README.md"),
                root.join("docs/intro.markdown"),
                root.join("docs/guide/deep.md"),
            ]
        );
    }

    #[test]
    fn test_single_file_target() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("post.md");
        fs::write(&file, "text").unwrap();
        assert_eq!(find_markdown_files(&file).unwrap(), vec![file]);

        let other = dir.path().join("post.txt");
        fs::write(&other, "text").unwrap();
        assert!(find_markdown_files(&other).unwrap().is_empty());
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(find_markdown_files(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_read_lines_numbers_from_one() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.md");
        fs::write(&file, "first\r\nsecond\n").unwrap();

        let lines = read_lines(&file);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "second");
        assert_eq!(lines[1].location, SourceLocation::new(&file, 2));
        assert_eq!(lines[0].text, "first");
    }

    #[test]
    fn test_unreadable_file_contributes_nothing() {
        let dir = tempdir().unwrap();
        assert!(read_lines(&dir.path().join("nope.md")).is_empty());
    }

    #[test]
    fn test_load_corpus() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "one\ntwo").unwrap();
        fs::write(dir.path().join("b.md"), "three").unwrap();

        let corpus = load_corpus(dir.path()).unwrap();
        assert_eq!(corpus.files.len(), 2);
        assert_eq!(corpus.lines.len(), 3);
    }
}

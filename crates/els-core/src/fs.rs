use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Directory names never descended into when scanning a project.
pub const IGNORED_DIRS: &[&str] = &[".git", "bower_components", "dist", "node_modules", "tmp"];

fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}

/// Every regular file below `root`, skipping [`IGNORED_DIRS`].
///
/// Unreadable entries are skipped. The result is sorted so scans are
/// deterministic across platforms.
pub fn collect_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_ignored_dir(entry))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

//! Source scanning for the layering contract tests.

use std::fs;
use std::path::{Path, PathBuf};

/// `(relative path, 1-based line number, line text)`.
pub type Hit = (String, usize, String);

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn relative_path(path: &Path) -> String {
    path.strip_prefix(root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Every `.rs` file under `relative_dir`, sorted.
pub fn collect_rs_files(relative_dir: &str) -> Vec<PathBuf> {
    let mut pending = vec![root().join(relative_dir)];
    let mut files = Vec::new();

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .unwrap_or_else(|e| panic!("failed to read dir {}: {e}", dir.display()));
        for entry in entries {
            let path = entry
                .unwrap_or_else(|e| panic!("failed to read entry in {}: {e}", dir.display()))
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

/// Run `select` over the lines of each file accepted by `include`,
/// collecting the lines it flags.
fn scan(
    relative_dir: &str,
    include: impl Fn(&Path) -> bool,
    mut select: impl FnMut(&str) -> ScanStep,
) -> Vec<Hit> {
    let mut hits = Vec::new();
    for file in collect_rs_files(relative_dir).into_iter().filter(|f| include(f)) {
        let content = fs::read_to_string(&file)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", file.display()));
        let path = relative_path(&file);
        for (idx, line) in content.lines().enumerate() {
            match select(line) {
                ScanStep::Skip => {}
                ScanStep::Flag => hits.push((path.clone(), idx + 1, line.to_string())),
                ScanStep::Stop => break,
            }
        }
    }
    hits
}

enum ScanStep {
    Skip,
    Flag,
    Stop,
}

/// Code lines under `relative_dir` containing any of `patterns`. Comments
/// and everything after `#[cfg(test)]` are skipped.
pub fn find_lines_containing(relative_dir: &str, patterns: &[&str]) -> Vec<Hit> {
    scan(relative_dir, |_| true, |line| {
        let trimmed = line.trim();
        if trimmed == "#[cfg(test)]" {
            ScanStep::Stop
        } else if trimmed.starts_with("//") || !patterns.iter().any(|p| line.contains(p)) {
            ScanStep::Skip
        } else {
            ScanStep::Flag
        }
    })
}

/// Lines in `mod.rs` files that are neither module declarations nor
/// re-exports.
pub fn find_non_export_lines_in_mod_files(relative_dir: &str) -> Vec<Hit> {
    let is_mod_rs = |path: &Path| path.file_name().is_some_and(|name| name == "mod.rs");
    let mut in_reexport = false;

    scan(relative_dir, is_mod_rs, move |raw| {
        let line = raw.trim();
        if in_reexport || line.starts_with("pub use ") {
            // Multi-line `pub use a::{...};` runs until its semicolon.
            in_reexport = !line.ends_with(';');
            return ScanStep::Skip;
        }
        let allowed = line.is_empty()
            || line.starts_with("//")
            || line.starts_with("pub mod ")
            || line.starts_with("mod ")
            || line.starts_with("#[cfg");
        if allowed {
            ScanStep::Skip
        } else {
            ScanStep::Flag
        }
    })
}

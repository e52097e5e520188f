//! Recursive file-count probe.
//!
//! Counts regular files under a root whose name matches any of the match
//! rules and none of the exclude rules. Rules are file names or `*.ext`
//! suffix patterns; excluded names also prune whole directories from the
//! walk (`node_modules`, `target`, `__pycache__`).
//!
//! A missing root is a legitimate zero, not an error: the tree simply does
//! not exist yet. Only permission problems fail the probe.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{Probe, ProbeError};

/// Probe that counts files matching name rules under a directory tree.
///
/// # Example
///
/// ```rust,no_run
/// use stackwatch_probes::FileCountProbe;
///
/// # #[tokio::main]
/// # async fn main() {
/// let probe = FileCountProbe::new("backend/src")
///     .matching("*.py")
///     .excluding("__pycache__");
///
/// let count = probe.count().await.unwrap();
/// # let _ = count;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileCountProbe {
    root: PathBuf,
    match_rules: Vec<String>,
    exclude_rules: Vec<String>,
}

impl FileCountProbe {
    /// Create a probe rooted at `root` that matches every file.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            match_rules: Vec::new(),
            exclude_rules: Vec::new(),
        }
    }

    /// Add a match rule (`*.ext` suffix pattern or literal file name).
    ///
    /// With no match rules configured, every file counts.
    pub fn matching(mut self, rule: impl Into<String>) -> Self {
        self.match_rules.push(rule.into());
        self
    }

    /// Add an exclude rule. Matching files are skipped and matching
    /// directory names are pruned from the walk entirely.
    pub fn excluding(mut self, rule: impl Into<String>) -> Self {
        self.exclude_rules.push(rule.into());
        self
    }

    /// Count matching files under the root.
    ///
    /// The walk runs on the blocking thread pool; directory entries that
    /// vanish mid-walk are skipped rather than failing the count.
    pub async fn count(&self) -> Result<u64, ProbeError> {
        let probe = self.clone();
        tokio::task::spawn_blocking(move || probe.count_blocking())
            .await
            .map_err(|e| ProbeError::Task(e.to_string()))?
    }

    fn count_blocking(&self) -> Result<u64, ProbeError> {
        match std::fs::metadata(&self.root) {
            // Non-existence is a legitimate zero.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                return Err(permission_denied(&self.root, &err));
            }
            Err(err) => return Err(ProbeError::InvalidTarget(err.to_string())),
            Ok(meta) if !meta.is_dir() => return Ok(0),
            Ok(_) => {}
        }

        let mut count: u64 = 0;
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                    return Err(permission_denied(&dir, &err));
                }
                // Directory disappeared between listing and descent.
                Err(_) => continue,
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(_) => continue,
                };
                let file_type = match entry.file_type() {
                    Ok(file_type) => file_type,
                    Err(_) => continue,
                };

                let name = entry.file_name();
                let name = name.to_string_lossy();

                if self.is_excluded(&name) {
                    continue;
                }

                if file_type.is_dir() {
                    stack.push(entry.path());
                } else if file_type.is_file() && self.matches(&name) {
                    count += 1;
                }
            }
        }

        Ok(count)
    }

    fn matches(&self, name: &str) -> bool {
        self.match_rules.is_empty()
            || self.match_rules.iter().any(|rule| matches_rule(name, rule))
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude_rules.iter().any(|rule| matches_rule(name, rule))
    }
}

fn permission_denied(path: &Path, err: &io::Error) -> ProbeError {
    ProbeError::PermissionDenied(format!("{}: {}", path.display(), err))
}

/// Match a file name against one rule: `*.ext` matches by suffix,
/// anything else matches literally.
fn matches_rule(name: &str, rule: &str) -> bool {
    match rule.strip_prefix('*') {
        Some(suffix) => name.ends_with(suffix),
        None => name == rule,
    }
}

#[async_trait]
impl Probe for FileCountProbe {
    type Output = u64;

    async fn run(&self) -> Result<u64, ProbeError> {
        self.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[tokio::test]
    async fn missing_root_is_zero_not_an_error() {
        let probe = FileCountProbe::new("/nonexistent/stackwatch/tree");
        assert_eq!(probe.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_directory_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FileCountProbe::new(dir.path());
        assert_eq!(probe.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn counts_all_files_without_rules() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.rs"));
        touch(&dir.path().join("b.txt"));
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested").join("c.rs"));

        let probe = FileCountProbe::new(dir.path());
        assert_eq!(probe.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn suffix_rule_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("main.py"));
        touch(&dir.path().join("util.py"));
        touch(&dir.path().join("readme.md"));

        let probe = FileCountProbe::new(dir.path()).matching("*.py");
        assert_eq!(probe.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn literal_rule_matches_exact_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Makefile"));
        touch(&dir.path().join("Makefile.bak"));

        let probe = FileCountProbe::new(dir.path()).matching("Makefile");
        assert_eq!(probe.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn excluded_directories_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("app.py"));
        fs::create_dir(dir.path().join("__pycache__")).unwrap();
        touch(&dir.path().join("__pycache__").join("app.cpython-312.py"));

        let probe = FileCountProbe::new(dir.path())
            .matching("*.py")
            .excluding("__pycache__");
        assert_eq!(probe.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn excluded_file_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("lib.rs"));
        touch(&dir.path().join("generated.rs"));

        let probe = FileCountProbe::new(dir.path())
            .matching("*.rs")
            .excluding("generated.rs");
        assert_eq!(probe.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn file_root_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.txt");
        touch(&file);

        // Nothing lives *under* a plain file.
        let probe = FileCountProbe::new(&file);
        assert_eq!(probe.count().await.unwrap(), 0);
    }

    #[test]
    fn rule_matching() {
        assert!(matches_rule("main.rs", "*.rs"));
        assert!(!matches_rule("main.rss", "*.rs"));
        assert!(matches_rule("Cargo.toml", "Cargo.toml"));
        assert!(!matches_rule("Cargo.toml", "*.rs"));
    }
}

//! Declarative file maps and their materialization

use crate::error::{BuildError, BuildResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Relative path to file content; iteration order is by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMap {
    files: BTreeMap<String, String>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a file, replacing any previous content at `path`
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Layer `self` over `defaults`: entries of `self` win on collision
    pub fn over(self, defaults: FileMap) -> FileMap {
        let mut merged = defaults;
        merged.files.extend(self.files);
        merged
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `root`, creating parent directories. Each file
    /// ends with exactly one trailing newline. Files already under `root`
    /// but absent from the map are left alone.
    pub fn write_all(&self, root: &Path) -> BuildResult<()> {
        for (relative, content) in &self.files {
            let file = root.join(relative);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
            }

            let mut text = content.clone();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            fs::write(&file, text).map_err(|e| BuildError::io(&file, e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_entries_win_over_defaults() {
        let mut defaults = FileMap::new();
        defaults.insert("lib/rspec.rb", "RSPEC = '1.0'");
        defaults.insert("lib/other.rb", "OTHER = '1.0'");

        let mut explicit = FileMap::new();
        explicit.insert("lib/rspec.rb", "SPEC = '1.2.7'");

        let merged = explicit.over(defaults);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("lib/rspec.rb"), Some("SPEC = '1.2.7'"));
    }

    #[test]
    fn test_write_all_adds_single_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let mut files = FileMap::new();
        files.insert("lib/deep/nested/a.rb", "A = '1'");
        files.insert("b.txt", "already\n");
        files.write_all(dir.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("lib/deep/nested/a.rb")).unwrap(),
            "A = '1'\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("b.txt")).unwrap(),
            "already\n"
        );
    }

    #[test]
    fn test_write_all_leaves_unlisted_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("stale.rb"), "OLD\n").unwrap();

        let mut files = FileMap::new();
        files.insert("fresh.rb", "NEW");
        files.write_all(dir.path()).unwrap();

        assert!(dir.path().join("stale.rb").exists());
        assert!(dir.path().join("fresh.rb").exists());
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let mut files = FileMap::new();
        files.insert("lib/a.rb", "A");
        let result = files.write_all(&blocker);
        assert!(matches!(result, Err(BuildError::IoError { .. })));
    }
}

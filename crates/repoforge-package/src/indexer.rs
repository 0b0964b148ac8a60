//! On-disk index generation over a repository root

use crate::archive::read_archive_metadata;
use crate::index::Index;
use crate::spec::{PackageSpec, METADATA_EXTENSION};
use crate::{PackageError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub const SPECS_FILE: &str = "specs.json";
pub const LATEST_SPECS_FILE: &str = "latest_specs.json";
pub const PRERELEASE_SPECS_FILE: &str = "prerelease_specs.json";

/// Generates the index of a repository once all of its packages exist
pub trait IndexGenerator {
    /// Index everything under `root`, plus `entries` registered by the
    /// current batch, and write the index files. Returns the full index.
    fn generate(&self, root: &Path, entries: &Index) -> Result<Index>;
}

/// Serialized index file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    pub generated_at: String,
    pub specs: Vec<PackageSpec>,
}

/// Default generator: scans `root/gems` for archives and materialized
/// package directories, then writes `specs.json`, `latest_specs.json` and
/// `prerelease_specs.json` at the root.
#[derive(Debug, Clone)]
pub struct SpecsIndexer {
    archive_extension: String,
}

impl SpecsIndexer {
    pub fn new(archive_extension: impl Into<String>) -> Self {
        Self {
            archive_extension: archive_extension.into(),
        }
    }

    /// Collect specs already present under `root/gems`
    pub fn scan(&self, root: &Path) -> Result<Index> {
        let mut index = Index::new();
        let gems_dir = root.join("gems");
        if !gems_dir.is_dir() {
            return Ok(index);
        }

        for entry in WalkDir::new(&gems_dir)
            .min_depth(1)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| PackageError::IoError(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let extension = path.extension().and_then(|s| s.to_str());

            if entry.depth() == 1 && extension == Some(self.archive_extension.as_str()) {
                index.add_entry(read_archive_metadata(path)?);
            } else if entry.depth() == 2 && extension == Some(METADATA_EXTENSION) {
                index.add_entry(PackageSpec::from_file(path)?);
            }
        }

        Ok(index)
    }
}

impl Default for SpecsIndexer {
    fn default() -> Self {
        Self::new("gem")
    }
}

impl IndexGenerator for SpecsIndexer {
    fn generate(&self, root: &Path, entries: &Index) -> Result<Index> {
        let mut index = self.scan(root)?;
        index.merge(entries.clone());

        let generated_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        let all: Vec<PackageSpec> = index.iter().cloned().collect();
        let prerelease: Vec<PackageSpec> = all
            .iter()
            .filter(|s| s.version.is_prerelease())
            .cloned()
            .collect();

        // Highest release per (name, platform)
        let mut latest: BTreeMap<(String, String), PackageSpec> = BTreeMap::new();
        for spec in all.iter().filter(|s| !s.version.is_prerelease()) {
            let key = (spec.name.clone(), spec.platform.to_string());
            match latest.get(&key) {
                Some(existing) if existing.version >= spec.version => {}
                _ => {
                    latest.insert(key, spec.clone());
                }
            }
        }

        write_index_file(&root.join(SPECS_FILE), &generated_at, all)?;
        write_index_file(
            &root.join(LATEST_SPECS_FILE),
            &generated_at,
            latest.into_values().collect(),
        )?;
        write_index_file(&root.join(PRERELEASE_SPECS_FILE), &generated_at, prerelease)?;

        tracing::debug!(root = %root.display(), specs = index.len(), "generated index");
        Ok(index)
    }
}

fn write_index_file(path: &Path, generated_at: &str, specs: Vec<PackageSpec>) -> Result<()> {
    let file = IndexFile {
        generated_at: generated_at.to_string(),
        specs,
    };
    fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}

/// Read the full index written by [`SpecsIndexer`]
pub fn load_index(root: &Path) -> Result<Index> {
    let content = fs::read_to_string(root.join(SPECS_FILE))?;
    let file: IndexFile = serde_json::from_str(&content)?;
    Ok(file.specs.into_iter().collect())
}

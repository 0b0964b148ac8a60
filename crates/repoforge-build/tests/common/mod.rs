//! Shared fixtures for build integration tests

#![allow(dead_code)]

use repoforge_build::{ArchiveTool, BuildError, BuildResult, Forge, TarArchiver, VersionControl};
use repoforge_config::ForgeConfig;
use repoforge_package::{Index, IndexGenerator, PackageSpec, SpecsIndexer};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// One recorded version-control operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Init(PathBuf),
    StageAll(PathBuf),
    Commit(PathBuf, String),
}

/// In-memory version control: revisions are counted per repository path
#[derive(Debug, Clone, Default)]
pub struct RecordingVcs {
    pub calls: Rc<RefCell<Vec<VcsCall>>>,
    revisions: Rc<RefCell<BTreeMap<PathBuf, usize>>>,
}

impl RecordingVcs {
    pub fn revisions(&self, path: &Path) -> usize {
        self.revisions.borrow().get(path).copied().unwrap_or(0)
    }

    pub fn commits(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                VcsCall::Commit(_, message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl VersionControl for RecordingVcs {
    fn init(&self, path: &Path) -> BuildResult<()> {
        self.calls.borrow_mut().push(VcsCall::Init(path.to_path_buf()));
        self.revisions.borrow_mut().entry(path.to_path_buf()).or_insert(0);
        Ok(())
    }

    fn stage_all(&self, path: &Path) -> BuildResult<()> {
        self.calls
            .borrow_mut()
            .push(VcsCall::StageAll(path.to_path_buf()));
        Ok(())
    }

    fn commit(&self, path: &Path, message: &str) -> BuildResult<()> {
        self.calls
            .borrow_mut()
            .push(VcsCall::Commit(path.to_path_buf(), message.to_string()));
        *self
            .revisions
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_insert(0) += 1;
        Ok(())
    }

    fn head_reference(&self, path: &Path) -> BuildResult<String> {
        match self.revisions.borrow().get(path) {
            Some(n) if *n > 0 => Ok(format!("rev{}", n)),
            _ => Err(BuildError::not_a_repository(path, None)),
        }
    }
}

/// Native archiver that also records whether artifacts were installed
#[derive(Debug, Clone)]
pub struct RecordingArchiver {
    inner: TarArchiver,
    pub built: Rc<RefCell<Vec<String>>>,
    pub installed: Rc<RefCell<Vec<PathBuf>>>,
}

impl RecordingArchiver {
    pub fn new(config: &ForgeConfig) -> Self {
        Self {
            inner: TarArchiver::from_config(config),
            built: Rc::default(),
            installed: Rc::default(),
        }
    }
}

impl ArchiveTool for RecordingArchiver {
    fn build_archive(&self, spec: &PackageSpec, staged_dir: &Path) -> BuildResult<PathBuf> {
        self.built.borrow_mut().push(spec.full_name());
        self.inner.build_archive(spec, staged_dir)
    }

    fn install_ignoring_dependencies(&self, artifact: &Path) -> BuildResult<PathBuf> {
        let installed = self.inner.install_ignoring_dependencies(artifact)?;
        self.installed.borrow_mut().push(installed.clone());
        Ok(installed)
    }
}

/// JSON index writer that counts its invocations
#[derive(Debug, Clone)]
pub struct CountingIndexer {
    inner: SpecsIndexer,
    pub runs: Rc<RefCell<usize>>,
}

impl Default for CountingIndexer {
    fn default() -> Self {
        Self {
            inner: SpecsIndexer::default(),
            runs: Rc::default(),
        }
    }
}

impl IndexGenerator for CountingIndexer {
    fn generate(&self, root: &Path, entries: &Index) -> repoforge_package::Result<Index> {
        *self.runs.borrow_mut() += 1;
        self.inner.generate(root, entries)
    }
}

/// A forge over a temporary scratch root with recording collaborators
pub struct Harness {
    pub scratch: TempDir,
    pub forge: Forge,
    pub vcs: RecordingVcs,
    pub archiver: RecordingArchiver,
    pub indexer: CountingIndexer,
}

impl Harness {
    pub fn new() -> Self {
        let scratch = TempDir::new().unwrap();
        let config = ForgeConfig::with_scratch_root(scratch.path());
        let vcs = RecordingVcs::default();
        let archiver = RecordingArchiver::new(&config);
        let indexer = CountingIndexer::default();

        let forge = Forge::new(config)
            .with_version_control(vcs.clone())
            .with_archiver(archiver.clone())
            .with_indexer(indexer.clone());

        Self {
            scratch,
            forge,
            vcs,
            archiver,
            indexer,
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.scratch.path().join(relative)
    }

    pub fn index_runs(&self) -> usize {
        *self.indexer.runs.borrow()
    }
}

/// Every file under `root`, relative and sorted
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    files.sort();
    files
}

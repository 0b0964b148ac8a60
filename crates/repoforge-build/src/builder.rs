//! Package builders
//!
//! A [`PackageBuilder`] holds one package version being configured: its
//! spec and the files declared for it. Configuration happens through the
//! typed methods below; [`PackageBuilder::materialize`] then hands the
//! builder to one of the four strategies selected by [`BuilderKind`]:
//!
//! - `Lib`: write files into a directory
//! - `Git`: write files, then initialize a repository and commit them
//! - `GitUpdate`: rewrite files in an existing repository and commit a successor
//! - `Gem`: stage files privately, package them, deposit or install the artifact

use crate::archive::ArchiveTool;
use crate::error::BuildResult;
use crate::files::FileMap;
use crate::options::BuildOptions;
use crate::vcs::VersionControl;
use crate::{git, packaged};
use repoforge_config::{ForgeConfig, LayoutConfig};
use repoforge_package::{
    constant_name, default_binding, DependencyGraphBuilder, PackageSpec, Platform,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Build strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuilderKind {
    /// Plain library directory
    Lib,
    /// Library directory with a fresh version-control history
    Git,
    /// New revision on top of an existing repository
    GitUpdate,
    /// Packaged archive
    Gem,
}

impl BuilderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lib => "lib",
            Self::Git => "git",
            Self::GitUpdate => "git-update",
            Self::Gem => "gem",
        }
    }
}

/// Collaborators and shared defaults a strategy runs with
pub struct BuildEnv<'a> {
    pub config: &'a ForgeConfig,
    pub vcs: &'a dyn VersionControl,
    pub archiver: &'a dyn ArchiveTool,
    /// Destination shared by every build inside a repository block
    pub default_root: Option<&'a Path>,
}

/// Result of materializing one package version
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    /// Final spec, including the list of written files
    pub spec: PackageSpec,
    /// Package directory, or the destination directory of an archive build
    pub path: PathBuf,
    /// Deposited artifact or installed package directory (archive builds)
    pub artifact: Option<PathBuf>,
}

/// One package version under construction
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    spec: PackageSpec,
    files: FileMap,
    layout: LayoutConfig,
}

impl PackageBuilder {
    pub fn new(name: &str, version: &str, layout: &LayoutConfig) -> BuildResult<Self> {
        Ok(Self {
            spec: PackageSpec::new(name, version, None)?,
            files: FileMap::new(),
            layout: layout.clone(),
        })
    }

    pub fn spec(&self) -> &PackageSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Explicitly declared files
    pub fn files(&self) -> &FileMap {
        &self.files
    }

    /// Declare a file; replaces any earlier declaration and any default at
    /// the same path
    pub fn write(&mut self, path: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.files.insert(path, source);
        self
    }

    /// Set the executables. Each gets a launcher under the bin directory
    /// that loads the package and prints its constant.
    pub fn executables<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.executables.clear();
        let constant = constant_name(&self.spec.name);

        for name in names {
            let name = name.into();
            let launcher = format!("require '{}' ; puts {}", self.spec.name, constant);
            self.files
                .insert(format!("{}/{}", self.layout.bin_dir, name), launcher);
            self.spec.executables.insert(name);
        }
        self
    }

    pub fn platform(&mut self, tag: &str) -> BuildResult<&mut Self> {
        self.spec.platform = Platform::parse(tag)?;
        Ok(self)
    }

    pub fn summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.spec.summary = summary.into();
        self
    }

    pub fn add_runtime_dependency(&mut self, name: &str, requirement: &str) -> BuildResult<&mut Self> {
        self.spec.add_runtime_dependency(name, requirement)?;
        Ok(self)
    }

    pub fn add_development_dependency(
        &mut self,
        name: &str,
        requirement: &str,
    ) -> BuildResult<&mut Self> {
        self.spec.add_development_dependency(name, requirement)?;
        Ok(self)
    }

    /// Declare several dependencies at once
    pub fn dependencies<F>(&mut self, block: F) -> BuildResult<&mut Self>
    where
        F: FnOnce(&mut DependencyGraphBuilder<'_>) -> repoforge_package::Result<()>,
    {
        DependencyGraphBuilder::run(&mut self.spec, block)?;
        Ok(self)
    }

    pub fn add_require_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.spec.require_paths.push(path.into());
        self
    }

    pub fn add_extension(&mut self, path: impl Into<String>) -> &mut Self {
        self.spec.extensions.push(path.into());
        self
    }

    /// Turn the package into a native-extension fixture: an `ext` require
    /// path, a build script registered as extension, and a C source stub.
    /// Nothing here compiles into anything useful; installers only need to
    /// see that an extension exists.
    pub fn native_extension(&mut self) -> &mut Self {
        let name = self.spec.name.clone();
        let build_script = format!("ext/extconf.{}", self.layout.source_extension);

        self.add_require_path("ext");
        self.add_extension(build_script.clone());
        self.write(
            build_script,
            format!(
                "require \"mkmf\"\n\n\
                 exit 1 unless with_config(\"simple\")\n\n\
                 extension_name = \"{name}_c\"\n\
                 dir_config extension_name\n\
                 create_makefile extension_name"
            ),
        );
        self.write(
            format!("ext/{}.c", name),
            format!(
                "#include \"ruby.h\"\n\n\
                 void Init_{name}_c() {{\n  rb_define_module(\"{}InC\");\n}}",
                camel_case(&name)
            ),
        );
        self
    }

    /// Files generated unless suppressed: one source file binding the
    /// package constant to its version
    pub fn default_files(&self) -> FileMap {
        let mut files = FileMap::new();
        files.insert(
            format!(
                "{}/{}.{}",
                self.layout.lib_dir, self.spec.name, self.layout.source_extension
            ),
            default_binding(&self.spec.name, &self.spec.version),
        );
        files
    }

    /// Location used when neither options nor a repository block name one
    pub fn default_path(&self, config: &ForgeConfig) -> PathBuf {
        config.libs_dir().join(self.spec.full_name())
    }

    /// Directory a directory-producing strategy writes into
    pub(crate) fn package_dir(&self, env: &BuildEnv<'_>, options: &BuildOptions) -> PathBuf {
        options
            .path
            .clone()
            .or_else(|| env.default_root.map(|root| root.join(self.spec.full_name())))
            .unwrap_or_else(|| self.default_path(env.config))
    }

    /// Run the strategy for `kind`
    pub fn materialize(
        self,
        kind: BuilderKind,
        env: &BuildEnv<'_>,
        options: &BuildOptions,
    ) -> BuildResult<BuildOutcome> {
        tracing::debug!(
            kind = kind.name(),
            package = %self.spec.full_name(),
            "materializing"
        );

        match kind {
            BuilderKind::Lib => {
                let mut builder = self;
                let path = builder.package_dir(env, options);
                builder.materialize_into(&path, options.no_default, options.gemspec)?;
                Ok(builder.finish(path, None))
            }
            BuilderKind::Git => git::build(self, env, options),
            BuilderKind::GitUpdate => git::update(self, env, options),
            BuilderKind::Gem => packaged::build(self, env, options),
        }
    }

    /// Shared materialization: merge defaults under explicit files, add the
    /// metadata description, record the file list, write everything.
    pub(crate) fn materialize_into(
        &mut self,
        path: &Path,
        no_default: bool,
        gemspec: bool,
    ) -> BuildResult<()> {
        fs::create_dir_all(path).map_err(|e| crate::BuildError::io(path, e))?;

        let mut files = self.files.clone();
        if !no_default {
            files = files.over(self.default_files());
        }

        let metadata_file = self.spec.metadata_file_name();
        if gemspec {
            files.insert(metadata_file.clone(), String::new());
        }
        self.spec.files = files.paths();
        if gemspec {
            files.insert(metadata_file, self.spec.to_metadata()?);
        }

        files.write_all(path)?;
        tracing::debug!(path = %path.display(), files = files.len(), "wrote package files");
        Ok(())
    }

    pub(crate) fn finish(self, path: PathBuf, artifact: Option<PathBuf>) -> BuildOutcome {
        BuildOutcome {
            spec: self.spec,
            path,
            artifact,
        }
    }
}

/// `very_simple_binary` becomes `VerySimpleBinary`
fn camel_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

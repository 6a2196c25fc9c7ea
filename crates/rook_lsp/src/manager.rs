//! Library and file lifecycle.
//!
//! The manager owns every loaded library and the per-file units of the
//! project. Hosts report edits with [`Manager::on_changed`] and
//! [`Manager::on_remove`] and then call [`Manager::rebuild`]; queries
//! read the model between rebuilds.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rook_model::{Diagnostic, Fault, IndexAllocator, LibraryId, LibrarySet, Phase};
use rook_syntax::{FileSyntax, SpaceNode};
use rook_types::{
    check_library, declare_members, dispose, link_imports, link_inheritance, link_signatures,
    mark, tidy, unlink, FileUnit, LinkOptions,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::kernel;
use crate::manifest::{ManifestError, ProjectManifest};
use crate::provider::SourceProvider;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error("`{0}` is not the project, the kernel or a declared import")]
    UnknownLibrary(String),
    #[error("library `{0}` could not be loaded")]
    LibraryUnavailable(String),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// What one [`Manager::rebuild`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub torn_down: usize,
    pub tidied: usize,
    pub linked: usize,
    pub diagnostics: usize,
}

pub struct Manager<P> {
    manifest: ProjectManifest,
    provider: P,
    libraries: LibrarySet,
    allocator: IndexAllocator,
    /// Live project files by path.
    files: BTreeMap<String, FileUnit>,
    /// Units of the kernel and of loaded imports.
    foreign: BTreeMap<LibraryId, Vec<FileUnit>>,
    /// Paths to tear down and parse again.
    dirty: BTreeSet<String>,
    /// Paths to tear down for good.
    removed: BTreeSet<String>,
}

impl<P: SourceProvider> Manager<P> {
    /// Create a manager and load the kernel.
    pub fn new(manifest: ProjectManifest, provider: P) -> Result<Self, ManagerError> {
        let libraries = LibrarySet::new(&manifest.project.name, &manifest.analysis.kernel);
        let mut manager = Self {
            manifest,
            provider,
            libraries,
            allocator: IndexAllocator::new(),
            files: BTreeMap::new(),
            foreign: BTreeMap::new(),
            dirty: BTreeSet::new(),
            removed: BTreeSet::new(),
        };
        manager.load_kernel()?;
        Ok(manager)
    }

    /// Create a manager for the project whose `rook.toml` sits in `dir`.
    pub fn open(dir: &Path, provider: P) -> Result<Self, ManagerError> {
        let manifest = ProjectManifest::load_dir(dir)?;
        debug!(project = %manifest.project.name, dir = %dir.display(), "opened project");
        Self::new(manifest, provider)
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn libraries(&self) -> &LibrarySet {
        &self.libraries
    }

    fn options(&self) -> LinkOptions {
        LinkOptions {
            suggestions: self.manifest.analysis.suggestions,
        }
    }

    /// The unit compiled from `path`, in any library.
    pub fn unit(&self, path: &str) -> Option<&FileUnit> {
        self.files.get(path).or_else(|| {
            self.foreign
                .values()
                .flatten()
                .find(|unit| unit.path() == path)
        })
    }

    /// Project units in path order, then kernel and import units.
    pub fn units(&self) -> impl Iterator<Item = &FileUnit> {
        self.files.values().chain(self.foreign.values().flatten())
    }

    /// Paths of the live project files.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    fn load_kernel(&mut self) -> Result<(), ManagerError> {
        let name = self.manifest.analysis.kernel.clone();
        let sources = match self.provider.load_library(&name) {
            Some(sources) => sources,
            None => {
                debug!(kernel = %name, "provider has no kernel sources, using the built-in kernel");
                kernel::builtin()
            }
        };
        let units = self.compile_library(LibraryId::KERNEL, sources)?;
        let diagnostics: usize = units.iter().map(|unit| unit.diagnostics.len()).sum();
        if diagnostics > 0 {
            warn!(kernel = %name, diagnostics, "kernel library has diagnostics");
        }
        self.foreign.insert(LibraryId::KERNEL, units);
        Ok(())
    }

    /// Resolve a library name: the kernel, the project itself, an import
    /// already loaded, or a declared import loaded now.
    pub fn try_load_library(&mut self, name: &str) -> Result<LibraryId, ManagerError> {
        if name == self.manifest.analysis.kernel {
            return Ok(LibraryId::KERNEL);
        }
        if name == self.manifest.project.name {
            return Ok(LibraryId::SELF);
        }
        if let Some(id) = self.libraries.by_name(name) {
            return Ok(id);
        }
        if !self.manifest.imports(name) {
            return Err(ManagerError::UnknownLibrary(name.to_string()));
        }
        let sources = self
            .provider
            .load_library(name)
            .ok_or_else(|| ManagerError::LibraryUnavailable(name.to_string()))?;

        let id = self.libraries.add_import(name);
        let units = self.compile_library(id, sources)?;
        debug!(library = %name, %id, files = units.len(), "loaded import");
        self.foreign.insert(id, units);
        Ok(id)
    }

    /// Tidy, link and check one immutable library in full.
    fn compile_library(
        &mut self,
        library: LibraryId,
        sources: Vec<FileSyntax>,
    ) -> Result<Vec<FileUnit>, ManagerError> {
        let mut units = vec![];
        for syntax in sources {
            let mut unit = FileUnit::new(syntax, library);
            tidy(&mut self.libraries, &mut self.allocator, &mut unit)?;
            units.push(unit);
        }
        if !library.is_kernel() {
            let names: BTreeSet<String> = units
                .iter()
                .flat_map(|unit| import_roots(&unit.syntax.root))
                .collect();
            self.load_imports(names);
        }
        let options = self.options();
        link_units(&mut self.libraries, units.iter_mut(), options);
        let mut check = check_library(&mut self.libraries, library);
        for unit in units.iter_mut() {
            for diagnostic in check.remove(unit.path()).unwrap_or_default() {
                unit.diagnostics.push(Phase::Check, diagnostic);
            }
        }
        Ok(units)
    }

    /// Load every declared import among `names`. Failures only leave the
    /// import unresolved; Link reports it where it is used.
    fn load_imports(&mut self, names: BTreeSet<String>) {
        for name in names {
            if !self.manifest.imports(&name) || self.libraries.by_name(&name).is_some() {
                continue;
            }
            if let Err(error) = self.try_load_library(&name) {
                warn!(library = %name, %error, "import could not be loaded");
            }
        }
    }

    /// Queue `path` for teardown and reparse.
    pub fn on_changed(&mut self, path: &str) {
        self.removed.remove(path);
        self.dirty.insert(path.to_string());
    }

    /// Queue `path` for teardown without reparse.
    pub fn on_remove(&mut self, path: &str) {
        self.dirty.remove(path);
        self.removed.insert(path.to_string());
    }

    /// Whether edits are waiting for [`Manager::rebuild`].
    pub fn is_pending(&self) -> bool {
        !self.dirty.is_empty() || !self.removed.is_empty()
    }

    /// Apply every queued change: tear down, parse, tidy, link every live
    /// file, then check the whole project library.
    pub fn rebuild(&mut self) -> Result<RebuildReport, ManagerError> {
        let mut report = RebuildReport::default();

        // Teardown: strip every file first, then detach.
        let doomed: Vec<String> = self
            .dirty
            .iter()
            .chain(&self.removed)
            .filter(|path| self.files.contains_key(*path))
            .cloned()
            .collect();
        let mut torn = vec![];
        for path in &doomed {
            if let Some(mut unit) = self.files.remove(path) {
                mark(&mut self.libraries, &mut self.allocator, &mut unit)?;
                torn.push(unit);
            }
        }
        for unit in torn.iter_mut() {
            dispose(&mut self.libraries, unit);
        }
        report.torn_down = torn.len();
        self.removed.clear();
        debug!(files = report.torn_down, "torn down");

        for unit in self.files.values_mut() {
            unlink(&mut self.libraries, unit);
        }

        let pending = std::mem::take(&mut self.dirty);
        let mut parsed = vec![];
        for path in pending {
            match self.provider.parse_document(&path) {
                Some(syntax) => parsed.push(FileUnit::new(syntax, LibraryId::SELF)),
                None => debug!(%path, "document is gone, treating it as removed"),
            }
        }
        for mut unit in parsed {
            tidy(&mut self.libraries, &mut self.allocator, &mut unit)?;
            self.files.insert(unit.path().to_string(), unit);
            report.tidied += 1;
        }
        debug!(files = report.tidied, "tidied");

        let names: BTreeSet<String> = self
            .files
            .values()
            .flat_map(|unit| import_roots(&unit.syntax.root))
            .collect();
        self.load_imports(names);

        let options = self.options();
        report.linked = link_units(&mut self.libraries, self.files.values_mut(), options);
        debug!(files = report.linked, "linked");

        let mut check = check_library(&mut self.libraries, LibraryId::SELF);
        for (path, unit) in self.files.iter_mut() {
            unit.diagnostics.clear(Phase::Check);
            for diagnostic in check.remove(path).unwrap_or_default() {
                unit.diagnostics.push(Phase::Check, diagnostic);
            }
        }

        report.diagnostics = self.files.values().map(|unit| unit.diagnostics.len()).sum();
        info!(
            torn_down = report.torn_down,
            tidied = report.tidied,
            linked = report.linked,
            diagnostics = report.diagnostics,
            "rebuild finished"
        );
        Ok(report)
    }

    /// Diagnostics of one document, in phase order.
    pub fn diagnostics(&self, path: &str) -> Vec<Diagnostic> {
        self.unit(path)
            .map(|unit| unit.diagnostics.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Diagnostics of every project document that has any.
    pub fn all_diagnostics(&self) -> BTreeMap<String, Vec<Diagnostic>> {
        self.files
            .iter()
            .filter(|(_, unit)| !unit.diagnostics.is_empty())
            .map(|(path, unit)| (path.clone(), unit.diagnostics.iter().cloned().collect()))
            .collect()
    }
}

/// Run the four Link steps, each across every unit before the next.
fn link_units<'a>(
    libraries: &mut LibrarySet,
    units: impl IntoIterator<Item = &'a mut FileUnit>,
    options: LinkOptions,
) -> usize {
    let mut units: Vec<&mut FileUnit> = units.into_iter().collect();
    for unit in units.iter_mut() {
        link_imports(libraries, unit);
    }
    for unit in units.iter_mut() {
        declare_members(libraries, unit);
    }
    for unit in units.iter_mut() {
        link_inheritance(libraries, unit, options);
    }
    for unit in units.iter_mut() {
        link_signatures(libraries, unit, options);
    }
    units.len()
}

/// First segment of every import directive in a file.
fn import_roots(node: &SpaceNode) -> Vec<String> {
    let mut roots: Vec<String> = node
        .imports
        .iter()
        .filter_map(|import| import.path.first())
        .map(|ident| ident.name.clone())
        .collect();
    for child in &node.children {
        roots.extend(import_roots(child));
    }
    roots
}

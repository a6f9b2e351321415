//! Extension registry
//!
//! Holds loaded extensions by name and owns their lifecycle. One reader/writer
//! lock guards the whole table. Dispatch takes a snapshot of the instances and
//! releases the lock before calling any hook method.

use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Extension;
use super::loader::{self, LoadedArtifact};
use crate::error::{LoadError, RegistryError};
use crate::hook::HookKind;

/// Listing entry for a registered extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub path: PathBuf,
    pub description: String,
}

struct Registered {
    extension: Arc<dyn Extension>,
    path: PathBuf,
}

#[derive(Default)]
pub struct Registry {
    plugins: RwLock<IndexMap<String, Registered>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Registered>> {
        self.plugins.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Registered>> {
        self.plugins.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load one artifact, initialize it, and register it under its derived name.
    /// Returns the registered name.
    pub fn load(&self, path: &Path) -> Result<String, LoadError> {
        let mut plugins = self.write();

        let LoadedArtifact { name, path, extension } = loader::open_artifact(path)?;
        install(&mut plugins, &name, path.clone(), Arc::from(extension))?;
        log::info!("Loaded plugin '{}' from {}", name, path.display());
        Ok(name)
    }

    /// Load every artifact directly inside `dir`.
    ///
    /// Successes stay registered even when some artifacts fail; the failures
    /// are returned together. Returns the number of extensions loaded.
    pub fn load_all(&self, dir: &Path) -> Result<usize, RegistryError> {
        if dir.as_os_str().is_empty() {
            return Err(RegistryError::NoDirectory);
        }
        if !dir.exists() {
            return Err(RegistryError::DirectoryMissing(dir.to_path_buf()));
        }

        let scan_error = |source: std::io::Error| RegistryError::Scan {
            path: dir.to_path_buf(),
            source,
        };
        let mut artifacts = Vec::new();
        for entry in fs::read_dir(dir).map_err(scan_error)? {
            let path = entry.map_err(scan_error)?.path();
            if loader::is_artifact(&path) {
                artifacts.push(path);
            }
        }
        artifacts.sort();

        let mut loaded = 0;
        let mut failures = Vec::new();
        for path in artifacts {
            match self.load(&path) {
                Ok(_) => loaded += 1,
                Err(e) => {
                    log::warn!("Failed to load plugin {}: {}", path.display(), e);
                    failures.push(e);
                }
            }
        }

        if failures.is_empty() {
            Ok(loaded)
        } else {
            Err(RegistryError::PartialLoad(failures))
        }
    }

    /// Clean up and remove an extension. It is removed even if cleanup fails.
    #[allow(dead_code)] // The CLI releases everything through shutdown
    pub fn unload(&self, name: &str) -> Result<(), RegistryError> {
        let mut plugins = self.write();

        let registered = plugins
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let cleanup = registered.extension.cleanup();
        plugins.shift_remove(name);

        log::info!("Unloaded plugin '{}'", name);
        cleanup.map_err(|source| RegistryError::Cleanup {
            name: name.to_string(),
            source,
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.read().get(name).map(|r| Arc::clone(&r.extension))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of registered extensions in registry order
    pub fn list(&self) -> Vec<PluginInfo> {
        let entries: Vec<(String, PathBuf, Arc<dyn Extension>)> = self
            .read()
            .iter()
            .map(|(name, registered)| (name.clone(), registered.path.clone(), Arc::clone(&registered.extension)))
            .collect();

        entries
            .into_iter()
            .map(|(name, path, extension)| PluginInfo {
                name,
                path,
                description: extension.metadata().description,
            })
            .collect()
    }

    /// Instances in registry order, detached from the lock
    pub fn extensions(&self) -> Vec<(String, Arc<dyn Extension>)> {
        self.read()
            .iter()
            .map(|(name, registered)| (name.clone(), Arc::clone(&registered.extension)))
            .collect()
    }

    /// Matcher pattern to extension names for a tool event, in registry order
    pub fn matcher_map(&self, kind: HookKind) -> IndexMap<String, Vec<String>> {
        let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
        for (name, extension) in self.extensions() {
            let metadata = extension.metadata();
            if let Some(matcher) = metadata.matcher.for_kind(kind) {
                map.entry(matcher.to_string()).or_default().push(name);
            }
        }
        map
    }

    /// Clean up every extension and clear the registry, even if cleanups fail
    pub fn shutdown(&self) -> Result<(), RegistryError> {
        let mut plugins = self.write();

        let errors: Vec<RegistryError> = plugins
            .iter()
            .filter_map(|(name, registered)| {
                registered
                    .extension
                    .cleanup()
                    .err()
                    .map(|source| RegistryError::Cleanup {
                        name: name.clone(),
                        source,
                    })
            })
            .collect();

        let count = plugins.len();
        plugins.clear();
        log::debug!("Registry shut down, {} plugin(s) released", count);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::Shutdown(errors))
        }
    }
}

/// Initialize `extension` and insert it, releasing any instance it replaces
fn install(
    plugins: &mut IndexMap<String, Registered>,
    name: &str,
    path: PathBuf,
    extension: Arc<dyn Extension>,
) -> Result<(), LoadError> {
    extension.initialize().map_err(|source| LoadError::Initialize {
        path: path.clone(),
        source,
    })?;
    let previous = plugins.insert(name.to_string(), Registered { extension, path });
    retire(name, previous);
    Ok(())
}

/// Clean up an instance replaced by a later load under the same name
fn retire(name: &str, previous: Option<Registered>) {
    let Some(previous) = previous else {
        return;
    };
    log::warn!(
        "Plugin '{}' replaced, releasing previous instance from {}",
        name,
        previous.path.display()
    );
    if let Err(e) = previous.extension.cleanup() {
        log::warn!("Failed to cleanup replaced plugin '{}': {}", name, e);
    }
}

#[cfg(test)]
impl Registry {
    /// Register an already-constructed extension, running its initialize hook
    pub fn register(&self, name: &str, path: PathBuf, extension: Arc<dyn Extension>) -> Result<(), LoadError> {
        install(&mut self.write(), name, path, extension)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }
}

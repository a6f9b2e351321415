//! Extension loading
//!
//! Opens an artifact, resolves its factory entry point, and produces an
//! uninitialized instance. The registry runs `initialize` afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use super::executor::SubprocessExtension;
use super::manifest::{ArtifactManifest, Factory, FactoryProblem};
use super::{ARTIFACT_SUFFIX, Extension, builtin};
use crate::error::LoadError;

/// An opened artifact, ready for initialization
pub struct LoadedArtifact {
    pub name: String,
    pub path: PathBuf,
    pub extension: Box<dyn Extension>,
}

/// Extension name derived from the artifact file name
pub fn plugin_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    file_name
        .strip_suffix(ARTIFACT_SUFFIX)
        .map(str::to_string)
        .unwrap_or(file_name)
}

pub fn is_artifact(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(ARTIFACT_SUFFIX))
}

/// Open the artifact at `path` and instantiate its extension
pub fn open_artifact(path: &Path) -> Result<LoadedArtifact, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = content.parse::<ArtifactManifest>().map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let factory = manifest.factory().map_err(|problem| match problem {
        FactoryProblem::Missing => LoadError::MissingFactory {
            path: path.to_path_buf(),
        },
        FactoryProblem::WrongShape(reason) => LoadError::BadFactory {
            path: path.to_path_buf(),
            reason,
        },
    })?;

    let abs_path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let name = plugin_name(path);
    let workdir = abs_path.parent().map(Path::to_path_buf).unwrap_or_default();

    let extension = instantiate(&name, &workdir, &manifest, factory).map_err(|reason| LoadError::NilInstance {
        path: path.to_path_buf(),
        reason,
    })?;

    log::debug!("Opened plugin '{}' from {}", name, abs_path.display());

    Ok(LoadedArtifact {
        name,
        path: abs_path,
        extension,
    })
}

fn instantiate(
    name: &str,
    workdir: &Path,
    manifest: &ArtifactManifest,
    factory: Factory,
) -> Result<Box<dyn Extension>, String> {
    match factory {
        Factory::Builtin { builtin } => match builtin::factory(&builtin) {
            Some(create) => Ok(create()),
            None => Err(format!(
                "unknown builtin '{}' (available: {})",
                builtin,
                builtin::names().collect::<Vec<_>>().join(", ")
            )),
        },
        Factory::Command { command, args, env } => {
            if command.trim().is_empty() {
                return Err("empty command".to_string());
            }
            Ok(Box::new(SubprocessExtension::new(
                name,
                workdir,
                &command,
                args,
                env,
                manifest.plugin.language,
                manifest.metadata(),
                manifest.lifecycle,
            )))
        }
    }
}

//! Error types for extension loading, event decoding and registry lifecycle.

use std::path::PathBuf;
use thiserror::Error;

use crate::hook::HookKind;

/// Errors raised while turning an artifact path into a registered extension.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("plugin file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read plugin {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open plugin {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("plugin {} does not export a '{}' factory", path.display(), crate::plugin::FACTORY_KEY)]
    MissingFactory { path: PathBuf },

    #[error("plugin {} '{}' factory has wrong shape: {reason}", path.display(), crate::plugin::FACTORY_KEY)]
    BadFactory { path: PathBuf, reason: String },

    #[error("plugin {} '{}' factory returned no instance: {reason}", path.display(), crate::plugin::FACTORY_KEY)]
    NilInstance { path: PathBuf, reason: String },

    #[error("failed to initialize plugin {}: {source}", path.display())]
    Initialize {
        path: PathBuf,
        #[source]
        source: ExtensionError,
    },
}

/// Errors raised while decoding the incoming hook event.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON input: {0}")]
    Json(#[source] serde_json::Error),

    #[error("missing or invalid hook_event_name")]
    MissingKind,

    #[error("unknown hook type: {0}")]
    UnknownKind(String),

    #[error("invalid {kind} input: {source}")]
    Schema {
        kind: HookKind,
        #[source]
        source: serde_json::Error,
    },
}

/// An error returned by an extension from one of its hook or lifecycle methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExtensionError {
    pub message: String,
}

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("plugin directory not set")]
    NoDirectory,

    #[error("plugin directory does not exist: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("failed to scan plugin directory {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load some plugins: {}", join_errors(.0))]
    PartialLoad(Vec<LoadError>),

    #[error("plugin {0} not found")]
    NotFound(String),

    #[error("failed to cleanup plugin {name}: {source}")]
    Cleanup {
        name: String,
        #[source]
        source: ExtensionError,
    },

    #[error("shutdown errors: {}", join_errors(.0))]
    Shutdown(Vec<RegistryError>),
}

/// Raised when a plugin name matches no artifact in any search location.
#[derive(Debug, Error)]
#[error("plugin '{name}' not found (searched: {})", searched_list(.searched))]
pub struct PluginNotFound {
    pub name: String,
    pub searched: Vec<PathBuf>,
}

fn searched_list(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

fn join_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

//! Command implementations

pub mod completions;
pub mod configure;
pub mod execute;
pub mod list;

use eyre::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::error::RegistryError;
use crate::plugin::Registry;
use crate::resolve::Resolver;

/// Build a registry from the named plugins, or from the whole plugin
/// directory when none are named.
///
/// A directory load keeps the plugins that loaded and only warns about the
/// rest. Named plugins must all load.
pub fn load_registry(plugins: &[String], dir: Option<&Path>, config: &Config) -> Result<Registry> {
    let registry = Registry::new();

    if plugins.is_empty() {
        let plugins_dir = dir.map(Config::expand_path).unwrap_or_else(|| config.plugins_dir());
        match registry.load_all(&plugins_dir) {
            Ok(count) => log::info!("Loaded {} plugin(s) from {}", count, plugins_dir.display()),
            Err(e @ RegistryError::PartialLoad(_)) => {
                log::warn!("{}", e);
            }
            Err(e) => return Err(e).context("Failed to load plugins"),
        }
        return Ok(registry);
    }

    let resolver = Resolver::new(dir, config);
    for path in resolver.resolve_all(plugins)? {
        registry
            .load(&path)
            .with_context(|| format!("Failed to load plugin {}", path.display()))?;
    }
    Ok(registry)
}

/// Release every plugin, logging cleanup failures
pub fn release(registry: &Registry) {
    if let Err(e) = registry.shutdown() {
        log::warn!("{}", e);
    }
}

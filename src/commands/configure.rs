//! Configure command
//!
//! Registers the loaded plugins' matchers in the supervisor settings file.

use colored::*;
use eyre::Result;
use std::path::{Path, PathBuf};

use super::{load_registry, release};
use crate::config::Config;
use crate::hook::HookKind;
use crate::plugin::Registry;
use crate::settings::ClaudeSettings;

pub fn run(plugins: &[String], settings: Option<PathBuf>, dir: Option<&Path>, config: &Config) -> Result<()> {
    let registry = load_registry(plugins, dir, config)?;
    let result = configure(&registry, settings, config);
    release(&registry);
    result
}

fn configure(registry: &Registry, settings: Option<PathBuf>, config: &Config) -> Result<()> {
    if registry.is_empty() {
        eyre::bail!("no plugins loaded");
    }

    let settings_path = settings
        .map(|p| Config::expand_path(&p))
        .unwrap_or_else(|| config.settings_path());

    let shown = Config::display_path(&settings_path);
    println!(
        "{} Configuring {} plugin(s) in {}",
        "→".blue(),
        registry.len(),
        shown.as_str().cyan()
    );

    update_settings(registry, &settings_path, &config.command_name)?;

    println!("{} Settings updated", "✓".green());
    Ok(())
}

/// Merge the registry's matcher maps into the settings file at `path`
pub fn update_settings(registry: &Registry, path: &Path, command_name: &str) -> Result<()> {
    let mut settings = ClaudeSettings::load(path)?;
    settings.apply(
        &registry.matcher_map(HookKind::PreToolUse),
        &registry.matcher_map(HookKind::PostToolUse),
        command_name,
    );
    settings.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::builtin::{env::EnvGuard, gocheck::GoCheck};
    use serde_json::Value;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_update_settings_writes_both_kinds() {
        let registry = Registry::new();
        registry.register("env", PathBuf::from("/env"), Arc::new(EnvGuard)).unwrap();
        registry
            .register("gocheck", PathBuf::from("/gocheck"), Arc::new(GoCheck::default()))
            .unwrap();

        let temp = tempdir().unwrap();
        let path = temp.path().join(".claude").join("settings.local.json");
        update_settings(&registry, &path, "hookhost").unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let pre = &value["hooks"]["PreToolUse"][0];
        assert_eq!(pre["matcher"], "Read|Write|Edit|MultiEdit");
        assert_eq!(pre["hooks"][0]["command"], "hookhost execute env");
        let post = &value["hooks"]["PostToolUse"][0];
        assert_eq!(post["matcher"], "Write|Edit|MultiEdit");
        assert_eq!(post["hooks"][0]["command"], "hookhost execute gocheck");
    }

    #[test]
    fn test_empty_registry_is_error() {
        let temp = tempdir().unwrap();
        let err = configure(
            &Registry::new(),
            Some(temp.path().join("settings.json")),
            &Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no plugins loaded"));
        assert!(!temp.path().join("settings.json").exists());
    }
}

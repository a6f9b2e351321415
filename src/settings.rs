//! Supervisor settings document
//!
//! `configure` rewrites the PreToolUse/PostToolUse hook lists so that each
//! matcher calls back into hookhost for the plugins registered under it.
//! Keys hookhost does not manage are carried through untouched.

use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Matcher pattern to ordered plugin names
pub type MatcherMap = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClaudeSettings {
    #[serde(default)]
    pub permissions: Permissions,

    #[serde(default)]
    pub hooks: Hooks,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Permissions {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
    #[serde(default)]
    pub ask: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Hooks {
    #[serde(rename = "PreToolUse", default)]
    pub pre_tool_use: Vec<HookConfig>,

    #[serde(rename = "PostToolUse", default)]
    pub post_tool_use: Vec<HookConfig>,

    /// Other hook kinds (Stop, Notification, ...) configured by hand
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HookConfig {
    #[serde(default)]
    pub matcher: String,

    #[serde(default)]
    pub hooks: Vec<HookEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HookEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HookEntry {
    /// Command entry that runs `plugin` through hookhost
    pub fn for_plugin(command_name: &str, plugin: &str) -> Self {
        Self {
            kind: "command".to_string(),
            command: format!("{} execute {}", command_name, plugin),
            extra: Map::new(),
        }
    }
}

impl ClaudeSettings {
    /// Load the settings document; a missing file yields an empty one
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Settings file {} does not exist, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read settings file")?;
        let settings = serde_json::from_str(&content).context("Failed to parse settings file")?;
        Ok(settings)
    }

    /// Write pretty JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let mut content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        content.push('\n');
        fs::write(path, content).context(format!("Failed to write {}", path.display()))?;
        log::info!("Wrote settings to {}", path.display());
        Ok(())
    }

    pub fn apply(&mut self, pre_tool_use: &MatcherMap, post_tool_use: &MatcherMap, command_name: &str) {
        merge_hook_configs(&mut self.hooks.pre_tool_use, pre_tool_use, command_name);
        merge_hook_configs(&mut self.hooks.post_tool_use, post_tool_use, command_name);
    }
}

/// Replace the hook list of matchers named in `plugins`, keep the rest, and
/// append matchers that are not configured yet
pub fn merge_hook_configs(existing: &mut Vec<HookConfig>, plugins: &MatcherMap, command_name: &str) {
    let entries = |names: &[String]| -> Vec<HookEntry> {
        names
            .iter()
            .map(|name| HookEntry::for_plugin(command_name, name))
            .collect()
    };

    for config in existing.iter_mut() {
        if let Some(names) = plugins.get(&config.matcher) {
            config.hooks = entries(names);
        }
    }

    for (matcher, names) in plugins {
        if existing.iter().any(|c| &c.matcher == matcher) {
            continue;
        }
        existing.push(HookConfig {
            matcher: matcher.clone(),
            hooks: entries(names),
            extra: Map::new(),
        });
    }
}

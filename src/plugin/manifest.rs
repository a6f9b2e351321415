//! Extension artifact parsing (`<name>.plugin.yaml`)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{ExtensionMetadata, FACTORY_KEY, Matchers};
use crate::hook::HookKind;

/// Artifact structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactManifest {
    #[serde(default)]
    pub plugin: PluginSection,

    #[serde(default)]
    pub matcher: Matchers,

    /// Non-tool kinds handled by the extension
    #[serde(default)]
    pub events: Vec<HookKind>,

    /// Run the command for Initialize/Cleanup as well
    #[serde(default)]
    pub lifecycle: bool,

    /// Raw factory entry; its shape is checked separately by `factory()`
    #[serde(default, rename = "new", skip_serializing_if = "Option::is_none")]
    pub factory: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PluginSection {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub language: PluginLanguage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginLanguage {
    Python,
    Rust,
    #[default]
    Binary,
    Mixed,
}

/// The factory entry point of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Factory {
    /// An extension compiled into the host
    Builtin { builtin: String },
    /// An external program speaking the stdin/stdout JSON protocol
    Command {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: IndexMap<String, String>,
    },
}

/// Why the factory entry could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryProblem {
    Missing,
    WrongShape(String),
}

impl std::str::FromStr for ArtifactManifest {
    type Err = serde_yaml::Error;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        serde_yaml::from_str(content)
    }
}

impl ArtifactManifest {
    /// Resolve the factory entry under the well-known key
    pub fn factory(&self) -> Result<Factory, FactoryProblem> {
        let raw = self.factory.as_ref().ok_or(FactoryProblem::Missing)?;
        if raw.is_null() {
            return Err(FactoryProblem::Missing);
        }
        serde_yaml::from_value(raw.clone()).map_err(|e| {
            FactoryProblem::WrongShape(format!("expected `{}: {{builtin: ..}}` or `{}: {{command: ..}}`: {}", FACTORY_KEY, FACTORY_KEY, e))
        })
    }

    pub fn metadata(&self) -> ExtensionMetadata {
        ExtensionMetadata {
            description: self.plugin.description.clone(),
            matcher: self.matcher.clone(),
            events: self.events.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMAND_ARTIFACT: &str = r#"
plugin:
  description: Block reads of real .env files
  language: python
matcher:
  PreToolUse: "Read|Write|Edit|MultiEdit"
events: [Stop]
lifecycle: true
new:
  command: hooks/env.py
  args: ["--strict"]
  env:
    LEVEL: high
"#;

    #[test]
    fn test_parse_command_artifact() {
        let manifest = COMMAND_ARTIFACT.parse::<ArtifactManifest>().unwrap();
        assert_eq!(manifest.plugin.description, "Block reads of real .env files");
        assert_eq!(manifest.plugin.language, PluginLanguage::Python);
        assert_eq!(manifest.matcher.pre_tool_use, "Read|Write|Edit|MultiEdit");
        assert!(manifest.matcher.post_tool_use.is_empty());
        assert_eq!(manifest.events, vec![HookKind::Stop]);
        assert!(manifest.lifecycle);

        match manifest.factory().unwrap() {
            Factory::Command { command, args, env } => {
                assert_eq!(command, "hooks/env.py");
                assert_eq!(args, vec!["--strict"]);
                assert_eq!(env.get("LEVEL").map(String::as_str), Some("high"));
            }
            other => panic!("unexpected factory: {:?}", other),
        }
    }

    #[test]
    fn test_parse_builtin_artifact() {
        let manifest = "new:\n  builtin: env\n".parse::<ArtifactManifest>().unwrap();
        assert_eq!(manifest.plugin.language, PluginLanguage::Binary);
        assert_eq!(
            manifest.factory().unwrap(),
            Factory::Builtin {
                builtin: "env".to_string()
            }
        );
    }

    #[test]
    fn test_missing_factory() {
        let manifest = "plugin:\n  description: nothing\n".parse::<ArtifactManifest>().unwrap();
        assert_eq!(manifest.factory(), Err(FactoryProblem::Missing));

        let manifest = "new: ~\n".parse::<ArtifactManifest>().unwrap();
        assert_eq!(manifest.factory(), Err(FactoryProblem::Missing));
    }

    #[test]
    fn test_wrong_factory_shape() {
        let manifest = "new: hooks/env.py\n".parse::<ArtifactManifest>().unwrap();
        assert!(matches!(manifest.factory(), Err(FactoryProblem::WrongShape(_))));

        let manifest = "new:\n  script: x\n".parse::<ArtifactManifest>().unwrap();
        assert!(matches!(manifest.factory(), Err(FactoryProblem::WrongShape(_))));
    }

    #[test]
    fn test_unknown_event_kind_is_malformed() {
        assert!("events: [SessionStart]\n".parse::<ArtifactManifest>().is_err());
    }
}

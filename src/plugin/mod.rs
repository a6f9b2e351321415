//! Extension capability interface, loading, and registry
//!
//! This module handles:
//! - The `Extension` trait every plugin implements
//! - Parsing extension artifacts (`*.plugin.yaml`)
//! - Resolving an artifact's factory into a live instance
//! - Running subprocess extensions over stdin/stdout JSON
//! - Owning extension lifecycle in the `Registry`

use serde::{Deserialize, Serialize};

pub mod builtin;
pub mod executor;
pub mod loader;
pub mod manifest;
pub mod registry;

use crate::error::ExtensionError;
use crate::hook::HookKind;
use crate::hook::event::{NotificationInput, PostToolUseInput, StopInput, SubagentStopInput, ToolInput};
use crate::hook::verdict::{DecisionOutput, HookOutput, PostToolUseOutput, PreToolUseOutput, StopOutput};

pub use registry::Registry;

/// File suffix that marks an extension artifact
pub const ARTIFACT_SUFFIX: &str = ".plugin.yaml";

/// Well-known key naming an artifact's factory entry point
pub const FACTORY_KEY: &str = "new";

/// What an extension hook method returns: an optional verdict or an error
pub type HookReturn<T> = Result<Option<T>, ExtensionError>;

/// Tool-name patterns an extension registers for, consumed by the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Matchers {
    #[serde(rename = "PreToolUse", default)]
    pub pre_tool_use: String,

    #[serde(rename = "PostToolUse", default)]
    pub post_tool_use: String,
}

impl Matchers {
    pub fn for_kind(&self, kind: HookKind) -> Option<&str> {
        let matcher = match kind {
            HookKind::PreToolUse => &self.pre_tool_use,
            HookKind::PostToolUse => &self.post_tool_use,
            _ => return None,
        };
        if matcher.is_empty() { None } else { Some(matcher) }
    }
}

/// Declared extension metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionMetadata {
    pub description: String,
    pub matcher: Matchers,
    /// Non-tool kinds the extension handles
    pub events: Vec<HookKind>,
}

impl ExtensionMetadata {
    /// Whether the extension declared support for `kind`
    pub fn supports(&self, kind: HookKind) -> bool {
        self.matcher.for_kind(kind).is_some() || self.events.contains(&kind)
    }
}

/// The capability interface every extension implements.
///
/// Hook methods return `Ok(None)` when the extension has nothing to say, which
/// is different from an explicit approve. The default hook bodies panic: the
/// dispatcher only calls methods for kinds declared in `metadata()`, so
/// reaching one of them is a contract violation in the extension.
pub trait Extension: Send + Sync {
    fn metadata(&self) -> ExtensionMetadata;

    fn initialize(&self) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn cleanup(&self) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn pre_tool_use(&self, _input: &ToolInput) -> HookReturn<PreToolUseOutput> {
        unimplemented_hook(HookKind::PreToolUse)
    }

    fn post_tool_use(&self, _input: &PostToolUseInput) -> HookReturn<PostToolUseOutput> {
        unimplemented_hook(HookKind::PostToolUse)
    }

    fn notification(&self, _input: &NotificationInput) -> HookReturn<HookOutput> {
        unimplemented_hook(HookKind::Notification)
    }

    fn stop(&self, _input: &StopInput) -> HookReturn<StopOutput> {
        unimplemented_hook(HookKind::Stop)
    }

    fn subagent_stop(&self, _input: &SubagentStopInput) -> HookReturn<DecisionOutput> {
        unimplemented_hook(HookKind::SubagentStop)
    }
}

fn unimplemented_hook(kind: HookKind) -> ! {
    panic!("extension does not implement the {} hook", kind)
}

//! Hook event dispatching
//!
//! Runs every registered extension that declared the event's kind, in
//! registry order. The first error or block stops the chain; otherwise the
//! last extension's outcome wins.

use super::event::HookEvent;
use super::outcome::Outcome;
use super::verdict::{PostToolUseOutput, PreToolUseOutput, StopOutput, Verdict};
use crate::error::ExtensionError;
use crate::plugin::{Extension, Registry};

/// Decode `raw` and run it through the registry
pub fn dispatch(registry: &Registry, raw: &[u8]) -> Outcome {
    let extensions = registry.extensions();
    if extensions.is_empty() {
        return Outcome::error("no plugins loaded");
    }

    let event = match HookEvent::decode(raw) {
        Ok(event) => event,
        Err(e) => {
            log::error!("Failed to decode hook event: {}", e);
            return Outcome::error(e.to_string());
        }
    };

    log::info!(
        "Dispatching {} (session {}) to {} plugin(s)",
        event.kind(),
        event.base().session_id,
        extensions.len()
    );

    let mut last: Option<Outcome> = None;
    for (name, extension) in &extensions {
        if !extension.metadata().supports(event.kind()) {
            log::debug!("Plugin '{}' does not handle {}, skipping", name, event.kind());
            continue;
        }

        let outcome = invoke(extension.as_ref(), &event);
        match &outcome {
            Outcome::Block { stderr } => {
                log::info!("Plugin '{}' blocked: {}", name, stderr.trim_end());
                return outcome;
            }
            Outcome::Error { stderr } => {
                log::error!("Plugin '{}' error: {}", name, stderr);
                return outcome;
            }
            Outcome::Success { .. } => {
                log::debug!("Plugin '{}' allowed {}", name, event.kind());
            }
        }
        last = Some(outcome);
    }

    // Nobody handled the kind: behave as if one extension had no opinion
    last.unwrap_or_else(|| fallback(&event))
}

/// Call the extension method for the event's kind and reduce its verdict
pub fn invoke(extension: &dyn Extension, event: &HookEvent) -> Outcome {
    match event {
        HookEvent::PreToolUse(input) => {
            reduce(extension.pre_tool_use(input).map(|v| Some(v.unwrap_or_else(PreToolUseOutput::fallback))))
        }
        HookEvent::PostToolUse(input) => {
            reduce(extension.post_tool_use(input).map(|v| Some(v.unwrap_or_else(PostToolUseOutput::fallback))))
        }
        HookEvent::Notification(input) => reduce(extension.notification(input)),
        HookEvent::Stop(input) => reduce(extension.stop(input).map(|v| Some(v.unwrap_or_else(StopOutput::fallback)))),
        HookEvent::SubagentStop(input) => reduce(extension.subagent_stop(input)),
    }
}

fn fallback(event: &HookEvent) -> Outcome {
    match event {
        HookEvent::PreToolUse(_) => reduce(Ok(Some(PreToolUseOutput::fallback()))),
        HookEvent::PostToolUse(_) => reduce(Ok(Some(PostToolUseOutput::fallback()))),
        HookEvent::Stop(_) => reduce(Ok(Some(StopOutput::fallback()))),
        HookEvent::Notification(_) | HookEvent::SubagentStop(_) => Outcome::success(""),
    }
}

/// Interpret one verdict: error first, then block, then serialized success
pub fn reduce<V: Verdict>(result: Result<Option<V>, ExtensionError>) -> Outcome {
    let verdict = match result {
        Err(e) => return Outcome::error(e.to_string()),
        Ok(None) => return Outcome::success(""),
        Ok(Some(verdict)) => verdict,
    };

    if verdict.is_block() {
        return Outcome::block(verdict.reason().unwrap_or_default());
    }

    match verdict.encode() {
        Ok(json) => Outcome::success(json),
        Err(e) => Outcome::error(format!("failed to marshal result: {}", e)),
    }
}

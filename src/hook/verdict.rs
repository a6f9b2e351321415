//! Extension verdicts
//!
//! Every verdict carries the base control fields. Decision-bearing kinds add an
//! optional `decision` and `reason`. Unset optional fields are omitted from the
//! encoded JSON entirely.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Reason used when a PreToolUse block is created without one
pub const PRE_TOOL_USE_BLOCK_FALLBACK: &str = "rejected";
/// Reason used when a PostToolUse block is created without one
pub const POST_TOOL_USE_BLOCK_FALLBACK: &str = "blocked by hook";
/// Reason used when a Stop is refused without one
pub const STOP_BLOCK_FALLBACK: &str = "stop not allowed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Block,
}

/// Fields present on every verdict
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HookOutput {
    /// Whether the supervisor keeps working after the hook (unset means true)
    #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
    pub continue_processing: Option<bool>,

    /// Shown to the user when `continue` is false
    #[serde(rename = "stopReason", default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,

    /// Hide stdout from the transcript view
    #[serde(rename = "suppressOutput", default, skip_serializing_if = "is_false")]
    pub suppress_output: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl HookOutput {
    /// Stop the supervisor for this session, showing `user_message` to the user
    #[allow(dead_code)] // Builder for in-process extensions; the builtins never halt
    pub fn halt(&mut self, user_message: impl Into<String>) -> &mut Self {
        self.continue_processing = Some(false);
        self.stop_reason = Some(user_message.into());
        self
    }

    #[allow(dead_code)] // Builder for in-process extensions
    pub fn suppress_output(&mut self) -> &mut Self {
        self.suppress_output = true;
        self
    }

    fn ensure_continue(&mut self) {
        if self.continue_processing.is_none() {
            self.continue_processing = Some(true);
        }
    }
}

/// Verdict shape shared by the decision-bearing kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DecisionOutput {
    #[serde(flatten)]
    pub base: HookOutput,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DecisionOutput {
    fn set_block(&mut self, reason: String, fallback: &str) {
        self.decision = Some(Decision::Block);
        self.reason = Some(if reason.is_empty() { fallback.to_string() } else { reason });
    }
}

impl Deref for DecisionOutput {
    type Target = HookOutput;

    fn deref(&self) -> &HookOutput {
        &self.base
    }
}

impl DerefMut for DecisionOutput {
    fn deref_mut(&mut self) -> &mut HookOutput {
        &mut self.base
    }
}

macro_rules! decision_verdict {
    ($(#[$meta:meta])* $name:ident, $fallback:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub DecisionOutput);

        impl $name {
            /// Give a block that arrived without a reason (e.g. decoded from
            /// plugin output) this kind's fallback reason
            pub fn normalized(mut self) -> Self {
                if self.0.decision == Some(Decision::Block) {
                    let reason = self.0.reason.take().unwrap_or_default();
                    self.0.set_block(reason, $fallback);
                }
                self
            }
        }

        impl Deref for $name {
            type Target = DecisionOutput;

            fn deref(&self) -> &DecisionOutput {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut DecisionOutput {
                &mut self.0
            }
        }

        impl Verdict for $name {
            fn decision(&self) -> Option<Decision> {
                self.0.decision
            }

            fn reason(&self) -> Option<&str> {
                self.0.reason.as_deref()
            }
        }
    };
}

decision_verdict!(
    /// PreToolUse verdict: approve shows `reason` to the user, block sends it to the supervisor
    PreToolUseOutput,
    PRE_TOOL_USE_BLOCK_FALLBACK
);
decision_verdict!(
    /// PostToolUse verdict: block feeds `reason` back to the supervisor
    PostToolUseOutput,
    POST_TOOL_USE_BLOCK_FALLBACK
);
decision_verdict!(
    /// Stop verdict: block refuses the stop and tells the supervisor why
    StopOutput,
    STOP_BLOCK_FALLBACK
);

impl PreToolUseOutput {
    /// Verdict used when an extension has no opinion: explicit approve
    pub fn fallback() -> Self {
        let mut output = Self::default();
        output.base.ensure_continue();
        output.approve(None::<String>);
        output
    }

    pub fn approve(&mut self, reason: Option<impl Into<String>>) -> &mut Self {
        self.0.decision = Some(Decision::Approve);
        if let Some(reason) = reason {
            self.0.reason = Some(reason.into());
        }
        self
    }

    pub fn block(&mut self, reason: impl Into<String>) -> &mut Self {
        self.0.set_block(reason.into(), PRE_TOOL_USE_BLOCK_FALLBACK);
        self
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        let mut output = Self::default();
        output.block(reason);
        output
    }
}

impl PostToolUseOutput {
    /// Verdict used when an extension has no opinion: continue, no decision
    pub fn fallback() -> Self {
        let mut output = Self::default();
        output.base.ensure_continue();
        output
    }

    pub fn block(&mut self, reason: impl Into<String>) -> &mut Self {
        self.0.set_block(reason.into(), POST_TOOL_USE_BLOCK_FALLBACK);
        self
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        let mut output = Self::default();
        output.block(reason);
        output
    }
}

impl StopOutput {
    /// Verdict used when an extension has no opinion: let the supervisor stop
    pub fn fallback() -> Self {
        let mut output = Self::default();
        output.base.ensure_continue();
        output
    }

    /// Refuse the stop; `reason` tells the supervisor how to continue
    #[allow(dead_code)] // Builder for in-process extensions; no builtin handles Stop
    pub fn not_allowed(&mut self, reason: impl Into<String>) -> &mut Self {
        self.0.set_block(reason.into(), STOP_BLOCK_FALLBACK);
        self
    }
}

/// What the reducer needs to know about any verdict
pub trait Verdict: Serialize {
    fn decision(&self) -> Option<Decision>;
    fn reason(&self) -> Option<&str>;

    fn is_block(&self) -> bool {
        self.decision() == Some(Decision::Block)
    }

    fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Verdict for HookOutput {
    fn decision(&self) -> Option<Decision> {
        None
    }

    fn reason(&self) -> Option<&str> {
        None
    }
}

impl Verdict for DecisionOutput {
    fn decision(&self) -> Option<Decision> {
        self.decision
    }

    fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

#[cfg(test)]
impl DecisionOutput {
    /// Block with `reason`, used as-is (SubagentStop has no fallback reason)
    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            decision: Some(Decision::Block),
            reason: Some(reason.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl PreToolUseOutput {
    pub fn approved(reason: impl Into<String>) -> Self {
        let mut output = Self::default();
        output.approve(Some(reason));
        output
    }
}

#[cfg(test)]
impl StopOutput {
    pub fn refused(reason: impl Into<String>) -> Self {
        let mut output = Self::default();
        output.not_allowed(reason);
        output
    }
}

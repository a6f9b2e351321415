//! Hook event handling
//!
//! Hooks are events fired by the tool-use supervisor that hookhost intercepts.
//! This module decodes those events, reduces extension verdicts, and maps the
//! result onto the exit-code protocol the supervisor understands.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod dispatch;
pub mod event;
pub mod outcome;
pub mod verdict;

pub use outcome::Outcome;

/// Hook event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum HookKind {
    PreToolUse,
    PostToolUse,
    Notification,
    Stop,
    SubagentStop,
}

impl HookKind {
    /// Parse the exact `hook_event_name` literal sent by the supervisor
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "PreToolUse" => Some(Self::PreToolUse),
            "PostToolUse" => Some(Self::PostToolUse),
            "Notification" => Some(Self::Notification),
            "Stop" => Some(Self::Stop),
            "SubagentStop" => Some(Self::SubagentStop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreToolUse => "PreToolUse",
            Self::PostToolUse => "PostToolUse",
            Self::Notification => "Notification",
            Self::Stop => "Stop",
            Self::SubagentStop => "SubagentStop",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_is_exact() {
        assert_eq!(HookKind::from_tag("PreToolUse"), Some(HookKind::PreToolUse));
        assert_eq!(HookKind::from_tag("SubagentStop"), Some(HookKind::SubagentStop));
        assert_eq!(HookKind::from_tag("pretooluse"), None);
        assert_eq!(HookKind::from_tag("SessionStart"), None);
        assert_eq!(HookKind::from_tag(""), None);
    }

    #[test]
    fn test_display_matches_tag() {
        let kinds = [
            HookKind::PreToolUse,
            HookKind::PostToolUse,
            HookKind::Notification,
            HookKind::Stop,
            HookKind::SubagentStop,
        ];
        for kind in kinds {
            assert_eq!(HookKind::from_tag(&kind.to_string()), Some(kind));
        }
    }
}

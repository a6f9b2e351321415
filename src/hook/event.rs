//! Hook event payloads and decoding
//!
//! Decoding happens in two passes: a generic map pass that reads the
//! `hook_event_name` tag, then a typed pass into the record for that kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::HookKind;
use crate::error::DecodeError;

/// Envelope fields shared by every hook event
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BaseHookInput {
    #[serde(default)]
    pub session_id: String,

    #[serde(default)]
    pub transcript_path: String,

    pub hook_event_name: String,
}

/// PreToolUse payload
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolInput {
    #[serde(flatten)]
    pub base: BaseHookInput,

    #[serde(default)]
    pub tool_name: String,

    #[serde(default)]
    pub tool_input: Map<String, Value>,
}

impl ToolInput {
    /// The `file_path` argument of the tool call, if it is a string
    pub fn file_path(&self) -> Option<&str> {
        self.tool_input.get("file_path").and_then(Value::as_str)
    }
}

/// PostToolUse payload
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PostToolUseInput {
    #[serde(flatten)]
    pub tool: ToolInput,

    #[serde(default)]
    pub tool_response: Map<String, Value>,
}

impl PostToolUseInput {
    pub fn file_path(&self) -> Option<&str> {
        self.tool.file_path()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NotificationInput {
    #[serde(flatten)]
    pub base: BaseHookInput,

    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StopInput {
    #[serde(flatten)]
    pub base: BaseHookInput,

    #[serde(default)]
    pub stop_hook_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SubagentStopInput {
    #[serde(flatten)]
    pub base: BaseHookInput,

    #[serde(default)]
    pub stop_hook_active: bool,
}

/// A decoded hook event, one variant per kind
#[derive(Debug, Clone, PartialEq)]
pub enum HookEvent {
    PreToolUse(ToolInput),
    PostToolUse(PostToolUseInput),
    Notification(NotificationInput),
    Stop(StopInput),
    SubagentStop(SubagentStopInput),
}

impl HookEvent {
    /// Decode raw event bytes into a typed event
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let map: Map<String, Value> = serde_json::from_slice(raw).map_err(DecodeError::Json)?;

        let tag = map
            .get("hook_event_name")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingKind)?;
        let kind = HookKind::from_tag(tag).ok_or_else(|| DecodeError::UnknownKind(tag.to_string()))?;

        let schema = |source: serde_json::Error| DecodeError::Schema { kind, source };
        let event = match kind {
            HookKind::PreToolUse => Self::PreToolUse(serde_json::from_slice(raw).map_err(schema)?),
            HookKind::PostToolUse => Self::PostToolUse(serde_json::from_slice(raw).map_err(schema)?),
            HookKind::Notification => Self::Notification(serde_json::from_slice(raw).map_err(schema)?),
            HookKind::Stop => Self::Stop(serde_json::from_slice(raw).map_err(schema)?),
            HookKind::SubagentStop => Self::SubagentStop(serde_json::from_slice(raw).map_err(schema)?),
        };

        Ok(event)
    }

    pub fn kind(&self) -> HookKind {
        match self {
            Self::PreToolUse(_) => HookKind::PreToolUse,
            Self::PostToolUse(_) => HookKind::PostToolUse,
            Self::Notification(_) => HookKind::Notification,
            Self::Stop(_) => HookKind::Stop,
            Self::SubagentStop(_) => HookKind::SubagentStop,
        }
    }

    pub fn base(&self) -> &BaseHookInput {
        match self {
            Self::PreToolUse(input) => &input.base,
            Self::PostToolUse(input) => &input.tool.base,
            Self::Notification(input) => &input.base,
            Self::Stop(input) => &input.base,
            Self::SubagentStop(input) => &input.base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pre_tool_use() {
        let raw = br#"{"session_id":"abc","transcript_path":"/tmp/t.jsonl","hook_event_name":"PreToolUse","tool_name":"Read","tool_input":{"file_path":".env"}}"#;
        let event = HookEvent::decode(raw).unwrap();
        assert_eq!(event.kind(), HookKind::PreToolUse);
        assert_eq!(event.base().session_id, "abc");
        match event {
            HookEvent::PreToolUse(input) => {
                assert_eq!(input.tool_name, "Read");
                assert_eq!(input.file_path(), Some(".env"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_post_tool_use_with_response() {
        let raw = br#"{"hook_event_name":"PostToolUse","tool_name":"Write","tool_input":{"file_path":"main.go"},"tool_response":{"success":true}}"#;
        match HookEvent::decode(raw).unwrap() {
            HookEvent::PostToolUse(input) => {
                assert_eq!(input.file_path(), Some("main.go"));
                assert_eq!(input.tool_response.get("success"), Some(&Value::Bool(true)));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_stop_flag() {
        let raw = br#"{"hook_event_name":"Stop","stop_hook_active":true}"#;
        match HookEvent::decode(raw).unwrap() {
            HookEvent::Stop(input) => assert!(input.stop_hook_active),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_file_path_ignores_non_string() {
        let raw = br#"{"hook_event_name":"PreToolUse","tool_name":"Read","tool_input":{"file_path":42}}"#;
        match HookEvent::decode(raw).unwrap() {
            HookEvent::PreToolUse(input) => assert_eq!(input.file_path(), None),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_missing_kind() {
        let err = HookEvent::decode(br#"{"tool_name":"Read"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingKind));

        let err = HookEvent::decode(br#"{"hook_event_name":7}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingKind));
    }

    #[test]
    fn test_decode_unknown_kind() {
        let err = HookEvent::decode(br#"{"hook_event_name":"SessionStart"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownKind(ref tag) if tag == "SessionStart"));
    }

    #[test]
    fn test_decode_mistyped_field() {
        let err = HookEvent::decode(br#"{"hook_event_name":"Stop","stop_hook_active":"yes"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Schema { kind: HookKind::Stop, .. }));

        let err = HookEvent::decode(br#"{"hook_event_name":"PreToolUse","tool_input":[1,2]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Schema { kind: HookKind::PreToolUse, .. }));
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = HookEvent::decode(b"not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}

//! Go syntax check after edits
//!
//! Runs `gopls check` on Go files the supervisor just wrote or edited and feeds
//! any diagnostics back as a PostToolUse block.

use std::process::Command;

use crate::error::ExtensionError;
use crate::hook::event::PostToolUseInput;
use crate::hook::verdict::PostToolUseOutput;
use crate::plugin::{Extension, ExtensionMetadata, HookReturn, Matchers};

pub struct GoCheck {
    program: String,
    args: Vec<String>,
}

impl Default for GoCheck {
    fn default() -> Self {
        Self::new("gopls", &["check"])
    }
}

impl GoCheck {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Run the checker; stdout wins over stderr, a silent failure is an error
    fn check(&self, file_path: &str) -> Result<String, ExtensionError> {
        let command_line = format!("{} {} {}", self.program, self.args.join(" "), file_path);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(file_path)
            .output()
            .map_err(|e| ExtensionError::new(format!("exec command {} failed, {}", command_line, e)))?;

        if !output.stdout.is_empty() {
            return Ok(String::from_utf8_lossy(&output.stdout).to_string());
        }
        if !output.stderr.is_empty() {
            return Ok(String::from_utf8_lossy(&output.stderr).to_string());
        }
        if !output.status.success() {
            return Err(ExtensionError::new(format!(
                "exec command {} failed, exit code {}",
                command_line,
                output.status.code().unwrap_or(-1)
            )));
        }
        Ok(String::new())
    }
}

impl Extension for GoCheck {
    fn metadata(&self) -> ExtensionMetadata {
        ExtensionMetadata {
            description: "Check Go syntax after editing Go files".to_string(),
            matcher: Matchers {
                pre_tool_use: String::new(),
                post_tool_use: "Write|Edit|MultiEdit".to_string(),
            },
            events: vec![],
        }
    }

    fn post_tool_use(&self, input: &PostToolUseInput) -> HookReturn<PostToolUseOutput> {
        let Some(file_path) = input.file_path().filter(|p| p.ends_with(".go")) else {
            return Ok(None);
        };

        let diagnostics = self.check(file_path)?;
        if diagnostics.is_empty() {
            return Ok(None);
        }

        log::info!("Go check reported issues for {}", file_path);
        Ok(Some(PostToolUseOutput::blocked(diagnostics)))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::hook::verdict::Verdict;
    use serde_json::Value;

    fn edited(path: &str) -> PostToolUseInput {
        let mut input = PostToolUseInput::default();
        input.tool.tool_name = "Edit".to_string();
        input
            .tool
            .tool_input
            .insert("file_path".to_string(), Value::String(path.to_string()));
        input
    }

    #[test]
    fn test_skips_non_go_files() {
        let check = GoCheck::new("false", &[]);
        assert_eq!(check.post_tool_use(&edited("main.rs")).unwrap(), None);
        assert_eq!(check.post_tool_use(&PostToolUseInput::default()).unwrap(), None);
    }

    #[test]
    fn test_output_becomes_block() {
        let check = GoCheck::new("echo", &["problem in"]);
        let verdict = check.post_tool_use(&edited("main.go")).unwrap().unwrap();
        assert!(verdict.is_block());
        assert_eq!(verdict.reason(), Some("problem in main.go\n"));
    }

    #[test]
    fn test_clean_check_has_no_opinion() {
        let check = GoCheck::new("true", &[]);
        assert_eq!(check.post_tool_use(&edited("main.go")).unwrap(), None);
    }

    #[test]
    fn test_silent_failure_is_error() {
        let check = GoCheck::new("false", &[]);
        let err = check.post_tool_use(&edited("main.go")).unwrap_err();
        assert!(err.message.contains("exit code 1"));
    }

    #[test]
    fn test_missing_program_is_error() {
        let check = GoCheck::new("hookhost-no-such-checker", &[]);
        assert!(check.post_tool_use(&edited("main.go")).is_err());
    }
}

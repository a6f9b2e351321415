//! Env file guard
//!
//! Blocks tool calls that touch real `.env` files while allowing example files
//! such as `.env.example` or `.env.local.sample`.

use lazy_regex::regex_is_match;

use crate::hook::event::ToolInput;
use crate::hook::verdict::PreToolUseOutput;
use crate::plugin::{Extension, ExtensionMetadata, HookReturn, Matchers};

pub struct EnvGuard;

impl EnvGuard {
    pub fn is_example_file(path: &str) -> bool {
        regex_is_match!(r"\.env\.(example|sample|template|dist)$"i, path)
            || regex_is_match!(r"\.env\..*\.(example|sample|template|dist)$"i, path)
    }

    /// `.env` itself or a single-suffix variant such as `.env.local`
    pub fn is_env_file(path: &str) -> bool {
        regex_is_match!(r"\.env$"i, path) || regex_is_match!(r"\.env\.[^.]+$"i, path)
    }
}

impl Extension for EnvGuard {
    fn metadata(&self) -> ExtensionMetadata {
        ExtensionMetadata {
            description: "Block reads and writes of .env files".to_string(),
            matcher: Matchers {
                pre_tool_use: "Read|Write|Edit|MultiEdit".to_string(),
                post_tool_use: String::new(),
            },
            events: vec![],
        }
    }

    fn pre_tool_use(&self, input: &ToolInput) -> HookReturn<PreToolUseOutput> {
        let Some(file_path) = input.file_path().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };

        if Self::is_example_file(file_path) {
            return Ok(None);
        }

        if Self::is_env_file(file_path) {
            log::info!("Blocking access to env file: {}", file_path);
            return Ok(Some(PreToolUseOutput::blocked(format!(
                "Access to .env files is not allowed. File: {}",
                file_path
            ))));
        }

        Ok(None)
    }
}

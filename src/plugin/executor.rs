//! Subprocess extension executor
//!
//! Runs an external program for each hook call. The event JSON goes to stdin,
//! the verdict JSON comes back on stdout. Exit code 0 with empty stdout means
//! "no opinion"; any other exit code is an extension error carrying stderr.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use super::manifest::PluginLanguage;
use super::{Extension, ExtensionMetadata, HookReturn};
use crate::error::ExtensionError;
use crate::hook::event::{NotificationInput, PostToolUseInput, StopInput, SubagentStopInput, ToolInput};
use crate::hook::verdict::{DecisionOutput, HookOutput, PostToolUseOutput, PreToolUseOutput, StopOutput};

/// Environment variable naming the method being invoked
pub const METHOD_ENV: &str = "HOOKHOST_METHOD";
/// Environment variable naming the extension being invoked
pub const PLUGIN_ENV: &str = "HOOKHOST_PLUGIN";

/// Raw result of one subprocess call
#[derive(Debug)]
pub struct CallResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// An extension backed by an external program
#[derive(Debug)]
pub struct SubprocessExtension {
    name: String,
    workdir: PathBuf,
    script: PathBuf,
    args: Vec<String>,
    env: IndexMap<String, String>,
    language: PluginLanguage,
    metadata: ExtensionMetadata,
    lifecycle: bool,
}

impl SubprocessExtension {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        workdir: &Path,
        command: &str,
        args: Vec<String>,
        env: IndexMap<String, String>,
        language: PluginLanguage,
        metadata: ExtensionMetadata,
        lifecycle: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            workdir: workdir.to_path_buf(),
            script: workdir.join(command),
            args,
            env,
            language,
            metadata,
            lifecycle,
        }
    }

    /// Program and leading arguments used to run the script
    fn program(&self) -> (String, Vec<String>) {
        let script = self.script.to_string_lossy().to_string();
        let python = |script: String| {
            // Try uv first, fall back to python3
            if which::which("uv").is_ok() {
                ("uv".to_string(), vec!["run".to_string(), "python".to_string(), script])
            } else {
                ("python3".to_string(), vec![script])
            }
        };

        match self.language {
            PluginLanguage::Python => python(script),
            PluginLanguage::Rust | PluginLanguage::Binary => (script, vec![]),
            PluginLanguage::Mixed => match self.script.extension().and_then(|e| e.to_str()) {
                Some("py") => python(script),
                _ => (script, vec![]),
            },
        }
    }

    /// Spawn the program once for `method`, feeding `payload` on stdin
    pub fn call(&self, method: &str, payload: &str) -> Result<CallResult, ExtensionError> {
        let (program, mut args) = self.program();
        args.extend(self.args.iter().cloned());

        log::debug!("Running plugin '{}' {}: {} {:?}", self.name, method, program, args);

        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(&self.workdir)
            .envs(&self.env)
            .env(METHOD_ENV, method)
            .env(PLUGIN_ENV, &self.name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ExtensionError::new(format!(
                    "failed to spawn plugin '{}' ({}): {}",
                    self.name,
                    self.script.display(),
                    e
                ))
            })?;

        // The plugin may fill stdout before it reads stdin
        let writer = child.stdin.take().map(|mut stdin| {
            let payload = payload.to_string();
            thread::spawn(move || stdin.write_all(payload.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| ExtensionError::new(format!("failed to wait for plugin '{}': {}", self.name, e)))?;

        if let Some(writer) = writer {
            match writer.join() {
                // A plugin may exit without reading its input
                Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => {
                    return Err(ExtensionError::new(format!(
                        "failed to write payload to plugin '{}': {}",
                        self.name, e
                    )));
                }
                Ok(_) => {}
                Err(_) => {
                    return Err(ExtensionError::new(format!(
                        "payload writer for plugin '{}' panicked",
                        self.name
                    )));
                }
            }
        }

        Ok(CallResult {
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Call a hook method and decode its verdict
    fn hook<I: serde::Serialize, T: DeserializeOwned>(&self, method: &str, input: &I) -> HookReturn<T> {
        let payload = serde_json::to_string(input)
            .map_err(|e| ExtensionError::new(format!("failed to serialize {} input: {}", method, e)))?;
        let result = self.call(method, &payload)?;
        self.interpret(method, result)
    }

    fn interpret<T: DeserializeOwned>(&self, method: &str, result: CallResult) -> HookReturn<T> {
        if result.exit_code != 0 {
            return Err(self.failure(method, &result));
        }

        let stdout = result.stdout.trim();
        if stdout.is_empty() {
            return Ok(None);
        }

        serde_json::from_str(stdout).map(Some).map_err(|e| {
            ExtensionError::new(format!(
                "plugin '{}' returned an invalid {} verdict: {}",
                self.name, method, e
            ))
        })
    }

    fn failure(&self, method: &str, result: &CallResult) -> ExtensionError {
        let stderr = result.stderr.trim();
        if stderr.is_empty() {
            ExtensionError::new(format!(
                "plugin '{}' ({}) exited with code {}",
                self.name, method, result.exit_code
            ))
        } else {
            ExtensionError::new(stderr)
        }
    }

    fn lifecycle_call(&self, method: &str) -> Result<(), ExtensionError> {
        if !self.lifecycle {
            return Ok(());
        }
        let result = self.call(method, "")?;
        if result.exit_code != 0 {
            return Err(self.failure(method, &result));
        }
        Ok(())
    }
}

impl Extension for SubprocessExtension {
    fn metadata(&self) -> ExtensionMetadata {
        self.metadata.clone()
    }

    fn initialize(&self) -> Result<(), ExtensionError> {
        if !self.script.exists() {
            return Err(ExtensionError::new(format!("script not found: {}", self.script.display())));
        }
        self.lifecycle_call("Initialize")
    }

    fn cleanup(&self) -> Result<(), ExtensionError> {
        self.lifecycle_call("Cleanup")
    }

    fn pre_tool_use(&self, input: &ToolInput) -> HookReturn<PreToolUseOutput> {
        Ok(self.hook::<_, PreToolUseOutput>("PreToolUse", input)?.map(PreToolUseOutput::normalized))
    }

    fn post_tool_use(&self, input: &PostToolUseInput) -> HookReturn<PostToolUseOutput> {
        Ok(self.hook::<_, PostToolUseOutput>("PostToolUse", input)?.map(PostToolUseOutput::normalized))
    }

    fn notification(&self, input: &NotificationInput) -> HookReturn<HookOutput> {
        self.hook("Notification", input)
    }

    fn stop(&self, input: &StopInput) -> HookReturn<StopOutput> {
        Ok(self.hook::<_, StopOutput>("Stop", input)?.map(StopOutput::normalized))
    }

    fn subagent_stop(&self, input: &SubagentStopInput) -> HookReturn<DecisionOutput> {
        self.hook("SubagentStop", input)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::hook::verdict::{Decision, Verdict};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn script_extension(dir: &Path, body: &str, lifecycle: bool) -> SubprocessExtension {
        let script_path = dir.join("hook.sh");
        fs::write(&script_path, format!("#!/bin/sh\n{}", body)).unwrap();
        let mut perms = fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms).unwrap();

        SubprocessExtension::new(
            "test-plugin",
            dir,
            "hook.sh",
            vec![],
            IndexMap::new(),
            PluginLanguage::Binary,
            ExtensionMetadata::default(),
            lifecycle,
        )
    }

    fn tool_input(path: &str) -> ToolInput {
        let mut input = ToolInput::default();
        input.base.hook_event_name = "PreToolUse".to_string();
        input.tool_name = "Read".to_string();
        input
            .tool_input
            .insert("file_path".to_string(), serde_json::Value::String(path.to_string()));
        input
    }

    #[test]
    fn test_empty_stdout_is_no_opinion() {
        let temp = tempdir().unwrap();
        let ext = script_extension(temp.path(), "cat > /dev/null\nexit 0\n", false);
        assert_eq!(ext.pre_tool_use(&tool_input("a.txt")).unwrap(), None);
    }

    #[test]
    fn test_stdout_verdict_is_decoded() {
        let temp = tempdir().unwrap();
        let ext = script_extension(
            temp.path(),
            "cat > /dev/null\necho '{\"decision\":\"block\",\"reason\":\"nope\"}'\n",
            false,
        );
        let verdict = ext.pre_tool_use(&tool_input("a.txt")).unwrap().unwrap();
        assert_eq!(verdict.decision(), Some(Decision::Block));
        assert_eq!(verdict.reason(), Some("nope"));
    }

    #[test]
    fn test_block_without_reason_gets_fallback() {
        let temp = tempdir().unwrap();
        let ext = script_extension(temp.path(), "cat > /dev/null\necho '{\"decision\":\"block\"}'\n", false);

        let verdict = ext.pre_tool_use(&tool_input("a.txt")).unwrap().unwrap();
        assert_eq!(verdict.reason(), Some("rejected"));
        assert_eq!(
            crate::hook::dispatch::reduce(Ok(Some(verdict))),
            crate::hook::Outcome::block("rejected")
        );

        let verdict = ext.post_tool_use(&PostToolUseInput::default()).unwrap().unwrap();
        assert_eq!(verdict.reason(), Some("blocked by hook"));

        let verdict = ext.stop(&StopInput::default()).unwrap().unwrap();
        assert_eq!(verdict.reason(), Some("stop not allowed"));

        let verdict = ext.subagent_stop(&SubagentStopInput::default()).unwrap().unwrap();
        assert_eq!(verdict.reason(), None);
    }

    #[test]
    fn test_payload_and_env_reach_the_script() {
        let temp = tempdir().unwrap();
        let ext = script_extension(
            temp.path(),
            "grep -q secret.txt || exit 3\n[ \"$HOOKHOST_METHOD\" = PreToolUse ] || exit 4\n[ \"$HOOKHOST_PLUGIN\" = test-plugin ] || exit 5\nexit 0\n",
            false,
        );
        assert_eq!(ext.pre_tool_use(&tool_input("secret.txt")).unwrap(), None);
    }

    #[test]
    fn test_large_output_before_reading_large_payload() {
        let temp = tempdir().unwrap();
        let ext = script_extension(
            temp.path(),
            "head -c 200000 /dev/zero | tr '\\0' ' '\n[ $(wc -c) -gt 300000 ] || exit 3\n",
            false,
        );

        let mut input = tool_input("big.txt");
        input
            .tool_input
            .insert("content".to_string(), serde_json::Value::String("x".repeat(300_000)));
        assert_eq!(ext.pre_tool_use(&input).unwrap(), None);
    }

    #[test]
    fn test_nonzero_exit_is_error_with_stderr() {
        let temp = tempdir().unwrap();
        let ext = script_extension(temp.path(), "echo 'lint failed' >&2\nexit 1\n", false);
        let err = ext.stop(&StopInput::default()).unwrap_err();
        assert_eq!(err.message, "lint failed");
    }

    #[test]
    fn test_nonzero_exit_without_stderr() {
        let temp = tempdir().unwrap();
        let ext = script_extension(temp.path(), "exit 7\n", false);
        let err = ext.notification(&NotificationInput::default()).unwrap_err();
        assert!(err.message.contains("exited with code 7"));
    }

    #[test]
    fn test_invalid_verdict_is_error() {
        let temp = tempdir().unwrap();
        let ext = script_extension(temp.path(), "echo '{\"decision\":\"maybe\"}'\n", false);
        let err = ext.post_tool_use(&PostToolUseInput::default()).unwrap_err();
        assert!(err.message.contains("invalid PostToolUse verdict"));
    }

    #[test]
    fn test_lifecycle_runs_only_when_enabled() {
        let temp = tempdir().unwrap();
        let failing = "[ \"$HOOKHOST_METHOD\" = Cleanup ] && { echo 'cleanup failed' >&2; exit 1; }\nexit 0\n";

        let ext = script_extension(temp.path(), failing, false);
        assert!(ext.initialize().is_ok());
        assert!(ext.cleanup().is_ok());

        let ext = script_extension(temp.path(), failing, true);
        assert!(ext.initialize().is_ok());
        assert_eq!(ext.cleanup().unwrap_err().message, "cleanup failed");
    }

    #[test]
    fn test_initialize_fails_for_missing_script() {
        let temp = tempdir().unwrap();
        let ext = SubprocessExtension::new(
            "ghost",
            temp.path(),
            "missing.sh",
            vec![],
            IndexMap::new(),
            PluginLanguage::Binary,
            ExtensionMetadata::default(),
            false,
        );
        assert!(ext.initialize().unwrap_err().message.contains("script not found"));
    }
}

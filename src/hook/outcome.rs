//! Dispatch outcomes and their mapping onto process exit
//!
//! Exit codes follow the supervisor's hook protocol:
//! - 0: success, stdout is shown to the user
//! - 1: error, stderr is shown to the user, the supervisor is not affected
//! - 2: blocking error, stderr is fed back to the supervisor

use std::io::{self, Write};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_BLOCK: i32 = 2;

/// Final result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Proceed; `stdout` is the serialized verdict (possibly empty)
    Success { stdout: String },
    /// Local failure, shown to the user only
    Error { stderr: String },
    /// A decision of "block"; `stderr` goes back to the supervisor
    Block { stderr: String },
}

impl Outcome {
    pub fn success(stdout: impl Into<String>) -> Self {
        Outcome::Success { stdout: stdout.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error { stderr: message.into() }
    }

    /// Blocking outcome; the reason is terminated with a newline
    pub fn block(reason: &str) -> Self {
        Outcome::Block {
            stderr: format!("{}\n", reason),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success { .. } => EXIT_SUCCESS,
            Outcome::Error { .. } => EXIT_ERROR,
            Outcome::Block { .. } => EXIT_BLOCK,
        }
    }

    /// Write the payload to the stream selected by the exit code
    pub fn write_to<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> io::Result<()> {
        match self {
            Outcome::Success { stdout } => {
                out.write_all(stdout.as_bytes())?;
                out.flush()
            }
            Outcome::Error { stderr } | Outcome::Block { stderr } => {
                err.write_all(stderr.as_bytes())?;
                err.flush()
            }
        }
    }

    /// Print the payload and terminate the process with the outcome's exit code
    pub fn exit(self) -> ! {
        let code = self.exit_code();
        log::info!("Exiting with code {}", code);
        if let Err(e) = self.write_to(&mut io::stdout().lock(), &mut io::stderr().lock()) {
            log::error!("Failed to write hook output: {}", e);
        }
        std::process::exit(code)
    }
}

#[cfg(test)]
impl Outcome {
    pub fn stdout(&self) -> &str {
        match self {
            Outcome::Success { stdout } => stdout,
            _ => "",
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            Outcome::Error { stderr } | Outcome::Block { stderr } => stderr,
            Outcome::Success { .. } => "",
        }
    }
}

//! Execute command
//!
//! Reads one hook event from stdin, dispatches it to the loaded plugins, and
//! exits with the code the supervisor expects. Every failure on this path is
//! reported as an error outcome (exit 1) rather than an eyre report.

use eyre::{Context, Result};
use std::io::{self, Read};
use std::path::Path;

use super::{load_registry, release};
use crate::config::Config;
use crate::hook::Outcome;
use crate::hook::dispatch;

pub fn run(plugins: &[String], dir: Option<&Path>, config: &Config) -> Result<()> {
    outcome(plugins, dir, config).exit()
}

fn outcome(plugins: &[String], dir: Option<&Path>, config: &Config) -> Outcome {
    let registry = match load_registry(plugins, dir, config) {
        Ok(registry) => registry,
        Err(e) => return Outcome::error(format!("{:#}", e)),
    };

    let input = match read_stdin() {
        Ok(input) => input,
        Err(e) => {
            release(&registry);
            return Outcome::error(format!("{:#}", e));
        }
    };
    log::debug!("Hook input: {}", String::from_utf8_lossy(&input));

    let outcome = dispatch::dispatch(&registry, &input);
    release(&registry);
    outcome
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read hook input from stdin")?;
    Ok(buffer)
}

//! Plugin argument resolution
//!
//! Turns a command-line plugin argument into an artifact path. Arguments that
//! already look like artifacts are used as given; bare names are looked up in
//! the search directories in order.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::PluginNotFound;
use crate::plugin::ARTIFACT_SUFFIX;

pub struct Resolver {
    search_dirs: Vec<PathBuf>,
}

impl Resolver {
    /// Search order: `--dir`, the configured plugin directory, then `~/.claude/hooks`
    pub fn new(dir: Option<&Path>, config: &Config) -> Self {
        let mut search_dirs: Vec<PathBuf> = Vec::new();
        let candidates = [
            dir.map(Config::expand_path),
            Some(config.plugins_dir()),
            Some(Config::default_plugins_dir()),
        ];
        for candidate in candidates.into_iter().flatten() {
            if !search_dirs.contains(&candidate) {
                search_dirs.push(candidate);
            }
        }
        Self { search_dirs }
    }

    pub fn resolve(&self, arg: &str) -> Result<PathBuf, PluginNotFound> {
        let given = Config::expand_path(Path::new(arg));
        if given.is_file() || arg.ends_with(ARTIFACT_SUFFIX) {
            return Ok(given);
        }

        let file_name = format!("{}{}", arg, ARTIFACT_SUFFIX);
        let mut searched = Vec::new();
        for dir in &self.search_dirs {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                log::debug!("Resolved plugin '{}' to {}", arg, candidate.display());
                return Ok(candidate);
            }
            searched.push(candidate);
        }

        Err(PluginNotFound {
            name: arg.to_string(),
            searched,
        })
    }

    pub fn resolve_all(&self, args: &[String]) -> Result<Vec<PathBuf>, PluginNotFound> {
        args.iter().map(|arg| self.resolve(arg)).collect()
    }
}

#[cfg(test)]
impl Resolver {
    fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }
}

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log verbosity written to the hookhost log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Main hookhost configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub paths: PathsConfig,
    /// Program name written into generated hook commands
    pub command_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for `*.plugin.yaml` artifacts
    pub plugins: PathBuf,
    /// Supervisor settings document updated by `configure`
    pub settings: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            paths: PathsConfig::default(),
            command_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            plugins: Config::default_plugins_dir(),
            settings: PathBuf::from(".claude").join("settings.local.json"),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let mut candidates: Vec<(PathBuf, &str)> = Vec::new();
        if let Ok(env_path) = std::env::var("HOOKHOST_CONFIG") {
            candidates.push((PathBuf::from(env_path), "HOOKHOST_CONFIG"));
        }
        if let Ok(dir) = std::env::var("HOOKHOST_DIR") {
            candidates.push((PathBuf::from(dir).join("hookhost.yaml"), "HOOKHOST_DIR"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push((config_dir.join("hookhost").join("hookhost.yaml"), "config dir"));
        }
        // ./hookhost.yaml (for development)
        candidates.push((PathBuf::from("hookhost.yaml"), "working directory"));

        for (path, source) in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Failed to load config from {} ({}): {:#}", path.display(), source, e),
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Where plugin artifacts live when nothing else is configured
    pub fn default_plugins_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".claude")
            .join("hooks")
    }

    /// Configured plugin directory, expanded
    pub fn plugins_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.plugins)
    }

    /// Configured settings document path, expanded
    pub fn settings_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.settings)
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }

    /// Render a path with the home directory shown as `~`
    pub fn display_path(path: &Path) -> String {
        if let Some(home) = dirs::home_dir()
            && let Ok(rest) = path.strip_prefix(&home)
        {
            return Path::new("~").join(rest).display().to_string();
        }
        path.display().to_string()
    }
}

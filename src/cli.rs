use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "hookhost",
    about = "Hook dispatch host - routes supervisor hook events to pluggable extensions",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/hookhost/logs/hookhost.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to hookhost.yaml config file")]
    pub config: Option<PathBuf>,

    /// Directory searched first for plugin artifacts
    #[arg(short, long, global = true, help = "Directory containing *.plugin.yaml artifacts")]
    pub dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose (debug) logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load plugins and show what they handle
    List {
        /// Plugin names or artifact paths (defaults to every plugin in the plugin directory)
        plugins: Vec<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Dispatch the hook event on stdin to the loaded plugins
    Execute {
        /// Plugin names or artifact paths (defaults to every plugin in the plugin directory)
        plugins: Vec<String>,
    },

    /// Register plugin matchers in the supervisor settings file
    Configure {
        /// Plugin names or artifact paths (defaults to every plugin in the plugin directory)
        plugins: Vec<String>,

        /// Settings file to update (defaults to ./.claude/settings.local.json)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

//! Command-line interface definitions using clap
//!
//! Without a subcommand the HTTP server is started.

use clap::{Parser, Subcommand, ValueEnum};

/// geoserve - GeoIP lookup service for installer timezone detection
#[derive(Parser)]
#[command(name = "geoserve")]
#[command(version)]
#[command(about = "GeoIP lookup service (Calamares JSON / Ubiquity XML)", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Look up a single IP address against the configured database
    #[cfg(feature = "cli")]
    Lookup {
        /// IP address to look up
        ip: String,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value_t = LookupFormat::Ubiquity)]
        format: LookupFormat,
    },

    /// Configuration management
    #[cfg(feature = "cli")]
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output file path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite without asking
        #[arg(long)]
        force: bool,
    },
}

/// Output format of the `lookup` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LookupFormat {
    Calamares,
    Ubiquity,
    Debug,
}

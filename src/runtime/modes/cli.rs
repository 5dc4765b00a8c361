//! CLI mode
//!
//! One-off commands that share the server's configuration and mappers:
//! - `lookup`: resolve a single IP and print it in one of the wire formats
//! - `config generate`: write a sample configuration file

use std::io::{self, BufRead, Write};
use std::net::IpAddr;
use std::path::Path;

use colored::Colorize;

use crate::cli::LookupFormat;
use crate::config::StaticConfig;
use crate::errors::{GeoserveError, Result};
use crate::models::{CalamaresGeoIP, UbiquityGeoIP};
use crate::services::{GeoIpProvider, GeoRecord};
use crate::utils::ip::parse_ip_literal;

const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// Look up `ip` in the configured database and print the response body
pub fn run_lookup(config: &StaticConfig, ip: &str, format: LookupFormat) -> Result<()> {
    let ip = parse_ip_literal(ip)?;
    let provider = GeoIpProvider::open(&config.database.path)?;
    let record = provider.lookup(ip)?;

    println!("{}", render_lookup(format, ip, &record)?);
    Ok(())
}

/// Render a record exactly as the matching HTTP endpoint would
pub fn render_lookup(format: LookupFormat, ip: IpAddr, record: &GeoRecord) -> Result<String> {
    match format {
        LookupFormat::Calamares => Ok(serde_json::to_string(&CalamaresGeoIP::from_record(
            record,
        ))?),
        LookupFormat::Ubiquity => UbiquityGeoIP::from_record(&ip.to_string(), record).to_xml(),
        LookupFormat::Debug => Ok(serde_json::to_string_pretty(record)?),
    }
}

/// Generate example configuration file
pub fn config_generate(output_path: Option<String>, force: bool) -> Result<()> {
    let path = output_path.unwrap_or_else(|| DEFAULT_SAMPLE_PATH.to_string());

    // 文件已存在且未指定 --force 时交互确认
    if !force && Path::new(&path).exists() {
        print!(
            "{} {} {}",
            "File already exists:".yellow(),
            path.blue(),
            "Overwrite? [y/N] ".yellow()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    StaticConfig::default()
        .save_to_file(&path)
        .map_err(|e| GeoserveError::file_operation(format!("{}: {}", path, e)))?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    println!(
        "  {}",
        "Please edit the configuration file and restart the service".yellow()
    );
    Ok(())
}

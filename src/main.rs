use clap::Parser;
use tracing::error;

use geoserve::cli::{Cli, Commands};
use geoserve::config::{get_config, init_config};
use geoserve::system::logging::init_logging;
use geoserve::system::panic_handler::{RunMode, install_panic_hook};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config(cli.config.as_deref());
    let config = get_config();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            install_panic_hook(RunMode::Server, &config);

            // 日志 guard 需要存活到进程退出
            let _log_guard = init_logging(&config.logging)?;

            if let Err(e) = geoserve::runtime::modes::run_server(&config).await {
                error!("Server failed: {:#}", e);
                return Err(e);
            }
        }

        #[cfg(feature = "cli")]
        Commands::Lookup { ip, format } => {
            install_panic_hook(RunMode::Cli, &config);

            if let Err(e) = geoserve::runtime::modes::run_lookup(&config, &ip, format) {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }

        #[cfg(feature = "cli")]
        Commands::Config { action } => {
            install_panic_hook(RunMode::Cli, &config);

            let geoserve::cli::ConfigCommands::Generate { output_path, force } = action;
            if let Err(e) = geoserve::runtime::modes::config_generate(output_path, force) {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

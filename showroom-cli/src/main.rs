mod cli;
mod config;
mod discount;
mod error;
mod store;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::*;
use log::debug;

use cli::commands::{config as config_cmd, instructions, template, upload, validate};
use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Template(args) => template::handle_template_command(args),
        Commands::Validate(args) => validate::handle_validate_command(args),
        Commands::Upload(args) => {
            let config = Config::load(config_path)?;
            debug!("Target table: {}", config.target.table);
            upload::handle_upload_command(args, &config).await
        }
        Commands::Instructions => instructions::handle_instructions_command(),
        Commands::Config { command } => config_cmd::handle_config_command(command, config_path),
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG wins over -v when set
    let default_filter = match verbose {
        0 => "showroom_cli=warn",
        1 => "showroom_cli=info",
        _ => "showroom_cli=debug",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

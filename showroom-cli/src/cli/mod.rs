//! Command-line interface definition

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "showroom-cli",
    about = "Validate showroom discount spreadsheets and append them to BigQuery",
    version,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a config file (defaults to <config dir>/showroom-discount/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a template file with the required columns and sample rows
    Template(TemplateArgs),

    /// Check a file without uploading it
    Validate(ValidateArgs),

    /// Validate a file and append its rows to the discount table
    Upload(UploadArgs),

    /// Show the required file format
    Instructions,

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateFormat {
    Csv,
    Xlsx,
    Both,
}

#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Which template file(s) to write
    #[arg(short, long, value_enum, default_value_t = TemplateFormat::Both)]
    pub format: TemplateFormat,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// CSV or Excel file (.csv, .xlsx, .xlsm, .xls, .ods)
    pub file: PathBuf,

    /// Number of rows to show in the preview
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// CSV or Excel file (.csv, .xlsx, .xlsm, .xls, .ods)
    pub file: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Send the upload even when the file has no data rows
    #[arg(long)]
    pub allow_empty: bool,

    /// Destination table as project.dataset.table (overrides config)
    #[arg(long)]
    pub table: Option<String>,

    /// Number of rows to show in the preview
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the default config file location
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_upload() {
        let cli = Cli::try_parse_from([
            "showroom-cli",
            "-vv",
            "upload",
            "prices.xlsx",
            "--yes",
            "--table",
            "pricing-prod.sales.showroom_discount",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Upload(args) => {
                assert_eq!(args.file, PathBuf::from("prices.xlsx"));
                assert!(args.yes);
                assert!(!args.allow_empty);
                assert_eq!(args.preview, 10);
                assert_eq!(
                    args.table.as_deref(),
                    Some("pricing-prod.sales.showroom_discount")
                );
            }
            _ => panic!("expected upload command"),
        }
    }

    #[test]
    fn test_parse_template_defaults() {
        let cli = Cli::try_parse_from(["showroom-cli", "template"]).unwrap();
        match cli.command {
            Commands::Template(args) => {
                assert_eq!(args.format, TemplateFormat::Both);
                assert_eq!(args.dir, PathBuf::from("."));
            }
            _ => panic!("expected template command"),
        }
    }
}

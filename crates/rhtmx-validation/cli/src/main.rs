mod commands;
mod values;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "rhtmx-validate")]
#[command(version, about = "RHTMX Validation - check page validation configurations", long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a validation pass over sample control values
    Check {
        /// Page validation configuration (TOML)
        #[arg(short, long, default_value = "validation.toml")]
        config: PathBuf,

        /// Control values and remote answers (JSON)
        #[arg(long)]
        values: PathBuf,

        /// Form to validate (defaults to the first configured form)
        #[arg(short, long)]
        form: Option<String>,

        /// Validation group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// List the forms, validators and summaries of a configuration
    Inspect {
        /// Page validation configuration (TOML)
        #[arg(short, long, default_value = "validation.toml")]
        config: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Check {
            config,
            values,
            form,
            group,
        } => {
            let valid =
                commands::check::execute(&config, &values, form.as_deref(), group.as_deref())
                    .await?;
            if !valid {
                std::process::exit(1);
            }
        }
        Commands::Inspect { config } => {
            commands::inspect::execute(&config)?;
        }
    }

    Ok(())
}

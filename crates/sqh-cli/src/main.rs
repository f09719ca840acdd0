//! squarehole CLI - converts round holes in solid bodies to square holes

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "squarehole")]
#[command(about = "Convert round holes in solid bodies to square holes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Square every round hole in a selection file
    Convert {
        /// Input selection (.ron)
        input: PathBuf,
        /// Conversion settings (.ron)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output selection (default: <input>.square.ron)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fit cuts to each body's extent plus this margin
        #[arg(long, conflicts_with = "cut_length")]
        fit_margin: Option<f32>,
        /// Fixed cut length along the hole axis
        #[arg(long)]
        cut_length: Option<f32>,
        /// Write the batch result as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Process bodies on a thread pool
        #[arg(long)]
        parallel: bool,
    },
    /// Write a sample selection with drilled plates and bosses
    Demo {
        /// Output selection (.ron)
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqh_core=info,sqh_cad=info,sqh_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            config,
            output,
            fit_margin,
            cut_length,
            json,
            parallel,
        } => {
            let options = commands::ConvertOptions {
                config,
                output,
                fit_margin,
                cut_length,
                json,
                parallel,
            };
            let result = commands::convert(&input, &options)?;
            println!("{result}");
        }
        Commands::Demo { output } => {
            commands::write_demo(&output)?;
            println!("Wrote sample selection to {}", output.display());
        }
    }

    Ok(())
}

mod commands;
mod relay_client;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use commands::PreviewPaths;
use playground_common::preview::DOWNLOAD_FILE_NAME;
use playground_common::runner::{RunOutcome, DEFAULT_LANGUAGE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "playground-cli")]
#[command(about = "Playground CLI - Run code through the relay and build live previews", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run source code through the execution relay
    Run {
        /// Language name (e.g., python, node, c++)
        #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
        lang: String,

        /// Source file (defaults to the language template)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// File whose contents are passed as standard input
        #[arg(short, long)]
        stdin: Option<PathBuf>,

        /// Program argument (repeatable)
        #[arg(short, long = "arg")]
        args: Vec<String>,

        /// Relay base URL
        #[arg(long, env = "PLAYGROUND_SERVER", default_value = "http://localhost:5000")]
        server: String,
    },

    /// Print the starter template for a language
    Template {
        /// Language name
        #[arg(short, long)]
        lang: String,
    },

    /// List recognised language names
    Languages,

    /// Build the HTML/CSS/JS preview document
    Preview {
        /// HTML fragment for the page body
        #[arg(long)]
        html: Option<PathBuf>,

        /// Stylesheet
        #[arg(long)]
        css: Option<PathBuf>,

        /// Script, run inside an error guard
        #[arg(long)]
        js: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = DOWNLOAD_FILE_NAME)]
        out: PathBuf,

        /// Rebuild on every change
        #[arg(short, long, default_value = "false")]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            lang,
            file,
            stdin,
            args,
            server,
        } => {
            let outcome = commands::run_code(
                &server,
                &lang,
                file.as_deref(),
                stdin.as_deref(),
                args,
            ).await?;
            if let RunOutcome::Failed { .. } = outcome {
                bail!("Run failed");
            }
        }
        Commands::Template { lang } => {
            commands::print_template(&lang)?;
        }
        Commands::Languages => {
            commands::list_languages();
        }
        Commands::Preview {
            html,
            css,
            js,
            out,
            watch,
        } => {
            let paths = PreviewPaths { html, css, js };
            if watch {
                commands::watch_preview(&paths, &out).await?;
            } else {
                commands::build_preview(&paths, &out)?;
            }
        }
    }

    Ok(())
}

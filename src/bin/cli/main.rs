mod app;
mod commands;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "flashcard-assist",
    about = "AI-assisted bulk editing for flashcard sets",
    version
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the edit endpoint over HTTP
    Serve {
        /// Listen address (overrides config and FLASHCARD_ASSIST_BIND)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Ask the model for edits to a set once and print the result
    Propose {
        /// Edit request JSON file (use "-" or omit to read stdin)
        input: Option<PathBuf>,
    },

    /// Merge a result onto a rows file
    Apply {
        /// JSON array of flashcard rows
        #[arg(long)]
        rows: PathBuf,
        /// Result produced by `propose`
        #[arg(long)]
        result: PathBuf,
        /// Original edit request; a non-empty selection restricts which cards may change
        #[arg(long)]
        request: Option<PathBuf>,
        /// Where to write the merged rows (defaults to overwriting --rows)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Read `path`, or stdin when it is "-" or absent and stdin is piped
fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => Ok(std::fs::read_to_string(p)?),
        Some(_) => read_stdin(),
        None => {
            if std::io::stdin().is_terminal() {
                anyhow::bail!("No input given. Pass a file or pipe an edit request on stdin.");
            }
            read_stdin()
        }
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
    Ok(buf)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            let app = app::App::new(cli.config.as_deref())?;
            commands::serve::run(&app, bind.as_deref()).await?;
        }
        Command::Propose { input } => {
            let app = app::App::new(cli.config.as_deref())?;
            let body = read_input(input.as_ref())?;
            commands::propose::run(&app, &body, &cli.format).await?;
        }
        Command::Apply {
            rows,
            result,
            request,
            output,
        } => {
            commands::apply::run(
                &rows,
                &result,
                request.as_deref(),
                output.as_deref(),
                &cli.format,
            )?;
        }
    }

    Ok(())
}

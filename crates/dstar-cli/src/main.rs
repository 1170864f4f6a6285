use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod logging;
mod output;
mod plan;

use logging::{init_logging, LogFormat, LoggingConfig};
use output::OutputFormat;
use plan::{handle_plan, PlanCommandArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Incremental D* replanning driver")]
struct Cli {
    /// Format of diagnostic logs on stderr (overrides DSTAR_LOG_FORMAT).
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan from a scenario's source to its goal and print the path.
    Plan {
        /// Path to a JSON scenario file.
        #[arg(long)]
        scenario: PathBuf,
        /// Output format for plan reports.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Apply each scripted event in turn and replan after it.
        #[arg(long)]
        replay: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig::from_env().with_format(cli.log_format));

    match cli.command {
        Command::Plan {
            scenario,
            format,
            replay,
        } => handle_plan(&PlanCommandArgs {
            scenario,
            format,
            replay,
        }),
    }
}

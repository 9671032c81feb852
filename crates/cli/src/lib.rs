pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "medstock",
    about = "Medstock inventory assistant operator CLI",
    long_about = "Operate the Medstock inventory assistant: migrations, demo data, config inspection, readiness checks, and conversations.",
    after_help = "Examples:\n  medstock doctor --json\n  medstock ask \"How many syringes do we have?\"\n  medstock chat --memory"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo inventory and verify it")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, DB connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Send one message to the assistant and print its reply")]
    Ask {
        #[arg(help = "Message text, e.g. \"How many syringes do we have?\"")]
        text: String,
    },
    #[command(about = "Hold an interactive conversation on stdin/stdout")]
    Chat {
        #[arg(long, help = "Conversation session identifier")]
        session: Option<String>,
        #[arg(long, help = "Answer from the demo inventory held in memory; no database needed")]
        memory: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Ask { text } => commands::ask::run(&text),
        Command::Chat { session, memory } => commands::chat::run(session.as_deref(), memory),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);

    // Servers log at info; one-shot commands keep stdout clean for their output
    let default_level = match cli.command {
        None | Some(Commands::Serve(_)) => "wikilog=info",
        Some(_) => "wikilog=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        Some(Commands::Status(args)) => commands::status::run(&args, format),
        Some(Commands::Users(args)) => commands::users::run(&args, format).await,
        None => {
            // No subcommand: serve with defaults (and WIKILOG_* overrides)
            match Cli::parse_from(["wikilog", "serve"]).command {
                Some(Commands::Serve(args)) => commands::serve::run(&args).await,
                _ => Err("failed to build default serve arguments".into()),
            }
        }
    }
}

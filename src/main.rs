use clap::Parser;
use stickies::cli::{handle_list, handle_run, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stickies=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { yes } => handle_run(cli.config, cli.data_dir, yes, cli.screen),
        Commands::List { json } => handle_list(cli.config, cli.data_dir, json, cli.screen),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "review-prompt", version, about = "Decide when to ask for a store review")]
struct Cli {
    /// Log evaluation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show tracked settings and how each condition evaluates
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record usage signals
    Track {
        #[command(subcommand)]
        action: commands::track::TrackAction,
    },
    /// Request a review if every condition holds
    Request,
    /// Forget all tracked settings
    Reset,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Status { json } => commands::review::status(json).await,
        Commands::Track { action } => commands::track::run(action).await,
        Commands::Request => commands::review::request().await,
        Commands::Reset => commands::review::reset().await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

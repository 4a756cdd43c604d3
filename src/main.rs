use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use deliver::config::Config;
use deliver::deliver::codec;
use deliver::{logging, rest};

#[derive(Parser)]
#[command(name = "deliver")]
#[command(about = "Slack deploy approval wizard for Bitrise builds")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Slack endpoints
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate the configuration and list the wizards
    CheckConfig,

    /// Print the parameters carried by a button value
    Decode {
        /// Encoded value copied from a wizard message
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Kept alive so buffered file logs are flushed on exit
    let _logging_handle = logging::init_logging(&config, cli.debug)?;

    match cli.command {
        Commands::Serve { port } => cmd_serve(config, port).await?,
        Commands::CheckConfig => cmd_check_config(&config)?,
        Commands::Decode { token } => cmd_decode(&token)?,
    }

    Ok(())
}

async fn cmd_serve(mut config: Config, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate().context("Invalid configuration")?;

    println!("Starting deliver...");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  Endpoints:");
    println!("    POST /slack/commands   Slash commands");
    println!("    POST /slack/actions    Interactivity");
    println!("    GET  /api/v1/health    Health check");
    println!("    GET  /api/v1/status    Configured wizards");
    println!();

    let state = rest::ApiState::from_config(config)?;
    rest::serve(state).await
}

fn cmd_check_config(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    for wizard in &config.wizards {
        println!(
            "{}  {} ({}/{}, prefix '{}')",
            wizard.command,
            wizard.title,
            wizard.repository.owner,
            wizard.repository.repo,
            wizard.action_prefix
        );
        for destination in &wizard.destinations {
            println!(
                "    {:<12} {} -> {}:{}",
                destination.id, destination.name, destination.app_slug, destination.workflow_id
            );
        }
    }
    println!("Configuration OK ({} wizard(s))", config.wizards.len());
    Ok(())
}

fn cmd_decode(token: &str) -> Result<()> {
    let params = codec::decode(token).context("Failed to decode token")?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

//! `tictac` - networked tic-tac-toe server and client.

use std::net::{SocketAddr, SocketAddrV4};

use anyhow::{Context, Result};
use clap::Parser;
use tictac_net::cli::{Cli, Command};
use tictac_net::{
    AttemptBudget, ConsolePlayer, Discovery, GameClient, GameServer, GameSummary, MoveSource,
    NetConfig, SearchPlayer,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = NetConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Command::Server { port } => run_server(port, &config).await,
            Command::Client {
                port,
                address,
                auto,
            } => {
                let server = SocketAddr::V4(SocketAddrV4::new(address, port));
                let summary = if auto {
                    run_client(SearchPlayer, server, &config).await?
                } else {
                    run_client(ConsolePlayer::stdin(), server, &config).await?
                };
                print_summary(&summary);
                Ok(())
            }
        }
    })
}

/// Run the game server until the process is killed
#[instrument(skip(config))]
async fn run_server(port: u16, config: &NetConfig) -> Result<()> {
    let mut server = GameServer::bind(port, config)
        .await
        .context("starting server")?;
    info!("Server ready");
    server.run().await;
    Ok(())
}

/// Play one game as the client
#[instrument(skip(player, config))]
async fn run_client<P: MoveSource>(
    player: P,
    server: SocketAddr,
    config: &NetConfig,
) -> Result<GameSummary> {
    let discovery = Discovery::bind(config)
        .await
        .context("opening discovery socket")?;
    let mut client = GameClient::new(
        player,
        discovery,
        AttemptBudget::new(*config.discovery_attempts()),
    );
    client.play(server).await.context("playing game")
}

fn print_summary(summary: &GameSummary) {
    println!("\n{}\n", summary.board().display());
    if summary.status().is_over() {
        println!("Game over: {}", summary.status());
    } else {
        println!("Game over: the server ended the game early");
    }
    if *summary.failovers() > 0 {
        println!("Moved to another server {} time(s)", summary.failovers());
    }
}

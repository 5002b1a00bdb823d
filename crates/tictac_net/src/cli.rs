//! Command-line interface for the `tictac` binary.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Networked tic-tac-toe with multicast discovery and failover
#[derive(Parser, Debug)]
#[command(name = "tictac")]
#[command(about = "Tic-tac-toe server and client with multicast failover", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML file overriding the network defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Role to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available roles
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host games as Player 1
    Server {
        /// TCP port to listen on
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,
    },

    /// Play a game as Player 2
    Client {
        /// Server's TCP port
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        /// Server's IPv4 address
        #[arg(value_parser = parse_server_address)]
        address: Ipv4Addr,

        /// Let the search pick moves instead of reading them from stdin
        #[arg(long)]
        auto: bool,
    },
}

/// Accepts a concrete IPv4 address to connect to.
fn parse_server_address(s: &str) -> Result<Ipv4Addr, String> {
    let addr: Ipv4Addr = s
        .parse()
        .map_err(|e| format!("'{s}' is not an IPv4 address: {e}"))?;
    if addr.is_unspecified() || addr.is_broadcast() {
        return Err(format!("'{s}' cannot be connected to"));
    }
    Ok(addr)
}

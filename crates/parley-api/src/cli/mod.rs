//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod user;

use clap::{Parser, Subcommand};

/// Chat relay server backed by Gemini.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Address to bind (defaults to `[server] host` in config.toml).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to `[server] port` in config.toml).
        #[arg(long, short, env = "PORT")]
        port: Option<u16>,
    },

    /// Manage user records.
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a user and print a session token for it.
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,
    },

    /// Issue a fresh session token for an existing user.
    Token {
        /// User id (UUID).
        user_id: String,
    },
}

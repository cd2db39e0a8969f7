//! CLI module for QEats Discovery
//!
//! - `serve`: HTTP API server
//! - `find`: one-shot lookup printing the matching restaurants as JSON

pub mod find;
pub mod serve;

use clap::{Parser, Subcommand};

/// QEats Discovery - restaurants that can serve a location right now
#[derive(Parser)]
#[command(name = "qeats-discovery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Look up restaurants once and print them
    Find(find::FindArgs),
}

//! MmapKV CLI Client
//!
//! Command-line interface for interacting with MmapKV.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mmapkv::network::Client;

/// MmapKV CLI
#[derive(Parser, Debug)]
#[command(name = "mmapkv-cli")]
#[command(about = "CLI for MmapKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8090")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Ping the server
    Ping,
}

fn run(args: Args) -> mmapkv::Result<ExitCode> {
    let mut client = Client::connect(&args.server)?;

    let code = match args.command {
        Commands::Get { key } => match client.get(key.as_bytes())? {
            Some(value) => {
                println!("{}", String::from_utf8_lossy(&value));
                ExitCode::SUCCESS
            }
            None => {
                println!("(not found)");
                ExitCode::FAILURE
            }
        },
        Commands::Set { key, value } => {
            client.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
            ExitCode::SUCCESS
        }
        Commands::Del { key } => {
            if client.delete(key.as_bytes())? {
                println!("OK");
                ExitCode::SUCCESS
            } else {
                println!("(not found)");
                ExitCode::FAILURE
            }
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

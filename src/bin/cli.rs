//! StrataKV CLI Client
//!
//! Command-line interface for interacting with a StrataKV server.

use clap::{Parser, Subcommand};
use stratakv::network::Client;

/// Printed when a key does not exist
const NOT_FOUND: &str = "NOT_FOUND";

/// StrataKV CLI
#[derive(Parser, Debug)]
#[command(name = "stratakv-cli")]
#[command(about = "CLI for StrataKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7070")]
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

    /// Show memtable size and segment count
    Stats,

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> stratakv::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { key } => match client.get(key.as_bytes())? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("{}", NOT_FOUND),
        },
        Commands::Set { key, value } => {
            client.set(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Stats => {
            let stats = client.stats()?;
            println!("memTableSizeBytes: {}", stats.memtable_size_bytes);
            println!("sstableCount: {}", stats.sstable_count);
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

//! ttlkv CLI Client
//!
//! Command-line interface for interacting with a ttlkv server.

use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use ttlkv::network::Client;
use ttlkv::TtlKvError;

/// ttlkv CLI
#[derive(Parser, Debug)]
#[command(name = "ttlkv-cli")]
#[command(about = "CLI for the ttlkv key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert a value with no expiry
    Insert {
        /// The key to insert
        key: String,

        /// The value to store
        value: String,
    },

    /// Insert a value that expires after a number of seconds
    InsertTtl {
        key: String,
        value: String,

        /// Time to live in seconds (fractions allowed)
        ttl_secs: f64,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// List every value
    List,

    /// Remove a key
    Remove {
        /// The key to remove
        key: String,
    },

    /// Show how long a key has been stored
    TimeAlive { key: String },

    /// Make a key expire a number of seconds from now
    SetTtl {
        key: String,

        /// Seconds from now (negative expires on the next sweep)
        #[arg(allow_negative_numbers = true)]
        secs_from_now: i64,
    },

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> ttlkv::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Insert { key, value } => {
            client.insert(&key, &value)?;
            println!("OK");
        }
        Commands::InsertTtl {
            key,
            value,
            ttl_secs,
        } => {
            let ttl = Duration::try_from_secs_f64(ttl_secs)
                .map_err(|e| TtlKvError::Config(format!("invalid ttl: {}", e)))?;
            client.insert_with_ttl(&key, &value, ttl)?;
            println!("OK");
        }
        Commands::Get { key } => match client.get(&key)? {
            Some(value) => println!("{}", value),
            None => return Err(TtlKvError::NotFound(key)),
        },
        Commands::List => {
            for value in client.list_all()? {
                println!("{}", value);
            }
        }
        Commands::Remove { key } => {
            client.remove(&key)?;
            println!("OK");
        }
        Commands::TimeAlive { key } => match client.time_alive(&key)? {
            Some(alive) => println!("{:.3}s", alive.as_secs_f64()),
            None => return Err(TtlKvError::NotFound(key)),
        },
        Commands::SetTtl { key, secs_from_now } => {
            let expires_at = chrono::Duration::try_seconds(secs_from_now)
                .and_then(|offset| Utc::now().checked_add_signed(offset))
                .ok_or_else(|| {
                    TtlKvError::Config(format!("offset out of range: {}s", secs_from_now))
                })?;
            client.set_ttl(&key, expires_at)?;
            println!("OK");
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

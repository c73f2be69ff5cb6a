//! HashKV CLI Client
//!
//! Sends a single command to a HashKV server and prints the reply.
//!
//! ```text
//! $ hashkv-cli set name Ariz
//! (nil)
//! $ hashkv-cli get name
//! "Ariz"
//! ```

use clap::Parser;
use hashkv::{Client, DEFAULT_HOST, DEFAULT_PORT};

/// HashKV CLI
#[derive(Parser, Debug)]
#[command(name = "hashkv-cli")]
#[command(about = "CLI for the HashKV key-value store")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Command and its arguments, e.g. `get name`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut client = Client::connect((args.host.as_str(), args.port)).await?;
    let reply = client.command(&args.command).await?;
    println!("{}", reply);

    Ok(())
}

pub mod client;
pub mod commands;
pub mod types;

use std::time::Duration;

use clap::{Parser, Subcommand};

use self::client::ApiClient;
use self::types::CtlError;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct StoreCtl {
    /// HTTP address of the tablekv server
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Table to operate on (server default when omitted)
    #[arg(short, long)]
    table: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15)]
    request_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a value by key, or every record under a key prefix
    Read(commands::read::ReadArgs),

    /// Write a record
    Write(commands::write::WriteArgs),

    /// Delete a record
    Delete(commands::delete::DeleteArgs),

    /// List keys
    List(commands::list::ListArgs),
}

impl StoreCtl {
    pub async fn run(self) -> Result<(), CtlError> {
        let client = ApiClient::new(
            &self.server,
            self.table,
            Duration::from_secs(self.request_timeout),
        )?;

        match self.command {
            Commands::Read(args) => commands::read::run(&client, args).await,
            Commands::Write(args) => commands::write::run(&client, args).await,
            Commands::Delete(args) => commands::delete::run(&client, args).await,
            Commands::List(args) => commands::list::run(&client, args).await,
        }
    }
}

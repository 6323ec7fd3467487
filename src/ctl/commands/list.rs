use clap::Args;

use crate::ctl::client::ApiClient;
use crate::ctl::types::CtlError;

#[derive(Args)]
pub struct ListArgs {
    /// Only list keys starting with this prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Maximum number of keys to return
    #[arg(long)]
    limit: Option<u64>,

    /// Number of matching keys to skip
    #[arg(long, default_value_t = 0)]
    offset: u64,
}

pub async fn run(client: &ApiClient, args: ListArgs) -> Result<(), CtlError> {
    let keys = client
        .list(args.prefix.as_deref(), args.limit, args.offset)
        .await?;

    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

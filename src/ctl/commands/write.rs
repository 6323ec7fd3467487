use clap::Args;

use crate::ctl::client::ApiClient;
use crate::ctl::types::CtlError;

#[derive(Args)]
pub struct WriteArgs {
    key: String,

    value: String,

    /// Expire the record after this many seconds
    #[arg(long)]
    ttl: Option<u64>,
}

pub async fn run(client: &ApiClient, args: WriteArgs) -> Result<(), CtlError> {
    // Success is silent
    client.write(&args.key, args.value.as_bytes(), args.ttl).await
}

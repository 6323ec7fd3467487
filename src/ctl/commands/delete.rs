use clap::Args;

use crate::ctl::client::ApiClient;
use crate::ctl::types::CtlError;

#[derive(Args)]
pub struct DeleteArgs {
    key: String,
}

pub async fn run(client: &ApiClient, args: DeleteArgs) -> Result<(), CtlError> {
    // Deleting a missing key succeeds; only backend failure is an error
    client.delete(&args.key).await
}

use base64::Engine;
use clap::Args;

use crate::api::rest::types::RecordPayload;
use crate::ctl::client::ApiClient;
use crate::ctl::types::CtlError;

#[derive(Args)]
pub struct ReadArgs {
    /// Key to read, or key prefix with --prefix
    key: String,

    /// Match every key starting with the given key
    #[arg(long)]
    prefix: bool,

    /// Print keys and expiry alongside values
    #[arg(short, long)]
    verbose: bool,

    /// Maximum number of records to return
    #[arg(long)]
    limit: Option<u64>,

    /// Number of matching records to skip
    #[arg(long, default_value_t = 0)]
    offset: u64,
}

pub async fn run(client: &ApiClient, args: ReadArgs) -> Result<(), CtlError> {
    let records = client
        .read(&args.key, args.prefix, args.limit, args.offset)
        .await?;

    for record in records {
        print_record(&record, args.verbose)?;
    }
    Ok(())
}

fn print_record(record: &RecordPayload, verbose: bool) -> Result<(), CtlError> {
    let value = base64::engine::general_purpose::STANDARD
        .decode(&record.value)
        .map_err(|_| CtlError::InvalidResponse("value is not valid base64".to_string()))?;
    let value = String::from_utf8_lossy(&value);

    if verbose {
        let expiry = match record.expires_at {
            Some(nanos) => chrono::DateTime::from_timestamp_nanos(nanos as i64).to_rfc3339(),
            None => "-".to_string(),
        };
        println!("{} {} {}", record.key, value, expiry);
    } else {
        println!("{}", value);
    }
    Ok(())
}

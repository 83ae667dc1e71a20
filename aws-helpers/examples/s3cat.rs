/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::error::Error;
use std::io::Write;

use aws_helpers::types::ValueKind;
use aws_helpers::value::Value;
use clap::Parser;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "s3cat")]
#[command(about = "Prints S3 objects, or lists the keys under a prefix.")]
pub struct Args {
    /// Objects to print <S3Uri>
    #[arg(required = true)]
    locations: Vec<String>,

    /// List the keys under each location instead of printing objects
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    list: bool,

    /// Include zero-length objects when listing
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    include_empty: bool,

    /// Only print the first N bytes of each object
    #[arg(long)]
    bytes: Option<u64>,

    /// Pretty-print JSON and JSON Lines objects
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    pretty: bool,
}

async fn print_object(
    client: &aws_helpers::Client,
    location: &str,
    args: &Args,
) -> Result<(), BoxError> {
    let pretty_kind = match location.rsplit_once('.') {
        Some((_, "json")) if args.pretty => Some(ValueKind::Mapping),
        Some((_, "jsonl")) if args.pretty => Some(ValueKind::JsonLines),
        _ => None,
    };

    if let (None, Some(kind)) = (args.bytes, pretty_kind) {
        let value = client.read_as(location, kind).await?;
        let mut stdout = std::io::stdout().lock();
        match value {
            Value::Mapping(map) => writeln!(stdout, "{}", serde_json::to_string_pretty(&map)?)?,
            Value::JsonLines(records) => {
                for record in records {
                    writeln!(stdout, "{}", serde_json::to_string_pretty(&record)?)?;
                }
            }
            other => tracing::warn!(?other, "unexpected value"),
        }
        return Ok(());
    }

    let body = match args.bytes {
        Some(byte_count) => client.read(location).byte_count(byte_count).send().await?,
        None => client.read_bytes(location).await?,
    };
    std::io::stdout().lock().write_all(&body)?;
    Ok(())
}

async fn list_keys(
    client: &aws_helpers::Client,
    location: &str,
    args: &Args,
) -> Result<(), BoxError> {
    let keys = client
        .list_objects(location)
        .include_empty_objects(args.include_empty)
        .send()
        .await?;
    tracing::debug!(%location, count = keys.len(), "listed keys");
    let mut stdout = std::io::stdout().lock();
    for key in keys {
        writeln!(stdout, "{key}")?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = aws_helpers::from_env().load().await;
    let client = aws_helpers::Client::new(config);

    for location in &args.locations {
        let result = if args.list {
            list_keys(&client, location, &args).await
        } else {
            print_object(&client, location, &args).await
        };
        if let Err(err) = result {
            tracing::error!(%location, "s3cat failed: {err}");
            return Err(err);
        }
    }
    Ok(())
}

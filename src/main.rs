use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;

mod cli;
mod encode;
mod param;
mod retrieve;
mod sigv4;
mod ssm;
mod store;
mod tree;
mod version;

fn main() -> Result<()> {
    init_tracing();

    let args = cli::Cli::parse();
    let key = args.query_key();
    let filter = args.type_filter();
    let retry = retrieve::RetryPolicy {
        max_retries: args.retries,
    };

    let client = ssm::SsmClient::from_env()?;
    let parameters = retrieve::fetch_all(&client, &key, &filter, retry)?;
    let tree = tree::assemble(&parameters, &key)?;
    let encoded = encode::encode(&tree, args.format)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&encoded).context("write output")?;
    if !encoded.ends_with(b"\n") {
        stdout.write_all(b"\n").context("write output")?;
    }
    Ok(())
}

// Diagnostics go to stderr so stdout stays reserved for the encoded tree.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

mod cli;
mod error;
mod fetch;
mod fields;
mod filter;
mod list;
mod paginate;
mod record;
mod render;
mod server;
mod sort;
mod storage;
mod store;
mod url_state;
mod verticals;
mod view;

use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match args.cmd {
        cli::Command::Serve(cmd) => server::run(cmd).await.context("serve failed"),
        cli::Command::List(cmd) => list::run(cmd).await.context("list failed"),
    }
}

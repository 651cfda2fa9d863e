use clap::{Parser, Subcommand};

const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

#[derive(Parser, Debug)]
#[command(name = "care-directory")]
#[command(about = "Healthcare directory listings (doctors, hospitals, labs, emergency, salons)", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the listing pages and JSON API.
    Serve(ServeArgs),
    /// Run one listing query and print the derived page as JSON.
    List(ListArgs),
}

/// Where collections are read from.
#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// Base URL of the hosted document store. When unset, collections are read
    /// from JSON files under --data-dir.
    #[arg(long, env = "CARE_STORE_URL")]
    pub store_url: Option<String>,

    /// Bearer token sent to the document store.
    #[arg(long, env = "CARE_STORE_TOKEN", hide_env_values = true)]
    pub store_token: Option<String>,

    /// Directory holding <collection>.json files.
    #[arg(long, env = "CARE_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Retries for transient store failures (429/5xx/transport).
    #[arg(long, env = "CARE_MAX_RETRIES", default_value_t = 3)]
    pub max_retries: u32,

    /// First retry delay in milliseconds; doubles per attempt up to 30s.
    #[arg(long, env = "CARE_RETRY_BACKOFF_MS", default_value_t = crate::store::DEFAULT_BACKOFF_MS)]
    pub retry_backoff_ms: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListingArgs {
    /// Records per page.
    #[arg(long, env = "CARE_PAGE_SIZE", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=100))]
    pub page_size: u64,

    /// Page-number buttons shown around the current page.
    #[arg(long, env = "CARE_WINDOW", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..=15))]
    pub window: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub listing: ListingArgs,

    #[arg(long, env = "CARE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "CARE_PORT", default_value_t = 8787)]
    pub port: u16,

    /// Render the loading placeholder when a collection fetch takes longer.
    #[arg(long, env = "CARE_FETCH_DEADLINE_MS", default_value_t = 2500)]
    pub fetch_deadline_ms: u64,

    /// Delay after the last keystroke before the search box navigates.
    #[arg(long, env = "CARE_DEBOUNCE_MS", default_value_t = 300)]
    pub debounce_ms: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub listing: ListingArgs,

    /// Vertical to list: doctors, hospitals, labs, emergency or salons.
    pub vertical: String,

    /// Listing query string, e.g. "q=knee&location=Pune&page=2".
    #[arg(long, default_value = "")]
    pub query: String,
}

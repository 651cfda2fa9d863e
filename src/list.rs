use std::io::Write;

use anyhow::Context;

use crate::cli::ListArgs;
use crate::fetch::{LoadState, fetch_records};
use crate::record::{Listable, Vertical};
use crate::server::{listing_config, open_store};
use crate::store::DocumentStore;
use crate::url_state;
use crate::verticals::{Doctor, EmergencyProvider, Hospital, Lab, Salon};
use crate::view::{self, ListingConfig};

pub async fn run(opts: ListArgs) -> anyhow::Result<()> {
    let vertical = Vertical::from_slug(opts.vertical.trim()).with_context(|| {
        let valid: Vec<&str> = Vertical::ALL.iter().map(|v| v.slug()).collect();
        format!(
            "unknown vertical {:?} (expected one of: {})",
            opts.vertical,
            valid.join(", ")
        )
    })?;
    let store = open_store(&opts.store)?;
    let cfg = listing_config(&opts.listing);
    let query = Some(opts.query.as_str()).filter(|q| !q.trim().is_empty());

    let json = match vertical {
        Vertical::Doctors => derive::<Doctor>(store.as_ref(), query, cfg).await?,
        Vertical::Hospitals => derive::<Hospital>(store.as_ref(), query, cfg).await?,
        Vertical::Labs => derive::<Lab>(store.as_ref(), query, cfg).await?,
        Vertical::Emergency => derive::<EmergencyProvider>(store.as_ref(), query, cfg).await?,
        Vertical::Salons => derive::<Salon>(store.as_ref(), query, cfg).await?,
    };

    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}")?;
    Ok(())
}

async fn derive<R: Listable>(
    store: &dyn DocumentStore,
    query: Option<&str>,
    cfg: ListingConfig,
) -> anyhow::Result<String> {
    let collection = R::VERTICAL.collection();
    let outcome = fetch_records::<R>(store)
        .await
        .with_context(|| format!("fetch collection {collection}"))?;
    if outcome.rejected > 0 {
        tracing::warn!(collection, rejected = outcome.rejected, "some documents were skipped");
    }
    let load = LoadState::Ready(outcome.records);
    let state = url_state::parse(R::VERTICAL, query);
    let view = view::build(&load, &state, cfg);
    serde_json::to_string_pretty(&view).context("serialize listing")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn derives_page_json_from_query() {
        let store = MemoryStore::default().with(
            "emergency_services",
            vec![
                Document::new("e1", json!({"name": "City Ambulance", "service": "Ambulance", "city": "Pune"})),
                Document::new("e2", json!({"name": "Blood Bank Pune", "service": "Blood Bank", "city": "Pune"})),
                Document::new("e3", json!({"name": "Metro Ambulance", "service": "Ambulance", "city": "Delhi"})),
            ],
        );
        let out = derive::<EmergencyProvider>(
            &store,
            Some("service=ambulance&location=pune"),
            ListingConfig::default(),
        )
        .await
        .unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["total_results"], 1);
        assert_eq!(v["items"][0]["id"], "e1");
        assert_eq!(v["vertical"], "emergency");
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let err = derive::<Lab>(&store, None, ListingConfig::default())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("fetch collection labs"));
    }
}

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::fields::Fields;

/// Upper bound on followed page tokens for one collection pull.
const MAX_PAGES: usize = 10_000;
const MAX_BACKOFF: Duration = Duration::from_secs(30);
pub const DEFAULT_BACKOFF_MS: u64 = 500;

/// One raw document as the store returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        let data = match data {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            data,
        }
    }

    /// Accepts `{"id": .., "data": {..}}` or a flat object carrying its own `id`.
    pub fn from_value(v: Value) -> Option<Self> {
        let Value::Object(mut obj) = v else {
            return None;
        };
        let id = match obj.remove("id") {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let data = match obj.remove("data") {
            Some(Value::Object(m)) => m,
            Some(_) | None => obj,
        };
        Some(Self { id, data })
    }
}

/// Read side of the hosted document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in `collection`, in store order. No filtering, ordering
    /// or limit is pushed down.
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Document>, FetchError>;
}

pub(crate) struct DocumentPage {
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

/// Parses a bare array of documents or a `{"documents": [..], "nextPageToken": ..}` page.
pub(crate) fn parse_page(collection: &str, v: Value) -> Result<DocumentPage, FetchError> {
    let decode = |reason: &str| FetchError::Decode {
        collection: collection.to_string(),
        reason: reason.to_string(),
    };
    let (items, next_page_token) = match v {
        Value::Array(items) => (items, None),
        Value::Object(mut obj) => {
            let items = match obj.remove("documents") {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(_) => return Err(decode("documents is not an array")),
            };
            let token = obj
                .get("nextPageToken")
                .and_then(|x| x.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());
            (items, token)
        }
        _ => return Err(decode("expected an array or a document page")),
    };
    let mut documents = Vec::with_capacity(items.len());
    for item in items {
        match Document::from_value(item) {
            Some(d) => documents.push(d),
            None => tracing::warn!(collection, "skipping non-object document"),
        }
    }
    Ok(DocumentPage {
        documents,
        next_page_token,
    })
}

/// REST client for the hosted document store.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
    token: Option<String>,
    max_retries: u32,
    backoff: Duration,
}

impl HttpDocumentStore {
    pub fn new(base_url: &str, token: Option<String>, max_retries: u32) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("care-directory/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build document store client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            max_retries,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        })
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/documents", self.base_url, collection)
    }

    async fn fetch_page(
        &self,
        collection: &str,
        page_token: Option<&str>,
    ) -> Result<DocumentPage, FetchError> {
        let attempts = self.max_retries.saturating_add(1);
        let mut backoff = self.backoff;
        let url = self.collection_url(collection);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let mut req = self.client.get(&url);
            if let Some(token) = page_token {
                req = req.query(&[("pageToken", token)]);
            }
            if let Some(bearer) = self.token.as_deref() {
                req = req.header(AUTHORIZATION, format!("Bearer {bearer}"));
            }

            let wait = match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let body: Value = resp.json().await.map_err(|e| FetchError::Decode {
                            collection: collection.to_string(),
                            reason: e.to_string(),
                        })?;
                        return parse_page(collection, body);
                    }

                    let retry_after = parse_retry_after(resp.headers().get(RETRY_AFTER));
                    let body = resp.text().await.unwrap_or_default();
                    if !is_retryable_status(status) || attempt >= attempts {
                        return Err(FetchError::Status {
                            collection: collection.to_string(),
                            status,
                            body: truncate_for_log(&body),
                        });
                    }
                    let wait = retry_after.unwrap_or(backoff).min(MAX_BACKOFF);
                    tracing::warn!(
                        collection,
                        %status,
                        attempt,
                        "retryable store status, retrying in {:?}",
                        wait
                    );
                    wait
                }
                Err(err) => {
                    if attempt >= attempts {
                        return Err(FetchError::Request {
                            collection: collection.to_string(),
                            source: err,
                        });
                    }
                    tracing::warn!(collection, attempt, "store request failed: {err}");
                    backoff
                }
            };
            tokio::time::sleep(wait).await;
            backoff = (backoff + backoff).min(MAX_BACKOFF);
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Document>, FetchError> {
        let mut out = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut token: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(collection, token.as_deref()).await?;
            out.extend(page.documents);
            let Some(next) = page.next_page_token else {
                return Ok(out);
            };
            if !seen.insert(next.clone()) {
                return Err(FetchError::Decode {
                    collection: collection.to_string(),
                    reason: format!("page token {next:?} repeated"),
                });
            }
            token = Some(next);
        }
        Err(FetchError::Decode {
            collection: collection.to_string(),
            reason: format!("more than {MAX_PAGES} pages"),
        })
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

pub fn parse_retry_after(value: Option<&reqwest::header::HeaderValue>) -> Option<Duration> {
    let value = value?.to_str().ok()?.trim();
    let secs = value.parse::<u64>().ok()?;
    Some(Duration::from_secs(secs))
}

pub fn truncate_for_log(text: &str) -> String {
    let trimmed = text.trim();
    let max_len = 300usize;
    match trimmed.char_indices().nth(max_len) {
        None => trimmed.to_string(),
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
    }
}

/// Fixed in-memory collections.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub collections: std::collections::HashMap<String, Vec<Document>>,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with(mut self, collection: &str, docs: Vec<Document>) -> Self {
        self.collections.insert(collection.to_string(), docs);
        self
    }
}

#[cfg(test)]
#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Document>, FetchError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail {
            return Err(FetchError::Decode {
                collection: collection.to_string(),
                reason: "store offline".into(),
            });
        }
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }
}

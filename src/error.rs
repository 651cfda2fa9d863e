use reqwest::StatusCode;
use thiserror::Error;

/// Failure to pull a collection from the document store.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request for collection {collection} failed: {source}")]
    Request {
        collection: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("collection {collection} returned status {status}: {body}")]
    Status {
        collection: String,
        status: StatusCode,
        body: String,
    },

    #[error("collection {collection} returned malformed payload: {reason}")]
    Decode { collection: String, reason: String },

    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown collection {0}")]
    UnknownCollection(String),

    #[error("fetch cancelled")]
    Cancelled,
}

/// A document that could not be turned into a typed record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("document has no id")]
    MissingId,

    #[error("document {id}: field {field} has unusable type ({found})")]
    InvalidField {
        id: String,
        field: &'static str,
        found: &'static str,
    },
}

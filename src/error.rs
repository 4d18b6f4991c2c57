use thiserror::Error;

/// Rejected user input (query strings, CLI arguments)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("unknown analysis mode '{0}'")]
    UnknownMode(String),
    #[error("unknown direction '{0}' (expected 'for' or 'against')")]
    UnknownDirection(String),
    #[error("invalid line '{0}': use whole numbers or numbers ending in .5 (e.g. 10, 10.5)")]
    InvalidLine(String),
}

/// Failures talking to a remote fixture store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{table} query returned HTTP {status}: {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },
    #[error("malformed {table} payload: {message}")]
    Payload { table: String, message: String },
    #[error("invalid store URL: {0}")]
    Url(#[from] url::ParseError),
}

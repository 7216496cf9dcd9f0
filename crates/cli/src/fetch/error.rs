use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub(crate) type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("fetch error: HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fetch error: HTTP response error: status = {status_code}, message = {message}")]
    Response {
        status_code: StatusCode,
        message: String,
    },

    #[error("fetch error: {url} did not render {missing:?} within {timeout_secs} seconds")]
    Timeout {
        url: String,
        missing: Vec<String>,
        timeout_secs: u64,
    },

    #[error("fetch error: reading the `{}` page failed: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

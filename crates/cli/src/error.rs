use thiserror::Error;
use topicrank_analytics::error::ParseError;
use topicrank_vis::error::VisError;

use crate::config::ConfigError;
use crate::fetch::error::FetchError;
use crate::mode::Mode;
use crate::publish::PublishError;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("CLI error: {0}")]
    Validation(#[from] ValidationError),

    #[error("CLI error: {0}")]
    Fetch(#[from] FetchError),

    #[error("CLI error: {0}")]
    Vis(#[from] VisError),

    #[error("CLI error: {0}")]
    Config(#[from] ConfigError),

    #[error("CLI error: {0}")]
    Publish(#[from] PublishError),

    #[error("CLI error: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CLI error: processing {url} failed: {source}")]
    Entity {
        url: String,
        #[source]
        source: EntityError,
    },

    #[error("CLI error: no topic of the {0} run could be processed")]
    NoSnapshots(Mode),
}

/// The input pages do not fit the selected mode. Detected before any page is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("validation error: the summary mode requires a page, found none")]
    Summary,

    #[error("validation error: the comparison mode requires exactly 2 pages, found {found}")]
    Comparison { found: usize },

    #[error("validation error: the ranking mode requires at least 2 pages, found {found}")]
    Ranking { found: usize },
}

/// A failure confined to one topic of a run.
#[derive(Debug, Error)]
pub(crate) enum EntityError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Vis(#[from] VisError),
}

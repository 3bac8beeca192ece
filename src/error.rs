//! Error taxonomy shared by every pipeline stage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network failure or non-2xx response.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The structural query matched nothing; usually means the page layout drifted.
    #[error("selector `{selector}` matched no element at index {index}")]
    SelectorNotFound { selector: String, index: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("cannot coerce {value:?} in column `{column}` (row {row}) to an integer")]
    TypeCoercion {
        column: String,
        row: usize,
        value: String,
    },

    #[error("no country code for {name:?}")]
    UnresolvedEntity { name: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub(crate) fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

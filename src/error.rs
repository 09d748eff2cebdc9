use thiserror::Error;

use crate::taxonomy::TaxonomyKey;

/// Errors produced by the coverage pipeline.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// A sub-type was supplied for a non-docs content type, omitted for docs,
    /// or either value is outside its enumeration.
    #[error("invalid taxonomy combination: content type '{content_type}', sub-type {sub_type:?}")]
    InvalidCombination {
        content_type: String,
        sub_type: Option<String>,
    },

    /// A fetch was requested with input that does not pass taxonomy validation.
    #[error("invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    /// The taxonomy leaf is valid but no snapshot is registered for it.
    #[error("unknown content type: no snapshot registered for {0}")]
    UnknownContentType(TaxonomyKey),

    #[error("unknown language code: '{0}'")]
    UnknownLanguage(String),

    #[error("unknown translation status: '{0}'")]
    UnknownStatus(String),

    #[error("page {page} is out of range (total pages: {total_pages})")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),

    /// The same file path appeared twice in one snapshot document.
    #[error("duplicate file path in snapshot: {0}")]
    DuplicateFile(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("preference error: {0}")]
    Preference(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;

impl MatrixError {
    /// Whether a remote load that failed with this error is worth retrying.
    ///
    /// Server errors and transport failures are transient; client errors and
    /// malformed documents are not.
    pub fn is_transient(&self) -> bool {
        match self {
            MatrixError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            MatrixError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

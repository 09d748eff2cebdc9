//! Translation coverage matrix.
//!
//! Reports, per documentation file, which languages have a translated
//! counterpart, for each content taxonomy leaf of a documentation site.
//!
//! Data flows one way: a taxonomy selection is resolved to a coverage
//! snapshot (`source`), reduced by the active filter (`filter`), then ordered
//! and paginated for display (`presentation`). `view` holds the per-view state
//! that drives those steps and `preference` persists the preferred language.

pub mod config;
pub mod error;
pub mod filter;
pub mod i18n;
pub mod metrics;
pub mod preference;
pub mod presentation;
pub mod retry;
pub mod snapshot;
pub mod source;
pub mod taxonomy;
pub mod view;

pub use error::{MatrixError, Result};
pub use filter::{FilterSelection, TranslationStatus};
pub use i18n::Language;
pub use snapshot::{CoverageRecord, CoverageSnapshot, FileCoverage};
pub use taxonomy::{ContentType, DocsSubType, TaxonomyKey};
pub use view::{FetchOutcome, MatrixPage, MatrixView};

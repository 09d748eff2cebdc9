//! Language registry and the validated language handle.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the closed set of languages, their
//!   display names and the base ordering
//! - `language`: Type-safe `Language` that can only hold registered codes
//!
//! # Example
//!
//! ```rust,ignore
//! use translation_matrix::i18n::{Language, LanguageRegistry};
//!
//! let base = Language::base();
//! let japanese = Language::from_code("ja")?;
//! let columns = LanguageRegistry::get().list();
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};

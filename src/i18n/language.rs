//! Language type: a validated handle into the language registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MatrixError, Result};
use crate::i18n::{LanguageConfig, LanguageRegistry};

/// A validated language code.
///
/// Only codes present in the registry can be constructed, so any `Language`
/// value is known to have a display name and a position in the base ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    /// The base language constant.
    pub const ENGLISH: Language = Language { code: "en" };

    /// Create a Language from a locale tag.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the registry
    /// * `Err(MatrixError::UnknownLanguage)` otherwise
    pub fn from_code(code: &str) -> Result<Language> {
        LanguageRegistry::get()
            .get_by_code(code)
            .map(|config| Language { code: config.code })
            .ok_or_else(|| MatrixError::UnknownLanguage(code.to_string()))
    }

    /// Get the base (reference) language.
    pub fn base() -> Language {
        Language {
            code: LanguageRegistry::get().base().code,
        }
    }

    /// Every registered language in registry-declared order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list()
            .iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// value built through `from_code`, `base`, `all` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// English display name (e.g., "Japanese").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_base(&self) -> bool {
        self.config().is_base
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for Language {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(serde::de::Error::custom)
    }
}

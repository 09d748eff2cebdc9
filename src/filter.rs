//! Filter engine: reduce a snapshot to the files matching a language/status selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};
use crate::i18n::Language;
use crate::snapshot::{CoverageRecord, CoverageSnapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    #[default]
    All,
    Translated,
    Untranslated,
}

impl TranslationStatus {
    pub const ALL: [TranslationStatus; 3] = [
        TranslationStatus::All,
        TranslationStatus::Untranslated,
        TranslationStatus::Translated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStatus::All => "all",
            TranslationStatus::Translated => "translated",
            TranslationStatus::Untranslated => "untranslated",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TranslationStatus::All => "All",
            TranslationStatus::Translated => "Translated",
            TranslationStatus::Untranslated => "Untranslated",
        }
    }

    fn accepts(&self, present: bool) -> bool {
        match self {
            TranslationStatus::All => true,
            TranslationStatus::Translated => present,
            TranslationStatus::Untranslated => !present,
        }
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationStatus {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TranslationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(())
    }
}

/// The language/status pair a view is filtered by.
///
/// `language: None` ignores the language and evaluates the status against the
/// base language instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    pub language: Option<Language>,
    pub status: TranslationStatus,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            language: Some(Language::base()),
            status: TranslationStatus::All,
        }
    }
}

impl FilterSelection {
    pub fn new(language: Option<Language>, status: TranslationStatus) -> Self {
        Self { language, status }
    }

    /// Build a selection from raw selection-event values.
    ///
    /// Fails with `UnknownLanguage` for a code outside the registry and
    /// `UnknownStatus` for anything but all/translated/untranslated.
    pub fn parse(language: Option<&str>, status: &str) -> Result<Self> {
        let language = language.map(Language::from_code).transpose()?;
        let status = status
            .parse()
            .map_err(|_| MatrixError::UnknownStatus(status.to_string()))?;
        Ok(Self { language, status })
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `apply` returns its input untouched for this selection.
    pub fn is_identity(&self) -> bool {
        self.language.is_none() && self.status == TranslationStatus::All
    }

    /// Summary label for the active filter, or `None` when the default filter is active.
    ///
    /// Formatted as "<Language> / <Status>"; without a language only the
    /// status part is shown.
    pub fn badge(&self) -> Option<String> {
        if self.is_default() {
            return None;
        }
        let language = self.language.map(|l| l.name()).unwrap_or_default();
        Some(format!("{} / {}", language, self.status.label()).trim().to_string())
    }

    fn includes(&self, record: &CoverageRecord) -> bool {
        let language = self.language.unwrap_or_else(Language::base);
        self.status.accepts(record.has(language))
    }
}

/// Apply a selection to a snapshot.
///
/// Surviving entries keep their original relative order. The identity
/// selection (no language, status `All`) returns a handle to the input itself.
pub fn apply(snapshot: &CoverageSnapshot, selection: &FilterSelection) -> CoverageSnapshot {
    if selection.is_identity() {
        return snapshot.clone();
    }
    snapshot.retain_into(|entry| selection.includes(&entry.record))
}

//! Preferred-language persistence.
//!
//! The preference is a single optional language stored outside the process.
//! `PreferenceStore` owns the state machine (Default or Set) and writes every
//! change through a `PreferenceSlot`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MatrixError, Result};
use crate::i18n::Language;

/// A single persisted key-value slot holding a language code.
pub trait PreferenceSlot {
    /// Read the stored code, `None` if nothing has been stored.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored code; `None` clears it.
    fn store(&self, code: Option<&str>) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    preferred_language: Option<String>,
    updated_at: DateTime<Utc>,
}

/// Preference kept in a small JSON file.
#[derive(Debug, Clone)]
pub struct FilePreferenceSlot {
    path: PathBuf,
}

impl FilePreferenceSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceSlot for FilePreferenceSlot {
    fn load(&self) -> Result<Option<String>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredPreference = serde_json::from_slice(&bytes).map_err(|e| {
            MatrixError::Preference(format!(
                "unreadable preference file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(stored.preferred_language)
    }

    fn store(&self, code: Option<&str>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let stored = StoredPreference {
            preferred_language: code.map(str::to_string),
            updated_at: Utc::now(),
        };
        std::fs::write(&self.path, serde_json::to_vec_pretty(&stored)?)?;
        debug!("Wrote preference {:?} to {}", code, self.path.display());
        Ok(())
    }
}

/// In-process slot; clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceSlot {
    value: Arc<Mutex<Option<String>>>,
}

impl MemoryPreferenceSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceSlot for MemoryPreferenceSlot {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, code: Option<&str>) -> Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = code.map(str::to_string);
        Ok(())
    }
}

/// The user's preferred language.
///
/// Holds `None` in the Default state. A stored base language is the same as
/// Default.
#[derive(Debug)]
pub struct PreferenceStore<S> {
    slot: S,
    current: Option<Language>,
}

impl<S: PreferenceSlot> PreferenceStore<S> {
    /// Read the persisted preference.
    ///
    /// An unreadable slot or a code that is no longer registered falls back to
    /// Default with a warning; the preference is never worth failing a view over.
    pub fn open(slot: S) -> Self {
        let current = match slot.load() {
            Ok(Some(code)) => match Language::from_code(&code) {
                Ok(lang) if !lang.is_base() => Some(lang),
                Ok(_) => None,
                Err(e) => {
                    warn!("Ignoring stored preferred language: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read preferred language, using default: {}", e);
                None
            }
        };

        Self { slot, current }
    }

    /// The preferred language, or the base language when none is set.
    pub fn get(&self) -> Language {
        self.current.unwrap_or_else(Language::base)
    }

    /// The explicitly chosen language, `None` in the Default state.
    pub fn preferred(&self) -> Option<Language> {
        self.current
    }

    pub fn is_default(&self) -> bool {
        self.current.is_none()
    }

    /// Select a language. Selecting the current preference again toggles back
    /// to Default, as does selecting the base language.
    ///
    /// Returns the effective preference after the change.
    pub fn set(&mut self, language: Language) -> Result<Language> {
        let next = if self.current == Some(language) || language.is_base() {
            None
        } else {
            Some(language)
        };
        self.persist(next)?;
        Ok(self.get())
    }

    /// Return to Default.
    pub fn clear(&mut self) -> Result<()> {
        self.persist(None)
    }

    fn persist(&mut self, next: Option<Language>) -> Result<()> {
        self.slot.store(next.map(|l| l.code()))?;
        self.current = next;
        Ok(())
    }
}

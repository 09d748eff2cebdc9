//! Coverage snapshot data model.
//!
//! A snapshot is the per-file language coverage of one taxonomy leaf. The
//! document shape is a JSON object mapping file paths to `{ "langs": [...] }`,
//! and the key order of that object is the display order of the files.
//!
//! Snapshots are immutable once built. Deriving a subset always allocates a
//! new snapshot; cloning one only bumps a reference count.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::{MatrixError, Result};
use crate::i18n::Language;

/// The set of languages a single file has been translated into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageRecord {
    langs: Vec<Language>,
}

impl CoverageRecord {
    /// Build a record, collapsing duplicates and keeping the first occurrence.
    pub fn new(langs: impl IntoIterator<Item = Language>) -> Self {
        let mut seen = HashSet::new();
        let langs = langs.into_iter().filter(|l| seen.insert(*l)).collect();
        Self { langs }
    }

    pub fn langs(&self) -> &[Language] {
        &self.langs
    }

    /// Whether a translation exists for `language`. Absence means "not translated".
    pub fn has(&self, language: Language) -> bool {
        self.langs.contains(&language)
    }
}

/// One row of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCoverage {
    pub path: String,
    pub record: CoverageRecord,
}

impl FileCoverage {
    pub fn new(path: impl Into<String>, record: CoverageRecord) -> Self {
        Self {
            path: path.into(),
            record,
        }
    }
}

/// Immutable, ordered mapping from file path to coverage record.
#[derive(Debug, Clone, Default)]
pub struct CoverageSnapshot {
    entries: Arc<Vec<FileCoverage>>,
    /// Path to position in `entries`.
    index: Arc<HashMap<String, usize>>,
}

impl CoverageSnapshot {
    /// Build a snapshot from ordered entries.
    ///
    /// Fails with `DuplicateFile` if a path appears more than once.
    pub fn from_entries(entries: Vec<FileCoverage>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.path.clone(), position).is_some() {
                return Err(MatrixError::DuplicateFile(entry.path.clone()));
            }
        }
        Ok(Self {
            entries: Arc::new(entries),
            index: Arc::new(index),
        })
    }

    /// Decode a snapshot document.
    ///
    /// Language codes outside the registry are dropped with a warning, since the
    /// producer tracks more locales than the matrix displays.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_slice(bytes)?;
        let mut unknown = BTreeSet::new();

        let entries = raw
            .0
            .into_iter()
            .map(|(path, record)| {
                let langs = record.langs.into_iter().filter_map(|code| {
                    match Language::from_code(&code) {
                        Ok(lang) => Some(lang),
                        Err(_) => {
                            unknown.insert(code);
                            None
                        }
                    }
                });
                FileCoverage::new(path, CoverageRecord::new(langs))
            })
            .collect();

        if !unknown.is_empty() {
            warn!(
                "Dropped unregistered language codes from snapshot: {:?}",
                unknown
            );
        }

        Self::from_entries(entries)
    }

    /// Derive a new snapshot holding the entries that satisfy `keep`, in order.
    pub(crate) fn retain_into(&self, mut keep: impl FnMut(&FileCoverage) -> bool) -> Self {
        let entries: Vec<FileCoverage> =
            self.entries.iter().filter(|e| keep(e)).cloned().collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, e)| (e.path.clone(), position))
            .collect();
        Self {
            entries: Arc::new(entries),
            index: Arc::new(index),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileCoverage] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileCoverage> {
        self.entries.iter()
    }

    pub fn get(&self, path: &str) -> Option<&CoverageRecord> {
        self.index.get(path).map(|&position| &self.entries[position].record)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Whether two snapshots share the same underlying storage.
    pub fn shares_storage_with(&self, other: &CoverageSnapshot) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl PartialEq for CoverageSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.shares_storage_with(other) || self.entries == other.entries
    }
}

impl Eq for CoverageSnapshot {}

impl Serialize for CoverageSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in self.entries.iter() {
            map.serialize_entry(&entry.path, &entry.record)?;
        }
        map.end()
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    langs: Vec<String>,
}

/// Document-ordered key/value pairs.
struct RawSnapshot(Vec<(String, RawRecord)>);

impl<'de> Deserialize<'de> for RawSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = RawSnapshot;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from file path to { langs: [...] }")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((path, record)) = access.next_entry::<String, RawRecord>()? {
                    entries.push((path, record));
                }
                Ok(RawSnapshot(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

//! Snapshot loading metrics and per-language coverage statistics.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::i18n::Language;
use crate::snapshot::CoverageSnapshot;

/// Counters for snapshot loads performed through a caching source.
#[derive(Debug, Default)]
pub struct SourceMetrics {
    /// Number of fetches answered from the cache
    cache_hits: AtomicUsize,

    /// Number of fetches that had to go to the backing source
    cache_misses: AtomicUsize,

    /// Number of backing loads that failed
    load_failures: AtomicUsize,
}

impl SourceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total = hits + misses;
        let cache_hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            load_failures: self.load_failures(),
        }
    }
}

/// Point-in-time view of `SourceMetrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub load_failures: usize,
}

/// Translated-file count for one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageCoverage {
    pub language: Language,
    pub translated: usize,

    /// Share of files translated, as a percentage (0-100)
    pub percent: f64,
}

/// Per-language coverage of a snapshot, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total_files: usize,
    pub languages: Vec<LanguageCoverage>,
}

impl CoverageReport {
    pub fn from_snapshot(snapshot: &CoverageSnapshot) -> Self {
        let total_files = snapshot.len();
        let languages = Language::all()
            .into_iter()
            .map(|language| {
                let translated = snapshot.iter().filter(|e| e.record.has(language)).count();
                let percent = if total_files > 0 {
                    (translated as f64 / total_files as f64) * 100.0
                } else {
                    0.0
                };
                LanguageCoverage {
                    language,
                    translated,
                    percent,
                }
            })
            .collect();

        Self {
            total_files,
            languages,
        }
    }

    pub fn for_language(&self, language: Language) -> Option<&LanguageCoverage> {
        self.languages.iter().find(|c| c.language == language)
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} files", self.total_files)?;
        for coverage in &self.languages {
            writeln!(
                f,
                "  {:<16} {:>6} ({:>5.1}%)",
                coverage.language.name(),
                coverage.translated,
                coverage.percent
            )?;
        }
        Ok(())
    }
}

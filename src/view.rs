//! Matrix view state.
//!
//! A `MatrixView` owns everything one rendered matrix depends on: the selected
//! taxonomy leaf, its snapshot, the filter selection, and the page state.
//! Every user action is a single `&mut self` transition, so resets (new
//! snapshot resets the filter and page; new filter or page size resets the
//! page) happen in the same update as the change that causes them.
//!
//! Fetches are split into `select_taxonomy`, which hands out a `FetchTicket`,
//! and `complete_fetch`, which applies the result only if the ticket still
//! matches the latest selection.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MatrixError, Result};
use crate::filter::{self, FilterSelection, TranslationStatus};
use crate::i18n::Language;
use crate::presentation::{self, ItemRange, PageSize};
use crate::snapshot::{CoverageSnapshot, FileCoverage};
use crate::source::{self, CoverageSource};
use crate::taxonomy::TaxonomyKey;

/// Identifies one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    key: TaxonomyKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> TaxonomyKey {
        self.key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The snapshot replaced the view's data.
    Applied,
    /// A newer selection superseded this fetch; the result was dropped.
    Stale,
    /// The fetch failed; the previous snapshot is kept but not shown.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub language: Language,
    pub name: &'static str,
    /// Marks the user's preferred language column.
    pub preferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub path: String,
    pub url: String,
    /// Presence per header column, in header order.
    pub translated: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: PageSize,
    pub range: ItemRange,
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixPage {
    pub taxonomy: String,
    pub status: ViewStatus,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<MatrixRow>,
    pub pagination: PageInfo,
    pub filter_badge: Option<String>,
}

#[derive(Debug)]
pub struct MatrixView {
    key: TaxonomyKey,
    generation: u64,
    snapshot: CoverageSnapshot,
    filtered: CoverageSnapshot,
    selection: FilterSelection,
    page: usize,
    page_size: PageSize,
    status: ViewStatus,
}

impl Default for MatrixView {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl MatrixView {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            key: TaxonomyKey::default(),
            generation: 0,
            snapshot: CoverageSnapshot::default(),
            filtered: CoverageSnapshot::default(),
            selection: FilterSelection::default(),
            page: 1,
            page_size,
            status: ViewStatus::Idle,
        }
    }

    pub fn key(&self) -> TaxonomyKey {
        self.key
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn selection(&self) -> FilterSelection {
        self.selection
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn snapshot(&self) -> &CoverageSnapshot {
        &self.snapshot
    }

    /// The snapshot after the current filter selection.
    pub fn filtered(&self) -> &CoverageSnapshot {
        &self.filtered
    }

    /// Pages of the rows currently shown; zero unless the view is `Ready`.
    pub fn total_pages(&self) -> usize {
        presentation::total_pages(self.visible().len(), self.page_size.get())
    }

    /// Start a fetch for `key`, superseding any fetch still in flight.
    pub fn select_taxonomy(&mut self, key: TaxonomyKey) -> FetchTicket {
        self.generation += 1;
        self.key = key;
        self.page = 1;
        self.status = ViewStatus::Loading;
        FetchTicket {
            key,
            generation: self.generation,
        }
    }

    /// Deliver the result of a fetch started with `select_taxonomy`.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<CoverageSnapshot>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation || ticket.key != self.key {
            debug!(
                "Discarding stale snapshot for {} (current selection: {})",
                ticket.key, self.key
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.selection = FilterSelection::default();
                self.page = 1;
                self.refilter();
                self.status = ViewStatus::Ready;
                FetchOutcome::Applied
            }
            Err(e) => {
                warn!("Coverage fetch for {} failed: {}", ticket.key, e);
                self.status = ViewStatus::Failed(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Select `key` and load it from `source` in one step.
    pub async fn load<S: CoverageSource>(&mut self, source: &S, key: TaxonomyKey) -> FetchOutcome {
        let ticket = self.select_taxonomy(key);
        let result = source::fetch_key(source, key).await;
        self.complete_fetch(ticket, result)
    }

    pub fn set_language(&mut self, language: Option<Language>) {
        self.set_selection(FilterSelection {
            language,
            ..self.selection
        });
    }

    pub fn set_status(&mut self, status: TranslationStatus) {
        self.set_selection(FilterSelection {
            status,
            ..self.selection
        });
    }

    pub fn set_selection(&mut self, selection: FilterSelection) {
        self.selection = selection;
        self.page = 1;
        self.refilter();
    }

    /// Restore the default filter (base language, all statuses).
    pub fn reset_filters(&mut self) {
        self.set_selection(FilterSelection::default());
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Move to another page of the filtered result.
    ///
    /// Fails with `PageOutOfRange` without changing the current page. Only
    /// page 1 exists while nothing is shown.
    pub fn set_page(&mut self, page: usize) -> Result<()> {
        let total_pages = self.total_pages();
        if page == 0 || page > total_pages.max(1) {
            return Err(MatrixError::PageOutOfRange { page, total_pages });
        }
        self.page = page;
        Ok(())
    }

    /// Build the current frame.
    ///
    /// `preferred` is the explicitly chosen language, if any; `repo_url` prefixes
    /// file paths to form row links. Rows are only shown once a snapshot has
    /// been applied and the latest fetch did not fail.
    pub fn render(&self, preferred: Option<Language>, repo_url: &str) -> Result<MatrixPage> {
        let languages = presentation::ordered_languages(preferred);
        let header = languages
            .iter()
            .map(|&language| HeaderCell {
                language,
                name: language.name(),
                preferred: Some(language) == preferred,
            })
            .collect();

        let page = presentation::paginate(self.visible(), self.page_size.get(), self.page)?;

        let base_url = repo_url.trim_end_matches('/');
        let rows = page
            .items
            .iter()
            .map(|entry| MatrixRow {
                path: entry.path.clone(),
                url: format!("{}/{}", base_url, entry.path),
                translated: languages.iter().map(|l| entry.record.has(*l)).collect(),
            })
            .collect();

        Ok(MatrixPage {
            taxonomy: self.key.to_string(),
            status: self.status.clone(),
            header,
            rows,
            pagination: PageInfo {
                page: page.page,
                total_pages: page.total_pages,
                page_size: self.page_size,
                range: page.range,
            },
            filter_badge: self.selection.badge(),
        })
    }

    fn visible(&self) -> &[FileCoverage] {
        match self.status {
            ViewStatus::Ready => self.filtered.entries(),
            _ => &[],
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter::apply(&self.snapshot, &self.selection);
    }
}

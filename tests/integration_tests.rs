//! Integration tests for the translation matrix
//!
//! These tests drive the public API end to end: snapshot documents loaded
//! from disk or HTTP, filtered, ordered and paginated through a view, with the
//! preferred language persisted in between.

use std::time::Duration;

use proptest::prelude::*;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use translation_matrix::filter::{self, FilterSelection, TranslationStatus};
use translation_matrix::i18n::Language;
use translation_matrix::preference::{FilePreferenceSlot, PreferenceStore};
use translation_matrix::presentation::{self, PageSize};
use translation_matrix::retry::RetryConfig;
use translation_matrix::snapshot::{CoverageRecord, CoverageSnapshot, FileCoverage};
use translation_matrix::source::{
    self, CachedSource, CoverageSource, FileCoverageSource, HttpCoverageSource,
    StaticCoverageSource,
};
use translation_matrix::taxonomy::{DocsSubType, TaxonomyKey};
use translation_matrix::view::{FetchOutcome, MatrixView, ViewStatus};
use translation_matrix::MatrixError;

const REPO: &str = "https://github.com/kubernetes/website/blob/main";

// ==================== Test Helpers ====================

/// Two-file snapshot document used by the worked scenarios
const SCENARIO_DOC: &str = r#"{
    "a.md": {"langs": ["en", "ja"]},
    "b.md": {"langs": ["en"]}
}"#;

fn lang(code: &str) -> Language {
    Language::from_code(code).expect("registered language")
}

/// Write `<root>/<leaf path>` for a taxonomy leaf
fn write_leaf(root: &std::path::Path, key: TaxonomyKey, body: &str) {
    let path = root.join(key.snapshot_path());
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create leaf dir");
    std::fs::write(path, body).expect("Failed to write leaf");
}

/// A document with `count` files, every third one translated to Japanese
fn numbered_doc(count: usize) -> String {
    let body: Vec<String> = (0..count)
        .map(|i| {
            let langs = if i % 3 == 0 { r#"["en", "ja"]"# } else { r#"["en"]"# };
            format!(r#""content/en/docs/page-{:03}.md": {{"langs": {}}}"#, i, langs)
        })
        .collect();
    format!("{{{}}}", body.join(","))
}

fn fast_retry() -> RetryConfig {
    RetryConfig::new(3, Duration::from_millis(5))
}

// ==================== Worked Scenario Tests ====================

#[test]
fn test_scenario_translated_for_japanese() {
    let snapshot = CoverageSnapshot::from_json(SCENARIO_DOC.as_bytes()).unwrap();
    let result = filter::apply(
        &snapshot,
        &FilterSelection::new(Some(lang("ja")), TranslationStatus::Translated),
    );

    assert_eq!(result.paths().collect::<Vec<_>>(), vec!["a.md"]);
}

#[test]
fn test_scenario_untranslated_without_language() {
    let snapshot = CoverageSnapshot::from_json(SCENARIO_DOC.as_bytes()).unwrap();
    let result = filter::apply(
        &snapshot,
        &FilterSelection::new(None, TranslationStatus::Untranslated),
    );

    assert!(result.is_empty());
}

#[test]
fn test_scenario_95_entries_page_4() {
    let entries: Vec<usize> = (0..95).collect();
    let page = presentation::paginate(&entries, 30, 4).unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.items, &entries[90..95]);
    assert_eq!(page.total_pages, 4);
}

#[tokio::test]
async fn test_scenario_superseded_docs_fetch() {
    let source = StaticCoverageSource::new()
        .with(
            TaxonomyKey::Docs(DocsSubType::Concept),
            CoverageSnapshot::from_json(br#"{"concept.md": {"langs": ["en"]}}"#).unwrap(),
        )
        .with(
            TaxonomyKey::Docs(DocsSubType::Task),
            CoverageSnapshot::from_json(br#"{"task.md": {"langs": ["en"]}}"#).unwrap(),
        );

    let mut view = MatrixView::default();
    let concept_ticket = view.select_taxonomy(TaxonomyKey::Docs(DocsSubType::Concept));
    let task_ticket = view.select_taxonomy(TaxonomyKey::Docs(DocsSubType::Task));

    // Both loads run concurrently; the older one finishes last
    let (concept, task) = tokio::join!(
        source::fetch_key(&source, concept_ticket.key()),
        source::fetch_key(&source, task_ticket.key()),
    );
    assert_eq!(view.complete_fetch(task_ticket, task), FetchOutcome::Applied);
    assert_eq!(view.complete_fetch(concept_ticket, concept), FetchOutcome::Stale);

    let page = view.render(None, REPO).unwrap();
    let shown: Vec<_> = page.rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(shown, vec!["task.md"]);
    assert_eq!(page.taxonomy, "docs/task");
}

// ==================== File Source Tests ====================

#[tokio::test]
async fn test_file_source_loads_every_leaf_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for key in TaxonomyKey::all() {
        write_leaf(
            temp_dir.path(),
            key,
            &format!(r#"{{"{}.md": {{"langs": ["en"]}}}}"#, key),
        );
    }

    let file_source = FileCoverageSource::new(temp_dir.path());
    for (key, result) in source::fetch_all(&file_source).await {
        let snapshot = assert_ok!(result);
        assert!(snapshot.get(&format!("{}.md", key)).is_some());
    }
}

#[tokio::test]
async fn test_file_source_missing_leaf_is_unknown_content_type() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_source = FileCoverageSource::new(temp_dir.path());

    let result = source::fetch(&file_source, "blog", None).await;
    assert!(matches!(
        result,
        Err(MatrixError::UnknownContentType(TaxonomyKey::Blog))
    ));
}

#[tokio::test]
async fn test_file_source_malformed_document_fails_whole_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_leaf(
        temp_dir.path(),
        TaxonomyKey::Release,
        r#"{"a.md": {"langs": ["en"]}, "b.md": {"langs": "#,
    );

    let file_source = FileCoverageSource::new(temp_dir.path());
    let result = file_source.load(TaxonomyKey::Release).await;
    assert!(matches!(result, Err(MatrixError::Json(_))));
}

#[tokio::test]
async fn test_invalid_taxonomy_never_reaches_source() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_source = CachedSource::new(FileCoverageSource::new(temp_dir.path()));

    assert_err!(source::fetch(&file_source, "docs", None).await);
    assert_err!(source::fetch(&file_source, "training", Some("task")).await);
    assert_err!(source::fetch(&file_source, "news", None).await);

    let report = file_source.metrics();
    assert_eq!(report.cache_hits + report.cache_misses, 0);
}

// ==================== HTTP Source Tests ====================

#[tokio::test]
async fn test_http_source_fetches_leaf_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/summary/docs/tasks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCENARIO_DOC))
        .expect(1)
        .mount(&mock_server)
        .await;

    let http = HttpCoverageSource::new(
        reqwest::Client::new(),
        format!("{}/summary/", mock_server.uri()),
    )
    .with_retry(fast_retry());
    let cached = CachedSource::new(http);

    let first = assert_ok!(source::fetch(&cached, "docs", Some("task")).await);
    let second = assert_ok!(source::fetch(&cached, "docs", Some("task")).await);

    assert_eq!(first.len(), 2);
    assert!(first.shares_storage_with(&second));
    assert_eq!(cached.metrics().cache_hits, 1);
}

#[tokio::test]
async fn test_http_source_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blog.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blog.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCENARIO_DOC))
        .mount(&mock_server)
        .await;

    let http = HttpCoverageSource::new(reqwest::Client::new(), mock_server.uri())
        .with_retry(fast_retry());

    let snapshot = assert_ok!(http.load(TaxonomyKey::Blog).await);
    assert_eq!(snapshot.len(), 2);
}

#[tokio::test]
async fn test_http_source_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/partners.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let http = HttpCoverageSource::new(reqwest::Client::new(), mock_server.uri())
        .with_retry(fast_retry());

    let result = http.load(TaxonomyKey::Partner).await;
    assert!(matches!(
        result,
        Err(MatrixError::UnknownContentType(TaxonomyKey::Partner))
    ));
}

#[tokio::test]
async fn test_http_source_persistent_failure_surfaces_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/training.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let http = HttpCoverageSource::new(reqwest::Client::new(), mock_server.uri())
        .with_retry(fast_retry());
    let cached = CachedSource::new(http);

    let result = cached.load(TaxonomyKey::Training).await;
    assert!(matches!(
        result,
        Err(MatrixError::HttpStatus { status: 500, .. })
    ));
    assert_eq!(cached.metrics().load_failures, 1);
}

// ==================== End-to-end View Tests ====================

#[tokio::test]
async fn test_view_with_persisted_preference() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let data_dir = temp_dir.path().join("summary");
    write_leaf(&data_dir, TaxonomyKey::Blog, &numbered_doc(95));
    let preference_path = temp_dir.path().join("preference.json");

    // First session: choose Japanese
    {
        let mut preference = PreferenceStore::open(FilePreferenceSlot::new(&preference_path));
        preference.set(lang("ja")).unwrap();
    }

    // Second session: preference is restored and pins the column
    let preference = PreferenceStore::open(FilePreferenceSlot::new(&preference_path));
    let file_source = FileCoverageSource::new(&data_dir);
    let mut view = MatrixView::new(PageSize::new(20).unwrap());

    assert_eq!(view.load(&file_source, TaxonomyKey::Blog).await, FetchOutcome::Applied);
    view.set_language(Some(lang("ja")));
    view.set_status(TranslationStatus::Translated);

    // Every third of 95 files is translated: 32 files, 2 pages of 20
    assert_eq!(view.filtered().len(), 32);
    assert_eq!(view.total_pages(), 2);
    view.set_page(2).unwrap();

    let page = view.render(preference.preferred(), REPO).unwrap();
    assert_eq!(page.header[1].language, lang("ja"));
    assert!(page.header[1].preferred);
    assert_eq!(page.rows.len(), 12);
    assert!(page.rows.iter().all(|row| row.translated[1]));
    assert_eq!(page.pagination.range.to_string(), "Showing 21 - 32 of 32 items");
    assert_eq!(page.filter_badge.as_deref(), Some("Japanese / Translated"));
}

#[tokio::test]
async fn test_view_failed_fetch_presents_error_state() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write_leaf(temp_dir.path(), TaxonomyKey::Blog, SCENARIO_DOC);
    let file_source = FileCoverageSource::new(temp_dir.path());

    let mut view = MatrixView::default();
    assert_eq!(view.load(&file_source, TaxonomyKey::Blog).await, FetchOutcome::Applied);
    assert_eq!(view.load(&file_source, TaxonomyKey::Include).await, FetchOutcome::Failed);

    assert_eq!(view.snapshot().len(), 2);
    let page = view.render(None, REPO).unwrap();
    assert!(matches!(page.status, ViewStatus::Failed(_)));
    assert!(page.rows.is_empty());
}

// ==================== Property Tests ====================

fn arb_snapshot() -> impl Strategy<Value = CoverageSnapshot> {
    let languages = Language::all();
    let n = languages.len();
    prop::collection::vec(prop::collection::vec(0..n, 0..n), 0..40).prop_map(move |rows| {
        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(i, picks)| {
                let record = CoverageRecord::new(picks.into_iter().map(|p| languages[p]));
                FileCoverage::new(format!("file-{}.md", i), record)
            })
            .collect();
        CoverageSnapshot::from_entries(entries).expect("paths are unique")
    })
}

fn arb_language() -> impl Strategy<Value = Language> {
    let languages = Language::all();
    (0..languages.len()).prop_map(move |i| languages[i])
}

proptest! {
    #[test]
    fn prop_identity_selection_returns_input(snapshot in arb_snapshot()) {
        let result = filter::apply(&snapshot, &FilterSelection::new(None, TranslationStatus::All));
        prop_assert!(result.shares_storage_with(&snapshot));
    }

    #[test]
    fn prop_translated_splits_on_language(snapshot in arb_snapshot(), language in arb_language()) {
        let result = filter::apply(
            &snapshot,
            &FilterSelection::new(Some(language), TranslationStatus::Translated),
        );
        for entry in result.iter() {
            prop_assert!(entry.record.has(language));
        }
        for entry in snapshot.iter().filter(|e| result.get(&e.path).is_none()) {
            prop_assert!(!entry.record.has(language));
        }
    }

    #[test]
    fn prop_status_only_partitions_snapshot(snapshot in arb_snapshot()) {
        let translated = filter::apply(
            &snapshot,
            &FilterSelection::new(None, TranslationStatus::Translated),
        );
        let untranslated = filter::apply(
            &snapshot,
            &FilterSelection::new(None, TranslationStatus::Untranslated),
        );

        prop_assert_eq!(translated.len() + untranslated.len(), snapshot.len());
        for entry in snapshot.iter() {
            let in_translated = translated.get(&entry.path).is_some();
            let in_untranslated = untranslated.get(&entry.path).is_some();
            prop_assert!(in_translated != in_untranslated);
            prop_assert_eq!(in_translated, entry.record.has(Language::base()));
        }
    }

    #[test]
    fn prop_filter_preserves_order(snapshot in arb_snapshot(), language in arb_language()) {
        let result = filter::apply(
            &snapshot,
            &FilterSelection::new(Some(language), TranslationStatus::Untranslated),
        );
        let expected: Vec<_> = snapshot
            .iter()
            .filter(|e| !e.record.has(language))
            .map(|e| e.path.clone())
            .collect();
        let actual: Vec<_> = result.paths().map(str::to_string).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_ordered_languages_is_permutation(preferred in prop::option::of(arb_language())) {
        let ordered = presentation::ordered_languages(preferred);
        let mut codes: Vec<_> = ordered.iter().map(|l| l.code()).collect();

        prop_assert_eq!(ordered.len(), Language::all().len());
        prop_assert_eq!(ordered[0], Language::base());
        if let Some(p) = preferred.filter(|p| *p != Language::base()) {
            prop_assert_eq!(ordered[1], p);
        }

        codes.sort_unstable();
        codes.dedup();
        prop_assert_eq!(codes.len(), Language::all().len());
    }

    #[test]
    fn prop_paginate_fills_all_but_last(count in 0usize..500, page_size in 1usize..120) {
        let entries: Vec<usize> = (0..count).collect();
        let pages = presentation::total_pages(count, page_size);

        for page_number in 1..=pages {
            let page = presentation::paginate(&entries, page_size, page_number).unwrap();
            prop_assert!(page.items.len() <= page_size);
            if page_number < pages {
                prop_assert_eq!(page.items.len(), page_size);
            }
        }
        prop_assert!(presentation::paginate(&entries, page_size, pages.max(1) + 1).is_err());
    }
}

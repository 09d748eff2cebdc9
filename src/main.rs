//! Preview binary - prints one page of the translation matrix as plain text
//!
//! Usage:
//!   translation-matrix docs concept                      # First page of docs/concept
//!   translation-matrix blog --lang ja --status untranslated
//!   translation-matrix docs task --page 2 --page-size 100
//!   translation-matrix release --lang none --status translated
//!   translation-matrix blog --prefer ko                  # Toggle preferred language, then print
//!   translation-matrix blog --clear-preference
//!   translation-matrix training --report                 # Per-language coverage summary
//!
//! Environment variables (all optional):
//! - COVERAGE_DATA_DIR (defaults to data/output/summary)
//! - COVERAGE_BASE_URL (fetch snapshots over HTTP instead)
//! - PREFERENCE_FILE (defaults to .translation-matrix/preference.json)
//! - SOURCE_REPO_URL
//! - DEFAULT_PAGE_SIZE (20, 50, 100 or 200)

use anyhow::{bail, Context, Result};
use tracing::info;
use translation_matrix::config::Config;
use translation_matrix::metrics::CoverageReport;
use translation_matrix::preference::{FilePreferenceSlot, PreferenceStore};
use translation_matrix::presentation::PageSize;
use translation_matrix::source::{
    CachedSource, CoverageSource, FileCoverageSource, HttpCoverageSource,
};
use translation_matrix::view::ViewStatus;
use translation_matrix::{
    taxonomy, FetchOutcome, Language, MatrixPage, MatrixView, TranslationStatus,
};

#[derive(Debug, Default)]
struct Args {
    content_type: String,
    sub_type: Option<String>,
    language: Option<String>,
    status: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
    prefer: Option<String>,
    clear_preference: bool,
    report: bool,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();

    while let Some(arg) = raw.next() {
        let mut value = |flag: &str| raw.next().with_context(|| format!("{} needs a value", flag));
        match arg.as_str() {
            "--lang" => args.language = Some(value("--lang")?),
            "--status" => args.status = Some(value("--status")?),
            "--page" => {
                let raw = value("--page")?;
                args.page = Some(raw.parse().context("--page must be a number")?);
            }
            "--page-size" => {
                let raw = value("--page-size")?;
                args.page_size = Some(raw.parse().context("--page-size must be a number")?);
            }
            "--prefer" => args.prefer = Some(value("--prefer")?),
            "--clear-preference" => args.clear_preference = true,
            "--report" => args.report = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    args.content_type = positional.next().unwrap_or_else(|| "docs".to_string());
    args.sub_type = positional.next();
    if args.content_type == "docs" && args.sub_type.is_none() {
        args.sub_type = Some("concept".to_string());
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_matrix=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let args = parse_args(std::env::args().skip(1))?;

    match &config.base_url {
        Some(base_url) => {
            info!("Loading snapshots from {}", base_url);
            let http = HttpCoverageSource::new(reqwest::Client::new(), base_url);
            let source = CachedSource::new(http);
            run(&config, &args, &source).await
        }
        None => {
            info!("Loading snapshots from {}", config.data_dir.display());
            let source = CachedSource::new(FileCoverageSource::new(&config.data_dir));
            run(&config, &args, &source).await
        }
    }
}

async fn run<S: CoverageSource>(config: &Config, args: &Args, source: &S) -> Result<()> {
    let key = taxonomy::validate(&args.content_type, args.sub_type.as_deref())?;

    let mut preference = PreferenceStore::open(FilePreferenceSlot::new(&config.preference_file));
    if args.clear_preference {
        preference.clear()?;
    }
    if let Some(code) = &args.prefer {
        let effective = preference.set(Language::from_code(code)?)?;
        info!("Preferred language is now {}", effective.name());
    }

    let page_size = match args.page_size {
        Some(size) => PageSize::new(size)?,
        None => config.default_page_size,
    };
    let mut view = MatrixView::new(page_size);

    if view.load(source, key).await != FetchOutcome::Applied {
        if let ViewStatus::Failed(message) = view.status() {
            bail!("Could not load {}: {}", key, message);
        }
    }

    if args.report {
        print!("{}", CoverageReport::from_snapshot(view.snapshot()));
        return Ok(());
    }

    if let Some(code) = &args.language {
        let language = match code.as_str() {
            "none" => None,
            code => Some(Language::from_code(code)?),
        };
        view.set_language(language);
    }
    if let Some(status) = &args.status {
        let status: TranslationStatus = status
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown status '{}'", status))?;
        view.set_status(status);
    }
    if let Some(page) = args.page {
        view.set_page(page)?;
    }

    let page = view.render(preference.preferred(), &config.source_repo_url)?;
    print_page(&page);
    Ok(())
}

fn print_page(page: &MatrixPage) {
    println!("{}", page.taxonomy);
    if let Some(badge) = &page.filter_badge {
        println!("Filter: {}", badge);
    }
    println!(
        "{} (page {}/{})",
        page.pagination.range, page.pagination.page, page.pagination.total_pages
    );
    println!();

    let header: Vec<String> = page
        .header
        .iter()
        .map(|cell| {
            if cell.preferred {
                format!("{} *", cell.language.code())
            } else {
                cell.language.code().to_string()
            }
        })
        .collect();
    println!("{}  File Path", header.join(" "));

    for row in &page.rows {
        let marks: Vec<String> = row
            .translated
            .iter()
            .zip(&header)
            .map(|(translated, column)| {
                let mark = if *translated { "✓" } else { "-" };
                format!("{:<width$}", mark, width = column.chars().count())
            })
            .collect();
        println!("{}  {}", marks.join(" "), row.path);
    }
}

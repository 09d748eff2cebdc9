use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::presentation::PageSize;

#[derive(Debug, Clone)]
pub struct Config {
    // Coverage data
    pub data_dir: PathBuf,
    pub base_url: Option<String>,

    // Preference persistence
    pub preference_file: PathBuf,

    // Presentation
    pub source_repo_url: String,
    pub default_page_size: PageSize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_page_size = match std::env::var("DEFAULT_PAGE_SIZE") {
            Ok(raw) => {
                let size: usize = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("DEFAULT_PAGE_SIZE is not a number: '{}'", raw))?;
                PageSize::new(size).with_context(|| {
                    format!(
                        "DEFAULT_PAGE_SIZE must be one of {:?}",
                        PageSize::OPTIONS
                    )
                })?
            }
            Err(_) => PageSize::default(),
        };

        Ok(Self {
            // Coverage data - local directory unless a published base URL is given
            data_dir: std::env::var("COVERAGE_DATA_DIR")
                .unwrap_or_else(|_| "data/output/summary".to_string())
                .into(),
            base_url: std::env::var("COVERAGE_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),

            preference_file: std::env::var("PREFERENCE_FILE")
                .unwrap_or_else(|_| ".translation-matrix/preference.json".to_string())
                .into(),

            source_repo_url: std::env::var("SOURCE_REPO_URL")
                .unwrap_or_else(|_| "https://github.com/kubernetes/website/blob/main".to_string()),
            default_page_size,
        })
    }
}

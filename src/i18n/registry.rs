//! Language registry: Single source of truth for all languages shown in the matrix.
//!
//! The registry is a closed, ordered set. Its declaration order is the base
//! ordering used for column headers, and exactly one entry is the base
//! (reference) language that every translation is measured against.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Locale tag as used in the documentation tree (e.g., "en", "pt-br")
    pub code: &'static str,

    /// English display name (e.g., "Japanese", "Portuguese(BR)")
    pub name: &'static str,

    /// Native name of the language (e.g., "日本語")
    pub native_name: &'static str,

    /// Whether this is the base/reference language (exactly one should be true)
    pub is_base: bool,
}

/// Global language registry singleton.
///
/// Initialized once on first access and immutable thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All languages in registry-declared order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Position of a code in registry-declared order.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.languages.iter().position(|lang| lang.code == code)
    }

    /// Number of registered languages.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Get the base language configuration.
    ///
    /// # Panics
    /// Panics if the registry does not declare exactly one base language.
    /// The registry is static, so this indicates a build-time configuration error.
    pub fn base(&self) -> &LanguageConfig {
        let base_langs: Vec<_> = self.languages.iter().filter(|lang| lang.is_base).collect();

        match base_langs.len() {
            0 => panic!("No base language found in registry"),
            1 => base_langs[0],
            _ => panic!("Multiple base languages found in registry"),
        }
    }

    /// Check if a language code belongs to the registry.
    pub fn contains(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

/// Default language configurations.
///
/// English is the base language; the remaining entries follow in the order
/// the columns are listed.
fn default_languages() -> Vec<LanguageConfig> {
    const fn lang(
        code: &'static str,
        name: &'static str,
        native_name: &'static str,
    ) -> LanguageConfig {
        LanguageConfig {
            code,
            name,
            native_name,
            is_base: false,
        }
    }

    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_base: true,
        },
        lang("bn", "Bengali", "বাংলা"),
        lang("de", "German", "Deutsch"),
        lang("es", "Spanish", "Español"),
        lang("fr", "French", "Français"),
        lang("hi", "Hindi", "हिन्दी"),
        lang("id", "Indonesian", "Bahasa Indonesia"),
        lang("ja", "Japanese", "日本語"),
        lang("ko", "Korean", "한국어"),
        lang("pl", "Polish", "Polski"),
        lang("pt-br", "Portuguese(BR)", "Português (Brasil)"),
        lang("ru", "Russian", "Русский"),
        lang("uk", "Ukrainian", "Українська"),
        lang("zh-cn", "Chinese(CN)", "中文 (简体)"),
    ]
}

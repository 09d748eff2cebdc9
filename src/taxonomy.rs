//! Taxonomy registry: the closed set of content types and docs sub-types.
//!
//! A `TaxonomyKey` names exactly one coverage snapshot. It can only be built
//! from a valid combination, so everything downstream of `validate` works with
//! keys that are correct by construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Docs,
    Blog,
    Community,
    CaseStudy,
    Example,
    Include,
    Release,
    Partner,
    Training,
}

impl ContentType {
    pub const ALL: [ContentType; 9] = [
        ContentType::Docs,
        ContentType::Blog,
        ContentType::Community,
        ContentType::CaseStudy,
        ContentType::Example,
        ContentType::Include,
        ContentType::Release,
        ContentType::Partner,
        ContentType::Training,
    ];

    /// Identifier used in selection events and snapshot keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Docs => "docs",
            ContentType::Blog => "blog",
            ContentType::Community => "community",
            ContentType::CaseStudy => "case_study",
            ContentType::Example => "example",
            ContentType::Include => "include",
            ContentType::Release => "release",
            ContentType::Partner => "partner",
            ContentType::Training => "training",
        }
    }

    /// Human-readable label for selectors.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Docs => "Docs",
            ContentType::Blog => "Blog",
            ContentType::Community => "Community",
            ContentType::CaseStudy => "Case-Study",
            ContentType::Example => "Example",
            ContentType::Include => "Include",
            ContentType::Release => "Release",
            ContentType::Partner => "Partner",
            ContentType::Training => "Training",
        }
    }

    /// Whether this content type is split into sub-types.
    pub fn requires_sub_type(&self) -> bool {
        matches!(self, ContentType::Docs)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocsSubType {
    Concept,
    Task,
    Tutorial,
    Reference,
    Contribute,
}

impl DocsSubType {
    pub const ALL: [DocsSubType; 5] = [
        DocsSubType::Concept,
        DocsSubType::Task,
        DocsSubType::Tutorial,
        DocsSubType::Reference,
        DocsSubType::Contribute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocsSubType::Concept => "concept",
            DocsSubType::Task => "task",
            DocsSubType::Tutorial => "tutorial",
            DocsSubType::Reference => "reference",
            DocsSubType::Contribute => "contribute",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocsSubType::Concept => "Concept",
            DocsSubType::Task => "Task",
            DocsSubType::Tutorial => "Tutorial",
            DocsSubType::Reference => "Reference",
            DocsSubType::Contribute => "Contribute",
        }
    }
}

impl fmt::Display for DocsSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocsSubType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DocsSubType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// A fully specified taxonomy leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyKey {
    Docs(DocsSubType),
    Blog,
    Community,
    CaseStudy,
    Example,
    Include,
    Release,
    Partner,
    Training,
}

impl TaxonomyKey {
    /// Build a key from already-typed parts, enforcing the docs/sub-type rule.
    pub fn new(content_type: ContentType, sub_type: Option<DocsSubType>) -> Result<Self> {
        let key = match (content_type, sub_type) {
            (ContentType::Docs, Some(sub)) => TaxonomyKey::Docs(sub),
            (ContentType::Blog, None) => TaxonomyKey::Blog,
            (ContentType::Community, None) => TaxonomyKey::Community,
            (ContentType::CaseStudy, None) => TaxonomyKey::CaseStudy,
            (ContentType::Example, None) => TaxonomyKey::Example,
            (ContentType::Include, None) => TaxonomyKey::Include,
            (ContentType::Release, None) => TaxonomyKey::Release,
            (ContentType::Partner, None) => TaxonomyKey::Partner,
            (ContentType::Training, None) => TaxonomyKey::Training,
            (content_type, sub_type) => {
                return Err(MatrixError::InvalidCombination {
                    content_type: content_type.as_str().to_string(),
                    sub_type: sub_type.map(|s| s.as_str().to_string()),
                })
            }
        };
        Ok(key)
    }

    /// Every taxonomy leaf, docs sub-types first.
    pub fn all() -> Vec<TaxonomyKey> {
        DocsSubType::ALL
            .into_iter()
            .map(TaxonomyKey::Docs)
            .chain(
                ContentType::ALL
                    .into_iter()
                    .filter(|t| !t.requires_sub_type())
                    .filter_map(|t| TaxonomyKey::new(t, None).ok()),
            )
            .collect()
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            TaxonomyKey::Docs(_) => ContentType::Docs,
            TaxonomyKey::Blog => ContentType::Blog,
            TaxonomyKey::Community => ContentType::Community,
            TaxonomyKey::CaseStudy => ContentType::CaseStudy,
            TaxonomyKey::Example => ContentType::Example,
            TaxonomyKey::Include => ContentType::Include,
            TaxonomyKey::Release => ContentType::Release,
            TaxonomyKey::Partner => ContentType::Partner,
            TaxonomyKey::Training => ContentType::Training,
        }
    }

    pub fn sub_type(&self) -> Option<DocsSubType> {
        match self {
            TaxonomyKey::Docs(sub) => Some(*sub),
            _ => None,
        }
    }

    /// Location of this leaf's snapshot document, relative to the data root.
    pub fn snapshot_path(&self) -> &'static str {
        match self {
            TaxonomyKey::Docs(DocsSubType::Concept) => "docs/concepts.json",
            TaxonomyKey::Docs(DocsSubType::Task) => "docs/tasks.json",
            TaxonomyKey::Docs(DocsSubType::Tutorial) => "docs/tutorials.json",
            TaxonomyKey::Docs(DocsSubType::Reference) => "docs/reference.json",
            TaxonomyKey::Docs(DocsSubType::Contribute) => "docs/contribute.json",
            TaxonomyKey::Blog => "blog.json",
            TaxonomyKey::Community => "community.json",
            TaxonomyKey::CaseStudy => "case-studies.json",
            TaxonomyKey::Example => "examples.json",
            TaxonomyKey::Include => "includes.json",
            TaxonomyKey::Release => "releases.json",
            TaxonomyKey::Partner => "partners.json",
            TaxonomyKey::Training => "training.json",
        }
    }
}

impl Default for TaxonomyKey {
    fn default() -> Self {
        TaxonomyKey::Docs(DocsSubType::Concept)
    }
}

impl fmt::Display for TaxonomyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxonomyKey::Docs(sub) => write!(f, "docs/{}", sub),
            other => f.write_str(other.content_type().as_str()),
        }
    }
}

/// Validate a raw (content type, sub-type) selection.
///
/// Fails with `InvalidCombination` when either value is outside its
/// enumeration, when docs is selected without a sub-type, or when a sub-type
/// accompanies any other content type.
pub fn validate(content_type: &str, sub_type: Option<&str>) -> Result<TaxonomyKey> {
    let invalid = || MatrixError::InvalidCombination {
        content_type: content_type.to_string(),
        sub_type: sub_type.map(str::to_string),
    };

    let parsed_type: ContentType = content_type.parse().map_err(|_| invalid())?;
    let parsed_sub = match sub_type {
        Some(raw) => Some(raw.parse::<DocsSubType>().map_err(|_| invalid())?),
        None => None,
    };

    TaxonomyKey::new(parsed_type, parsed_sub).map_err(|_| invalid())
}

//! Platform and module descriptors
//!
//! Immutable values keyed by name. Merging two declarations of the same name
//! goes through `update`, which returns a new value instead of mutating.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

// ============================================================================
// Platform
// ============================================================================

/// A named platform variant of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaPlatform {
    pub name: String,
    /// Group pattern used for published coordinates (None = default pattern)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_pattern: Option<String>,
    /// Name of the platform this one replaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    pub published: bool,
    pub source_published: bool,
    pub test: bool,
    /// Pruned by an explicit platform list; kept so consumers can explain absence
    pub disabled: bool,
}

impl SchemaPlatform {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_replace(mut self, replace: impl Into<String>) -> Self {
        self.replace = Some(replace.into());
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    /// Merge another declaration of the same platform into a new value.
    ///
    /// Flags are ORed, `replace` and the publish pattern take the incoming
    /// value when it has one. `disabled` is left as it was.
    pub fn update(&self, other: &SchemaPlatform) -> SchemaPlatform {
        SchemaPlatform {
            name: self.name.clone(),
            publish_pattern: other
                .publish_pattern
                .clone()
                .or_else(|| self.publish_pattern.clone()),
            replace: other.replace.clone().or_else(|| self.replace.clone()),
            published: self.published || other.published,
            source_published: self.source_published || other.source_published,
            test: self.test || other.test,
            disabled: self.disabled,
        }
    }

    pub fn replace(&self) -> Option<&str> {
        self.replace.as_deref().filter(|r| !r.is_empty())
    }
}

impl PartialEq for SchemaPlatform {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SchemaPlatform {}

impl Hash for SchemaPlatform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

// ============================================================================
// Module
// ============================================================================

/// A named module facet of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaModule {
    pub name: String,
    /// Name pattern used for published coordinates (None = default pattern)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_pattern: Option<String>,
    /// Modules this module absorbs
    pub include: BTreeSet<String>,
    pub published: bool,
    pub test: bool,
    pub force: bool,
}

impl SchemaModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(include.into_iter().map(Into::into));
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    /// Merge another declaration of the same module into a new value.
    pub fn update(&self, other: &SchemaModule) -> SchemaModule {
        SchemaModule {
            name: self.name.clone(),
            publish_pattern: other
                .publish_pattern
                .clone()
                .or_else(|| self.publish_pattern.clone()),
            include: self.include.union(&other.include).cloned().collect(),
            published: self.published || other.published,
            test: self.test || other.test,
            force: self.force || other.force,
        }
    }
}

impl PartialEq for SchemaModule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SchemaModule {}

impl Hash for SchemaModule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

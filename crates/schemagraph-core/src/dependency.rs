//! Dependency records
//!
//! A [`SchemaDependency`] is one declared or synthesized requirement. Identity
//! is (group, version, coordinate, name): the same edge may be discovered
//! several times with different declared strictness.

use crate::coords::PlatformModule;
use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Sentinel for an unknown group or version.
pub const UNKNOWN_VALUE: &str = "unknown";

// ============================================================================
// Classification
// ============================================================================

/// Where a dependency points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Another project in the same multi-project build
    Project,
    /// Another platform:module of the same project
    Internal,
    /// A foreign group:name:version coordinate
    External,
    /// Resolution deferred to the consumer
    Unknown,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Project => "project",
            DependencyType::Internal => "internal",
            DependencyType::External => "external",
            DependencyType::Unknown => "unknown",
        }
    }

    /// External and project requirements express direct user intent.
    pub fn is_explicit(&self) -> bool {
        matches!(self, DependencyType::External | DependencyType::Project)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(DependencyType::Project),
            "internal" => Ok(DependencyType::Internal),
            "external" => Ok(DependencyType::External),
            "unknown" => Ok(DependencyType::Unknown),
            other => Err(SchemaError::InvalidDependencyType(other.to_string())),
        }
    }
}

/// Where a dependency is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transitivity {
    /// Compile and runtime, transitive
    #[default]
    Api,
    /// Compile only, not transitive
    CompileOnly,
    /// Compile and runtime, superseded by an `Impl` for the same coordinate
    Stub,
    /// Compile and runtime, transitive, replaces `Stub`
    Impl,
    /// Compile only, transitive within the project's own matrix
    Internal,
    /// Runtime, transitive
    Runtime,
    /// Runtime, not transitive
    RuntimeOnly,
    /// Runtime, transitive within the same project
    Execution,
}

impl Transitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transitivity::Api => "api",
            Transitivity::CompileOnly => "compile_only",
            Transitivity::Stub => "stub",
            Transitivity::Impl => "impl",
            Transitivity::Internal => "internal",
            Transitivity::Runtime => "runtime",
            Transitivity::RuntimeOnly => "runtime_only",
            Transitivity::Execution => "execution",
        }
    }

    pub fn is_compile(&self) -> bool {
        !matches!(
            self,
            Transitivity::Runtime | Transitivity::RuntimeOnly | Transitivity::Execution
        )
    }

    pub fn is_runtime(&self) -> bool {
        !matches!(self, Transitivity::CompileOnly | Transitivity::Internal)
    }

    /// Visible to consumers outside the declaring project.
    pub fn is_transitive(&self) -> bool {
        matches!(
            self,
            Transitivity::Api | Transitivity::Stub | Transitivity::Impl | Transitivity::Runtime
        )
    }
}

impl fmt::Display for Transitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transitivity {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(Transitivity::Api),
            "compile_only" | "compileOnly" => Ok(Transitivity::CompileOnly),
            "stub" => Ok(Transitivity::Stub),
            "impl" => Ok(Transitivity::Impl),
            "internal" => Ok(Transitivity::Internal),
            "runtime" => Ok(Transitivity::Runtime),
            "runtime_only" | "runtimeOnly" => Ok(Transitivity::RuntimeOnly),
            "execution" => Ok(Transitivity::Execution),
            other => Err(SchemaError::InvalidTransitivity(other.to_string())),
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// A requirement record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDependency {
    #[serde(rename = "type")]
    pub dep_type: DependencyType,
    /// Target coordinate; unset sides mean "default"
    pub coords: PlatformModule,
    pub group: String,
    pub name: String,
    pub version: String,
    pub transitivity: Transitivity,
    /// Raw suffix appended verbatim to the synthesized external identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_gnv: Option<String>,
}

impl SchemaDependency {
    pub fn new(
        dep_type: DependencyType,
        coords: PlatformModule,
        group: impl Into<String>,
        version: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            dep_type,
            coords,
            group: group.into(),
            name: name.into(),
            version: version.into(),
            transitivity: Transitivity::default(),
            extra_gnv: None,
        }
    }

    pub fn with_transitivity(mut self, transitivity: Transitivity) -> Self {
        self.transitivity = transitivity;
        self
    }

    pub fn with_extra_gnv(mut self, extra: impl Into<String>) -> Self {
        self.extra_gnv = Some(extra.into());
        self
    }

    /// `group:name[:version][:extra]`, omitting an unknown version.
    pub fn gnv(&self) -> String {
        let mut out = format!("{}:{}", self.group, self.name);
        if self.version != UNKNOWN_VALUE {
            out.push(':');
            out.push_str(&self.version);
        }
        if let Some(extra) = self.extra_gnv.as_deref().filter(|e| !e.is_empty()) {
            out.push(':');
            out.push_str(extra);
        }
        out
    }

    /// Clone this record onto a different target coordinate.
    pub fn rebase(&self, coords: PlatformModule) -> SchemaDependency {
        SchemaDependency {
            coords,
            ..self.clone()
        }
    }

    /// Same identity, ignoring transitivity.
    fn identity(&self) -> (&str, &str, &PlatformModule, &str) {
        (&self.group, &self.version, &self.coords, &self.name)
    }
}

impl PartialEq for SchemaDependency {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for SchemaDependency {}

impl Hash for SchemaDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for SchemaDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dep_type {
            DependencyType::External => write!(f, "external {}", self.gnv()),
            _ if self.coords.is_any() => write!(f, "{} {}", self.dep_type, self.name),
            _ => write!(f, "{} {}@{}", self.dep_type, self.name, self.coords),
        }
    }
}

/// Drop every `Stub` record that has an `Impl` record with the same identity.
pub fn supersede_stubs(deps: Vec<SchemaDependency>) -> Vec<SchemaDependency> {
    let impls: Vec<&SchemaDependency> = deps
        .iter()
        .filter(|d| d.transitivity == Transitivity::Impl)
        .collect();
    if impls.is_empty() {
        return deps;
    }
    let keep: Vec<bool> = deps
        .iter()
        .map(|d| d.transitivity != Transitivity::Stub || !impls.iter().any(|i| *i == d))
        .collect();
    deps.into_iter()
        .zip(keep)
        .filter_map(|(d, keep)| keep.then_some(d))
        .collect()
}

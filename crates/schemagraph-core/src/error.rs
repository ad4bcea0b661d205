//! Error types for schema resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or querying a schema graph.
///
/// All variants are fatal configuration errors or lookup misses. Liveness
/// index reads never produce an error.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed coordinate '{input}': expected at most one ':'")]
    MalformedCoordinate { input: String },

    #[error("malformed external dependency '{value}' in project {project}: expected group:name[:version[:extra]]")]
    MalformedExternal { project: String, value: String },

    #[error("could not find module {module} in project {project} (known modules: {})", available.join(", "))]
    UnknownModule {
        project: String,
        module: String,
        available: Vec<String>,
    },

    #[error("could not find platform {platform} in project {project} (known platforms: {})", available.join(", "))]
    UnknownPlatform {
        project: String,
        platform: String,
        available: Vec<String>,
    },

    #[error("no such project: {path}; available projects: {}", available.join(", "))]
    UnknownProject { path: String, available: Vec<String> },

    #[error("cannot overwrite project {name} under {parent}; get and mutate the existing child instead")]
    ConflictingChild { parent: String, name: String },

    #[error("invalid dependency type '{0}'")]
    InvalidDependencyType(String),

    #[error("invalid transitivity '{0}'")]
    InvalidTransitivity(String),

    #[error("schema resolution re-entered from the resolving thread")]
    ReentrantResolve,

    #[error("schema resolution failed earlier: {0}")]
    ResolveFailed(String),

    #[error("failed to read metadata '{path}': {source}")]
    ReadMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse metadata: {0}")]
    ParseMetadata(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create a new UnknownModule error.
    pub fn unknown_module(
        project: impl Into<String>,
        module: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::UnknownModule {
            project: project.into(),
            module: module.into(),
            available,
        }
    }

    /// Create a new UnknownPlatform error.
    pub fn unknown_platform(
        project: impl Into<String>,
        platform: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::UnknownPlatform {
            project: project.into(),
            platform: platform.into(),
            available,
        }
    }

    /// Create a new UnknownProject error.
    pub fn unknown_project(path: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownProject {
            path: path.into(),
            available,
        }
    }
}

/// Result alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_module_lists_available() {
        let err = SchemaError::unknown_module(
            ":app",
            "spi",
            vec!["main".to_string(), "test".to_string()],
        );
        let msg = err.to_string();
        assert!(msg.contains(":app"));
        assert!(msg.contains("spi"));
        assert!(msg.contains("main, test"));
    }

    #[test]
    fn test_unknown_project_lists_available() {
        let err = SchemaError::unknown_project(":nope", vec![":".to_string(), ":app".to_string()]);
        assert_eq!(
            err.to_string(),
            "no such project: :nope; available projects: :, :app"
        );
    }
}

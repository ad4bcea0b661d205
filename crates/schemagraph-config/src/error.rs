//! Errors raised while loading, validating and saving schemagraph settings.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Filesystem step that failed on a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Read,
    Write,
    CreateDir,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read config file",
            Self::Write => "write config file",
            Self::CreateDir => "create config directory",
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot {action} '{path}': {source}")]
    Io {
        action: FileAction,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a valid schemagraph config: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot encode schemagraph config: {0}")]
    Encode(#[from] toml::ser::Error),

    /// `schema.default_platform` / `schema.default_module` cannot name a unit.
    #[error("{key} = {value:?} is not a usable coordinate name: {reason}")]
    CoordinateName {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("schema.explicit_platform = {0:?} names no platform")]
    EmptyPlatformList(String),
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(FileAction::Read, path, source)
    }

    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(FileAction::Write, path, source)
    }

    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(FileAction::CreateDir, path, source)
    }

    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    fn io(action: FileAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_name_message() {
        let err = ConfigError::CoordinateName {
            key: "schema.default_module",
            value: "bad:name".to_string(),
            reason: "must not contain ':'",
        };
        assert_eq!(
            err.to_string(),
            r#"schema.default_module = "bad:name" is not a usable coordinate name: must not contain ':'"#
        );
    }

    #[test]
    fn test_io_error_names_action_and_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ConfigError::read_file("/tmp/missing.toml", io);
        assert_eq!(
            err.to_string(),
            "cannot read config file '/tmp/missing.toml': gone"
        );
        assert!(matches!(err, ConfigError::Io { action: FileAction::Read, .. }));
    }
}

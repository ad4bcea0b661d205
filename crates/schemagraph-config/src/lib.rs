//! SchemaGraph Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.schemagraph/config.toml`
//! - Local config: `.schemagraph/config.toml` (in workspace)
//! - Environment variables (`SCHEMAGRAPH_*`)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → environment → CLI overrides.

mod error;
mod loader;

pub use error::{ConfigError, FileAction};
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name used for the default platform and module when nothing is configured.
pub const DEFAULT_NAME: &str = "main";

/// Environment variable overriding the default platform name.
pub const ENV_DEFAULT_PLATFORM: &str = "SCHEMAGRAPH_DEFAULT_PLATFORM";
/// Environment variable overriding the default module name.
pub const ENV_DEFAULT_MODULE: &str = "SCHEMAGRAPH_DEFAULT_MODULE";
/// Environment variable holding the explicit platform trim list.
pub const ENV_PLATFORM: &str = "SCHEMAGRAPH_PLATFORM";
/// Environment variable overriding the index directory.
pub const ENV_INDEX_DIR: &str = "SCHEMAGRAPH_INDEX_DIR";
/// Environment variable overriding the build name.
pub const ENV_BUILD_NAME: &str = "SCHEMAGRAPH_BUILD_NAME";

/// Root configuration for SchemaGraph.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GraphConfig {
    /// Schema naming configuration
    pub schema: SchemaSettings,

    /// Build coordinates
    pub build: BuildSettings,

    /// Liveness index location
    pub index: IndexSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Naming defaults used while resolving platforms and modules.
///
/// # Example TOML
///
/// ```toml
/// [schema]
/// default_platform = "main"
/// default_module = "main"
/// explicit_platform = "jre,gwt"
/// publish_group_pattern = "$group.$platform"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemaSettings {
    /// Name of the platform that contributes no suffix
    pub default_platform: String,

    /// Name of the module that contributes no suffix
    pub default_module: String,

    /// Comma-separated allow-list of platforms; everything else is disabled
    pub explicit_platform: Option<String>,

    /// Group pattern for published platforms (None = built-in default)
    pub publish_group_pattern: Option<String>,

    /// Name pattern for published modules (None = built-in default)
    pub publish_name_pattern: Option<String>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            default_platform: DEFAULT_NAME.to_string(),
            default_module: DEFAULT_NAME.to_string(),
            explicit_platform: None,
            publish_group_pattern: None,
            publish_name_pattern: None,
        }
    }
}

impl SchemaSettings {
    /// Validate naming settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("schema.default_platform", &self.default_platform),
            ("schema.default_module", &self.default_module),
        ] {
            let reason = if value.trim().is_empty() {
                "must not be empty"
            } else if value.contains(':') {
                "must not contain ':'"
            } else {
                continue;
            };
            return Err(ConfigError::CoordinateName {
                key,
                value: value.clone(),
                reason,
            });
        }
        Ok(())
    }
}

/// Coordinates of the build being resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSettings {
    /// Build name (`_` for the root build)
    pub name: String,

    /// Group override (None = taken from the root schema)
    pub group: Option<String>,

    /// Version override (None = taken from the root schema)
    pub version: Option<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            name: "_".to_string(),
            group: None,
            version: None,
        }
    }
}

/// Location of the persisted liveness index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexSettings {
    /// Index directory, relative paths resolve against the workspace root
    pub dir: PathBuf,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("build/xindex"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override index directory
    pub index_dir: Option<PathBuf>,

    /// Override explicit platform list
    pub explicit_platform: Option<String>,

    /// Override build name
    pub build_name: Option<String>,

    /// Override log level
    pub log_level: Option<String>,
}

impl GraphConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref dir) = overrides.index_dir {
            self.index.dir = dir.clone();
        }

        if let Some(ref platform) = overrides.explicit_platform {
            self.schema.explicit_platform = Some(platform.clone());
        }

        if let Some(ref name) = overrides.build_name {
            self.build.name = name.clone();
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Apply `SCHEMAGRAPH_*` variables from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Blank values are ignored so an exported-but-empty variable falls back
    /// to the previous layer.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(platform) = get(ENV_DEFAULT_PLATFORM) {
            self.schema.default_platform = platform;
        }
        if let Some(module) = get(ENV_DEFAULT_MODULE) {
            self.schema.default_module = module;
        }
        if let Some(explicit) = get(ENV_PLATFORM) {
            self.schema.explicit_platform = Some(explicit);
        }
        if let Some(dir) = get(ENV_INDEX_DIR) {
            self.index.dir = PathBuf::from(dir);
        }
        if let Some(name) = get(ENV_BUILD_NAME) {
            self.build.name = name;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schema.validate()?;
        if let Some(ref explicit) = self.schema.explicit_platform {
            if explicit.split(',').all(|p| p.trim().is_empty()) {
                return Err(ConfigError::EmptyPlatformList(explicit.clone()));
            }
        }
        Ok(())
    }

    /// Get the effective index directory for a workspace.
    pub fn index_dir(&self, workspace_root: &Path) -> PathBuf {
        if self.index.dir.is_absolute() {
            self.index.dir.clone()
        } else {
            workspace_root.join(&self.index.dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.schema.default_platform, "main");
        assert_eq!(config.schema.default_module, "main");
        assert!(config.schema.explicit_platform.is_none());
        assert_eq!(config.build.name, "_");
        assert_eq!(config.index.dir, PathBuf::from("build/xindex"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = GraphConfig::default();
        let overrides = ConfigOverrides {
            index_dir: Some(PathBuf::from("/custom/index")),
            explicit_platform: Some("jre".to_string()),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        config.apply_overrides(&overrides);

        assert_eq!(config.index.dir, PathBuf::from("/custom/index"));
        assert_eq!(config.schema.explicit_platform.as_deref(), Some("jre"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_apply_env_with() {
        let vars: HashMap<&str, &str> = [
            (ENV_DEFAULT_PLATFORM, "core"),
            (ENV_DEFAULT_MODULE, "  "),
            (ENV_PLATFORM, "gwt,jre"),
        ]
        .into_iter()
        .collect();

        let mut config = GraphConfig::default();
        config.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.schema.default_platform, "core");
        // blank values are ignored
        assert_eq!(config.schema.default_module, "main");
        assert_eq!(config.schema.explicit_platform.as_deref(), Some("gwt,jre"));
        assert_eq!(config.index.dir, PathBuf::from("build/xindex"));
    }

    #[test]
    fn test_validate_rejects_colon() {
        let mut config = GraphConfig::default();
        config.schema.default_module = "a:b".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("schema.default_module"));
    }

    #[test]
    fn test_validate_rejects_blank_explicit_platform() {
        let mut config = GraphConfig::default();
        config.schema.explicit_platform = Some(" , ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyPlatformList(ref value)) if value == " , "
        ));
    }

    #[test]
    fn test_index_dir_resolution() {
        let config = GraphConfig::default();
        let workspace = PathBuf::from("/home/user/project");
        assert_eq!(
            config.index_dir(&workspace),
            PathBuf::from("/home/user/project/build/xindex")
        );

        let mut config = GraphConfig::default();
        config.index.dir = PathBuf::from("/abs/xindex");
        assert_eq!(config.index_dir(&workspace), PathBuf::from("/abs/xindex"));
    }

    #[test]
    fn test_schema_settings_toml_roundtrip() {
        let settings = SchemaSettings {
            default_platform: "core".to_string(),
            explicit_platform: Some("jre".to_string()),
            publish_name_pattern: Some("$name-$module".to_string()),
            ..Default::default()
        };

        let toml_str = toml::to_string(&settings).unwrap();
        let parsed: SchemaSettings = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, settings);
    }
}

//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.schemagraph/config.toml`
//! 2. Local config: `.schemagraph/config.toml` (in workspace)
//! 3. `SCHEMAGRAPH_*` environment variables
//! 4. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{ConfigOverrides, GraphConfig, DEFAULT_NAME};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".schemagraph";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".schemagraph";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.schemagraph`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<GraphConfig>,

    /// Whether `SCHEMAGRAPH_*` variables are consulted
    read_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.schemagraph`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
            read_env: true,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Environment variables are not consulted, which keeps tests hermetic.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
            read_env: false,
        }
    }

    /// Enable or disable reading `SCHEMAGRAPH_*` variables.
    pub fn with_env(mut self, read_env: bool) -> Self {
        self.read_env = read_env;
        self
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a workspace.
    pub fn local_config_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a workspace with optional CLI overrides.
    ///
    /// Merges config in order: global → local → environment → overrides.
    pub fn load(
        &mut self,
        workspace_root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<GraphConfig, ConfigError> {
        let mut config = GraphConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = self.load_local(workspace_root)? {
            config = merge_configs(config, local_config);
        }

        if self.read_env {
            config.apply_env();
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<GraphConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a workspace.
    pub fn load_local(&self, workspace_root: &Path) -> Result<Option<GraphConfig>, ConfigError> {
        let local_path = self.local_config_path(workspace_root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Save configuration to the local config file for a workspace.
    pub fn save_local(
        &self,
        workspace_root: &Path,
        config: &GraphConfig,
    ) -> Result<(), ConfigError> {
        let local_path = self.local_config_path(workspace_root);
        save_config_file(&local_path, config)
    }

    /// Initialize local configuration for a workspace.
    ///
    /// Creates `.schemagraph/config.toml` with default configuration.
    pub fn init_local(&self, workspace_root: &Path) -> Result<PathBuf, ConfigError> {
        let local_dir = workspace_root.join(LOCAL_CONFIG_DIR);

        if !local_dir.exists() {
            std::fs::create_dir_all(&local_dir)
                .map_err(|e| ConfigError::create_dir(&local_dir, e))?;
        }

        let config_path = local_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            save_config_file(&config_path, &GraphConfig::default())?;
        }

        Ok(config_path)
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<GraphConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &GraphConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// This performs a field-by-field merge, allowing partial configs.
fn merge_configs(base: GraphConfig, overlay: GraphConfig) -> GraphConfig {
    GraphConfig {
        schema: merge_schema(base.schema, overlay.schema),
        build: merge_build(base.build, overlay.build),
        index: merge_index(base.index, overlay.index),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Merge schema naming, overlay values override base when they differ from default.
fn merge_schema(
    base: crate::SchemaSettings,
    overlay: crate::SchemaSettings,
) -> crate::SchemaSettings {
    crate::SchemaSettings {
        default_platform: if overlay.default_platform != DEFAULT_NAME {
            overlay.default_platform
        } else {
            base.default_platform
        },
        default_module: if overlay.default_module != DEFAULT_NAME {
            overlay.default_module
        } else {
            base.default_module
        },
        explicit_platform: overlay.explicit_platform.or(base.explicit_platform),
        publish_group_pattern: overlay.publish_group_pattern.or(base.publish_group_pattern),
        publish_name_pattern: overlay.publish_name_pattern.or(base.publish_name_pattern),
    }
}

/// Merge build coordinates.
fn merge_build(base: crate::BuildSettings, overlay: crate::BuildSettings) -> crate::BuildSettings {
    crate::BuildSettings {
        name: if overlay.name != "_" {
            overlay.name
        } else {
            base.name
        },
        group: overlay.group.or(base.group),
        version: overlay.version.or(base.version),
    }
}

/// Merge index location.
fn merge_index(base: crate::IndexSettings, overlay: crate::IndexSettings) -> crate::IndexSettings {
    crate::IndexSettings {
        dir: if overlay.dir != Path::new("build/xindex") {
            overlay.dir
        } else {
            base.dir
        },
    }
}

/// Merge logging config.
fn merge_logging(
    base: crate::LoggingConfig,
    overlay: crate::LoggingConfig,
) -> crate::LoggingConfig {
    crate::LoggingConfig {
        level: if overlay.level != "info" {
            overlay.level
        } else {
            base.level
        },
        format: overlay.format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_config(content: &str, dir: &Path) -> PathBuf {
        let config_dir = dir.join(".schemagraph");
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.schema.default_platform, "main");
        assert_eq!(config.schema.default_module, "main");
        assert_eq!(config.index.dir, PathBuf::from("build/xindex"));
    }

    #[test]
    fn test_load_local_config() {
        let temp = TempDir::new().unwrap();
        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        create_test_config(
            r#"
            [schema]
            default_platform = "core"
            explicit_platform = "jre"

            [index]
            dir = "out/index"
            "#,
            temp.path(),
        );

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.schema.default_platform, "core");
        assert_eq!(config.schema.explicit_platform.as_deref(), Some("jre"));
        assert_eq!(config.index.dir, PathBuf::from("out/index"));
    }

    #[test]
    fn test_local_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            r#"
            [logging]
            level = "debug"

            [build]
            name = "global-build"
            group = "com.example"
            "#,
        )
        .unwrap();

        create_test_config(
            r#"
            [build]
            name = "local-build"
            "#,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(&global_dir);
        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.build.name, "local-build");
        // values the local file does not set survive from the global file
        assert_eq!(config.build.group.as_deref(), Some("com.example"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides_all() {
        let temp = TempDir::new().unwrap();

        create_test_config(
            r#"
            [schema]
            explicit_platform = "gwt"
            "#,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let overrides = ConfigOverrides {
            explicit_platform: Some("jre".to_string()),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };

        let config = loader.load(temp.path(), Some(&overrides)).unwrap();

        assert_eq!(config.schema.explicit_platform.as_deref(), Some("jre"));
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_invalid_local_config_is_rejected() {
        let temp = TempDir::new().unwrap();
        create_test_config(
            r#"
            [schema]
            default_module = "bad:name"
            "#,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let err = loader.load(temp.path(), None).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::CoordinateName {
                key: "schema.default_module",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_toml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = create_test_config("[schema\ndefault_module = ", temp.path());

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let err = loader.load(temp.path(), None).unwrap_err();
        match err {
            ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let mut config = GraphConfig::default();
        config.schema.default_module = "core".to_string();
        config.logging.level = "warn".to_string();

        loader.save_local(temp.path(), &config).unwrap();

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let loaded = loader.load(temp.path(), None).unwrap();

        assert_eq!(loaded.schema.default_module, "core");
        assert_eq!(loaded.logging.level, "warn");
    }

    #[test]
    fn test_init_local_creates_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config_path = loader.init_local(temp.path()).unwrap();

        assert!(config_path.exists());
        assert!(config_path.ends_with(".schemagraph/config.toml"));

        let content = std::fs::read_to_string(&config_path).unwrap();
        let _: GraphConfig = toml::from_str(&content).unwrap();
    }

    #[test]
    fn test_schema_merge_keeps_base_when_overlay_default() {
        let base = crate::SchemaSettings {
            default_platform: "core".to_string(),
            publish_group_pattern: Some("$group".to_string()),
            ..Default::default()
        };
        let overlay = crate::SchemaSettings {
            explicit_platform: Some("jre".to_string()),
            ..Default::default()
        };

        let merged = merge_schema(base, overlay);

        assert_eq!(merged.default_platform, "core");
        assert_eq!(merged.publish_group_pattern.as_deref(), Some("$group"));
        assert_eq!(merged.explicit_platform.as_deref(), Some("jre"));
    }

    #[test]
    fn test_cache_clearing() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            r#"
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let mut loader = ConfigLoader::with_global_dir(&global_dir);

        let _ = loader.load_global().unwrap();
        assert!(loader.global_config.is_some());

        loader.clear_cache();
        assert!(loader.global_config.is_none());
    }
}

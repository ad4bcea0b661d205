//! Metadata tree input
//!
//! The output of the external schema parser: a tree of named nodes, each with
//! platform, module, and requirement declarations plus child projects. The
//! tree can be deserialized from JSON.

use crate::coords::{CoordinateNames, PlatformModule};
use crate::dependency::{DependencyType, SchemaDependency, Transitivity, UNKNOWN_VALUE};
use crate::descriptor::{SchemaModule, SchemaPlatform};
use crate::error::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One node of the metadata tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaMetadata {
    pub name: String,
    pub group: Option<String>,
    pub version: Option<String>,
    /// Inherit the parent's platforms and modules (None = parent's setting)
    pub inherit: Option<bool>,
    pub multiplatform: Option<bool>,
    #[serde(rename = "virtual")]
    pub is_virtual: Option<bool>,
    pub platforms: Vec<PlatformDecl>,
    pub modules: Vec<ModuleDecl>,
    pub requires: Vec<RequireDecl>,
    pub projects: Vec<SchemaMetadata>,
}

/// A declared platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformDecl {
    pub name: String,
    pub replace: Option<String>,
    pub published: Option<bool>,
    pub test: Option<bool>,
    pub publish_pattern: Option<String>,
}

/// A declared module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleDecl {
    pub name: String,
    pub include: Vec<String>,
    pub published: Option<bool>,
    pub test: Option<bool>,
    pub force: Option<bool>,
    pub publish_pattern: Option<String>,
}

/// A declared requirement expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequireDecl {
    #[serde(rename = "type")]
    pub dep_type: DependencyType,
    /// Coordinate whose bucket receives the dependency (None = any/any)
    #[serde(default)]
    pub on: Option<String>,
    pub value: String,
    #[serde(default)]
    pub transitivity: Option<Transitivity>,
}

impl SchemaMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        debug!("Loading metadata from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::ReadMetadata {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }
}

impl PlatformDecl {
    /// Convert into a descriptor. `published` defaults to true only for the
    /// default platform.
    pub fn to_platform(&self, names: &CoordinateNames) -> SchemaPlatform {
        SchemaPlatform {
            name: self.name.clone(),
            publish_pattern: self.publish_pattern.clone(),
            replace: self.replace.clone().filter(|r| !r.is_empty()),
            published: self
                .published
                .unwrap_or_else(|| names.is_default_platform(&self.name)),
            source_published: false,
            test: self.test.unwrap_or(false),
            disabled: false,
        }
    }
}

impl ModuleDecl {
    /// Convert into a descriptor. `published` defaults to true only for the
    /// default module.
    pub fn to_module(&self, names: &CoordinateNames) -> SchemaModule {
        SchemaModule {
            name: self.name.clone(),
            publish_pattern: self.publish_pattern.clone(),
            include: self.include.iter().cloned().collect(),
            published: self
                .published
                .unwrap_or_else(|| names.is_default_module(&self.name)),
            test: self.test.unwrap_or(false),
            force: self.force.unwrap_or(false),
        }
    }
}

impl RequireDecl {
    /// Build the dependency record and the bucket key it belongs to.
    ///
    /// `group`/`version` are the defaults for non-external requirements.
    pub fn to_dependency(
        &self,
        project: &str,
        group: &str,
        version: &str,
        names: &CoordinateNames,
    ) -> Result<(PlatformModule, SchemaDependency)> {
        let on = match self.on.as_deref() {
            Some(on) => PlatformModule::parse(on)?,
            None => PlatformModule::any(),
        };

        let mut dep = match self.dep_type {
            DependencyType::External => {
                let bits: Vec<&str> = self.value.split(':').collect();
                if !(2..=4).contains(&bits.len()) || bits.iter().take(2).any(|b| b.is_empty()) {
                    return Err(SchemaError::MalformedExternal {
                        project: project.to_string(),
                        value: self.value.clone(),
                    });
                }
                let version = bits.get(2).copied().unwrap_or(UNKNOWN_VALUE);
                let dep = SchemaDependency::new(
                    DependencyType::External,
                    on.clone(),
                    bits[0],
                    version,
                    bits[1],
                );
                match bits.get(3) {
                    Some(extra) => dep.with_extra_gnv(*extra),
                    None => dep,
                }
            }
            DependencyType::Internal => {
                let target = PlatformModule::parse(&self.value)?.or(&on);
                SchemaDependency::new(
                    DependencyType::Internal,
                    target.clone(),
                    group,
                    version,
                    target.to_string_strict(names),
                )
            }
            DependencyType::Project | DependencyType::Unknown => {
                SchemaDependency::new(self.dep_type, on.clone(), group, version, &self.value)
            }
        };
        if let Some(transitivity) = self.transitivity {
            dep.transitivity = transitivity;
        }
        Ok((on, dep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const APP_JSON: &str = r#"{
        "name": "app",
        "group": "com.example",
        "platforms": [
            { "name": "main" },
            { "name": "jre", "replace": "main" }
        ],
        "modules": [
            { "name": "main" },
            { "name": "test", "include": ["main"], "test": true }
        ],
        "requires": [
            { "type": "external", "on": "jre:main", "value": "org.lib:lib:1.0" }
        ],
        "projects": [
            { "name": "child", "virtual": true }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let meta = SchemaMetadata::from_json_str(APP_JSON).unwrap();
        assert_eq!(meta.name, "app");
        assert_eq!(meta.platforms.len(), 2);
        assert_eq!(meta.platforms[1].replace.as_deref(), Some("main"));
        assert_eq!(meta.modules[1].include, vec!["main".to_string()]);
        assert_eq!(meta.requires[0].dep_type, DependencyType::External);
        assert_eq!(meta.projects[0].is_virtual, Some(true));
    }

    #[test]
    fn test_published_defaults_to_default_name() {
        let names = CoordinateNames::default();
        let meta = SchemaMetadata::from_json_str(APP_JSON).unwrap();
        assert!(meta.platforms[0].to_platform(&names).published);
        assert!(!meta.platforms[1].to_platform(&names).published);
        assert!(meta.modules[0].to_module(&names).published);
        assert!(!meta.modules[1].to_module(&names).published);
    }

    #[test]
    fn test_external_requirement() {
        let names = CoordinateNames::default();
        let req = RequireDecl {
            dep_type: DependencyType::External,
            on: Some("jre:main".to_string()),
            value: "org.lib:lib:1.0:tests".to_string(),
            transitivity: Some(Transitivity::RuntimeOnly),
        };
        let (key, dep) = req.to_dependency(":app", "g", "v", &names).unwrap();
        assert_eq!(key, PlatformModule::new("jre", "main"));
        assert_eq!(dep.gnv(), "org.lib:lib:1.0:tests");
        assert_eq!(dep.transitivity, Transitivity::RuntimeOnly);
    }

    #[test]
    fn test_external_requirement_arity() {
        let names = CoordinateNames::default();
        for value in ["lib", "a:b:c:d:e", ":lib"] {
            let req = RequireDecl {
                dep_type: DependencyType::External,
                on: None,
                value: value.to_string(),
                transitivity: None,
            };
            let err = req.to_dependency(":app", "g", "v", &names).unwrap_err();
            assert!(matches!(err, SchemaError::MalformedExternal { .. }), "{value}");
        }
    }

    #[test]
    fn test_internal_requirement_inherits_platform() {
        let names = CoordinateNames::default();
        let req = RequireDecl {
            dep_type: DependencyType::Internal,
            on: Some("gwt:test".to_string()),
            value: "api".to_string(),
            transitivity: None,
        };
        let (key, dep) = req.to_dependency(":app", "g", "v", &names).unwrap();
        assert_eq!(key, PlatformModule::new("gwt", "test"));
        assert_eq!(dep.coords, PlatformModule::new("gwt", "api"));
        assert_eq!(dep.name, "gwt:api");
        assert_eq!(dep.group, "g");
    }

    #[test]
    fn test_project_requirement_defaults_to_any() {
        let names = CoordinateNames::default();
        let req = RequireDecl {
            dep_type: DependencyType::Project,
            on: None,
            value: "lib".to_string(),
            transitivity: None,
        };
        let (key, dep) = req.to_dependency(":app", "g", "v", &names).unwrap();
        assert!(key.is_any());
        assert_eq!(dep.name, "lib");
        assert_eq!(dep.transitivity, Transitivity::Api);
    }
}

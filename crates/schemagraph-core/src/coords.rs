//! Platform × module coordinates
//!
//! A [`PlatformModule`] names one build-unit variant of a project. Either side
//! may be unset, meaning "the default", which is resolved against
//! [`CoordinateNames`] at the point where a concrete name is needed.

use crate::error::SchemaError;
use schemagraph_config::{SchemaSettings, DEFAULT_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The configured names of the default platform and default module.
///
/// Passed explicitly wherever defaults must be resolved, so no process-wide
/// state is involved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateNames {
    pub default_platform: String,
    pub default_module: String,
}

impl Default for CoordinateNames {
    fn default() -> Self {
        Self {
            default_platform: DEFAULT_NAME.to_string(),
            default_module: DEFAULT_NAME.to_string(),
        }
    }
}

impl CoordinateNames {
    pub fn new(default_platform: impl Into<String>, default_module: impl Into<String>) -> Self {
        Self {
            default_platform: default_platform.into(),
            default_module: default_module.into(),
        }
    }

    pub fn from_settings(settings: &SchemaSettings) -> Self {
        Self::new(&settings.default_platform, &settings.default_module)
    }

    pub fn is_default_platform(&self, name: &str) -> bool {
        name == self.default_platform
    }

    pub fn is_default_module(&self, name: &str) -> bool {
        name == self.default_module
    }
}

/// An ordered `(platform, module)` pair.
///
/// `None` on either side means "default". The "any/any" wildcard used as a
/// dependency bucket key is the coordinate with both sides unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformModule {
    pub platform: Option<String>,
    pub module: Option<String>,
}

impl PlatformModule {
    /// Create a coordinate with both sides set.
    pub fn new(platform: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            platform: Some(platform.into()),
            module: Some(module.into()),
        }
    }

    /// The wildcard coordinate (both sides unset).
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_platform(platform: impl Into<String>) -> Self {
        Self {
            platform: Some(platform.into()),
            module: None,
        }
    }

    pub fn with_module(module: impl Into<String>) -> Self {
        Self {
            platform: None,
            module: Some(module.into()),
        }
    }

    pub fn is_any(&self) -> bool {
        self.platform.is_none() && self.module.is_none()
    }

    /// Parse `platform:module`, `module`, `platform:` or `:module`.
    ///
    /// Empty sides are unset. More than one `:` is a configuration error.
    pub fn parse(input: &str) -> Result<Self, SchemaError> {
        let mut parts = input.split(':');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(SchemaError::MalformedCoordinate {
                input: input.to_string(),
            });
        }

        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        Ok(match second {
            Some(module) => Self {
                platform: non_empty(first),
                module: non_empty(module),
            },
            None => Self {
                platform: None,
                module: non_empty(first),
            },
        })
    }

    /// Return a new coordinate with only the given sides replaced.
    pub fn edit(&self, platform: Option<&str>, module: Option<&str>) -> Self {
        Self {
            platform: platform
                .map(str::to_string)
                .or_else(|| self.platform.clone()),
            module: module.map(str::to_string).or_else(|| self.module.clone()),
        }
    }

    /// Fill unset sides from `other`.
    pub fn or(&self, other: &PlatformModule) -> Self {
        Self {
            platform: self.platform.clone().or_else(|| other.platform.clone()),
            module: self.module.clone().or_else(|| other.module.clone()),
        }
    }

    pub fn platform_or<'a>(&'a self, names: &'a CoordinateNames) -> &'a str {
        self.platform.as_deref().unwrap_or(&names.default_platform)
    }

    pub fn module_or<'a>(&'a self, names: &'a CoordinateNames) -> &'a str {
        self.module.as_deref().unwrap_or(&names.default_module)
    }

    /// Replace unset sides with the configured default names.
    pub fn resolve(&self, names: &CoordinateNames) -> Self {
        Self::new(self.platform_or(names), self.module_or(names))
    }

    /// Replace sides equal to the default names with unset.
    pub fn normalize(&self, names: &CoordinateNames) -> Self {
        Self {
            platform: self
                .platform
                .clone()
                .filter(|p| !names.is_default_platform(p)),
            module: self.module.clone().filter(|m| !names.is_default_module(m)),
        }
    }

    /// Full `platform:module` form, with defaults filled in.
    pub fn to_string_strict(&self, names: &CoordinateNames) -> String {
        format!("{}:{}", self.platform_or(names), self.module_or(names))
    }

    /// Shortest unambiguous key for this coordinate.
    ///
    /// `module` when the platform is default, `platform` when the module is
    /// default, the default module name when both are default, and a
    /// camel-joined `platformModule` otherwise. This is the directory name the
    /// liveness index uses for a coordinate.
    pub fn unparse(&self, names: &CoordinateNames) -> String {
        unparse(self.platform_or(names), self.module_or(names), names)
    }
}

/// Key for the given platform and module names. See [`PlatformModule::unparse`].
pub fn unparse(platform: &str, module: &str, names: &CoordinateNames) -> String {
    let default_platform = names.is_default_platform(platform);
    let default_module = names.is_default_module(module);
    match (default_platform, default_module) {
        (true, true) => names.default_module.clone(),
        (true, false) => module.to_string(),
        (false, true) => platform.to_string(),
        (false, false) => {
            let mut chars = module.chars();
            match chars.next() {
                Some(first) => {
                    format!("{}{}{}", platform, first.to_uppercase(), chars.as_str())
                }
                None => platform.to_string(),
            }
        }
    }
}

/// Elided form: `platform:module`, omitting unset sides.
impl fmt::Display for PlatformModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.platform, &self.module) {
            (None, None) => Ok(()),
            (None, Some(m)) => write!(f, "{}", m),
            (Some(p), None) => write!(f, "{}:", p),
            (Some(p), Some(m)) => write!(f, "{}:{}", p, m),
        }
    }
}

impl std::str::FromStr for PlatformModule {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            PlatformModule::parse("gwt:api").unwrap(),
            PlatformModule::new("gwt", "api")
        );
        assert_eq!(
            PlatformModule::parse("api").unwrap(),
            PlatformModule::with_module("api")
        );
        assert_eq!(
            PlatformModule::parse(":api").unwrap(),
            PlatformModule::with_module("api")
        );
        assert_eq!(
            PlatformModule::parse("gwt:").unwrap(),
            PlatformModule::with_platform("gwt")
        );
        assert!(PlatformModule::parse("").unwrap().is_any());
    }

    #[test]
    fn test_parse_rejects_two_colons() {
        let err = PlatformModule::parse("a:b:c").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedCoordinate { .. }));
        assert!(err.to_string().contains("a:b:c"));
    }

    #[test]
    fn test_equality_includes_unset_sides() {
        assert_eq!(PlatformModule::any(), PlatformModule::parse(":").unwrap());
        assert_ne!(
            PlatformModule::with_module("main"),
            PlatformModule::new("main", "main")
        );
    }

    #[test]
    fn test_edit_replaces_only_given_sides() {
        let coords = PlatformModule::new("jre", "api");
        assert_eq!(
            coords.edit(Some("main"), None),
            PlatformModule::new("main", "api")
        );
        assert_eq!(coords.edit(None, Some("spi")), PlatformModule::new("jre", "spi"));
        assert_eq!(coords.edit(None, None), coords);
    }

    #[test]
    fn test_unparse_elides_defaults() {
        let names = CoordinateNames::default();
        assert_eq!(PlatformModule::new("main", "main").unparse(&names), "main");
        assert_eq!(PlatformModule::new("main", "api").unparse(&names), "api");
        assert_eq!(PlatformModule::new("gwt", "main").unparse(&names), "gwt");
        assert_eq!(PlatformModule::new("gwt", "test").unparse(&names), "gwtTest");
        assert_eq!(PlatformModule::any().unparse(&names), "main");
    }

    #[test]
    fn test_unparse_with_custom_defaults() {
        let names = CoordinateNames::new("core", "impl");
        assert_eq!(PlatformModule::new("core", "api").unparse(&names), "api");
        assert_eq!(PlatformModule::new("main", "impl").unparse(&names), "main");
        assert_eq!(PlatformModule::any().unparse(&names), "impl");
    }

    #[test]
    fn test_strict_and_display() {
        let names = CoordinateNames::default();
        let coords = PlatformModule::with_module("test");
        assert_eq!(coords.to_string_strict(&names), "main:test");
        assert_eq!(coords.to_string(), "test");
        assert_eq!(PlatformModule::with_platform("jre").to_string(), "jre:");
        assert_eq!(PlatformModule::new("jre", "api").to_string(), "jre:api");
    }

    #[test]
    fn test_roundtrip_after_default_elision() {
        let names = CoordinateNames::default();
        for platform in ["main", "jre", "gwt"] {
            for module in ["main", "api", "test"] {
                let coords = PlatformModule::new(platform, module).normalize(&names);
                let parsed = PlatformModule::parse(&coords.to_string()).unwrap();
                assert_eq!(parsed.normalize(&names), coords);
                assert_eq!(parsed.resolve(&names), PlatformModule::new(platform, module));
            }
        }
    }
}

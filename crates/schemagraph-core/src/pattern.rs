//! Publish-coordinate templating
//!
//! Group and name patterns such as `$group.$platform` or `$name-$module` are
//! resolved by literal token substitution. Build-time naming and index lookups
//! go through the same resolver so generated coordinates agree.

use crate::coords::CoordinateNames;
use crate::dependency::UNKNOWN_VALUE;
use schemagraph_config::GraphConfig;

/// Identity of the build being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCoordinates {
    /// Build name, `_` for the root build
    pub build_name: String,
    pub group: String,
    pub version: String,
}

impl Default for BuildCoordinates {
    fn default() -> Self {
        Self {
            build_name: "_".to_string(),
            group: UNKNOWN_VALUE.to_string(),
            version: UNKNOWN_VALUE.to_string(),
        }
    }
}

impl BuildCoordinates {
    pub fn new(
        build_name: impl Into<String>,
        group: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            build_name: build_name.into(),
            group: group.into(),
            version: version.into(),
        }
    }

    /// Build coordinates from configuration, falling back to the given
    /// group/version (typically the root schema's) when unset.
    pub fn from_config(config: &GraphConfig, group: &str, version: &str) -> Self {
        Self {
            build_name: config.build.name.clone(),
            group: config
                .build
                .group
                .clone()
                .unwrap_or_else(|| group.to_string()),
            version: config
                .build
                .version
                .clone()
                .unwrap_or_else(|| version.to_string()),
        }
    }
}

/// Values substituted into a pattern.
#[derive(Debug, Clone, Copy)]
pub struct PatternValues<'a> {
    pub build: &'a str,
    pub name: &'a str,
    pub group: &'a str,
    pub version: &'a str,
    pub platform: &'a str,
    pub module: &'a str,
}

/// Resolves `$token` patterns into publish coordinates.
#[derive(Debug, Clone)]
pub struct PatternResolver {
    names: CoordinateNames,
    group_pattern: Option<String>,
    name_pattern: Option<String>,
}

impl PatternResolver {
    pub fn new(names: CoordinateNames) -> Self {
        Self {
            names,
            group_pattern: None,
            name_pattern: None,
        }
    }

    /// Use configured pattern overrides.
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            names: CoordinateNames::from_settings(&config.schema),
            group_pattern: config.schema.publish_group_pattern.clone(),
            name_pattern: config.schema.publish_name_pattern.clone(),
        }
    }

    pub fn names(&self) -> &CoordinateNames {
        &self.names
    }

    /// Substitute every token, then strip `-main` until none remain.
    ///
    /// Tokens are replaced in a fixed order: `$build`, `$name`, `$group`,
    /// `$version`, `$platform`, `$module`.
    pub fn resolve(&self, pattern: &str, values: &PatternValues<'_>) -> String {
        let mut out = pattern
            .replace("$build", values.build)
            .replace("$name", values.name)
            .replace("$group", values.group)
            .replace("$version", values.version)
            .replace("$platform", values.platform)
            .replace("$module", values.module);
        while out.contains("-main") {
            out = out.replace("-main", "");
        }
        out
    }

    /// Group pattern for a platform: explicit, configured, or built-in.
    pub fn group_pattern<'a>(&'a self, platform: &str, explicit: Option<&'a str>) -> &'a str {
        if let Some(pattern) = explicit {
            return pattern;
        }
        if let Some(pattern) = self.group_pattern.as_deref() {
            return pattern;
        }
        if self.names.is_default_platform(platform) {
            "$group"
        } else {
            "$group.$platform"
        }
    }

    /// Name pattern for a module: explicit, configured, or built-in.
    pub fn name_pattern<'a>(&'a self, module: &str, explicit: Option<&'a str>) -> &'a str {
        if let Some(pattern) = explicit {
            return pattern;
        }
        if let Some(pattern) = self.name_pattern.as_deref() {
            return pattern;
        }
        if self.names.is_default_module(module) {
            "$name"
        } else {
            "$name-$module"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values<'a>(platform: &'a str, module: &'a str) -> PatternValues<'a> {
        PatternValues {
            build: "_",
            name: "app",
            group: "com.example",
            version: "1.0",
            platform,
            module,
        }
    }

    #[test]
    fn test_substitution() {
        let resolver = PatternResolver::new(CoordinateNames::default());
        assert_eq!(
            resolver.resolve("$group.$platform", &values("gwt", "api")),
            "com.example.gwt"
        );
        assert_eq!(resolver.resolve("$name-$module", &values("gwt", "api")), "app-api");
        assert_eq!(resolver.resolve("$build/$version", &values("gwt", "api")), "_/1.0");
    }

    #[test]
    fn test_default_suffix_is_stripped() {
        let resolver = PatternResolver::new(CoordinateNames::default());
        assert_eq!(resolver.resolve("$name-$module", &values("main", "main")), "app");
        // stripping repeats until no `-main` is left
        assert_eq!(resolver.resolve("x-ma-mainin", &values("main", "main")), "x");
    }

    #[test]
    fn test_default_patterns() {
        let resolver = PatternResolver::new(CoordinateNames::default());
        assert_eq!(resolver.group_pattern("main", None), "$group");
        assert_eq!(resolver.group_pattern("gwt", None), "$group.$platform");
        assert_eq!(resolver.name_pattern("main", None), "$name");
        assert_eq!(resolver.name_pattern("api", None), "$name-$module");
        assert_eq!(resolver.name_pattern("api", Some("$module")), "$module");
    }

    #[test]
    fn test_configured_patterns() {
        let mut config = GraphConfig::default();
        config.schema.publish_group_pattern = Some("org.$platform".to_string());
        let resolver = PatternResolver::from_config(&config);
        assert_eq!(resolver.group_pattern("main", None), "org.$platform");
        assert_eq!(resolver.name_pattern("api", None), "$name-$module");
    }

    #[test]
    fn test_build_coordinates_fallback() {
        let mut config = GraphConfig::default();
        config.build.version = Some("2.0".to_string());
        let coords = BuildCoordinates::from_config(&config, "com.root", "1.0");
        assert_eq!(coords.build_name, "_");
        assert_eq!(coords.group, "com.root");
        assert_eq!(coords.version, "2.0");
    }
}

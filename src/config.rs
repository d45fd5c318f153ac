//! Configuration for reading and writing BoM documents

use std::collections::BTreeSet;

use crate::schema::SchemaVersion;

/// Configuration for a [`BomHandler`](crate::BomHandler)
///
/// Controls which schema versions are accepted and whether document keys no
/// node type claims are rejected.
///
/// # Example
///
/// ```
/// use bom_xml::{HandlerConfig, SchemaVersion};
///
/// let config = HandlerConfig::new()
///     .with_schema(SchemaVersion::Eco2505)
///     .strict(false);
/// assert!(config.supports(SchemaVersion::Eco2505));
/// assert!(!config.supports(SchemaVersion::Eco2301));
/// assert!(!config.is_strict());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    schemas: BTreeSet<SchemaVersion>,
    strict: bool,
}

impl HandlerConfig {
    /// Create a strict configuration supporting no schema version
    pub fn new() -> Self {
        Self {
            schemas: BTreeSet::new(),
            strict: true,
        }
    }

    /// Create a strict configuration supporting every known schema version
    pub fn with_all_schemas() -> Self {
        SchemaVersion::ALL
            .into_iter()
            .fold(Self::new(), Self::with_schema)
    }

    /// Add support for a schema version
    pub fn with_schema(mut self, version: SchemaVersion) -> Self {
        self.schemas.insert(version);
        self
    }

    /// Set whether unmapped document keys are an error
    ///
    /// When off, unmapped keys are logged and dropped.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether unmapped document keys are an error
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Whether a schema version is supported
    pub fn supports(&self, version: SchemaVersion) -> bool {
        self.schemas.contains(&version)
    }

    /// Supported schema versions, oldest first
    pub fn schemas(&self) -> impl Iterator<Item = SchemaVersion> + '_ {
        self.schemas.iter().copied()
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::with_all_schemas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_supports_nothing() {
        let config = HandlerConfig::new();
        assert_eq!(config.schemas().count(), 0);
        assert!(config.is_strict());
    }

    #[test]
    fn test_default_supports_all() {
        let config = HandlerConfig::default();
        assert_eq!(
            config.schemas().collect::<Vec<_>>(),
            vec![SchemaVersion::Eco2301, SchemaVersion::Eco2505]
        );
        assert_eq!(config, HandlerConfig::with_all_schemas());
    }
}

//! Schema versions and the node types they define
//!
//! Each BoM schema version is a closed set of node types registered in its
//! own [`TypeRegistry`]. Versions share the base record reference types of
//! [`gbt1205`] and are never mixed within one document: the namespace of the
//! root element selects the version once, before any field is mapped.

pub mod eco2301;
pub mod eco2505;
pub mod gbt1205;

use std::fmt;

use tracing::debug;

use crate::config::HandlerConfig;
use crate::descriptor::Document;
use crate::error::{Error, Result};
use crate::namespace::NamespaceResolver;
use crate::reader::Reader;
use crate::registry::TypeRegistry;
use crate::writer::Writer;

/// Supported BoM schema versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaVersion {
    /// BillOfMaterialsEco 23/01
    Eco2301,
    /// BillOfMaterialsEco 25/05, adding equivalent record references
    Eco2505,
}

impl SchemaVersion {
    /// Every known version, oldest first
    pub const ALL: [SchemaVersion; 2] = [SchemaVersion::Eco2301, SchemaVersion::Eco2505];

    /// Namespace URI of the document elements
    pub fn namespace(&self) -> &'static str {
        match self {
            SchemaVersion::Eco2301 => eco2301::NAMESPACE,
            SchemaVersion::Eco2505 => eco2505::NAMESPACE,
        }
    }

    /// Version whose document namespace is `namespace`
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|version| version.namespace() == namespace)
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            SchemaVersion::Eco2301 => "Eco2301",
            SchemaVersion::Eco2505 => "Eco2505",
        }
    }

    /// Prefix table used when writing documents of this version
    ///
    /// The document namespace is the default namespace and the base types
    /// use the `gbt` prefix.
    pub fn namespaces(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            SchemaVersion::Eco2301 => &[("", eco2301::NAMESPACE), ("gbt", gbt1205::NAMESPACE)],
            SchemaVersion::Eco2505 => &[("", eco2505::NAMESPACE), ("gbt", gbt1205::NAMESPACE)],
        }
    }

    fn register(&self, registry: &mut TypeRegistry) {
        match self {
            SchemaVersion::Eco2301 => eco2301::register(registry),
            SchemaVersion::Eco2505 => eco2505::register(registry),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One schema version with its type registry and namespace table
#[derive(Debug, Clone)]
pub struct Schema {
    version: SchemaVersion,
    registry: TypeRegistry,
    namespaces: NamespaceResolver,
}

impl Schema {
    /// Build and check the registry of a schema version
    pub fn new(version: SchemaVersion) -> Result<Self> {
        let mut registry = TypeRegistry::new();
        version.register(&mut registry);
        registry.validate()?;
        debug!(schema = %version, types = registry.len(), "schema registry built");
        Ok(Self {
            version,
            registry,
            namespaces: NamespaceResolver::from_table(version.namespaces()),
        })
    }

    /// Schema version
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Registered node types
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Namespace table used for writing
    pub fn namespaces(&self) -> &NamespaceResolver {
        &self.namespaces
    }

    /// Reader for one document of this version, strict as `config` says
    pub fn reader(&self, root: &Document, config: &HandlerConfig) -> Reader<'_> {
        Reader::for_document(&self.registry, root).strict(config.is_strict())
    }

    /// Writer for one document of this version
    pub fn writer(&self) -> Writer<'_> {
        Writer::new(&self.registry, self.namespaces.clone())
    }
}

/// Select the schema version of a document from its root declarations
///
/// The default namespace decides when there is one. Otherwise the one BoM
/// namespace bound to a prefix is used; a document binding several needs a
/// default declaration, or [`read_document_with_root`] to name its root.
///
/// [`read_document_with_root`]: crate::BomHandler::read_document_with_root
pub fn detect_schema(root: &Document) -> Result<SchemaVersion> {
    let resolver = NamespaceResolver::from_document(root);
    if let Some(namespace) = resolver.default_namespace() {
        return SchemaVersion::from_namespace(namespace)
            .ok_or_else(|| Error::UnsupportedSchema(namespace.to_string()));
    }
    let mut versions: Vec<SchemaVersion> = resolver
        .declarations()
        .iter()
        .filter_map(|(_, uri)| SchemaVersion::from_namespace(uri))
        .collect();
    versions.sort();
    versions.dedup();
    match versions.as_slice() {
        [version] => Ok(*version),
        _ => Err(Error::MissingNamespaceDeclaration(
            crate::namespace::XMLNS.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_namespaces() {
        for version in SchemaVersion::ALL {
            assert_eq!(SchemaVersion::from_namespace(version.namespace()), Some(version));
        }
        assert_eq!(SchemaVersion::from_namespace(gbt1205::NAMESPACE), None);
        assert_eq!(SchemaVersion::Eco2505.to_string(), "Eco2505");
    }

    #[test]
    fn test_every_schema_validates() {
        for version in SchemaVersion::ALL {
            let schema = Schema::new(version).unwrap();
            assert!(schema.registry().contains("BillOfMaterials"));
            assert!(schema.registry().contains("MIRecordReference"));
        }
        let eco2505 = Schema::new(SchemaVersion::Eco2505).unwrap();
        assert!(eco2505.registry().contains("ExtendedMIRecordReference"));
        let eco2301 = Schema::new(SchemaVersion::Eco2301).unwrap();
        assert!(!eco2301.registry().contains("ExtendedMIRecordReference"));
    }

    #[test]
    fn test_reader_follows_config() {
        let schema = Schema::new(SchemaVersion::Eco2301).unwrap();
        let doc = json!({"@xmlns": eco2301::NAMESPACE, "Colour": "red"});
        let doc = doc.as_object().unwrap();

        let strict = schema.reader(doc, &HandlerConfig::default());
        assert!(strict.is_strict());
        assert!(matches!(
            strict.read_root::<eco2301::BillOfMaterials>(doc),
            Err(Error::UnmappedField { ref key, .. }) if key == "Colour"
        ));

        let lenient = schema.reader(doc, &HandlerConfig::default().strict(false));
        assert!(!lenient.is_strict());
        let bom = lenient.read_root::<eco2301::BillOfMaterials>(doc).unwrap();
        assert!(bom.components.is_empty());
    }

    #[test]
    fn test_detect_schema() {
        let doc = json!({"@xmlns": eco2505::NAMESPACE});
        assert_eq!(
            detect_schema(doc.as_object().unwrap()).unwrap(),
            SchemaVersion::Eco2505
        );

        let doc = json!({"@xmlns": "http://www.grantadesign.com/99/01/BillOfMaterialsEco"});
        assert!(matches!(
            detect_schema(doc.as_object().unwrap()),
            Err(Error::UnsupportedSchema(_))
        ));

        let doc = json!({"@xmlns:eco": eco2301::NAMESPACE, "@xmlns:gbt": gbt1205::NAMESPACE});
        assert_eq!(
            detect_schema(doc.as_object().unwrap()).unwrap(),
            SchemaVersion::Eco2301
        );

        let doc = json!({"@xmlns:a": eco2301::NAMESPACE, "@xmlns:b": eco2505::NAMESPACE});
        assert!(matches!(
            detect_schema(doc.as_object().unwrap()),
            Err(Error::MissingNamespaceDeclaration(_))
        ));

        let doc = json!({"@xmlns:gbt": gbt1205::NAMESPACE});
        assert!(matches!(
            detect_schema(doc.as_object().unwrap()),
            Err(Error::MissingNamespaceDeclaration(_))
        ));
    }
}

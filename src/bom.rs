//! Reading and writing whole BoM documents
//!
//! [`BomHandler`] selects the schema version of a document from its root
//! namespace and converts it with that version's registry. With the `xml`
//! feature it also loads and dumps XML text.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::HandlerConfig;
use crate::descriptor::{Document, Node};
use crate::error::{Error, Result};
use crate::name::QualifiedName;
use crate::namespace::NamespaceResolver;
use crate::schema::{Schema, SchemaVersion, detect_schema, eco2301, eco2505};

/// Local name of the root element in every schema version
pub const ROOT_ELEMENT: &str = "BillOfMaterials";

/// A BoM document of any supported schema version
#[derive(Debug, Clone, PartialEq)]
pub enum Bom {
    /// BoM of the 23/01 schema
    Eco2301(eco2301::BillOfMaterials),
    /// BoM of the 25/05 schema
    Eco2505(eco2505::BillOfMaterials),
}

impl Bom {
    /// Schema version of the document
    pub fn version(&self) -> SchemaVersion {
        match self {
            Bom::Eco2301(_) => SchemaVersion::Eco2301,
            Bom::Eco2505(_) => SchemaVersion::Eco2505,
        }
    }

    /// Root node
    pub fn as_node(&self) -> &dyn Node {
        match self {
            Bom::Eco2301(bom) => bom,
            Bom::Eco2505(bom) => bom,
        }
    }

    /// Number of top-level parts
    pub fn component_count(&self) -> usize {
        match self {
            Bom::Eco2301(bom) => bom.components.len(),
            Bom::Eco2505(bom) => bom.components.len(),
        }
    }
}

impl From<eco2301::BillOfMaterials> for Bom {
    fn from(bom: eco2301::BillOfMaterials) -> Self {
        Bom::Eco2301(bom)
    }
}

impl From<eco2505::BillOfMaterials> for Bom {
    fn from(bom: eco2505::BillOfMaterials) -> Self {
        Bom::Eco2505(bom)
    }
}

/// Converts BoM documents of the configured schema versions
///
/// # Example
///
/// ```
/// use bom_xml::{Bom, BomHandler, HandlerConfig, SchemaVersion};
/// use bom_xml::schema::eco2505::{BillOfMaterials, Part};
///
/// let handler = BomHandler::new(HandlerConfig::new().with_schema(SchemaVersion::Eco2505))?;
/// let bom = Bom::from(BillOfMaterials::new(vec![Part::new("P1")]));
///
/// let doc = handler.write_document(&bom)?;
/// assert_eq!(handler.read_document(&doc)?, bom);
/// # Ok::<(), bom_xml::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct BomHandler {
    config: HandlerConfig,
    schemas: BTreeMap<SchemaVersion, Schema>,
}

impl BomHandler {
    /// Create a handler, building the registry of every configured version
    pub fn new(config: HandlerConfig) -> Result<Self> {
        let schemas = config
            .schemas()
            .map(|version| Schema::new(version).map(|schema| (version, schema)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { config, schemas })
    }

    /// Create a strict handler for every known version
    pub fn with_all_schemas() -> Result<Self> {
        Self::new(HandlerConfig::default())
    }

    /// Handler configuration
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Schema of a configured version
    pub fn schema(&self, version: SchemaVersion) -> Result<&Schema> {
        self.schemas
            .get(&version)
            .ok_or_else(|| Error::UnsupportedSchema(version.namespace().to_string()))
    }

    /// Read a document whose default namespace selects the schema
    pub fn read_document(&self, doc: &Document) -> Result<Bom> {
        let version = detect_schema(doc)?;
        self.read_version(version, doc)
    }

    /// Read a document given the tag of its root element
    ///
    /// The tag may be bare, prefixed (`eco:BillOfMaterials`) or in
    /// `{uri}BillOfMaterials` form; its namespace selects the schema.
    pub fn read_document_with_root(&self, root_tag: &str, doc: &Document) -> Result<Bom> {
        let (namespace, local_name) = match root_tag.strip_prefix('{') {
            Some(rest) => rest
                .split_once('}')
                .map(|(uri, local)| (uri.to_string(), local.to_string()))
                .ok_or_else(|| Error::InvalidXml(format!("malformed root tag '{}'", root_tag)))?,
            None => {
                let name = NamespaceResolver::from_document(doc).resolve(root_tag, "")?;
                (name.namespace().to_string(), name.local_name().to_string())
            }
        };
        if local_name != ROOT_ELEMENT {
            return Err(Error::UnregisteredType(local_name));
        }
        let version = SchemaVersion::from_namespace(&namespace)
            .ok_or(Error::UnsupportedSchema(namespace))?;
        self.read_version(version, doc)
    }

    fn read_version(&self, version: SchemaVersion, doc: &Document) -> Result<Bom> {
        let schema = self.schema(version)?;
        debug!(schema = %version, strict = self.config.is_strict(), "reading BoM document");
        let reader = schema.reader(doc, &self.config);
        Ok(match version {
            SchemaVersion::Eco2301 => {
                Bom::Eco2301(reader.read_root::<eco2301::BillOfMaterials>(doc)?)
            }
            SchemaVersion::Eco2505 => {
                Bom::Eco2505(reader.read_root::<eco2505::BillOfMaterials>(doc)?)
            }
        })
    }

    /// Write a BoM with the namespace declarations of its schema
    pub fn write_document(&self, bom: &Bom) -> Result<Document> {
        let schema = self.schema(bom.version())?;
        debug!(schema = %bom.version(), "writing BoM document");
        schema.writer().write_root(bom.as_node())
    }

    /// Tag of the root element when writing a version
    pub fn root_tag(&self, version: SchemaVersion) -> Result<String> {
        self.schema(version)?
            .namespaces()
            .document_key(&QualifiedName::new(ROOT_ELEMENT, version.namespace()))
    }

    /// Parse XML text and read the BoM it holds
    #[cfg(feature = "xml")]
    pub fn load_bom_from_text(&self, xml: &str) -> Result<Bom> {
        let parsed = crate::xml::parse_document(xml)?;
        debug!(root = %parsed.root, "parsed BoM XML");
        self.read_document_with_root(&parsed.root, &parsed.document)
    }

    /// Read the BoM held in an XML file
    #[cfg(feature = "xml")]
    pub fn load_bom_from_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<Bom> {
        let xml = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = xml.len(), "loaded BoM file");
        self.load_bom_from_text(&xml)
    }

    /// Serialize a BoM to XML text
    #[cfg(feature = "xml")]
    pub fn dump_bom(&self, bom: &Bom) -> Result<String> {
        let doc = self.write_document(bom)?;
        crate::xml::write_document(&self.root_tag(bom.version())?, &doc)
    }
}

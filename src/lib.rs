//! # bom-xml
//!
//! Namespace-aware, bidirectional marshaling between Eco Bill of Materials
//! documents and typed Rust structures.
//!
//! A BoM document is handled in its nested-mapping form: child elements are
//! keyed by their (optionally prefixed) tag, attributes carry a leading `@`
//! and element text sits under `$`. Every node type describes its fields in
//! a static descriptor table, and one generic [`Reader`] and [`Writer`] pair
//! walks those tables in both directions.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Two schema versions (23/01 and 25/05) selected by root namespace
//! - Namespace prefixes resolved per document, so re-prefixed input reads
//!   identically
//! - Record references written with exactly one identifier, in priority order
//! - Optional XML text layer (`xml` feature, enabled by default)
//!
//! ## Example
//!
//! ```
//! use bom_xml::{BomHandler, HandlerConfig};
//! use serde_json::json;
//!
//! # fn main() -> bom_xml::Result<()> {
//! let doc = json!({
//!     "@xmlns": "http://www.grantadesign.com/23/01/BillOfMaterialsEco",
//!     "@xmlns:gbt": "http://www.grantadesign.com/12/05/GrantaBaseTypes",
//!     "Components": {"Part": [{
//!         "PartNumber": "P1",
//!         "MIPartReference": {"gbt:dbKey": "DB", "gbt:recordGUID": "G"}
//!     }]}
//! });
//!
//! let handler = BomHandler::new(HandlerConfig::default())?;
//! let bom = handler.read_document(doc.as_object().unwrap())?;
//! assert_eq!(bom.component_count(), 1);
//!
//! let written = handler.write_document(&bom)?;
//! assert_eq!(serde_json::Value::Object(written), doc);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bom;
pub mod builder;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod name;
pub mod namespace;
pub mod reader;
pub mod registry;
pub mod schema;
pub mod writer;
#[cfg(feature = "xml")]
pub mod xml;

pub use bom::{Bom, BomHandler};
pub use config::HandlerConfig;
pub use descriptor::{
    CustomField, Document, FieldDescriptor, FieldSet, Node, NodeType, ScalarValue,
};
pub use error::{Error, Result};
pub use name::QualifiedName;
pub use namespace::NamespaceResolver;
pub use reader::Reader;
pub use registry::TypeRegistry;
pub use schema::{Schema, SchemaVersion};
pub use writer::Writer;

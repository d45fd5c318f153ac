//! Writing typed nodes to nested-mapping documents
//!
//! The inverse of [`Reader`](crate::Reader). Document keys are generated from
//! the target schema's namespace table, so a document written by one writer
//! always carries the same prefixes regardless of how it was read.

use serde_json::Value;
use tracing::{debug, trace};

use crate::descriptor::{Document, FieldDescriptor, Node, NodeType, ScalarValue};
use crate::error::{Error, Result};
use crate::name::QualifiedName;
use crate::namespace::NamespaceResolver;
use crate::registry::TypeRegistry;

/// Writer for one document
#[derive(Debug)]
pub struct Writer<'s> {
    registry: &'s TypeRegistry,
    resolver: NamespaceResolver,
}

impl<'s> Writer<'s> {
    /// Create a writer using a schema namespace table
    pub fn new(registry: &'s TypeRegistry, resolver: NamespaceResolver) -> Self {
        Self { registry, resolver }
    }

    /// Create a writer from `(prefix, uri)` pairs, the empty prefix being the
    /// default namespace
    pub fn with_namespaces(registry: &'s TypeRegistry, namespaces: &[(&str, &str)]) -> Self {
        Self::new(registry, NamespaceResolver::from_table(namespaces))
    }

    /// Namespace bindings used for generated keys
    pub fn resolver(&self) -> &NamespaceResolver {
        &self.resolver
    }

    /// Document key for a qualified name
    pub fn key(&self, name: &QualifiedName<'_>) -> Result<String> {
        self.resolver.document_key(name)
    }

    /// Write the root node, adding the namespace declarations of the schema
    pub fn write_root(&self, node: &dyn Node) -> Result<Document> {
        let mut doc = self.write(node)?;
        for (key, uri) in self.resolver.declarations() {
            doc.insert(key, Value::String(uri));
        }
        debug!(
            type_name = node.type_name(),
            keys = doc.len(),
            "wrote document root"
        );
        Ok(doc)
    }

    /// Document form of a scalar written by a custom hook
    ///
    /// Fails with [`Error::InvalidFieldValue`] for values that have no
    /// document form, such as `NaN`.
    pub fn scalar<V: ScalarValue>(
        &self,
        type_name: &str,
        property: &str,
        value: &V,
    ) -> Result<Value> {
        written(type_name, property, value.to_value())
    }

    /// Write a node of a registered type to its element document
    pub fn write(&self, node: &dyn Node) -> Result<Document> {
        if !self.registry.contains(node.type_name()) {
            return Err(Error::UnregisteredType(node.type_name().to_string()));
        }
        node.write_document(self)
    }

    /// Write every field of `node` into a new element document
    pub fn write_fields<T: NodeType>(&self, node: &T) -> Result<Document> {
        trace!(type_name = T::TYPE_NAME, "writing node");
        let mut out = Document::new();

        for descriptor in T::FIELDS {
            match descriptor {
                FieldDescriptor::Scalar {
                    property,
                    name,
                    get,
                } => {
                    if let Some(value) = get(node) {
                        out.insert(self.key(name)?, written(T::TYPE_NAME, property, value)?);
                    }
                }
                FieldDescriptor::Single { name, get, .. } => {
                    if let Some(child) = get(node) {
                        out.insert(self.key(name)?, Value::Object(self.write(child)?));
                    }
                }
                FieldDescriptor::List {
                    container,
                    item,
                    get,
                    ..
                } => {
                    let items = get(node);
                    if items.is_empty() {
                        continue;
                    }
                    let written = items
                        .into_iter()
                        .map(|child| self.write(child).map(Value::Object))
                        .collect::<Result<Vec<_>>>()?;
                    let mut wrapper = Document::new();
                    wrapper.insert(self.key(item)?, Value::Array(written));
                    out.insert(self.key(container)?, Value::Object(wrapper));
                }
                FieldDescriptor::Base { get, .. } => {
                    out.extend(self.write(get(node))?);
                }
            }
        }

        node.custom_write(&mut out, self)?;
        Ok(out)
    }
}

fn written(type_name: &str, property: &str, value: Value) -> Result<Value> {
    if value.is_null() {
        return Err(Error::invalid_value(type_name, property, "finite number", &value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::gbt1205::{self, PartialTableReference};
    use serde_json::json;

    #[test]
    fn test_write_prefixed_scalars() {
        let registry = TypeRegistry::new().with::<PartialTableReference>();
        let writer = Writer::with_namespaces(&registry, &[("gbt", gbt1205::NAMESPACE)]);
        let table = PartialTableReference {
            table_identity: Some(5),
            table_guid: None,
            table_name: Some("Materials".to_string()),
        };
        let doc = writer.write(&table).unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({"gbt:tableIdentity": 5, "gbt:tableName": "Materials"})
        );
    }

    #[test]
    fn test_write_root_adds_declarations() {
        let registry = TypeRegistry::new().with::<PartialTableReference>();
        let writer = Writer::with_namespaces(&registry, &[("", gbt1205::NAMESPACE)]);
        let table = PartialTableReference {
            table_identity: None,
            table_guid: Some("abc".to_string()),
            table_name: None,
        };
        let doc = writer.write_root(&table).unwrap();
        assert_eq!(
            Value::Object(doc),
            json!({"tableGUID": "abc", "@xmlns": gbt1205::NAMESPACE})
        );
    }

    #[test]
    fn test_write_unregistered_type() {
        let registry = TypeRegistry::new();
        let writer = Writer::with_namespaces(&registry, &[("gbt", gbt1205::NAMESPACE)]);
        let table = PartialTableReference {
            table_identity: Some(1),
            table_guid: None,
            table_name: None,
        };
        let err = writer.write(&table).unwrap_err();
        assert!(matches!(err, Error::UnregisteredType(ref name) if name == "PartialTableReference"));
    }

    #[test]
    fn test_namespace_not_in_schema() {
        let registry = TypeRegistry::new().with::<PartialTableReference>();
        let writer = Writer::with_namespaces(&registry, &[("", "urn:other")]);
        let table = PartialTableReference {
            table_identity: Some(1),
            table_guid: None,
            table_name: None,
        };
        let err = writer.write(&table).unwrap_err();
        assert!(matches!(err, Error::NamespaceNotInSchema(_)));
    }
}

//! Reading typed nodes from nested-mapping documents
//!
//! The reader walks a document depth-first, driven by the descriptor tables
//! of the node types in its [`TypeRegistry`]. One reader serves exactly one
//! document: its [`NamespaceResolver`] is built once from the root
//! declarations and reused for every nested element.

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::descriptor::{BoxedNode, Document, FieldDescriptor, FieldSet, FieldValue, NodeType};
use crate::error::{Error, Result};
use crate::name::{QualifiedName, TEXT};
use crate::namespace::{NamespaceResolver, XSI_NAMESPACE};
use crate::registry::TypeRegistry;

/// Reader for one document
#[derive(Debug)]
pub struct Reader<'s> {
    registry: &'s TypeRegistry,
    resolver: NamespaceResolver,
    strict: bool,
}

impl<'s> Reader<'s> {
    /// Create a reader with an explicit resolver
    ///
    /// Unmapped fields are rejected unless [`strict`](Self::strict) is
    /// turned off.
    pub fn new(registry: &'s TypeRegistry, resolver: NamespaceResolver) -> Self {
        Self {
            registry,
            resolver,
            strict: true,
        }
    }

    /// Create a reader for a document, resolving prefixes from its root
    /// declarations
    pub fn for_document(registry: &'s TypeRegistry, root: &Document) -> Self {
        Self::new(registry, NamespaceResolver::from_document(root))
    }

    /// Set whether document keys no descriptor claims are an error
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether unmapped fields are rejected
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Namespace bindings of the document being read
    pub fn resolver(&self) -> &NamespaceResolver {
        &self.resolver
    }

    /// Read the root node of the document
    pub fn read_root<T: NodeType>(&self, root: &Document) -> Result<T> {
        debug!(
            type_name = T::TYPE_NAME,
            default_namespace = self.resolver.default_namespace().unwrap_or_default(),
            "reading document root"
        );
        self.create_typed::<T>(root)
    }

    /// Create a node of a registered type from its element value
    ///
    /// A scalar value is read as an element holding only text. An empty
    /// element (`null`, or text that is empty or whitespace) is read as an
    /// element without content.
    pub fn create(&self, type_name: &str, value: &Value) -> Result<BoxedNode> {
        match value {
            Value::Object(doc) => self.create_from_document(type_name, doc),
            Value::Null => self.create_from_document(type_name, &Document::new()),
            Value::String(text) if text.trim().is_empty() => {
                self.create_from_document(type_name, &Document::new())
            }
            Value::Array(_) => Err(Error::invalid_value(
                type_name,
                TEXT,
                "a single element",
                value,
            )),
            scalar => {
                let mut doc = Document::new();
                doc.insert(TEXT.to_string(), scalar.clone());
                self.create_from_document(type_name, &doc)
            }
        }
    }

    /// Create a node of a registered type from its element document
    pub fn create_from_document(&self, type_name: &str, doc: &Document) -> Result<BoxedNode> {
        let read = self
            .registry
            .get(type_name)
            .ok_or_else(|| Error::UnregisteredType(type_name.to_string()))?;
        read(self, doc)
    }

    /// Create a node through the registry and recover its concrete type
    pub fn create_typed<T: NodeType>(&self, doc: &Document) -> Result<T> {
        let node = self.create_from_document(T::TYPE_NAME, doc)?;
        node.into_any()
            .downcast::<T>()
            .map(|node| *node)
            .map_err(|_| Error::FieldTypeMismatch {
                type_name: T::TYPE_NAME.to_string(),
                field: TEXT.to_string(),
                expected: T::TYPE_NAME,
            })
    }

    /// Read a node of type `T` from its own element
    ///
    /// Every key of the element must be claimed by the type (strict mode).
    pub fn read_node<T: NodeType>(&self, doc: &Document) -> Result<T> {
        trace!(type_name = T::TYPE_NAME, keys = doc.len(), "reading node");
        self.check_unmapped::<T>(doc)?;
        T::from_fields(self.read_fields::<T>(doc)?)
    }

    /// Read a node of type `T` from an element shared with an extending type
    pub fn read_base<T: NodeType>(&self, doc: &Document) -> Result<T> {
        T::from_fields(self.read_fields::<T>(doc)?)
    }

    /// Collect the values of every field of `T` present in the element
    pub fn read_fields<T: NodeType>(&self, doc: &Document) -> Result<FieldSet> {
        let mut fields = FieldSet::new(T::TYPE_NAME);

        for descriptor in T::FIELDS {
            match descriptor {
                FieldDescriptor::Scalar { property, name, .. } => {
                    if let Some(value) = self.get_field(doc, name)? {
                        if !value.is_null() {
                            fields.insert(*property, FieldValue::Scalar(value.clone()))?;
                        }
                    }
                }
                FieldDescriptor::Single {
                    child_type,
                    property,
                    name,
                    ..
                } => {
                    if let Some(value) = self.get_field(doc, name)? {
                        let child = self.create(child_type, value)?;
                        fields.insert(*property, FieldValue::Single(child))?;
                    }
                }
                FieldDescriptor::List {
                    item_type,
                    property,
                    container,
                    item,
                    ..
                } => {
                    let items = self.read_list(T::TYPE_NAME, doc, container, item, item_type)?;
                    if !items.is_empty() {
                        fields.insert(*property, FieldValue::List(items))?;
                    }
                }
                FieldDescriptor::Base { property, read, .. } => {
                    fields.insert(*property, FieldValue::Single(read(self, doc)?))?;
                }
            }
        }

        fields.merge(T::custom_read(doc, self)?)?;
        Ok(fields)
    }

    fn read_list(
        &self,
        type_name: &str,
        doc: &Document,
        container: &QualifiedName<'_>,
        item: &QualifiedName<'_>,
        item_type: &str,
    ) -> Result<Vec<BoxedNode>> {
        let Some(container_doc) = self.get_wrapper(type_name, doc, container)? else {
            return Ok(Vec::new());
        };
        match self.get_field(container_doc, item)? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|value| self.create(item_type, value))
                .collect(),
            Some(value) => Ok(vec![self.create(item_type, value)?]),
        }
    }

    /// Find the value stored under a qualified name in an element
    ///
    /// Unprefixed attribute keys are resolved against the namespace of the
    /// name being looked up, which is the namespace of the owning node.
    pub fn get_field<'d>(
        &self,
        doc: &'d Document,
        name: &QualifiedName<'_>,
    ) -> Result<Option<&'d Value>> {
        for (key, value) in doc {
            if NamespaceResolver::is_declaration(key) {
                continue;
            }
            if name.is_text() != (key == TEXT) {
                continue;
            }
            if self.resolver.resolve(key, name.namespace())?.matches(name) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Find a wrapper element, such as a list container, in an element
    ///
    /// An empty wrapper reads as absent; a wrapper holding text or a sequence
    /// is a [`Error::MalformedContainerShape`].
    pub fn get_wrapper<'d>(
        &self,
        type_name: &str,
        doc: &'d Document,
        name: &QualifiedName<'_>,
    ) -> Result<Option<&'d Document>> {
        match self.get_field(doc, name)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(Value::Object(wrapper)) => Ok(Some(wrapper)),
            Some(_) => Err(Error::MalformedContainerShape {
                type_name: type_name.to_string(),
                container: name.to_string(),
            }),
        }
    }

    /// Read a text-only child, or the text of a child element with attributes
    pub fn get_text<'d>(
        &self,
        doc: &'d Document,
        name: &QualifiedName<'_>,
    ) -> Result<Option<&'d Value>> {
        Ok(match self.get_field(doc, name)? {
            None | Some(Value::Null) => None,
            Some(Value::Object(element)) => element.get(TEXT),
            Some(value) => Some(value),
        })
    }

    fn check_unmapped<T: NodeType>(&self, doc: &Document) -> Result<()> {
        let claimed = T::claimed_names();
        'keys: for key in doc.keys() {
            if NamespaceResolver::is_declaration(key) {
                continue;
            }
            // Unprefixed attributes take the namespace of whichever name
            // claims them, as in `get_field`.
            for name in &claimed {
                if self.resolver.resolve(key, name.namespace())?.matches(name) {
                    continue 'keys;
                }
            }
            if self.resolver.resolve(key, T::NAMESPACE)?.namespace() == XSI_NAMESPACE {
                continue;
            }
            if self.strict {
                return Err(Error::UnmappedField {
                    type_name: T::TYPE_NAME.to_string(),
                    key: key.clone(),
                });
            }
            warn!(type_name = T::TYPE_NAME, key = %key, "ignoring unmapped field");
        }
        Ok(())
    }
}

/// Read the base part of an extending type from the shared element
pub fn read_base_node<T: NodeType>(reader: &Reader<'_>, doc: &Document) -> Result<BoxedNode> {
    Ok(Box::new(reader.read_base::<T>(doc)?))
}

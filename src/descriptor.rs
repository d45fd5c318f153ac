//! Field descriptor tables and the node type contract
//!
//! Every marshalable record implements [`NodeType`]: it names its namespace,
//! lists its fields in a static table of [`FieldDescriptor`]s and may add
//! `custom_read` / `custom_write` hooks for the few fields the generic shapes
//! cannot express. The [`Reader`](crate::Reader) and
//! [`Writer`](crate::Writer) consume those tables generically.
//!
//! The reader collects the values it found into a [`FieldSet`], from which
//! the type's `from_fields` constructor takes typed values. Missing required
//! values, wrong primitive shapes and unknown enumeration members are all
//! reported from there.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::name::QualifiedName;
use crate::reader::Reader;
use crate::writer::Writer;

/// Nested-mapping form of one element: children by key, attributes under
/// `@`-prefixed keys, text under `$`
pub type Document = Map<String, Value>;

/// A type-erased node produced by the reader
pub type BoxedNode = Box<dyn Node>;

/// Constructor reading a node of a fixed type from its document
pub type ReadFn = fn(&Reader<'_>, &Document) -> Result<BoxedNode>;

/// One entry of a node type's descriptor table
pub enum FieldDescriptor<T> {
    /// A primitive or enum-as-string value
    Scalar {
        /// Property name
        property: &'static str,
        /// Element, attribute or text name in the document
        name: QualifiedName<'static>,
        /// Current value, `None` when absent
        get: fn(&T) -> Option<Value>,
    },
    /// Exactly one nested node, present or absent
    Single {
        /// Registered type name of the child
        child_type: &'static str,
        /// Property name
        property: &'static str,
        /// Element name in the document
        name: QualifiedName<'static>,
        /// Current child, `None` when absent
        get: fn(&T) -> Option<&dyn Node>,
    },
    /// Zero or more nested nodes wrapped in a container element
    List {
        /// Registered type name of each item
        item_type: &'static str,
        /// Property name
        property: &'static str,
        /// Wrapping container element
        container: QualifiedName<'static>,
        /// Repeated item element inside the container
        item: QualifiedName<'static>,
        /// Current items in document order
        get: fn(&T) -> Vec<&dyn Node>,
    },
    /// Another node type read from, and written into, the same element
    ///
    /// Used by a later schema version to extend an earlier type while reusing
    /// its table unchanged.
    Base {
        /// Registered type name of the base
        base_type: &'static str,
        /// Property holding the base value
        property: &'static str,
        /// Reads the base from the shared element
        read: ReadFn,
        /// Base value to write
        get: fn(&T) -> &dyn Node,
        /// Document names claimed by the base type
        names: fn() -> Vec<QualifiedName<'static>>,
    },
}

impl<T> FieldDescriptor<T> {
    /// Property name of this entry
    pub fn property(&self) -> &'static str {
        match self {
            FieldDescriptor::Scalar { property, .. }
            | FieldDescriptor::Single { property, .. }
            | FieldDescriptor::List { property, .. }
            | FieldDescriptor::Base { property, .. } => property,
        }
    }

    /// Document names this entry claims on the owning element
    pub fn claimed_names(&self) -> Vec<QualifiedName<'static>> {
        match self {
            FieldDescriptor::Scalar { name, .. } | FieldDescriptor::Single { name, .. } => {
                vec![name.clone()]
            }
            FieldDescriptor::List { container, .. } => vec![container.clone()],
            FieldDescriptor::Base { names, .. } => names(),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDescriptor::Scalar { property, name, .. } => f
                .debug_struct("Scalar")
                .field("property", property)
                .field("name", name)
                .finish(),
            FieldDescriptor::Single {
                child_type,
                property,
                name,
                ..
            } => f
                .debug_struct("Single")
                .field("child_type", child_type)
                .field("property", property)
                .field("name", name)
                .finish(),
            FieldDescriptor::List {
                item_type,
                property,
                container,
                item,
                ..
            } => f
                .debug_struct("List")
                .field("item_type", item_type)
                .field("property", property)
                .field("container", container)
                .field("item", item)
                .finish(),
            FieldDescriptor::Base {
                base_type,
                property,
                ..
            } => f
                .debug_struct("Base")
                .field("base_type", base_type)
                .field("property", property)
                .finish(),
        }
    }
}

/// A field handled by a node type's custom hooks
#[derive(Debug, Clone)]
pub struct CustomField {
    /// Property name
    pub property: &'static str,
    /// Outermost document name the hooks read and write
    pub name: QualifiedName<'static>,
    /// Registered type the hooks create, if the field holds a node
    pub child_type: Option<&'static str>,
}

impl CustomField {
    /// Create a custom field entry holding simple values
    pub const fn new(property: &'static str, name: QualifiedName<'static>) -> Self {
        Self {
            property,
            name,
            child_type: None,
        }
    }

    /// Create a custom field entry whose hooks create a nested node
    pub const fn node(
        property: &'static str,
        child_type: &'static str,
        name: QualifiedName<'static>,
    ) -> Self {
        Self {
            property,
            name,
            child_type: Some(child_type),
        }
    }
}

/// View of a descriptor table split by shape
pub struct Descriptors<T: 'static> {
    fields: &'static [FieldDescriptor<T>],
}

impl<T: 'static> Descriptors<T> {
    /// Scalar entries
    pub fn scalars(&self) -> impl Iterator<Item = &'static FieldDescriptor<T>> {
        self.fields
            .iter()
            .filter(|d| matches!(d, FieldDescriptor::Scalar { .. }))
    }

    /// Single nested-node entries
    pub fn singles(&self) -> impl Iterator<Item = &'static FieldDescriptor<T>> {
        self.fields
            .iter()
            .filter(|d| matches!(d, FieldDescriptor::Single { .. }))
    }

    /// List entries
    pub fn lists(&self) -> impl Iterator<Item = &'static FieldDescriptor<T>> {
        self.fields
            .iter()
            .filter(|d| matches!(d, FieldDescriptor::List { .. }))
    }

    /// Every entry in table order
    pub fn all(&self) -> &'static [FieldDescriptor<T>] {
        self.fields
    }
}

/// Contract implemented by every marshalable record
///
/// # Example
///
/// ```
/// use bom_xml::{FieldDescriptor, FieldSet, NodeType, QualifiedName, Result, descriptor::opt_scalar};
///
/// #[derive(Debug)]
/// struct Note {
///     text: Option<String>,
/// }
///
/// impl NodeType for Note {
///     const TYPE_NAME: &'static str = "Note";
///     const NAMESPACE: &'static str = "urn:notes";
///     const FIELDS: &'static [FieldDescriptor<Self>] = &[FieldDescriptor::Scalar {
///         property: "text",
///         name: QualifiedName::new("Text", "urn:notes"),
///         get: |n| opt_scalar(&n.text),
///     }];
///
///     fn from_fields(mut fields: FieldSet) -> Result<Self> {
///         Ok(Self { text: fields.optional("text")? })
///     }
/// }
///
/// assert_eq!(Note::descriptors().scalars().count(), 1);
/// ```
pub trait NodeType: Sized + fmt::Debug + 'static {
    /// Registered type name
    const TYPE_NAME: &'static str;

    /// Namespace URI owning this type's fields
    const NAMESPACE: &'static str;

    /// Declarative field table
    const FIELDS: &'static [FieldDescriptor<Self>];

    /// Fields handled by [`custom_read`](Self::custom_read) and
    /// [`custom_write`](Self::custom_write)
    const CUSTOM_FIELDS: &'static [CustomField] = &[];

    /// Build the node from the values the reader collected
    fn from_fields(fields: FieldSet) -> Result<Self>;

    /// Read fields the generic shapes cannot express
    fn custom_read(_doc: &Document, _reader: &Reader<'_>) -> Result<FieldSet> {
        Ok(FieldSet::new(Self::TYPE_NAME))
    }

    /// Write fields the generic shapes cannot express into `out`
    fn custom_write(&self, _out: &mut Document, _writer: &Writer<'_>) -> Result<()> {
        Ok(())
    }

    /// Descriptor table split by shape
    fn descriptors() -> Descriptors<Self> {
        Descriptors {
            fields: Self::FIELDS,
        }
    }

    /// Namespace URI owning this type's fields
    fn namespace() -> &'static str {
        Self::NAMESPACE
    }

    /// Every document name this type claims on its own element
    fn claimed_names() -> Vec<QualifiedName<'static>> {
        let mut names: Vec<_> = Self::FIELDS
            .iter()
            .flat_map(FieldDescriptor::claimed_names)
            .collect();
        names.extend(Self::CUSTOM_FIELDS.iter().map(|c| c.name.clone()));
        names
    }

    /// Check that no property or document name is claimed twice
    fn validate_mapping() -> Result<()> {
        let mut properties: Vec<&str> = Vec::new();
        let table = Self::FIELDS.iter().map(FieldDescriptor::property);
        let custom = Self::CUSTOM_FIELDS.iter().map(|c| c.property);
        for property in table.chain(custom) {
            if properties.contains(&property) {
                return Err(Error::duplicate_field(Self::TYPE_NAME, property));
            }
            properties.push(property);
        }

        // Custom fields may share one wrapper element between them, but not
        // with a table entry. A base type claims its shared wrappers once.
        let mut names: Vec<QualifiedName<'static>> = Vec::new();
        for descriptor in Self::FIELDS {
            let mut own: Vec<QualifiedName<'static>> = Vec::new();
            for name in descriptor.claimed_names() {
                if !own.iter().any(|n| n.matches(&name)) {
                    own.push(name);
                }
            }
            for name in own {
                if names.iter().any(|n| n.matches(&name)) {
                    return Err(Error::duplicate_field(Self::TYPE_NAME, &name.to_string()));
                }
                names.push(name);
            }
        }
        for custom in Self::CUSTOM_FIELDS {
            if names.iter().any(|n| n.matches(&custom.name)) {
                return Err(Error::duplicate_field(Self::TYPE_NAME, custom.property));
            }
        }
        Ok(())
    }
}

/// Object-safe view of any [`NodeType`]
pub trait Node: Any + fmt::Debug {
    /// Registered type name
    fn type_name(&self) -> &'static str;

    /// Write this node's element
    fn write_document(&self, writer: &Writer<'_>) -> Result<Document>;

    /// Recover the concrete type
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Borrow as [`Any`] for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl<T: NodeType> Node for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn write_document(&self, writer: &Writer<'_>) -> Result<Document> {
        writer.write_fields(self)
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A value collected for one property
#[derive(Debug)]
pub enum FieldValue {
    /// Raw scalar value, coerced by the constructor
    Scalar(Value),
    /// A nested node
    Single(BoxedNode),
    /// Nested nodes in document order
    List(Vec<BoxedNode>),
}

/// Values collected for one node, keyed by property
#[derive(Debug)]
pub struct FieldSet {
    type_name: &'static str,
    values: HashMap<&'static str, FieldValue>,
}

impl FieldSet {
    /// Create an empty field set for a node type
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            values: HashMap::new(),
        }
    }

    /// Node type this field set builds
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of properties with a value
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no property has a value
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether a property has a value
    pub fn contains(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    /// Add a value; a property may only be set once
    pub fn insert(&mut self, property: &'static str, value: FieldValue) -> Result<()> {
        if self.values.contains_key(property) {
            return Err(Error::duplicate_field(self.type_name, property));
        }
        self.values.insert(property, value);
        Ok(())
    }

    /// Add a raw scalar value
    pub fn insert_scalar(&mut self, property: &'static str, value: Value) -> Result<()> {
        self.insert(property, FieldValue::Scalar(value))
    }

    /// Add a nested node
    pub fn insert_node(&mut self, property: &'static str, node: BoxedNode) -> Result<()> {
        self.insert(property, FieldValue::Single(node))
    }

    /// Merge another field set into this one, rejecting collisions
    pub fn merge(&mut self, other: FieldSet) -> Result<()> {
        for (property, value) in other.values {
            self.insert(property, value)?;
        }
        Ok(())
    }

    fn take_scalar(&mut self, property: &str) -> Result<Option<Value>> {
        match self.values.remove(property) {
            None => Ok(None),
            Some(FieldValue::Scalar(Value::Null)) => Ok(None),
            Some(FieldValue::Scalar(value)) => Ok(Some(value)),
            Some(_) => Err(Error::InvalidFieldValue {
                type_name: self.type_name.to_string(),
                field: property.to_string(),
                expected: "scalar",
                value: "nested node".to_string(),
            }),
        }
    }

    /// Take an optional scalar, coerced to `V`
    pub fn optional<V: ScalarValue>(&mut self, property: &'static str) -> Result<Option<V>> {
        self.take_scalar(property)?
            .map(|value| V::from_value(&value, self.type_name, property))
            .transpose()
    }

    /// Take a required scalar, coerced to `V`
    pub fn required<V: ScalarValue>(&mut self, property: &'static str) -> Result<V> {
        self.optional(property)?
            .ok_or_else(|| Error::missing_field(self.type_name, property))
    }

    /// Take a list of scalars, coerced to `V`; absent is empty
    pub fn scalar_list<V: ScalarValue>(&mut self, property: &'static str) -> Result<Vec<V>> {
        match self.take_scalar(property)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| V::from_value(item, self.type_name, property))
                .collect(),
            Some(item) => Ok(vec![V::from_value(&item, self.type_name, property)?]),
        }
    }

    /// Take an optional nested node of type `N`
    pub fn single<N: NodeType>(&mut self, property: &'static str) -> Result<Option<N>> {
        match self.values.remove(property) {
            None => Ok(None),
            Some(FieldValue::Single(node)) => self.downcast(property, node).map(Some),
            Some(_) => Err(self.mismatch::<N>(property)),
        }
    }

    /// Take a required nested node of type `N`
    pub fn required_single<N: NodeType>(&mut self, property: &'static str) -> Result<N> {
        self.single(property)?
            .ok_or_else(|| Error::missing_field(self.type_name, property))
    }

    /// Take a list of nested nodes of type `N`; absent is empty
    pub fn list<N: NodeType>(&mut self, property: &'static str) -> Result<Vec<N>> {
        match self.values.remove(property) {
            None => Ok(Vec::new()),
            Some(FieldValue::List(nodes)) => nodes
                .into_iter()
                .map(|node| self.downcast(property, node))
                .collect(),
            Some(_) => Err(self.mismatch::<N>(property)),
        }
    }

    fn downcast<N: NodeType>(&self, property: &str, node: BoxedNode) -> Result<N> {
        node.into_any()
            .downcast::<N>()
            .map(|node| *node)
            .map_err(|_| self.mismatch::<N>(property))
    }

    fn mismatch<N: NodeType>(&self, property: &str) -> Error {
        Error::FieldTypeMismatch {
            type_name: self.type_name.to_string(),
            field: property.to_string(),
            expected: N::TYPE_NAME,
        }
    }
}

/// Primitive value stored in a scalar field
///
/// Values arriving from XML text are strings; they are coerced to the
/// declared primitive here.
pub trait ScalarValue: Sized {
    /// Coerce a document value
    fn from_value(value: &Value, type_name: &str, property: &str) -> Result<Self>;

    /// Document form of the value
    fn to_value(&self) -> Value;
}

impl ScalarValue for String {
    fn from_value(value: &Value, type_name: &str, property: &str) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(Error::invalid_value(type_name, property, "string", other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ScalarValue for f64 {
    fn from_value(value: &Value, type_name: &str, property: &str) -> Result<Self> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        // Non-finite values have no document form to write back.
        parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::invalid_value(type_name, property, "finite number", value))
    }

    fn to_value(&self) -> Value {
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl ScalarValue for i64 {
    fn from_value(value: &Value, type_name: &str, property: &str) -> Result<Self> {
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| Error::invalid_value(type_name, property, "integer", value))
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl ScalarValue for bool {
    fn from_value(value: &Value, type_name: &str, property: &str) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => match s.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(Error::invalid_value(type_name, property, "boolean", value)),
            },
            other => Err(Error::invalid_value(type_name, property, "boolean", other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

/// Document value of a present scalar
pub fn to_scalar<V: ScalarValue>(value: &V) -> Option<Value> {
    Some(value.to_value())
}

/// Document value of an optional scalar
pub fn opt_scalar<V: ScalarValue>(value: &Option<V>) -> Option<Value> {
    value.as_ref().map(ScalarValue::to_value)
}

/// Borrow an optional nested node as `&dyn Node`
pub fn opt_node<N: NodeType>(node: &Option<N>) -> Option<&dyn Node> {
    node.as_ref().map(|n| n as &dyn Node)
}

/// Borrow nested nodes as `&dyn Node`
pub fn node_list<N: NodeType>(nodes: &[N]) -> Vec<&dyn Node> {
    nodes.iter().map(|n| n as &dyn Node).collect()
}

/// Declare an enumeration stored as its canonical string
///
/// The string form of each member is given explicitly; parsing an unknown
/// string is an [`Error::InvalidEnumValue`].
#[macro_export]
macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every member in declaration order
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Canonical string form
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }

            /// Parse the canonical string form
            pub fn from_str_value(value: &str) -> Option<Self> {
                match value {
                    $( $text => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::descriptor::ScalarValue for $name {
            fn from_value(
                value: &::serde_json::Value,
                type_name: &str,
                property: &str,
            ) -> $crate::Result<Self> {
                let text = value.as_str().ok_or_else(|| {
                    $crate::Error::invalid_value(type_name, property, stringify!($name), value)
                })?;
                $name::from_str_value(text.trim())
                    .ok_or_else(|| $crate::Error::invalid_enum(text, stringify!($name), type_name))
            }

            fn to_value(&self) -> ::serde_json::Value {
                ::serde_json::Value::String(self.as_str().to_string())
            }
        }
    };
}

//! Type registry mapping type names to constructors
//!
//! Each schema version builds one [`TypeRegistry`] with every node type it
//! defines. The registry is passed explicitly to the reader and writer of a
//! document; there is no process-wide registry.

use std::collections::BTreeMap;

use crate::descriptor::{BoxedNode, Document, FieldDescriptor, NodeType, ReadFn};
use crate::error::{Error, Result};
use crate::reader::Reader;

/// Registered type and the functions needed to read and check it
#[derive(Clone, Copy)]
struct TypeEntry {
    namespace: &'static str,
    read: ReadFn,
    validate: fn() -> Result<()>,
    children: fn() -> Vec<&'static str>,
}

/// Map of registered node types by name
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: BTreeMap<&'static str, TypeEntry>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type under its type name
    ///
    /// Registering the same name again replaces the earlier entry.
    pub fn register<T: NodeType>(&mut self) {
        self.entries.insert(
            T::TYPE_NAME,
            TypeEntry {
                namespace: T::NAMESPACE,
                read: read_registered::<T>,
                validate: T::validate_mapping,
                children: child_types::<T>,
            },
        );
    }

    /// Register a node type, builder style
    ///
    /// # Example
    ///
    /// ```
    /// use bom_xml::TypeRegistry;
    /// use bom_xml::schema::gbt1205::{MIRecordReference, PartialTableReference};
    ///
    /// let registry = TypeRegistry::new()
    ///     .with::<MIRecordReference>()
    ///     .with::<PartialTableReference>();
    /// assert!(registry.contains("MIRecordReference"));
    /// ```
    pub fn with<T: NodeType>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Whether a type name is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Constructor for a type name
    pub fn get(&self, type_name: &str) -> Option<ReadFn> {
        self.entries.get(type_name).map(|entry| entry.read)
    }

    /// Namespace of a registered type
    pub fn namespace_of(&self, type_name: &str) -> Option<&'static str> {
        self.entries.get(type_name).map(|entry| entry.namespace)
    }

    /// Registered type names in sorted order
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every registered type
    ///
    /// Fails with [`Error::DuplicateFieldMapping`] when a type claims a field
    /// twice, and with [`Error::UnregisteredType`] when a descriptor refers to
    /// a type missing from this registry.
    pub fn validate(&self) -> Result<()> {
        for (name, entry) in &self.entries {
            (entry.validate)()?;
            for child in (entry.children)() {
                if !self.contains(child) {
                    return Err(Error::UnregisteredType(format!(
                        "{} (referenced by {})",
                        child, name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn read_registered<T: NodeType>(reader: &Reader<'_>, doc: &Document) -> Result<BoxedNode> {
    Ok(Box::new(reader.read_node::<T>(doc)?))
}

fn child_types<T: NodeType>() -> Vec<&'static str> {
    let table = T::FIELDS.iter().filter_map(|descriptor| match descriptor {
        FieldDescriptor::Scalar { .. } => None,
        FieldDescriptor::Single { child_type, .. } => Some(*child_type),
        FieldDescriptor::List { item_type, .. } => Some(*item_type),
        FieldDescriptor::Base { base_type, .. } => Some(*base_type),
    });
    let custom = T::CUSTOM_FIELDS.iter().filter_map(|field| field.child_type);
    table.chain(custom).collect()
}

//! Document-scoped namespace resolution
//!
//! A [`NamespaceResolver`] maps prefixes to namespace URIs for exactly one
//! document. The read path builds it from the `@xmlns` / `@xmlns:<prefix>`
//! declarations on the root mapping; the write path builds it from the target
//! schema's namespace table, never from data.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::descriptor::Document;
use crate::error::{Error, Result};
use crate::name::{ATTRIBUTE_MARKER, QualifiedName, TEXT};

/// Key of the default namespace declaration on a root mapping
pub const XMLNS: &str = "@xmlns";

/// XML Schema instance namespace, whose attributes are never mapped fields
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Prefix to namespace URI bindings for one document
///
/// The empty prefix is the default namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceResolver {
    bindings: BTreeMap<String, String>,
}

impl NamespaceResolver {
    /// Create a resolver with no bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the namespace declarations of a root mapping
    ///
    /// # Example
    ///
    /// ```
    /// use bom_xml::NamespaceResolver;
    /// use serde_json::json;
    ///
    /// let doc = json!({
    ///     "@xmlns": "urn:eco",
    ///     "@xmlns:gbt": "urn:gbt",
    /// });
    /// let resolver = NamespaceResolver::from_document(doc.as_object().unwrap());
    /// assert_eq!(resolver.uri("gbt"), Some("urn:gbt"));
    /// assert_eq!(resolver.default_namespace(), Some("urn:eco"));
    /// ```
    pub fn from_document(doc: &Document) -> Self {
        let mut resolver = Self::new();
        for (key, value) in doc {
            let Some(uri) = value.as_str() else {
                continue;
            };
            if key == XMLNS {
                resolver.bind("", uri);
            } else if let Some(prefix) = key.strip_prefix("@xmlns:") {
                resolver.bind(prefix, uri);
            }
        }
        resolver
    }

    /// Build a resolver from a static `(prefix, uri)` table
    pub fn from_table(table: &[(&str, &str)]) -> Self {
        let mut resolver = Self::new();
        for &(prefix, uri) in table {
            resolver.bind(prefix, uri);
        }
        resolver
    }

    /// Bind a prefix (empty for the default namespace) to a URI
    pub fn bind(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings.insert(prefix.into(), uri.into());
    }

    /// URI bound to a prefix
    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// URI of the default namespace
    pub fn default_namespace(&self) -> Option<&str> {
        self.uri("")
    }

    /// Whether no namespace is declared at all
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Whether a key is a namespace declaration rather than a field
    pub fn is_declaration(key: &str) -> bool {
        key == XMLNS || key.starts_with("@xmlns:")
    }

    /// Resolve a document key to a qualified name
    ///
    /// Unprefixed elements belong to the default namespace (or to none when
    /// the document has no default). Unprefixed attributes belong to the
    /// namespace of the node that owns them, given as `context_namespace`.
    pub fn resolve<'k>(
        &self,
        key: &'k str,
        context_namespace: &str,
    ) -> Result<QualifiedName<'k>> {
        if key == TEXT {
            return Ok(QualifiedName::text());
        }
        if self.is_empty() {
            return Err(Error::MissingNamespaceDeclaration(key.to_string()));
        }

        let (is_attribute, name) = match key.strip_prefix(ATTRIBUTE_MARKER) {
            Some(rest) => (true, rest),
            None => (false, key),
        };

        let (namespace, local) = match name.split_once(':') {
            Some((prefix, local)) => {
                let uri = self
                    .uri(prefix)
                    .ok_or_else(|| Error::UnknownNamespacePrefix {
                        prefix: prefix.to_string(),
                        key: key.to_string(),
                    })?;
                (uri.to_string(), local)
            }
            None if is_attribute => (context_namespace.to_string(), name),
            None => (
                self.default_namespace().unwrap_or_default().to_string(),
                name,
            ),
        };

        let local_name = if is_attribute {
            Cow::Owned(format!("{}{}", ATTRIBUTE_MARKER, local))
        } else {
            Cow::Borrowed(local)
        };
        Ok(QualifiedName::from_parts(local_name, Cow::Owned(namespace)))
    }

    /// Generate the document key for a qualified name
    ///
    /// A name in the default namespace is written bare; otherwise the prefix
    /// bound to its namespace is used (`prefix:Local`). Attributes are always
    /// written unqualified and take the namespace of their element on read,
    /// but their namespace must still be bound.
    pub fn document_key(&self, name: &QualifiedName<'_>) -> Result<String> {
        if name.is_text() {
            return Ok(TEXT.to_string());
        }
        let prefixes: Vec<&str> = self
            .bindings
            .iter()
            .filter(|(_, uri)| uri.as_str() == name.namespace())
            .map(|(prefix, _)| prefix.as_str())
            .collect();

        if prefixes.contains(&"") {
            return Ok(name.local_name().to_string());
        }
        let prefix = prefixes
            .first()
            .ok_or_else(|| Error::NamespaceNotInSchema(name.namespace().to_string()))?;

        if name.is_attribute() {
            Ok(name.local_name().to_string())
        } else {
            Ok(format!("{}:{}", prefix, name.local_name()))
        }
    }

    /// Root declarations (`@xmlns`, `@xmlns:<prefix>`) for every binding
    pub fn declarations(&self) -> Vec<(String, String)> {
        self.bindings
            .iter()
            .map(|(prefix, uri)| {
                let key = if prefix.is_empty() {
                    XMLNS.to_string()
                } else {
                    format!("{}:{}", XMLNS, prefix)
                };
                (key, uri.clone())
            })
            .collect()
    }
}

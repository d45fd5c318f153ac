//! Qualified names for elements, attributes and text content

use std::borrow::Cow;
use std::fmt;

/// Reserved local name for element text content
pub const TEXT: &str = "$";

/// Marker prefixed to the local name of attributes
pub const ATTRIBUTE_MARKER: char = '@';

/// A (local name, namespace URI) pair identifying one attribute, element or
/// text node
///
/// Attributes carry a leading `@` on the local name (`"@Unit"`); element text
/// uses the reserved local name `"$"`. Descriptor tables hold borrowed
/// `'static` names, names resolved from document keys may own their local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName<'a> {
    local_name: Cow<'a, str>,
    namespace: Cow<'a, str>,
}

impl<'a> QualifiedName<'a> {
    /// Create a name from borrowed parts
    pub const fn new(local_name: &'a str, namespace: &'a str) -> Self {
        Self {
            local_name: Cow::Borrowed(local_name),
            namespace: Cow::Borrowed(namespace),
        }
    }

    /// The text content name, which carries no namespace
    pub const fn text() -> Self {
        Self::new(TEXT, "")
    }

    pub(crate) fn from_parts(local_name: Cow<'a, str>, namespace: Cow<'a, str>) -> Self {
        Self {
            local_name,
            namespace,
        }
    }

    /// Local name, including the `@` marker for attributes
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Namespace URI
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Local name without the attribute marker
    pub fn bare_local_name(&self) -> &str {
        self.local_name
            .strip_prefix(ATTRIBUTE_MARKER)
            .unwrap_or(&self.local_name)
    }

    /// Whether this names an attribute
    pub fn is_attribute(&self) -> bool {
        self.local_name.starts_with(ATTRIBUTE_MARKER)
    }

    /// Whether this names element text content
    pub fn is_text(&self) -> bool {
        self.local_name == TEXT
    }

    /// Whether two names refer to the same document construct
    ///
    /// Text content matches text content regardless of namespace, everything
    /// else requires both components to be equal.
    pub fn matches(&self, other: &QualifiedName<'_>) -> bool {
        if self.is_text() || other.is_text() {
            return self.is_text() && other.is_text();
        }
        self.local_name == other.local_name && self.namespace == other.namespace
    }

    /// Detach the name from any borrowed data
    pub fn into_owned(self) -> QualifiedName<'static> {
        QualifiedName {
            local_name: Cow::Owned(self.local_name.into_owned()),
            namespace: Cow::Owned(self.namespace.into_owned()),
        }
    }
}

impl fmt::Display for QualifiedName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:test";

    #[test]
    fn test_equality_needs_both_components() {
        let a = QualifiedName::new("Part", NS);
        assert_eq!(a, QualifiedName::new("Part", NS));
        assert_ne!(a, QualifiedName::new("Part", "urn:other"));
        assert_ne!(a, QualifiedName::new("Material", NS));
    }

    #[test]
    fn test_attribute_marker() {
        let unit = QualifiedName::new("@Unit", NS);
        assert!(unit.is_attribute());
        assert_eq!(unit.bare_local_name(), "Unit");
        assert!(!QualifiedName::new("Unit", NS).is_attribute());
    }

    #[test]
    fn test_text_matches_regardless_of_namespace() {
        let text = QualifiedName::new(TEXT, NS);
        assert!(text.is_text());
        assert!(text.matches(&QualifiedName::text()));
        assert!(!text.matches(&QualifiedName::new("Value", NS)));
    }

    #[test]
    fn test_display() {
        assert_eq!(QualifiedName::new("dbKey", NS).to_string(), "{urn:test}dbKey");
        assert_eq!(QualifiedName::text().to_string(), "$");
    }
}

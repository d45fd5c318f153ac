//! Error types for BoM marshaling
//!
//! Every failure of a document conversion is reported through [`Error`]. Errors
//! are never recovered inside the engine: the first one aborts the whole
//! conversion and no partial result is returned.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: Type registry and field value errors
//! - **E2xxx**: Namespace resolution errors
//! - **E3xxx**: Field mapping and document shape errors
//! - **E4xxx**: Schema selection errors
//! - **E5xxx**: XML text layer errors
//! - **E6xxx**: I/O errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: Type not registered in the active schema
//! - `E1002`: Required field missing from the document
//! - `E1003`: Enumeration value not recognised
//! - `E2001`: Namespace prefix not declared on the document root
//! - `E2003`: Namespace not part of the target schema
//! - `E3001`: Field claimed twice by one node type
//! - `E3002`: List container in an unexpected shape
//! - `E4001`: Root namespace does not select a supported schema

use thiserror::Error;

/// Result type for BoM marshaling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when reading or writing BoM documents
#[derive(Error, Debug)]
pub enum Error {
    /// A type name was requested that the active schema does not register
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - Writing a node of one schema version with another version's writer
    /// - A descriptor table naming a child type that was never registered
    #[error("[E1001] Type '{0}' is not registered in the active schema")]
    UnregisteredType(String),

    /// A required field is absent from the document
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Element omitted from hand-authored XML
    /// - Element written in the wrong namespace, so it does not match
    ///
    /// **Suggestions**:
    /// - Check the element prefix against the declarations on the root element
    #[error("[E1002] '{type_name}' is missing required field '{field}'")]
    MissingRequiredField {
        /// Node type being constructed
        type_name: String,
        /// Property that had no value
        field: String,
    },

    /// A string value does not name any member of its enumeration
    ///
    /// **Error Code**: E1003
    ///
    /// **Common Causes**:
    /// - Misspelled enumeration value
    /// - Value from a newer schema version
    #[error("[E1003] Invalid {enum_name} value '{value}' in '{type_name}'")]
    InvalidEnumValue {
        /// Offending value
        value: String,
        /// Enumeration the value was parsed as
        enum_name: String,
        /// Node type owning the field
        type_name: String,
    },

    /// A scalar value cannot be coerced to the primitive type of its property
    ///
    /// **Error Code**: E1004
    ///
    /// **Common Causes**:
    /// - Non-numeric text in a numeric element
    /// - Nested element where a simple value is expected
    ///
    /// **Suggestions**:
    /// - Verify numeric values use proper format (e.g., "1.5" not "1,5")
    #[error("[E1004] Invalid value for '{type_name}.{field}': expected {expected}, got {value}")]
    InvalidFieldValue {
        /// Node type owning the field
        type_name: String,
        /// Property being coerced
        field: String,
        /// Expected primitive type
        expected: &'static str,
        /// Offending value, as JSON text
        value: String,
    },

    /// A nested node does not have the concrete type its property expects
    ///
    /// **Error Code**: E1005
    ///
    /// **Common Causes**:
    /// - A descriptor table naming the wrong child type
    #[error("[E1005] Field '{type_name}.{field}' expected node type '{expected}'")]
    FieldTypeMismatch {
        /// Node type owning the field
        type_name: String,
        /// Property holding the nested node
        field: String,
        /// Expected node type
        expected: &'static str,
    },

    /// A document key uses a prefix not declared on the document root
    ///
    /// **Error Code**: E2001
    ///
    /// **Suggestions**:
    /// - Add the matching `xmlns:<prefix>` declaration to the root element
    #[error("[E2001] Unknown namespace prefix '{prefix}' in key '{key}'")]
    UnknownNamespacePrefix {
        /// Undeclared prefix
        prefix: String,
        /// Document key containing the prefix
        key: String,
    },

    /// A namespaced lookup was attempted on a document without declarations
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Root element without any `xmlns` attribute
    #[error("[E2002] Document declares no namespaces, cannot resolve '{0}'")]
    MissingNamespaceDeclaration(String),

    /// A namespace has no prefix in the target schema's namespace table
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Writing a node type that belongs to a different schema version
    #[error("[E2003] Namespace '{0}' is not declared by the target schema")]
    NamespaceNotInSchema(String),

    /// A node type claims one field in more than one place
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - A property listed both in a descriptor table and in a custom hook
    #[error("[E3001] Field '{field}' of '{type_name}' is mapped more than once")]
    DuplicateFieldMapping {
        /// Node type with the conflicting mapping
        type_name: String,
        /// Property or document name claimed twice
        field: String,
    },

    /// A list container is present but not a wrapper of items
    ///
    /// **Error Code**: E3002
    ///
    /// **Common Causes**:
    /// - Items placed directly under the parent without their container
    /// - Container given as text
    #[error("[E3002] Container '{container}' of '{type_name}' is malformed")]
    MalformedContainerShape {
        /// Node type owning the list
        type_name: String,
        /// Document key of the container
        container: String,
    },

    /// A document key is not mapped by the node type (strict mode only)
    ///
    /// **Error Code**: E3003
    ///
    /// **Common Causes**:
    /// - A field only defined by a newer schema version
    /// - Misspelled element name
    ///
    /// **Suggestions**:
    /// - Use lenient handling to ignore unmapped fields
    #[error("[E3003] Field '{key}' is not mapped by '{type_name}'")]
    UnmappedField {
        /// Node type being read
        type_name: String,
        /// Unclaimed document key
        key: String,
    },

    /// The root element's namespace does not select a supported schema
    ///
    /// **Error Code**: E4001
    ///
    /// **Suggestions**:
    /// - Check that the configuration enables the document's schema version
    #[error("[E4001] Unsupported BoM schema namespace '{0}'")]
    UnsupportedSchema(String),

    /// XML parsing error
    ///
    /// **Error Code**: E5001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax
    /// - Unclosed tags
    #[cfg(feature = "xml")]
    #[error("[E5001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid XML structure
    ///
    /// **Error Code**: E5002
    ///
    /// **Common Causes**:
    /// - DTD declarations
    /// - Mismatched or missing root element
    #[error("[E5002] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// XML writing error
    ///
    /// **Error Code**: E5003
    #[error("[E5003] XML writing error: {0}")]
    XmlWrite(String),

    /// I/O error while reading a BoM file
    ///
    /// **Error Code**: E6001
    ///
    /// **Common Causes**:
    /// - File not found
    /// - Permission denied
    #[error("[E6001] I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a MissingRequiredField error
    pub fn missing_field(type_name: &str, field: &str) -> Self {
        Error::MissingRequiredField {
            type_name: type_name.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an InvalidEnumValue error
    ///
    /// # Example
    /// ```
    /// use bom_xml::Error;
    ///
    /// let err = Error::invalid_enum("NotARealCategory", "Category", "Substance");
    /// assert!(err.to_string().contains("NotARealCategory"));
    /// ```
    pub fn invalid_enum(value: &str, enum_name: &str, type_name: &str) -> Self {
        Error::InvalidEnumValue {
            value: value.to_string(),
            enum_name: enum_name.to_string(),
            type_name: type_name.to_string(),
        }
    }

    /// Create an InvalidFieldValue error for a value of the wrong primitive shape
    pub fn invalid_value(
        type_name: &str,
        field: &str,
        expected: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        Error::InvalidFieldValue {
            type_name: type_name.to_string(),
            field: field.to_string(),
            expected,
            value: value.to_string(),
        }
    }

    /// Create a DuplicateFieldMapping error
    pub fn duplicate_field(type_name: &str, field: &str) -> Self {
        Error::DuplicateFieldMapping {
            type_name: type_name.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an XmlWrite error
    pub fn xml_write(message: String) -> Self {
        Error::XmlWrite(message)
    }
}

//! Builders for record and attribute references
//!
//! A reference must be identified in exactly one way. The builders encode the
//! allowed combinations in their type: `build()` only exists once an
//! identifier has been chosen, and an attribute given by name must also name
//! its table.
//!
//! # Example
//!
//! ```
//! use bom_xml::builder::{AttributeReferenceBuilder, RecordReferenceBuilder};
//!
//! let attribute = AttributeReferenceBuilder::new("MI_Training")
//!     .with_attribute_name("Material ID", false)
//!     .with_table_name("MaterialUniverse")
//!     .build();
//!
//! let reference = RecordReferenceBuilder::new("MI_Training")
//!     .with_lookup_value("steel-1", attribute)
//!     .build();
//! assert_eq!(reference.lookup_value.as_deref(), Some("steel-1"));
//! ```

use std::marker::PhantomData;

use crate::schema::gbt1205::{
    MIAttributeReference, MIRecordReference, PartialTableReference, PseudoAttribute,
};

/// Builder state: no identifier chosen yet
#[derive(Debug)]
pub struct Unidentified;

/// Builder state: attribute given by name, table still required
#[derive(Debug)]
pub struct NeedsTable;

/// Builder state: ready to build
#[derive(Debug)]
pub struct Identified;

/// Builds an [`MIRecordReference`] with one valid identifying combination
#[derive(Debug)]
pub struct RecordReferenceBuilder<S = Unidentified> {
    reference: MIRecordReference,
    state: PhantomData<S>,
}

impl RecordReferenceBuilder<Unidentified> {
    /// Start a reference to a record in database `db_key`
    pub fn new(db_key: impl Into<String>) -> Self {
        Self {
            reference: MIRecordReference::new(db_key),
            state: PhantomData,
        }
    }

    /// Tag the reference with an identifier that is echoed back unchanged
    pub fn with_record_uid(mut self, record_uid: impl Into<String>) -> Self {
        self.reference.record_uid = Some(record_uid.into());
        self
    }

    /// Identify the record by its history identity
    ///
    /// Without a version number the latest released version is used.
    pub fn with_record_history_id(
        mut self,
        record_history_id: i64,
        record_version_number: Option<i64>,
    ) -> RecordReferenceBuilder<Identified> {
        self.reference.record_history_identity = Some(record_history_id);
        self.reference.record_version_number = record_version_number;
        self.identified()
    }

    /// Identify one record version by its GUID
    pub fn with_record_guid(
        mut self,
        record_guid: impl Into<String>,
    ) -> RecordReferenceBuilder<Identified> {
        self.reference.record_guid = Some(record_guid.into());
        self.identified()
    }

    /// Identify a record history by its GUID, resolving to the latest
    /// released version
    pub fn with_record_history_guid(
        mut self,
        record_history_guid: impl Into<String>,
    ) -> RecordReferenceBuilder<Identified> {
        self.reference.record_history_guid = Some(record_history_guid.into());
        self.identified()
    }

    /// Identify the record by a unique value of a short-text attribute
    pub fn with_lookup_value(
        mut self,
        lookup_value: impl Into<String>,
        lookup_attribute_reference: MIAttributeReference,
    ) -> RecordReferenceBuilder<Identified> {
        self.reference.lookup_value = Some(lookup_value.into());
        self.reference.lookup_attribute_reference = Some(lookup_attribute_reference);
        self.identified()
    }

    fn identified(self) -> RecordReferenceBuilder<Identified> {
        RecordReferenceBuilder {
            reference: self.reference,
            state: PhantomData,
        }
    }
}

impl RecordReferenceBuilder<Identified> {
    /// Finish the reference
    pub fn build(self) -> MIRecordReference {
        self.reference
    }
}

/// Builds an [`MIAttributeReference`] with one valid identifying combination
#[derive(Debug)]
pub struct AttributeReferenceBuilder<S = Unidentified> {
    reference: MIAttributeReference,
    state: PhantomData<S>,
}

impl<S> AttributeReferenceBuilder<S> {
    fn into_state<T>(self) -> AttributeReferenceBuilder<T> {
        AttributeReferenceBuilder {
            reference: self.reference,
            state: PhantomData,
        }
    }
}

impl AttributeReferenceBuilder<Unidentified> {
    /// Start a reference to an attribute in database `db_key`
    pub fn new(db_key: impl Into<String>) -> Self {
        Self {
            reference: MIAttributeReference {
                db_key: db_key.into(),
                ..MIAttributeReference::default()
            },
            state: PhantomData,
        }
    }

    /// Identify the attribute by its identity
    pub fn with_attribute_identity(
        mut self,
        attribute_identity: i64,
    ) -> AttributeReferenceBuilder<Identified> {
        self.reference.attribute_identity = Some(attribute_identity);
        self.into_state()
    }

    /// Reference a pseudo-attribute
    pub fn as_pseudo_attribute(
        mut self,
        pseudo_attribute: PseudoAttribute,
    ) -> AttributeReferenceBuilder<Identified> {
        self.reference.pseudo = Some(pseudo_attribute);
        self.into_state()
    }

    /// Identify the attribute by name; the table must be given next
    pub fn with_attribute_name(
        mut self,
        attribute_name: impl Into<String>,
        is_standard_name: bool,
    ) -> AttributeReferenceBuilder<NeedsTable> {
        self.reference.attribute_name = Some(attribute_name.into());
        self.reference.is_standard = Some(is_standard_name);
        self.into_state()
    }
}

impl AttributeReferenceBuilder<NeedsTable> {
    /// Name the table by its name
    pub fn with_table_name(
        self,
        table_name: impl Into<String>,
    ) -> AttributeReferenceBuilder<Identified> {
        self.with_table(PartialTableReference {
            table_name: Some(table_name.into()),
            ..PartialTableReference::default()
        })
    }

    /// Name the table by its identity
    pub fn with_table_identity(
        self,
        table_identity: i64,
    ) -> AttributeReferenceBuilder<Identified> {
        self.with_table(PartialTableReference {
            table_identity: Some(table_identity),
            ..PartialTableReference::default()
        })
    }

    /// Name the table by its GUID
    pub fn with_table_guid(
        self,
        table_guid: impl Into<String>,
    ) -> AttributeReferenceBuilder<Identified> {
        self.with_table(PartialTableReference {
            table_guid: Some(table_guid.into()),
            ..PartialTableReference::default()
        })
    }

    fn with_table(mut self, table: PartialTableReference) -> AttributeReferenceBuilder<Identified> {
        self.reference.table_reference = Some(table);
        self.into_state()
    }
}

impl AttributeReferenceBuilder<Identified> {
    /// Finish the reference
    pub fn build(self) -> MIAttributeReference {
        self.reference
    }
}

//! Record reference identifiers and their priority

mod common;

use bom_xml::builder::{AttributeReferenceBuilder, RecordReferenceBuilder};
use bom_xml::schema::eco2301::{BillOfMaterials, Part};
use bom_xml::schema::gbt1205::{MIRecordReference, PseudoAttribute, RecordIdentifier};
use bom_xml::{Bom, BomHandler, HandlerConfig};
use common::*;
use serde_json::{Value, json};

fn handler() -> BomHandler {
    BomHandler::new(HandlerConfig::default()).unwrap()
}

/// Write a part holding `reference` and return the written reference
fn write_reference(reference: MIRecordReference) -> Value {
    let mut part = Part::new("P1");
    part.mi_part_reference = Some(reference);
    let bom = Bom::from(BillOfMaterials::new(vec![part]));
    let mut written = Value::Object(handler().write_document(&bom).unwrap());
    written["Components"]["Part"][0]["MIPartReference"].take()
}

fn read_reference(reference: Value) -> MIRecordReference {
    let mut fixture = minimal_eco2301();
    fixture["Components"]["Part"][0]["MIPartReference"] = reference;
    match handler().read_document(&document(fixture)).unwrap() {
        Bom::Eco2301(mut bom) => bom.components.remove(0).mi_part_reference.unwrap(),
        other => panic!("unexpected version {}", other.version()),
    }
}

#[test]
fn test_identity_wins_over_guid() {
    let reference = MIRecordReference {
        record_history_identity: Some(42),
        record_guid: Some("G".to_string()),
        ..MIRecordReference::new("DB")
    };
    assert_eq!(
        write_reference(reference),
        json!({"gbt:dbKey": "DB", "gbt:identity": {"gbt:recordHistoryIdentity": 42}})
    );
}

#[test]
fn test_priority_order() {
    let all = MIRecordReference {
        record_history_identity: Some(1),
        record_guid: Some("G".to_string()),
        record_history_guid: Some("H".to_string()),
        lookup_value: Some("L".to_string()),
        ..MIRecordReference::new("DB")
    };
    let written = write_reference(all.clone());
    assert!(written.get("gbt:identity").is_some());
    assert!(written.get("gbt:recordGUID").is_none());

    let without_identity = MIRecordReference {
        record_history_identity: None,
        ..all.clone()
    };
    let written = write_reference(without_identity.clone());
    assert_eq!(written["gbt:recordGUID"], json!("G"));
    assert!(written.get("gbt:recordHistoryGUID").is_none());

    let history_guid_only = MIRecordReference {
        record_guid: None,
        ..without_identity
    };
    let written = write_reference(history_guid_only);
    assert_eq!(written["gbt:recordHistoryGUID"], json!("H"));
    assert!(written.get("gbt:lookupValue").is_none());
}

#[test]
fn test_read_guid_only() {
    let reference = read_reference(json!({"gbt:dbKey": "DB", "gbt:recordGUID": "G"}));
    assert_eq!(reference.record_history_identity, None);
    assert_eq!(reference.identifier(), Some(RecordIdentifier::Guid("G")));
}

#[test]
fn test_reading_keeps_every_identifier() {
    let reference = read_reference(json!({
        "gbt:dbKey": "DB",
        "gbt:identity": {"gbt:recordHistoryIdentity": 42},
        "gbt:recordGUID": "G"
    }));
    assert_eq!(reference.record_history_identity, Some(42));
    assert_eq!(reference.record_guid.as_deref(), Some("G"));
}

#[test]
fn test_identity_given_as_text() {
    let reference = read_reference(json!({
        "gbt:dbKey": "DB",
        "gbt:identity": {"gbt:recordHistoryIdentity": "42", "gbt:version": "7"}
    }));
    assert_eq!(
        reference.identifier(),
        Some(RecordIdentifier::HistoryIdentity {
            identity: Some(42),
            version: Some(7)
        })
    );
}

#[test]
fn test_lookup_reference_round_trip() {
    let attribute = AttributeReferenceBuilder::new("DB")
        .with_attribute_name("Material ID", false)
        .with_table_name("MaterialUniverse")
        .build();
    let reference = RecordReferenceBuilder::new("DB")
        .with_record_uid("uid-9")
        .with_lookup_value("steel-1", attribute)
        .build();

    let written = write_reference(reference.clone());
    assert_eq!(
        written,
        json!({
            "gbt:dbKey": "DB",
            "@recordUID": "uid-9",
            "gbt:lookupValue": {
                "gbt:attributeReference": {
                    "gbt:dbKey": "DB",
                    "gbt:name": {
                        "gbt:table": {"gbt:tableName": "MaterialUniverse"},
                        "gbt:attributeName": "Material ID",
                        "@isStandard": false
                    }
                },
                "gbt:attributeValue": "steel-1"
            }
        })
    );
    assert_eq!(read_reference(written), reference);
}

#[test]
fn test_pseudo_attribute_lookup() {
    let attribute = AttributeReferenceBuilder::new("DB")
        .as_pseudo_attribute(PseudoAttribute::ShortName)
        .build();
    let reference = RecordReferenceBuilder::new("DB")
        .with_lookup_value("S-1", attribute)
        .build();
    let written = write_reference(reference.clone());
    assert_eq!(
        written["gbt:lookupValue"]["gbt:attributeReference"]["gbt:name"]["gbt:pseudo"],
        json!("shortName")
    );
    assert_eq!(read_reference(written), reference);
}

#[test]
fn test_unknown_pseudo_attribute() {
    let mut fixture = minimal_eco2301();
    fixture["Components"]["Part"][0]["MIPartReference"] = json!({
        "gbt:dbKey": "DB",
        "gbt:lookupValue": {
            "gbt:attributeReference": {
                "gbt:dbKey": "DB",
                "gbt:name": {"gbt:pseudo": "colour"}
            },
            "gbt:attributeValue": "red"
        }
    });
    let err = handler().read_document(&document(fixture)).unwrap_err();
    assert!(matches!(err, bom_xml::Error::InvalidEnumValue { ref value, .. } if value == "colour"));
}

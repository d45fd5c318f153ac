//! Schema version selection and the 25/05 extended record reference

mod common;

use bom_xml::schema::eco2505::{self, ExtendedMIRecordReference};
use bom_xml::schema::gbt1205::MIRecordReference;
use bom_xml::schema::{Schema, detect_schema};
use bom_xml::{Bom, BomHandler, Error, HandlerConfig, SchemaVersion};
use common::*;
use serde_json::{Value, json};

fn equivalent_fixture(namespace: &str) -> Value {
    let mut fixture = minimal_eco2301();
    fixture["@xmlns"] = json!(namespace);
    fixture["Components"]["Part"][0]["MIPartReference"] = json!({
        "gbt:dbKey": "DB",
        "gbt:recordGUID": "G-main",
        "EquivalentReferences": {
            "EquivalentReference": [
                guid_reference("G-first"),
                guid_reference("G-second")
            ]
        }
    });
    fixture
}

#[test]
fn test_equivalent_references_round_trip_in_order() {
    let handler = BomHandler::new(HandlerConfig::default()).unwrap();
    let fixture = equivalent_fixture(ECO2505);
    let bom = handler.read_document(&document(fixture.clone())).unwrap();

    let Bom::Eco2505(ref inner) = bom else {
        panic!("expected a 25/05 BoM");
    };
    let reference = inner.components[0].mi_part_reference.as_ref().unwrap();
    assert_eq!(reference.record_guid.as_deref(), Some("G-main"));
    let guids: Vec<_> = reference
        .equivalent_references
        .iter()
        .map(|r| r.record_guid.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(guids, vec!["G-first", "G-second"]);

    let written = handler.write_document(&bom).unwrap();
    assert_eq!(Value::Object(written), fixture);
}

#[test]
fn test_older_schema_rejects_equivalent_references() {
    let handler = BomHandler::new(HandlerConfig::default()).unwrap();
    let err = handler
        .read_document(&document(equivalent_fixture(ECO2301)))
        .unwrap_err();
    assert!(
        matches!(err, Error::UnmappedField { ref key, ref type_name } if key == "EquivalentReferences" && type_name == "MIRecordReference")
    );
}

#[test]
fn test_lenient_older_schema_drops_equivalent_references() {
    let handler = BomHandler::new(HandlerConfig::default().strict(false)).unwrap();
    let bom = handler
        .read_document(&document(equivalent_fixture(ECO2301)))
        .unwrap();
    let Bom::Eco2301(ref inner) = bom else {
        panic!("expected a 23/01 BoM");
    };
    let reference = inner.components[0].mi_part_reference.as_ref().unwrap();
    assert_eq!(reference.record_guid.as_deref(), Some("G-main"));

    let written = Value::Object(handler.write_document(&bom).unwrap());
    assert!(written["Components"]["Part"][0]["MIPartReference"]
        .get("EquivalentReferences")
        .is_none());
}

#[test]
fn test_versions_are_not_mixed() {
    let handler = BomHandler::new(HandlerConfig::default()).unwrap();
    let reference = ExtendedMIRecordReference::from(MIRecordReference::new("DB"));
    let mut part = eco2505::Part::new("P1");
    part.mi_part_reference = Some(reference);
    let bom = Bom::from(eco2505::BillOfMaterials::new(vec![part]));

    // A 25/05 node cannot be written with the 23/01 registry.
    let eco2301 = Schema::new(SchemaVersion::Eco2301).unwrap();
    let err = eco2301.writer().write_root(bom.as_node()).unwrap_err();
    assert!(matches!(
        err,
        Error::NamespaceNotInSchema(_) | Error::UnregisteredType(_)
    ));

    let written = handler.write_document(&bom).unwrap();
    assert_eq!(detect_schema(&written).unwrap(), SchemaVersion::Eco2505);
}

#[test]
fn test_unknown_root_namespace_fails_before_mapping() {
    let handler = BomHandler::new(HandlerConfig::default()).unwrap();
    let doc = json!({
        "@xmlns": "http://www.grantadesign.com/99/01/BillOfMaterialsEco",
        "Components": {"Part": [{"NotAPartField": 1}]}
    });
    let err = handler.read_document(&document(doc)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedSchema(ref ns) if ns.contains("99/01")));
}

#[test]
fn test_configured_versions_only() {
    let handler =
        BomHandler::new(HandlerConfig::new().with_schema(SchemaVersion::Eco2301)).unwrap();
    assert!(handler.read_document(&document(minimal_eco2301())).is_ok());
    let err = handler
        .read_document(&document(equivalent_fixture(ECO2505)))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedSchema(ref ns) if ns == ECO2505));
}

#[test]
fn test_process_location_only_in_new_version() {
    let handler = BomHandler::new(HandlerConfig::default()).unwrap();
    let mut fixture = full_eco2301();
    fixture["Components"]["Part"][0]["Processes"]["Process"][0]["Location"] =
        json!({"Identity": "weld-shop"});
    let err = handler.read_document(&document(fixture)).unwrap_err();
    assert!(matches!(err, Error::UnmappedField { ref key, .. } if key == "Location"));
}

#[test]
fn test_handler_builds_every_schema() {
    let handler = BomHandler::with_all_schemas().unwrap();
    for version in SchemaVersion::ALL {
        assert_eq!(handler.schema(version).unwrap().version(), version);
    }
}

//! Conversion failures and their error codes

mod common;

use bom_xml::schema::eco2301::Part;
use bom_xml::{BomHandler, Error, HandlerConfig, Reader, TypeRegistry};
use common::*;
use serde_json::json;

fn handler() -> BomHandler {
    BomHandler::new(HandlerConfig::default()).unwrap()
}

fn substance_fixture(category: &str) -> serde_json::Value {
    let mut fixture = minimal_eco2301();
    fixture["Components"]["Part"][0]["Substances"] = json!({
        "Substance": [{
            "MISubstanceReference": guid_reference("G-lead"),
            "Category": category
        }]
    });
    fixture
}

#[test]
fn test_invalid_category() {
    let err = handler()
        .read_document(&document(substance_fixture("NotARealCategory")))
        .unwrap_err();
    match err {
        Error::InvalidEnumValue {
            ref value,
            ref type_name,
            ..
        } => {
            assert_eq!(value, "NotARealCategory");
            assert_eq!(type_name, "Substance");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.to_string().starts_with("[E1003]"));
}

#[test]
fn test_valid_category() {
    assert!(handler()
        .read_document(&document(substance_fixture("UsedInCoating")))
        .is_ok());
}

#[test]
fn test_missing_required_field() {
    let mut fixture = minimal_eco2301();
    fixture["Components"]["Part"][0] = json!({"Name": "nameless"});
    let err = handler().read_document(&document(fixture)).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingRequiredField { ref type_name, ref field } if type_name == "Part" && field == "part_number"
    ));
    assert!(err.to_string().starts_with("[E1002]"));
}

#[test]
fn test_missing_required_child() {
    let mut fixture = minimal_eco2301();
    fixture["Components"]["Part"][0]["EndOfLifeFates"] = json!({
        "EndOfLifeFate": [{"Fraction": 0.5}]
    });
    let err = handler().read_document(&document(fixture)).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingRequiredField { ref field, .. } if field == "mi_end_of_life_reference"
    ));
}

#[test]
fn test_malformed_container() {
    let mut fixture = minimal_eco2301();
    fixture["Components"]["Part"][0]["Materials"] = json!(["not", "a", "container"]);
    let err = handler().read_document(&document(fixture)).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedContainerShape { ref type_name, .. } if type_name == "Part"
    ));
    assert!(err.to_string().starts_with("[E3002]"));
}

#[test]
fn test_invalid_number() {
    let mut fixture = minimal_eco2301();
    fixture["Components"]["Part"][0]["Quantity"] = json!({"$": "lots", "@Unit": "kg"});
    let err = handler().read_document(&document(fixture)).unwrap_err();
    assert!(matches!(err, Error::InvalidFieldValue { ref type_name, .. } if type_name == "UnittedValue"));
}

#[test]
fn test_unregistered_type() {
    let registry = TypeRegistry::new();
    let root = document(minimal_eco2301());
    let reader = Reader::for_document(&registry, &root);
    let err = reader.create_typed::<Part>(&root).unwrap_err();
    assert!(matches!(err, Error::UnregisteredType(ref name) if name == "Part"));
    assert!(err.to_string().starts_with("[E1001]"));
}

#[test]
fn test_unmapped_field_strict_and_lenient() {
    let mut fixture = minimal_eco2301();
    fixture["Components"]["Part"][0]["Colour"] = json!("red");

    let err = handler().read_document(&document(fixture.clone())).unwrap_err();
    assert!(matches!(err, Error::UnmappedField { ref key, .. } if key == "Colour"));
    assert!(err.to_string().starts_with("[E3003]"));

    let lenient = BomHandler::new(HandlerConfig::default().strict(false)).unwrap();
    assert_eq!(
        lenient.read_document(&document(fixture)).unwrap(),
        handler().read_document(&document(minimal_eco2301())).unwrap()
    );
}

#[test]
fn test_schema_location_is_ignored() {
    let mut fixture = minimal_eco2301();
    fixture["@xmlns:xsi"] = json!("http://www.w3.org/2001/XMLSchema-instance");
    fixture["@xsi:schemaLocation"] = json!(format!("{} BillOfMaterialsEco2301.xsd", ECO2301));
    assert!(handler().read_document(&document(fixture)).is_ok());
}

//! Shared document fixtures for integration tests

#![allow(dead_code)]

use bom_xml::Document;
use serde_json::{Value, json};

pub const ECO2301: &str = "http://www.grantadesign.com/23/01/BillOfMaterialsEco";
pub const ECO2505: &str = "http://www.grantadesign.com/25/05/BillOfMaterialsEco";
pub const GBT: &str = "http://www.grantadesign.com/12/05/GrantaBaseTypes";

/// Unwrap a `json!` object literal into a document
pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture is not an object: {}", other),
    }
}

/// Record reference by GUID, in the shape the writer produces
pub fn guid_reference(guid: &str) -> Value {
    json!({"gbt:dbKey": "DB", "gbt:recordGUID": guid})
}

/// The smallest useful 23/01 document: one part `P1` in database `DB`
pub fn minimal_eco2301() -> Value {
    json!({
        "@xmlns": ECO2301,
        "@xmlns:gbt": GBT,
        "Components": {
            "Part": [{
                "PartNumber": "P1",
                "MIPartReference": {
                    "gbt:dbKey": "DB",
                    "gbt:identity": {"gbt:recordHistoryIdentity": 1}
                }
            }]
        }
    })
}

/// Part content shared by both schema versions
fn full_part() -> Value {
    json!({
        "@id": "p1",
        "Quantity": {"$": 2.0, "@Unit": "Each"},
        "MassPerUom": {"$": 1.5, "@Unit": "kg"},
        "MIPartReference": {
            "@recordUID": "u-1",
            "gbt:dbKey": "DB",
            "gbt:identity": {"gbt:recordHistoryIdentity": 12, "gbt:version": 3}
        },
        "PartNumber": "P1",
        "Name": "Housing",
        "Components": {
            "Part": [
                {"PartNumber": "P1.1", "NonMIPartReference": "ERP-7"},
                {"PartNumber": "P1.2", "ExternalIdentity": "cad-42"}
            ]
        },
        "Specifications": {
            "Specification": [{
                "MISpecificationReference": guid_reference("G-spec"),
                "Quantity": {"$": 0.5, "@Unit": "m^2"}
            }]
        },
        "Materials": {
            "Material": [{
                "@id": "m1",
                "MIMaterialReference": {"gbt:dbKey": "DB", "gbt:recordHistoryGUID": "H-steel"},
                "Percentage": 80.0,
                "Processes": {
                    "Process": [{
                        "MIProcessReference": guid_reference("G-cast"),
                        "DimensionType": "Mass",
                        "Percentage": 100.0
                    }]
                },
                "RecycleContent": {"Percentage": 25.0}
            }]
        },
        "Substances": {
            "Substance": [{
                "MISubstanceReference": guid_reference("G-lead"),
                "Percentage": 0.1,
                "Category": "Incorporated"
            }]
        },
        "Processes": {
            "Process": [{
                "MIProcessReference": guid_reference("G-weld"),
                "DimensionType": "Length",
                "Quantity": {"$": 1.2, "@Unit": "m"}
            }]
        },
        "RohsExemptions": {"RohsExemption": ["6(c)", "7(a)"]},
        "EndOfLifeFates": {
            "EndOfLifeFate": [{
                "MIEndOfLifeReference": guid_reference("G-landfill"),
                "Fraction": 0.2
            }]
        }
    })
}

fn full_bom(namespace: &str, part: Value) -> Value {
    json!({
        "@xmlns": namespace,
        "@xmlns:gbt": GBT,
        "@id": "bom-1",
        "Components": {"Part": [part]},
        "TransportPhase": {
            "TransportStage": [{
                "@id": "t1",
                "Name": "Ship",
                "MITransportReference": guid_reference("G-ship"),
                "Distance": {"$": 1000.0, "@Unit": "km"}
            }]
        },
        "UsePhase": {
            "ProductLifeSpan": {
                "DurationYears": 5.0,
                "FunctionalUnitDescription": "year of service",
                "Utility": {"Utility": 1.2}
            },
            "ElectricityMix": {
                "MIRegionReference": guid_reference("G-europe"),
                "PercentageFossilFuels": 40.0
            },
            "StaticMode": {
                "MIEnergyConversionReference": guid_reference("G-electric"),
                "PowerRating": {"$": 100.0, "@Unit": "W"},
                "Usage": {"DaysUsedPerYear": 200.0, "HoursUsedPerDay": 8.0}
            }
        },
        "Location": {"Name": "Factory", "Identity": "loc-1"},
        "Notes": {"ProductName": "Widget", "Notes": "Sample"}
    })
}

/// A 23/01 document exercising every node type
pub fn full_eco2301() -> Value {
    full_bom(ECO2301, full_part())
}

/// A 25/05 document exercising every node type and the fields added in 25/05
pub fn full_eco2505() -> Value {
    let mut part = full_part();
    part["MIPartReference"]["EquivalentReferences"] = json!({
        "EquivalentReference": [
            guid_reference("G-equivalent-1"),
            {"gbt:dbKey": "OTHER", "gbt:recordHistoryGUID": "H-equivalent-2"}
        ]
    });
    part["Location"] = json!({"Name": "Plant 2"});
    part["TransportPhase"] = json!({
        "TransportStage": [{
            "Name": "Truck",
            "MITransportReference": guid_reference("G-truck"),
            "Distance": {"$": 250.0, "@Unit": "km"}
        }]
    });
    part["Processes"]["Process"][0]["Location"] = json!({"Identity": "weld-shop"});
    full_bom(ECO2505, part)
}

/// A 23/01 document whose parts nest `depth` levels below the top-level part
pub fn nested_eco2301(depth: usize) -> Value {
    let mut part = json!({"PartNumber": format!("P{}", depth)});
    for level in (0..depth).rev() {
        part = json!({
            "PartNumber": format!("P{}", level),
            "Components": {"Part": [part]}
        });
    }
    json!({
        "@xmlns": ECO2301,
        "@xmlns:gbt": GBT,
        "Components": {"Part": [part]}
    })
}

/// Number of part levels below the first top-level part
pub fn part_depth(part: &bom_xml::schema::eco2301::Part) -> usize {
    let mut depth = 0;
    let mut current = part;
    while let Some(child) = current.components.first() {
        depth += 1;
        current = child;
    }
    depth
}

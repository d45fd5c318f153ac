//! Loading and dumping BoM documents as XML text

#![cfg(feature = "xml")]

mod common;

use bom_xml::xml::{parse_document, write_document};
use bom_xml::schema::eco2301::{BillOfMaterials, Part};
use bom_xml::{Bom, BomHandler, Error, HandlerConfig, SchemaVersion};
use common::*;
use serde_json::Value;
use std::io::Write;

const SAMPLE_2301: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<BillOfMaterials xmlns="http://www.grantadesign.com/23/01/BillOfMaterialsEco"
                 xmlns:gbt="http://www.grantadesign.com/12/05/GrantaBaseTypes"
                 xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                 xsi:schemaLocation="http://www.grantadesign.com/23/01/BillOfMaterialsEco BillOfMaterialsEco2301.xsd"
                 id="bom-1">
  <Components>
    <Part id="p1">
      <Quantity Unit="Each">2</Quantity>
      <MIPartReference recordUID="u-1">
        <gbt:dbKey>MI_Restricted_Substances</gbt:dbKey>
        <gbt:identity>
          <gbt:recordHistoryIdentity>12</gbt:recordHistoryIdentity>
        </gbt:identity>
      </MIPartReference>
      <PartNumber>P&amp;1</PartNumber>
      <Components>
        <Part><PartNumber>P1.1</PartNumber></Part>
      </Components>
      <Substances>
        <Substance>
          <MISubstanceReference>
            <gbt:dbKey>MI_Restricted_Substances</gbt:dbKey>
            <gbt:recordGUID>0f0e2f1b-7e1a-4d8b-9b1c-2a6f9f0c1e11</gbt:recordGUID>
          </MISubstanceReference>
          <Percentage>0.1</Percentage>
          <Category>Incorporated</Category>
        </Substance>
      </Substances>
      <RohsExemptions>
        <RohsExemption>6(c)</RohsExemption>
      </RohsExemptions>
    </Part>
  </Components>
  <Notes><ProductName>Widget</ProductName></Notes>
</BillOfMaterials>
"#;

fn handler() -> BomHandler {
    BomHandler::new(HandlerConfig::default()).unwrap()
}

#[test]
fn test_load_sample() {
    let bom = handler().load_bom_from_text(SAMPLE_2301).unwrap();
    let Bom::Eco2301(ref inner) = bom else {
        panic!("expected a 23/01 BoM");
    };
    let part = &inner.components[0];
    assert_eq!(part.part_number, "P&1");
    assert_eq!(part.internal_id.as_deref(), Some("p1"));
    assert_eq!(part.quantity.as_ref().map(|q| q.value), Some(2.0));
    assert_eq!(part.components[0].part_number, "P1.1");
    assert_eq!(part.rohs_exemptions, vec!["6(c)"]);

    let reference = part.mi_part_reference.as_ref().unwrap();
    assert_eq!(reference.db_key, "MI_Restricted_Substances");
    assert_eq!(reference.record_history_identity, Some(12));
    assert_eq!(reference.record_uid.as_deref(), Some("u-1"));
    assert_eq!(
        inner.notes.as_ref().and_then(|n| n.product_name.as_deref()),
        Some("Widget")
    );
}

#[test]
fn test_dump_then_load() {
    let handler = handler();
    let bom = handler.load_bom_from_text(SAMPLE_2301).unwrap();
    let xml = handler.dump_bom(&bom).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><BillOfMaterials"));
    assert!(!xml.contains('\n'));
    assert!(xml.contains("<PartNumber>P&amp;1</PartNumber>"));
    assert!(xml.contains("<MIPartReference recordUID=\"u-1\">"));
    assert_eq!(handler.load_bom_from_text(&xml).unwrap(), bom);
}

#[test]
fn test_full_fixtures_through_text() {
    let handler = handler();
    for fixture in [full_eco2301(), full_eco2505()] {
        let bom = handler.read_document(&document(fixture)).unwrap();
        let xml = handler.dump_bom(&bom).unwrap();
        assert_eq!(handler.load_bom_from_text(&xml).unwrap(), bom);
    }
}

#[test]
fn test_written_document_text_round_trip() {
    let handler = handler();
    let bom = handler.read_document(&document(full_eco2505())).unwrap();
    let doc = handler.write_document(&bom).unwrap();
    let xml = write_document("BillOfMaterials", &doc).unwrap();
    let parsed = parse_document(&xml).unwrap();
    assert_eq!(parsed.root, "BillOfMaterials");
    assert_eq!(
        handler
            .read_document_with_root(&parsed.root, &parsed.document)
            .unwrap()
            .version(),
        SchemaVersion::Eco2505
    );
}

#[test]
fn test_prefixed_root_element() {
    let xml = format!(
        r#"<eco:BillOfMaterials xmlns:eco="{}" xmlns:gbt="{}"><eco:Components><eco:Part><eco:PartNumber>P1</eco:PartNumber></eco:Part></eco:Components></eco:BillOfMaterials>"#,
        ECO2505, GBT
    );
    let bom = handler().load_bom_from_text(&xml).unwrap();
    assert_eq!(bom.version(), SchemaVersion::Eco2505);
    assert_eq!(bom.component_count(), 1);
}

#[test]
fn test_dtd_rejected() {
    let xml = r#"<?xml version="1.0"?>
<!DOCTYPE BillOfMaterials [<!ENTITY boom "boom">]>
<BillOfMaterials xmlns="http://www.grantadesign.com/23/01/BillOfMaterialsEco"/>"#;
    assert!(matches!(
        handler().load_bom_from_text(xml),
        Err(Error::InvalidXml(_))
    ));
}

#[test]
fn test_malformed_xml() {
    let err = handler()
        .load_bom_from_text("<BillOfMaterials><Components></BillOfMaterials>")
        .unwrap_err();
    assert!(matches!(err, Error::Xml(_) | Error::InvalidXml(_)));
}

#[test]
fn test_wrong_root_element() {
    let xml = format!(r#"<Part xmlns="{}"><PartNumber>P1</PartNumber></Part>"#, ECO2301);
    assert!(matches!(
        handler().load_bom_from_text(&xml),
        Err(Error::UnregisteredType(ref name)) if name == "Part"
    ));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_2301.as_bytes()).unwrap();
    let bom = handler().load_bom_from_file(file.path()).unwrap();
    assert_eq!(bom.component_count(), 1);
}

#[test]
fn test_empty_bom_text() {
    let xml = format!(r#"<BillOfMaterials xmlns="{}"/>"#, ECO2301);
    let bom = handler().load_bom_from_text(&xml).unwrap();
    assert_eq!(bom.component_count(), 0);
    let written = handler().write_document(&bom).unwrap();
    assert_eq!(
        written.get("@xmlns").and_then(Value::as_str),
        Some(ECO2301)
    );
}

#[test]
fn test_text_content_kept_verbatim() {
    let handler = handler();
    let mut part = Part::new(" P1 ");
    part.part_name = Some(String::new());
    let bom = Bom::from(BillOfMaterials::new(vec![part, Part::new("")]));

    let xml = handler.dump_bom(&bom).unwrap();
    assert!(xml.contains("<PartNumber> P1 </PartNumber>"));
    assert_eq!(handler.load_bom_from_text(&xml).unwrap(), bom);
}

#[test]
fn test_empty_elements_read_as_empty_text() {
    let xml = format!(
        "<BillOfMaterials xmlns=\"{}\">\n  <Components>\n    <Part>\n      <PartNumber/>\n      <Name></Name>\n    </Part>\n  </Components>\n  <Notes/>\n</BillOfMaterials>",
        ECO2301
    );
    let bom = handler().load_bom_from_text(&xml).unwrap();
    let Bom::Eco2301(ref inner) = bom else {
        panic!("expected a 23/01 BoM");
    };
    assert_eq!(inner.components[0].part_number, "");
    assert_eq!(inner.components[0].part_name.as_deref(), Some(""));
    assert!(inner.notes.is_some());
}

#![no_main]

use bom_xml::xml::{parse_document, write_document};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Text layer only: whatever parses must write and parse back
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(parsed) = parse_document(xml) {
        let written =
            write_document(&parsed.root, &parsed.document).expect("parsed document must write");
        let reparsed = parse_document(&written).expect("written document must parse");
        assert_eq!(parsed.root, reparsed.root);
    }
});

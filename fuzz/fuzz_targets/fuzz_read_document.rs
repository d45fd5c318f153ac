#![no_main]

use bom_xml::{BomHandler, HandlerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary nested mappings straight into the reader
    let Ok(serde_json::Value::Object(doc)) = serde_json::from_slice(data) else {
        return;
    };
    if let Ok(handler) = BomHandler::new(HandlerConfig::default()) {
        let _ = handler.read_document(&doc);
    }
});

#![no_main]

use bom_xml::{BomHandler, HandlerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // XML text -> document -> BoM, in both strict and lenient mode
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    for strict in [true, false] {
        let Ok(handler) = BomHandler::new(HandlerConfig::default().strict(strict)) else {
            return;
        };
        if let Ok(bom) = handler.load_bom_from_text(xml) {
            // Anything that loads must dump and load back to the same BoM
            let dumped = handler.dump_bom(&bom).expect("loaded BoM must dump");
            let reloaded = handler
                .load_bom_from_text(&dumped)
                .expect("dumped BoM must load");
            assert_eq!(bom, reloaded);
        }
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use manifest_parser::parsers::maven::MavenParser;
use manifest_parser::parsers::Parser;
use manifest_parser::utils::split_lines;
use std::panic::AssertUnwindSafe;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let parser = MavenParser::new();

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            parser.parse_content("pom.xml", content)
        }));

        if let Ok(Ok(deps)) = result {
            let lines = split_lines(content);

            for dep in &deps {
                assert!(!dep.locations.is_empty(), "dependency without locations");
                for location in &dep.locations {
                    assert!(location.line < lines.len(), "line out of range");
                    assert!(
                        location.start_index < location.end_index,
                        "start_index must be < end_index"
                    );
                    assert!(
                        location.slice(&lines).is_some(),
                        "span must slice its line on char boundaries"
                    );
                }
            }
        }
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use testbundle::TestBody;
use testbundle::parse_bundle;

fuzz_target!(|data: &[u8]| {
    // Invalid UTF-8 can't be a bundle
    if let Ok(s) = std::str::from_utf8(data) {
        // Loading must reject bad input with an error, never a panic
        if let Ok(registry) = parse_bundle(s, "fuzz.json") {
            // Evaluating loaded expectations must not panic either
            for case in registry.cases() {
                if let TestBody::Expect(list) = &case.body {
                    for expectation in list {
                        let _ = expectation.evaluate();
                    }
                }
            }
        }
    }
});

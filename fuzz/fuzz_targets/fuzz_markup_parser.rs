#![no_main]

use libfuzzer_sys::fuzz_target;
use veil_dom::markup::{parse_fragment, serialize};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let once = serialize(&parse_fragment(input));
    let twice = serialize(&parse_fragment(&once));
    assert_eq!(once, twice, "serialization must be a fixed point");
});

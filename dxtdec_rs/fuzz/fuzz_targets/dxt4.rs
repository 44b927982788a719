#![no_main]

extern crate libfuzzer_sys;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 16]| {
    // Decode with a wider pitch to check that padding bytes are untouched.
    let mut actual = [0u8; 32 * 4];
    dxtdec_rs::dxt4(&data, &mut actual, 32);

    for row in actual.chunks_exact(32) {
        assert!(row[16..].iter().all(|b| *b == 0));
    }
});

#![no_main]

extern crate libfuzzer_sys;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 8]| {
    let mut actual = [0u8; 16 * 4];
    dxtdec_rs::dxt1(&data, &mut actual, 16);

    // DXT1 only has fully opaque or fully transparent pixels.
    assert!(actual.chunks_exact(4).all(|p| p[3] == 0 || p[3] == 255));

    // The transparent color is only available when color0 <= color1.
    let c0 = u16::from_le_bytes([data[0], data[1]]);
    let c1 = u16::from_le_bytes([data[2], data[3]]);
    if c0 > c1 {
        assert!(actual.chunks_exact(4).all(|p| p[3] == 255));
    }
});

#![no_main]

extern crate libfuzzer_sys;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 16]| {
    let mut actual = [0u8; 16 * 4];
    dxtdec_rs::dxt2(&data, &mut actual, 16);

    // The color block is shared with DXT4.
    let mut expected = [0u8; 16 * 4];
    dxtdec_rs::dxt4(&data, &mut expected, 16);

    for (a, e) in actual.chunks_exact(4).zip(expected.chunks_exact(4)) {
        assert_eq!(a[..3], e[..3]);
        assert_eq!(0, a[3] % 17);
    }
});

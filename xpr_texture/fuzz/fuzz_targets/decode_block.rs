#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (xpr_texture::dxt::BlockVariant, &[u8])| {
    let (variant, block) = input;

    if let Ok(pixels) = xpr_texture::dxt::decode_block(block, variant) {
        let plane =
            xpr_texture::dxt::decompress_plane(block, 4, 4, variant).expect("block should decode");
        assert_eq!(pixels.concat(), plane);
    }
});

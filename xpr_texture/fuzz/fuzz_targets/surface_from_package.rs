#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (xpr_texture::Padding, &[u8])| {
    let (padding, package) = input;

    // Limit allocations for padded surfaces.
    if let xpr_texture::Padding::Exact { width, height } = padding {
        if width > 4096 || height > 4096 {
            return;
        }
    }
    let palette = [0xFF00_0000u32; 256];

    if let Ok(surface) = xpr_texture::surface_from_package(package, Some(&palette), padding) {
        assert_eq!(
            surface.pitch as usize * surface.height as usize,
            surface.data.len()
        );
        assert!(surface.width >= surface.image_width);
        assert!(surface.height >= surface.image_height);
    }
});

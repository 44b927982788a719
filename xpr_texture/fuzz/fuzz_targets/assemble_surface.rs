#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (xpr_texture::TextureDescriptor, &[u8])| {
    let (descriptor, data) = input;

    // Limit allocations for padded surfaces.
    if descriptor.width > 4096 || descriptor.height > 4096 {
        return;
    }

    let palette = [0u32; 256];
    let _surface = xpr_texture::assemble_surface(
        &descriptor,
        data,
        Some(&palette),
        xpr_texture::Padding::PowerOfTwo,
    );
});

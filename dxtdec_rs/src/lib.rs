#![no_std]
//! A safe, no_std decoder for the DXT1, DXT2 and DXT4 blocks found in legacy console texture bundles.
//!
//! Each function decodes a single 4x4 block and writes 16 pixels in row-major order.
//! Pixels are ARGB8888 stored as B, G, R, A bytes,
//! which is a packed `0xAARRGGBB` value read back from little-endian memory.
//! The `destination_pitch` is the number of bytes between rows in `decompressed_block`.
//!
//! The interpolation arithmetic matches the console hardware decoder rather than the D3D specification.
//! Endpoints are expanded by left shift only and each weighted average uses a fixed rounding bias.

/// The number of bytes for a single ARGB8888 pixel.
pub const PIXEL_SIZE: usize = 4;

/// Decode an 8 byte DXT1 block with optional 1-bit transparency.
///
/// # Panics
/// Panics if `compressed_block` has fewer than 8 bytes
/// or `decompressed_block` can't hold 4 rows of `destination_pitch` bytes.
pub fn dxt1(compressed_block: &[u8], decompressed_block: &mut [u8], destination_pitch: usize) {
    color_block(
        compressed_block,
        decompressed_block,
        destination_pitch,
        false,
    )
}

/// Decode a 16 byte DXT2 block with explicit 4-bit alpha.
///
/// # Panics
/// Panics if `compressed_block` has fewer than 16 bytes
/// or `decompressed_block` can't hold 4 rows of `destination_pitch` bytes.
pub fn dxt2(compressed_block: &[u8], decompressed_block: &mut [u8], destination_pitch: usize) {
    color_block(
        &compressed_block[8..],
        decompressed_block,
        destination_pitch,
        true,
    );
    explicit_alpha_block(compressed_block, decompressed_block, destination_pitch);
}

/// Decode a 16 byte DXT4 block with interpolated 3-bit alpha.
///
/// # Panics
/// Panics if `compressed_block` has fewer than 16 bytes
/// or `decompressed_block` can't hold 4 rows of `destination_pitch` bytes.
pub fn dxt4(compressed_block: &[u8], decompressed_block: &mut [u8], destination_pitch: usize) {
    color_block(
        &compressed_block[8..],
        decompressed_block,
        destination_pitch,
        true,
    );
    interpolated_alpha_block(
        compressed_block,
        &mut decompressed_block[3..],
        destination_pitch,
        PIXEL_SIZE,
    );
}

fn expand_rgb565(color: u16) -> [u32; 3] {
    let color = color as u32;
    let r = ((color >> 11) & 0x1F) << 3;
    let g = ((color >> 5) & 0x3F) << 2;
    let b = (color & 0x1F) << 3;
    [r, g, b]
}

fn argb(r: u32, g: u32, b: u32, a: u8) -> [u8; 4] {
    [b as u8, g as u8, r as u8, a]
}

fn color_block(
    compressed_block: &[u8],
    decompressed_block: &mut [u8],
    destination_pitch: usize,
    only_opaque_mode: bool,
) {
    let c0 = u16::from_le_bytes([compressed_block[0], compressed_block[1]]);
    let c1 = u16::from_le_bytes([compressed_block[2], compressed_block[3]]);

    let [r0, g0, b0] = expand_rgb565(c0);
    let [r1, g1, b1] = expand_rgb565(c1);

    let mut ref_colors = [[0u8; 4]; 4];
    ref_colors[0] = argb(r0, g0, b0, 255u8);
    ref_colors[1] = argb(r1, g1, b1, 255u8);

    // The packed values are compared, not the expanded channels.
    if c0 > c1 || only_opaque_mode {
        // color_2 = 2/3*color_0 + 1/3*color_1
        // color_3 = 1/3*color_0 + 2/3*color_1
        ref_colors[2] = argb(
            (2 * r0 + r1 + 1) / 3,
            (2 * g0 + g1 + 1) / 3,
            (2 * b0 + b1 + 1) / 3,
            255u8,
        );
        ref_colors[3] = argb(
            (r0 + 2 * r1 + 1) / 3,
            (g0 + 2 * g1 + 1) / 3,
            (b0 + 2 * b1 + 1) / 3,
            255u8,
        );
    } else {
        // color_2 = 1/2*color_0 + 1/2*color_1
        // color_3 = transparent
        ref_colors[2] = argb((r0 + r1) / 2, (g0 + g1) / 2, (b0 + b1) / 2, 255u8);
        ref_colors[3] = [0u8; 4];
    }

    // One byte per row with the leftmost pixel in the lowest 2 bits.
    let mut color_indices = u32::from_le_bytes([
        compressed_block[4],
        compressed_block[5],
        compressed_block[6],
        compressed_block[7],
    ]);

    for i in 0..4 {
        for j in 0..4 {
            let idx = color_indices & 0x03;
            let start = i * destination_pitch + j * PIXEL_SIZE;
            decompressed_block[start..start + PIXEL_SIZE]
                .copy_from_slice(&ref_colors[idx as usize]);
            color_indices >>= 2;
        }
    }
}

fn explicit_alpha_block(
    compressed_block: &[u8],
    decompressed_block: &mut [u8],
    destination_pitch: usize,
) {
    for i in 0..4 {
        let alpha = u16::from_le_bytes([compressed_block[i * 2], compressed_block[i * 2 + 1]]);
        for j in 0..4 {
            let index = i * destination_pitch + j * PIXEL_SIZE + 3;
            decompressed_block[index] = ((alpha >> (4 * j)) & 0x0F) as u8 * 17;
        }
    }
}

fn alpha_palette(a0: u8, a1: u8) -> [u8; 8] {
    let a0 = a0 as u32;
    let a1 = a1 as u32;

    let mut alpha = [0u32; 8];
    alpha[0] = a0;
    alpha[1] = a1;

    if a0 > a1 {
        // 6 interpolated alpha values.
        alpha[2] = (6 * a0 + a1 + 3) / 7; // 6/7*alpha_0 + 1/7*alpha_1
        alpha[3] = (5 * a0 + 2 * a1 + 3) / 7; // 5/7*alpha_0 + 2/7*alpha_1
        alpha[4] = (4 * a0 + 3 * a1 + 3) / 7; // 4/7*alpha_0 + 3/7*alpha_1
        alpha[5] = (3 * a0 + 4 * a1 + 3) / 7; // 3/7*alpha_0 + 4/7*alpha_1
        alpha[6] = (2 * a0 + 5 * a1 + 3) / 7; // 2/7*alpha_0 + 5/7*alpha_1
        alpha[7] = (a0 + 6 * a1 + 3) / 7; // 1/7*alpha_0 + 6/7*alpha_1
    } else {
        // 4 interpolated alpha values.
        alpha[2] = (4 * a0 + a1 + 2) / 5; // 4/5*alpha_0 + 1/5*alpha_1
        alpha[3] = (3 * a0 + 2 * a1 + 2) / 5; // 3/5*alpha_0 + 2/5*alpha_1
        alpha[4] = (2 * a0 + 3 * a1 + 2) / 5; // 2/5*alpha_0 + 3/5*alpha_1
        alpha[5] = (a0 + 4 * a1 + 2) / 5; // 1/5*alpha_0 + 4/5*alpha_1
        alpha[6] = 0x00;
        alpha[7] = 0xFF;
    }

    alpha.map(|a| a as u8)
}

fn interpolated_alpha_block(
    compressed_block: &[u8],
    decompressed_block: &mut [u8],
    destination_pitch: usize,
    pixel_size: usize,
) {
    let alpha = alpha_palette(compressed_block[0], compressed_block[1]);

    // The 16 3-bit indices form a 48-bit little-endian bitstream after the endpoints.
    // Indices can straddle byte boundaries.
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&compressed_block[..8]);
    let mut indices = u64::from_le_bytes(bytes) >> 16;

    for i in 0..4 {
        for j in 0..4 {
            let index = i * destination_pitch + j * pixel_size;
            decompressed_block[index] = alpha[(indices & 0x07) as usize];
            indices >>= 3;
        }
    }
}

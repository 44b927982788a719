//! Conversion between the tiled Morton layout and row-major order for uncompressed formats.
//!
//! Swizzled textures interleave the bits of the x and y coordinates
//! so that neighboring pixels are also close in memory.
//! The y coordinate occupies the odd bit positions.
//! Non-square textures repeat square Morton tiles along the longer axis.
use crate::{AssemblyError, DimensionError};

/// The largest supported width or height for swizzled data.
///
/// Coordinates are interleaved using 16 bits per axis.
pub const MAX_SWIZZLE_DIMENSION: u32 = 1 << MORTON_BITS;

const MORTON_BITS: u32 = 16;

/// Convert the swizzled data in `source` to row-major order.
///
/// The result has `width * height * bytes_per_pixel` bytes.
/// Both dimensions must be powers of two no larger than [MAX_SWIZZLE_DIMENSION].
pub fn unswizzle(
    source: &[u8],
    bytes_per_pixel: usize,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, AssemblyError> {
    swizzle_inner(source, bytes_per_pixel, width, height, true)
}

/// Convert the row-major data in `source` to the swizzled layout.
///
/// This is the inverse of [unswizzle] and has the same requirements.
pub fn swizzle(
    source: &[u8],
    bytes_per_pixel: usize,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, AssemblyError> {
    swizzle_inner(source, bytes_per_pixel, width, height, false)
}

/// The offset in pixels of `(x, y)` in the swizzled layout.
pub fn swizzled_offset(x: u32, y: u32, width: u32, height: u32) -> u64 {
    column_offset(x, height) + row_offset(y, width)
}

fn swizzle_inner(
    source: &[u8],
    bytes_per_pixel: usize,
    width: u32,
    height: u32,
    unswizzle: bool,
) -> Result<Vec<u8>, AssemblyError> {
    validate_dimensions(width, height)?;

    let size = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
        .ok_or(AssemblyError::SizeWouldOverflow { width, height })?;

    if source.len() < size {
        return Err(AssemblyError::NotEnoughData {
            expected: size,
            actual: source.len(),
        });
    }

    // The column offsets are the same for every row.
    let column_offsets: Vec<u64> = (0..width).map(|x| column_offset(x, height)).collect();

    let mut output = vec![0u8; size];
    for y in 0..height {
        let row_offset = row_offset(y, width);
        for (x, column_offset) in column_offsets.iter().enumerate() {
            let swizzled = (row_offset + column_offset) as usize * bytes_per_pixel;
            let linear = (y as usize * width as usize + x) * bytes_per_pixel;

            let (src, dst) = if unswizzle {
                (swizzled, linear)
            } else {
                (linear, swizzled)
            };
            output[dst..dst + bytes_per_pixel].copy_from_slice(&source[src..src + bytes_per_pixel]);
        }
    }

    Ok(output)
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), DimensionError> {
    if !width.is_power_of_two() || !height.is_power_of_two() {
        return Err(DimensionError::NotPowerOfTwo { width, height });
    }

    if width > MAX_SWIZZLE_DIMENSION || height > MAX_SWIZZLE_DIMENSION {
        return Err(DimensionError::TooLarge {
            width,
            height,
            max: MAX_SWIZZLE_DIMENSION,
        });
    }

    Ok(())
}

// Move bit i of value to bit 2 * i.
fn spread_bits(value: u32) -> u64 {
    let mut result = 0u64;
    for bit in 0..MORTON_BITS {
        result |= (((value >> bit) & 1) as u64) << (2 * bit);
    }
    result
}

fn row_offset(y: u32, width: u32) -> u64 {
    if y < width {
        spread_bits(y) << 1
    } else {
        // Rows past the first square tile advance by whole tiles.
        let tile = (y / width) as u64;
        (spread_bits(y % width) << 1) + tile * width as u64 * width as u64
    }
}

fn column_offset(x: u32, height: u32) -> u64 {
    let tile_width = 2 * height as u64;
    if (x as u64) < tile_width {
        spread_bits(x)
    } else {
        let tile = x as u64 / tile_width;
        spread_bits((x as u64 % tile_width) as u32) + tile * tile_width * height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn spread_bits_interleaves() {
        assert_eq!(0, spread_bits(0));
        assert_eq!(0b1, spread_bits(0b1));
        assert_eq!(0b101, spread_bits(0b11));
        assert_eq!(0b1000001, spread_bits(0b1001));
        assert_eq!(0x5555_5555, spread_bits(0xFFFF));
        // Only the low 16 bits are interleaved.
        assert_eq!(0, spread_bits(1 << 16));
    }

    #[test]
    fn unswizzle_4x4() {
        let swizzled: Vec<u8> = (0..16).collect();
        assert_eq!(
            vec![0u8, 1, 4, 5, 2, 3, 6, 7, 8, 9, 12, 13, 10, 11, 14, 15],
            unswizzle(&swizzled, 1, 4, 4).unwrap()
        );
    }

    #[test]
    fn unswizzle_wide_tiles() {
        // Each 4x2 tile is stored contiguously.
        let swizzled: Vec<u8> = (0..16).collect();
        assert_eq!(
            vec![0u8, 1, 4, 5, 8, 9, 12, 13, 2, 3, 6, 7, 10, 11, 14, 15],
            unswizzle(&swizzled, 1, 8, 2).unwrap()
        );
    }

    #[test]
    fn unswizzle_tall_tiles() {
        // Each 2x2 tile is stored contiguously.
        let swizzled: Vec<u8> = (0..8).collect();
        assert_eq!(
            vec![0u8, 1, 2, 3, 4, 5, 6, 7],
            unswizzle(&swizzled, 1, 2, 4).unwrap()
        );
    }

    #[test]
    fn unswizzle_bytes_per_pixel() {
        let swizzled: Vec<u8> = (0..16u8).flat_map(|i| [i, i, i, 255]).collect();
        let linear = unswizzle(&swizzled, 4, 4, 4).unwrap();

        assert_eq!(&[0u8, 0, 0, 255], &linear[0..4]);
        assert_eq!(&[4u8, 4, 4, 255], &linear[8..12]);
        assert_eq!(&[2u8, 2, 2, 255], &linear[16..20]);
        assert_eq!(&[15u8, 15, 15, 255], &linear[60..64]);
    }

    #[rstest]
    fn swizzle_unswizzle(
        #[values(1, 2, 4, 8, 16, 32, 64)] width: u32,
        #[values(1, 2, 4, 8, 16, 32, 64)] height: u32,
    ) {
        let linear: Vec<u8> = (0..width * height * 2).map(|i| (i * 7 + i / 256) as u8).collect();

        let swizzled = swizzle(&linear, 2, width, height).unwrap();
        assert_eq!(linear, unswizzle(&swizzled, 2, width, height).unwrap());
    }

    #[rstest]
    fn swizzled_offsets_are_unique(
        #[values(1, 4, 16, 128)] width: u32,
        #[values(1, 2, 8, 64)] height: u32,
    ) {
        let mut seen = vec![false; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let offset = swizzled_offset(x, y, width, height) as usize;
                assert!(!seen[offset]);
                seen[offset] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn unswizzle_non_power_of_two() {
        assert_eq!(
            Err(AssemblyError::Dimension(DimensionError::NotPowerOfTwo {
                width: 3,
                height: 4
            })),
            unswizzle(&[0u8; 64], 4, 3, 4)
        );
    }

    #[test]
    fn unswizzle_zero_size() {
        assert_eq!(
            Err(AssemblyError::Dimension(DimensionError::NotPowerOfTwo {
                width: 0,
                height: 4
            })),
            unswizzle(&[], 4, 0, 4)
        );
    }

    #[test]
    fn unswizzle_too_large() {
        assert_eq!(
            Err(AssemblyError::Dimension(DimensionError::TooLarge {
                width: 1 << 17,
                height: 1,
                max: 65536
            })),
            unswizzle(&[], 4, 1 << 17, 1)
        );
    }

    #[test]
    fn unswizzle_not_enough_data() {
        assert_eq!(
            Err(AssemblyError::NotEnoughData {
                expected: 64,
                actual: 63
            }),
            unswizzle(&[0u8; 63], 4, 4, 4)
        );
    }
}

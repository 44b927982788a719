//! Decode textures from legacy console packed resource (XPR) files to linear ARGB8888 surfaces.
//!
//! Textures are stored swizzled, block compressed with DXT1, DXT2, or DXT4, or as palette indices.
//! Decoding runs the following stages as needed for the [TextureFormat]:
//! 1. decompress 4x4 blocks with [dxt::decompress_plane]
//! 2. convert the tiled layout to row-major with [swizzle::unswizzle]
//! 3. look up palette indices with [expand_palette]
//! 4. copy rows into a surface and replicate edges into padding with [assemble_surface]
//!
//! Decoded pixels use B, G, R, A byte order, which is the packed `0xAARRGGBB` value read from little-endian memory.
//! Each call owns its intermediate buffers, so textures can be decoded from multiple threads without synchronization.
use tracing::debug;

pub mod dxt;
pub mod swizzle;

mod error;
pub use error::*;

mod header;
pub use header::*;

mod palette;
pub use palette::*;

mod sink;
pub use sink::*;

mod surface;
pub use surface::*;

#[cfg(feature = "image")]
mod bmp;
#[cfg(feature = "image")]
pub use bmp::*;

use dxt::BlockVariant;

/// The number of bytes for a decoded ARGB8888 pixel.
pub const CHANNELS: usize = 4;

/// The pixel format for a texture resource.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "strum", derive(strum::EnumIter, strum::Display))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextureFormat {
    /// Swizzled ARGB8888.
    Argb8888,
    /// Row-major ARGB8888 with an explicit pitch.
    LinearArgb8888,
    Dxt1,
    Dxt2,
    Dxt4,
    /// Swizzled 8-bit indices into a 256 color palette.
    P8,
    /// A format code without a known layout.
    Unknown(u8),
}

impl TextureFormat {
    /// Get the format for the code stored in bits 8 to 16 of the header format field.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x06 => Self::Argb8888,
            0x0B => Self::P8,
            0x0C => Self::Dxt1,
            0x0E => Self::Dxt2,
            0x0F => Self::Dxt4,
            0x12 => Self::LinearArgb8888,
            _ => Self::Unknown(code),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Argb8888 => 0x06,
            Self::P8 => 0x0B,
            Self::Dxt1 => 0x0C,
            Self::Dxt2 => 0x0E,
            Self::Dxt4 => 0x0F,
            Self::LinearArgb8888 => 0x12,
            Self::Unknown(code) => *code,
        }
    }

    /// The bytes per pixel used for pitch calculations on the stored data.
    ///
    /// Block compressed formats report their compressed size rather than the decoded size.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::Argb8888 => 4,
            Self::LinearArgb8888 => 4,
            Self::Dxt1 => 1,
            Self::Dxt2 => 4,
            Self::Dxt4 => 4,
            Self::P8 => 1,
            Self::Unknown(_) => 0,
        }
    }

    pub fn is_paletted(&self) -> bool {
        matches!(self, Self::P8)
    }

    /// Returns `true` if the data uses the tiled Morton layout.
    /// Block compressed formats use block tiling instead.
    pub fn is_swizzled(&self) -> bool {
        matches!(self, Self::Argb8888 | Self::P8)
    }

    pub fn is_block_compressed(&self) -> bool {
        self.block_variant().is_some()
    }

    /// The codec for block compressed formats or [None] for uncompressed formats.
    pub fn block_variant(&self) -> Option<BlockVariant> {
        match self {
            Self::Dxt1 => Some(BlockVariant::Dxt1),
            Self::Dxt2 => Some(BlockVariant::Dxt2),
            Self::Dxt4 => Some(BlockVariant::Dxt4),
            _ => None,
        }
    }
}

/// Decode the texture in `package` to an ARGB8888 surface.
///
/// The `palette` is only required for paletted formats.
/// The surface is expanded to the dimensions required by `padding`
/// by repeating the last column and row of the image.
pub fn surface_from_package(
    package: &[u8],
    palette: Option<&Palette>,
    padding: Padding,
) -> Result<Surface<Vec<u8>>, DecodeError> {
    let (descriptor, data) = texture_from_package(package)?;
    debug!(
        format = ?descriptor.format,
        width = descriptor.width,
        height = descriptor.height,
        pitch = descriptor.pitch,
        "parsed texture descriptor"
    );

    let surface = assemble_surface(&descriptor, data, palette, padding)?;
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TextureFormat::Argb8888, 4, false, true, false)]
    #[case(TextureFormat::LinearArgb8888, 4, false, false, false)]
    #[case(TextureFormat::Dxt1, 1, false, false, true)]
    #[case(TextureFormat::Dxt2, 4, false, false, true)]
    #[case(TextureFormat::Dxt4, 4, false, false, true)]
    #[case(TextureFormat::P8, 1, true, true, false)]
    #[case(TextureFormat::Unknown(0x42), 0, false, false, false)]
    fn format_table(
        #[case] format: TextureFormat,
        #[case] bytes_per_pixel: u32,
        #[case] paletted: bool,
        #[case] swizzled: bool,
        #[case] block_compressed: bool,
    ) {
        assert_eq!(bytes_per_pixel, format.bytes_per_pixel());
        assert_eq!(paletted, format.is_paletted());
        assert_eq!(swizzled, format.is_swizzled());
        assert_eq!(block_compressed, format.is_block_compressed());
    }

    #[test]
    fn format_codes() {
        for code in 0..=u8::MAX {
            assert_eq!(code, TextureFormat::from_code(code).code());
        }
        assert_eq!(TextureFormat::Dxt1, TextureFormat::from_code(0x0C));
        assert_eq!(TextureFormat::Unknown(0x01), TextureFormat::from_code(0x01));
    }

    fn dxt1_package_8x8() -> Vec<u8> {
        let mut package = Vec::new();
        // Package header with the data immediately after the resource header.
        package.extend_from_slice(b"XPR0");
        package.extend_from_slice(&(32u32 + 64).to_le_bytes());
        package.extend_from_slice(&32u32.to_le_bytes());
        // Resource header for DXT1 with log2(width) = log2(height) = 3.
        package.extend_from_slice(&0x0004_0001u32.to_le_bytes());
        package.extend_from_slice(&0u32.to_le_bytes());
        package.extend_from_slice(&0u32.to_le_bytes());
        package.extend_from_slice(&0x0331_0C00u32.to_le_bytes());
        package.extend_from_slice(&0u32.to_le_bytes());
        // 8 blocks of solid white.
        for _ in 0..8 {
            package.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);
        }
        package
    }

    #[test]
    fn surface_from_package_dxt1_8x8() {
        let surface =
            surface_from_package(&dxt1_package_8x8(), None, Padding::Disabled).unwrap();

        assert_eq!(8, surface.width);
        assert_eq!(8, surface.height);
        assert_eq!(32, surface.pitch);
        assert_eq!(8 * 8 * 4, surface.data.len());
        assert!(surface
            .data
            .chunks_exact(4)
            .all(|p| p == [248u8, 252, 248, 255]));
    }

    #[test]
    fn surface_from_package_p8_swizzled() {
        // Store each index at its row-major position before swizzling.
        let indices: Vec<u8> = (0..16 * 8).map(|i| i as u8).collect();
        let swizzled = swizzle::swizzle(&indices, 1, 16, 8).unwrap();

        let descriptor = TextureDescriptor {
            format: TextureFormat::P8,
            width: 16,
            height: 8,
            pitch: 16,
            data_offset: 0,
            mipmaps: 1,
        };
        let package = package_from_texture(&descriptor, &swizzled);

        let palette: Palette = std::array::from_fn(|i| 0xFF00_0000 | i as u32);
        let surface = surface_from_package(&package, Some(&palette), Padding::Disabled).unwrap();

        for y in 0..8 {
            for x in 0..16 {
                let i = (y * 16 + x) as u8;
                assert_eq!(Some([i, 0, 0, 255]), surface.pixel(x, y));
            }
        }
    }

    #[test]
    fn surface_from_package_unknown_format() {
        let mut package = dxt1_package_8x8();
        // Replace the format code.
        package[12 + 13] = 0x42;

        assert_eq!(
            Err(DecodeError::Parse(ParseError::UnknownFormat { code: 0x42 })),
            surface_from_package(&package, None, Padding::Disabled)
        );
    }

    #[test]
    fn surface_from_package_missing_data() {
        let package = dxt1_package_8x8();

        assert_eq!(
            Err(DecodeError::Assembly(AssemblyError::NotEnoughData {
                expected: 32,
                actual: 16
            })),
            surface_from_package(&package[..48], None, Padding::Disabled)
        );
    }
}

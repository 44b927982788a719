//! Decoding for the 4x4 block compressed formats.
use crate::AssemblyError;

mod decode;
use decode::decode_dxt;
pub use decode::{BlockDecode, ReadBlock};

pub const BLOCK_WIDTH: usize = 4;
pub const BLOCK_HEIGHT: usize = 4;

const CHANNELS: usize = crate::CHANNELS;

/// DXT1 with 1-bit alpha encoded in the color endpoint ordering.
pub struct Dxt1;
/// DXT2 with explicit 4-bit alpha.
pub struct Dxt2;
/// DXT4 with interpolated 3-bit alpha.
pub struct Dxt4;

/// The codec used to decode a single compressed block.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "strum", derive(strum::EnumIter, strum::Display))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlockVariant {
    Dxt1,
    Dxt2,
    Dxt4,
}

impl BlockVariant {
    pub fn block_size_in_bytes(&self) -> usize {
        match self {
            BlockVariant::Dxt1 => 8,
            BlockVariant::Dxt2 | BlockVariant::Dxt4 => 16,
        }
    }
}

/// Decode a single compressed `block` to 16 ARGB8888 pixels in row-major order.
pub fn decode_block(block: &[u8], variant: BlockVariant) -> Result<[[u8; 4]; 16], AssemblyError> {
    let expected = variant.block_size_in_bytes();
    if block.len() < expected {
        return Err(AssemblyError::NotEnoughData {
            expected,
            actual: block.len(),
        });
    }

    let pixels = match variant {
        BlockVariant::Dxt1 => Dxt1::decompress_block(&ReadBlock::read_block(block, 0)),
        BlockVariant::Dxt2 => Dxt2::decompress_block(&ReadBlock::read_block(block, 0)),
        BlockVariant::Dxt4 => Dxt4::decompress_block(&ReadBlock::read_block(block, 0)),
    };

    Ok(bytemuck::cast(pixels))
}

/// Decompress the blocks in `data` to a row-major ARGB8888 plane of `width` x `height` pixels.
///
/// Blocks are stored in row-major order.
/// Both dimensions must be multiples of the 4x4 block dimensions.
pub fn decompress_plane(
    data: &[u8],
    width: u32,
    height: u32,
    variant: BlockVariant,
) -> Result<Vec<u8>, AssemblyError> {
    match variant {
        BlockVariant::Dxt1 => decode_dxt::<Dxt1>(width, height, data),
        BlockVariant::Dxt2 => decode_dxt::<Dxt2>(width, height, data),
        BlockVariant::Dxt4 => decode_dxt::<Dxt4>(width, height, data),
    }
}

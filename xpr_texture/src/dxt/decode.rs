use crate::{AssemblyError, DimensionError};

use super::{Dxt1, Dxt2, Dxt4, BLOCK_HEIGHT, BLOCK_WIDTH, CHANNELS};

pub trait BlockDecode {
    type CompressedBlock;

    // The decoded 4x4 pixel blocks are in row-major ordering.
    // Fixing the length should reduce the amount of bounds checking.
    fn decompress_block(block: &Self::CompressedBlock) -> [[[u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];
}

// Allows block types to read and copy buffer data to enforce alignment.
pub trait ReadBlock {
    const SIZE_IN_BYTES: usize;

    fn read_block(data: &[u8], offset: usize) -> Self;
}

impl ReadBlock for [u8; 8] {
    const SIZE_IN_BYTES: usize = 8;

    fn read_block(data: &[u8], offset: usize) -> Self {
        let mut block = [0u8; 8];
        block.copy_from_slice(&data[offset..offset + 8]);
        block
    }
}

impl ReadBlock for [u8; 16] {
    const SIZE_IN_BYTES: usize = 16;

    fn read_block(data: &[u8], offset: usize) -> Self {
        let mut block = [0u8; 16];
        block.copy_from_slice(&data[offset..offset + 16]);
        block
    }
}

impl BlockDecode for Dxt1 {
    type CompressedBlock = [u8; 8];

    fn decompress_block(block: &[u8; 8]) -> [[[u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT] {
        let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];

        dxtdec_rs::dxt1(
            block,
            bytemuck::cast_slice_mut(&mut decompressed),
            BLOCK_WIDTH * CHANNELS,
        );

        decompressed
    }
}

impl BlockDecode for Dxt2 {
    type CompressedBlock = [u8; 16];

    fn decompress_block(block: &[u8; 16]) -> [[[u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT] {
        let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];

        dxtdec_rs::dxt2(
            block,
            bytemuck::cast_slice_mut(&mut decompressed),
            BLOCK_WIDTH * CHANNELS,
        );

        decompressed
    }
}

impl BlockDecode for Dxt4 {
    type CompressedBlock = [u8; 16];

    fn decompress_block(block: &[u8; 16]) -> [[[u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT] {
        let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];

        dxtdec_rs::dxt4(
            block,
            bytemuck::cast_slice_mut(&mut decompressed),
            BLOCK_WIDTH * CHANNELS,
        );

        decompressed
    }
}

/// Decompress the bytes in `data` to a row-major ARGB8888 plane.
pub fn decode_dxt<F>(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>, AssemblyError>
where
    F: BlockDecode,
    F::CompressedBlock: ReadBlock,
{
    // Partial blocks would read past the end of each block row.
    if width as usize % BLOCK_WIDTH != 0 || height as usize % BLOCK_HEIGHT != 0 {
        return Err(DimensionError::NonIntegralDimensionsInBlocks {
            width,
            height,
            block_width: BLOCK_WIDTH as u32,
            block_height: BLOCK_HEIGHT as u32,
        }
        .into());
    }

    let blocks_per_row = width as usize / BLOCK_WIDTH;
    let block_rows = height as usize / BLOCK_HEIGHT;

    // Validate surface dimensions to check for potential overflow.
    let overflow = || AssemblyError::SizeWouldOverflow { width, height };
    let expected_size = blocks_per_row
        .checked_mul(block_rows)
        .and_then(|blocks| blocks.checked_mul(F::CompressedBlock::SIZE_IN_BYTES))
        .ok_or_else(overflow)?;
    let output_size = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or_else(overflow)?;

    if data.len() < expected_size {
        return Err(AssemblyError::NotEnoughData {
            expected: expected_size,
            actual: data.len(),
        });
    }

    let mut argb = vec![0u8; output_size];

    for y in (0..height as usize).step_by(BLOCK_HEIGHT) {
        for x in (0..width as usize).step_by(BLOCK_WIDTH) {
            let block_start = ((y / BLOCK_HEIGHT) * blocks_per_row + x / BLOCK_WIDTH)
                * F::CompressedBlock::SIZE_IN_BYTES;

            // Use a special type to enforce alignment.
            let block = F::CompressedBlock::read_block(data, block_start);
            let decompressed_block = F::decompress_block(&block);

            put_argb_block(&mut argb, decompressed_block, x, y, width as usize);
        }
    }

    Ok(argb)
}

fn put_argb_block(
    surface: &mut [u8],
    pixels: [[[u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT],
    x: usize,
    y: usize,
    width: usize,
) {
    // The data from each block will update 4 rows of the ARGB surface.
    let elements_per_row = CHANNELS * BLOCK_WIDTH;

    for (row, row_pixels) in pixels.iter().enumerate() {
        // Convert pixel coordinates to byte coordinates.
        let surface_index = ((y + row) * width + x) * CHANNELS;
        surface[surface_index..surface_index + elements_per_row]
            .copy_from_slice(bytemuck::cast_slice(row_pixels));
    }
}

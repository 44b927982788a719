use crate::{AssemblyError, CHANNELS};

/// The number of entries in a color palette.
pub const PALETTE_SIZE: usize = 256;

/// A color palette for paletted textures with packed `0xAARRGGBB` entries.
pub type Palette = [u32; PALETTE_SIZE];

/// Read a palette resource of 256 little-endian `0xAARRGGBB` entries.
pub fn palette_from_bytes(data: &[u8]) -> Result<Palette, AssemblyError> {
    let expected = PALETTE_SIZE * 4;
    if data.len() < expected {
        return Err(AssemblyError::NotEnoughData {
            expected,
            actual: data.len(),
        });
    }

    let mut palette = [0u32; PALETTE_SIZE];
    for (color, bytes) in palette.iter_mut().zip(data.chunks_exact(4)) {
        *color = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    Ok(palette)
}

/// Look up each of the `width` x `height` indices in `palette`.
///
/// Rows of `indices` are `source_pitch` bytes apart.
/// Each output row is `destination_pitch` bytes with any bytes after the first `width` pixels set to zero.
pub fn expand_palette(
    indices: &[u8],
    palette: &Palette,
    width: u32,
    height: u32,
    source_pitch: usize,
    destination_pitch: usize,
) -> Result<Vec<u8>, AssemblyError> {
    let width = width as usize;
    let height = height as usize;

    if source_pitch < width {
        return Err(AssemblyError::PitchTooSmall {
            pitch: source_pitch,
            min_pitch: width,
        });
    }

    let min_pitch = width
        .checked_mul(CHANNELS)
        .ok_or(AssemblyError::SizeWouldOverflow {
            width: width as u32,
            height: height as u32,
        })?;
    if destination_pitch < min_pitch {
        return Err(AssemblyError::PitchTooSmall {
            pitch: destination_pitch,
            min_pitch,
        });
    }

    // The last row only needs to contain width indices.
    let expected = match height {
        0 => Some(0),
        _ => source_pitch
            .checked_mul(height - 1)
            .and_then(|size| size.checked_add(width)),
    }
    .ok_or(AssemblyError::SizeWouldOverflow {
        width: width as u32,
        height: height as u32,
    })?;
    if indices.len() < expected {
        return Err(AssemblyError::NotEnoughData {
            expected,
            actual: indices.len(),
        });
    }

    let size = destination_pitch
        .checked_mul(height)
        .ok_or(AssemblyError::SizeWouldOverflow {
            width: width as u32,
            height: height as u32,
        })?;
    let mut argb = vec![0u8; size];

    if width > 0 {
        for (row, output_row) in argb.chunks_exact_mut(destination_pitch).enumerate() {
            let start = row * source_pitch;
            for (pixel, index) in output_row
                .chunks_exact_mut(CHANNELS)
                .zip(&indices[start..start + width])
            {
                pixel.copy_from_slice(&palette[*index as usize].to_le_bytes());
            }
        }
    }

    Ok(argb)
}

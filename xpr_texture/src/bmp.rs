use std::{
    io::{BufWriter, Write},
    path::Path,
};

use image::{codecs::bmp::BmpEncoder, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::{CreateImageError, Surface, CHANNELS};

/// Convert the B, G, R, A pixels in `surface` to an RGBA8 image including any padding.
pub fn image_from_surface<T: AsRef<[u8]>>(
    surface: &Surface<T>,
) -> Result<RgbaImage, CreateImageError> {
    let invalid_dimensions = || CreateImageError::InvalidSurfaceDimensions {
        width: surface.width,
        height: surface.height,
        data_length: surface.data.as_ref().len(),
    };

    let row_size = surface.width as usize * CHANNELS;
    let mut rgba = Vec::with_capacity(row_size * surface.height as usize);
    for y in 0..surface.height {
        let row = surface
            .row(y)
            .and_then(|row| row.get(..row_size))
            .ok_or_else(invalid_dimensions)?;
        rgba.extend(row.chunks_exact(CHANNELS).flat_map(|p| [p[2], p[1], p[0], p[3]]));
    }

    RgbaImage::from_raw(surface.width, surface.height, rgba).ok_or_else(invalid_dimensions)
}

/// Write `surface` to `writer` as an uncompressed 24-bit BMP image.
///
/// The alpha channel is discarded.
pub fn write_bmp<T: AsRef<[u8]>, W: Write>(
    surface: &Surface<T>,
    writer: &mut W,
) -> Result<(), CreateImageError> {
    let rgb = image::DynamicImage::ImageRgba8(image_from_surface(surface)?).to_rgb8();

    BmpEncoder::new(writer).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

/// Write `surface` to the file at `path` as an uncompressed 24-bit BMP image.
pub fn save_bmp<T: AsRef<[u8]>, P: AsRef<Path>>(
    surface: &Surface<T>,
    path: P,
) -> Result<(), CreateImageError> {
    let file = std::fs::File::create(path).map_err(image::ImageError::IoError)?;
    let mut writer = BufWriter::new(file);
    write_bmp(surface, &mut writer)?;
    writer.flush().map_err(image::ImageError::IoError)?;
    Ok(())
}

use std::borrow::Cow;

use tracing::debug;

use crate::{
    dxt::decompress_plane, expand_palette, swizzle::unswizzle, AssemblyError, Palette,
    TextureDescriptor, CHANNELS,
};

/// A decoded ARGB8888 surface with B, G, R, A byte order.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surface<T> {
    /// The width of the surface in pixels including any padding.
    pub width: u32,
    /// The height of the surface in pixels including any padding.
    pub height: u32,
    /// The number of bytes between the start of each row in [data](#structfield.data).
    pub pitch: u32,
    /// The width of the decoded image in pixels.
    pub image_width: u32,
    /// The height of the decoded image in pixels.
    pub image_height: u32,
    /// The pixel data with rows ordered from top to bottom.
    pub data: T,
}

impl<T: AsRef<[u8]>> Surface<T> {
    /// Get the bytes for row `y` including any padding.
    ///
    /// Returns [None] if the row is not fully contained within the buffer.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.pitch as usize;
        self.data.as_ref().get(start..start + self.pitch as usize)
    }

    /// Get the B, G, R, A bytes for the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width {
            return None;
        }
        let start = x as usize * CHANNELS;
        let bytes = self.row(y)?.get(start..start + CHANNELS)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Determines the dimensions of the surface allocated for a decoded image.
///
/// Padded pixels repeat the last column and row of the image.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Padding {
    /// Use the dimensions of the image.
    #[default]
    Disabled,
    /// Round each dimension up to the next power of two.
    PowerOfTwo,
    /// Use the given dimensions, which must be at least the dimensions of the image.
    Exact { width: u32, height: u32 },
}

impl Padding {
    /// The surface dimensions for an image of `width` x `height` pixels.
    pub fn surface_dimensions(&self, width: u32, height: u32) -> Result<(u32, u32), AssemblyError> {
        match self {
            Padding::Disabled => Ok((width, height)),
            Padding::PowerOfTwo => width
                .checked_next_power_of_two()
                .zip(height.checked_next_power_of_two())
                .ok_or(AssemblyError::SizeWouldOverflow { width, height }),
            Padding::Exact {
                width: surface_width,
                height: surface_height,
            } => {
                if *surface_width < width || *surface_height < height {
                    Err(AssemblyError::SurfaceTooSmall {
                        width: *surface_width,
                        height: *surface_height,
                        image_width: width,
                        image_height: height,
                    })
                } else {
                    Ok((*surface_width, *surface_height))
                }
            }
        }
    }
}

// The output of a pipeline stage.
// Linear data is borrowed from the input without copying.
struct Plane<'a> {
    data: Cow<'a, [u8]>,
    pitch: usize,
}

/// Decode the texture `data` described by `descriptor` to an ARGB8888 surface.
///
/// Block compressed data is decompressed, swizzled data is converted to row-major order,
/// and paletted data is expanded using `palette`.
/// The image is then copied into a surface with dimensions determined by `padding`.
pub fn assemble_surface(
    descriptor: &TextureDescriptor,
    data: &[u8],
    palette: Option<&Palette>,
    padding: Padding,
) -> Result<Surface<Vec<u8>>, AssemblyError> {
    descriptor.validate()?;

    let width = descriptor.width;
    let height = descriptor.height;
    let format = descriptor.format;

    // Check the palette before doing any work.
    let palette = match (format.is_paletted(), palette) {
        (true, None) => return Err(AssemblyError::MissingPalette),
        (_, palette) => palette,
    };

    let row_size = (width as usize)
        .checked_mul(CHANNELS)
        .ok_or(AssemblyError::SizeWouldOverflow { width, height })?;

    let mut plane = Plane {
        data: Cow::Borrowed(data),
        pitch: descriptor.pitch as usize,
    };

    if let Some(variant) = format.block_variant() {
        plane = Plane {
            data: Cow::Owned(decompress_plane(data, width, height, variant)?),
            pitch: row_size,
        };
        debug!(?variant, width, height, "decompressed plane");
    }

    if format.is_swizzled() {
        let bytes_per_pixel = format.bytes_per_pixel() as usize;
        plane = Plane {
            data: Cow::Owned(unswizzle(&plane.data, bytes_per_pixel, width, height)?),
            pitch: width as usize * bytes_per_pixel,
        };
        debug!(bytes_per_pixel, width, height, "unswizzled plane");
    }

    if let Some(palette) = palette.filter(|_| format.is_paletted()) {
        plane = Plane {
            data: Cow::Owned(expand_palette(
                &plane.data,
                palette,
                width,
                height,
                plane.pitch,
                row_size,
            )?),
            pitch: row_size,
        };
        debug!(width, height, "expanded palette");
    }

    let surface = copy_to_surface(&plane, width, height, padding)?;
    debug!(
        width = surface.width,
        height = surface.height,
        image_width = surface.image_width,
        image_height = surface.image_height,
        "assembled surface"
    );
    Ok(surface)
}

fn copy_to_surface(
    plane: &Plane,
    width: u32,
    height: u32,
    padding: Padding,
) -> Result<Surface<Vec<u8>>, AssemblyError> {
    let (surface_width, surface_height) = padding.surface_dimensions(width, height)?;

    let overflow = || AssemblyError::SizeWouldOverflow {
        width: surface_width,
        height: surface_height,
    };

    let row_size = width as usize * CHANNELS;
    let pitch = (surface_width as usize)
        .checked_mul(CHANNELS)
        .ok_or_else(overflow)?;
    let size = pitch
        .checked_mul(surface_height as usize)
        .ok_or_else(overflow)?;
    let pitch_u32 = u32::try_from(pitch).map_err(|_| overflow())?;

    if plane.pitch < row_size {
        return Err(AssemblyError::PitchTooSmall {
            pitch: plane.pitch,
            min_pitch: row_size,
        });
    }

    // The last row only needs to contain the image pixels.
    let expected = plane
        .pitch
        .checked_mul(height.saturating_sub(1) as usize)
        .and_then(|s| s.checked_add(row_size))
        .ok_or_else(overflow)?;
    if plane.data.len() < expected {
        return Err(AssemblyError::NotEnoughData {
            expected,
            actual: plane.data.len(),
        });
    }

    let mut data = vec![0u8; size];

    let copy_size = plane.pitch.min(pitch);
    for (y, row) in data.chunks_exact_mut(pitch).take(height as usize).enumerate() {
        let start = y * plane.pitch;
        let end = (start + copy_size).min(plane.data.len());
        row[..end - start].copy_from_slice(&plane.data[start..end]);

        // Repeat the last column into the padding.
        if surface_width > width && width > 0 {
            let (image, padded) = row.split_at_mut(row_size);
            let last_pixel = &image[row_size - CHANNELS..];
            for pixel in padded.chunks_exact_mut(CHANNELS) {
                pixel.copy_from_slice(last_pixel);
            }
        }
    }

    // Repeat the last row into the padding.
    if height > 0 {
        for y in height as usize..surface_height as usize {
            data.copy_within((y - 1) * pitch..y * pitch, y * pitch);
        }
    }

    Ok(Surface {
        width: surface_width,
        height: surface_height,
        pitch: pitch_u32,
        image_width: width,
        image_height: height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{swizzle::swizzle, ParseError, TextureFormat};

    fn linear_descriptor(width: u32, height: u32, pitch: u32) -> TextureDescriptor {
        TextureDescriptor {
            format: TextureFormat::LinearArgb8888,
            width,
            height,
            pitch,
            data_offset: 0,
            mipmaps: 1,
        }
    }

    // Each pixel stores its coordinates.
    fn linear_data(width: u32, height: u32, pitch: u32) -> Vec<u8> {
        let mut data = vec![0xEEu8; (pitch * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let i = (y * pitch + x * 4) as usize;
                data[i..i + 4].copy_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        data
    }

    #[test]
    fn surface_dimensions() {
        assert_eq!(Ok((3, 5)), Padding::Disabled.surface_dimensions(3, 5));
        assert_eq!(Ok((4, 8)), Padding::PowerOfTwo.surface_dimensions(3, 5));
        assert_eq!(Ok((16, 1)), Padding::PowerOfTwo.surface_dimensions(16, 1));
        assert_eq!(
            Ok((10, 10)),
            Padding::Exact {
                width: 10,
                height: 10
            }
            .surface_dimensions(3, 5)
        );
        assert_eq!(
            Err(AssemblyError::SizeWouldOverflow {
                width: u32::MAX,
                height: 1
            }),
            Padding::PowerOfTwo.surface_dimensions(u32::MAX, 1)
        );
    }

    #[test]
    fn assemble_linear_pitch() {
        let descriptor = linear_descriptor(3, 2, 64);
        let data = linear_data(3, 2, 64);

        let surface = assemble_surface(&descriptor, &data, None, Padding::Disabled).unwrap();
        assert_eq!(3, surface.width);
        assert_eq!(2, surface.height);
        assert_eq!(12, surface.pitch);
        assert_eq!(
            vec![
                0u8, 0, 0, 255, 1, 0, 0, 255, 2, 0, 0, 255, //
                0, 1, 0, 255, 1, 1, 0, 255, 2, 1, 0, 255,
            ],
            surface.data
        );
    }

    #[test]
    fn assemble_linear_power_of_two_padding() {
        let descriptor = linear_descriptor(3, 3, 64);
        let data = linear_data(3, 3, 64);

        let surface = assemble_surface(&descriptor, &data, None, Padding::PowerOfTwo).unwrap();
        assert_eq!(4, surface.width);
        assert_eq!(4, surface.height);
        assert_eq!(16, surface.pitch);
        assert_eq!(3, surface.image_width);
        assert_eq!(3, surface.image_height);

        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(Some([x as u8, y as u8, 0, 255]), surface.pixel(x, y));
            }
            assert_eq!(surface.pixel(2, y), surface.pixel(3, y));
        }
        assert_eq!(surface.row(2), surface.row(3));
        assert_eq!(Some([2, 2, 0, 255]), surface.pixel(3, 3));
    }

    #[test]
    fn assemble_linear_exact_padding() {
        let descriptor = linear_descriptor(1, 1, 64);
        let data = linear_data(1, 1, 64);

        let surface = assemble_surface(
            &descriptor,
            &data,
            None,
            Padding::Exact {
                width: 3,
                height: 2,
            },
        )
        .unwrap();
        assert_eq!(vec![0u8, 0, 0, 255].repeat(6), surface.data);
    }

    #[test]
    fn assemble_exact_padding_too_small() {
        let descriptor = linear_descriptor(3, 3, 64);
        let data = linear_data(3, 3, 64);

        assert_eq!(
            Err(AssemblyError::SurfaceTooSmall {
                width: 2,
                height: 4,
                image_width: 3,
                image_height: 3
            }),
            assemble_surface(
                &descriptor,
                &data,
                None,
                Padding::Exact {
                    width: 2,
                    height: 4
                }
            )
        );
    }

    #[test]
    fn assemble_linear_last_row_without_padding_bytes() {
        // The last row doesn't need to extend to the full pitch.
        let descriptor = linear_descriptor(2, 2, 64);
        let data = linear_data(2, 2, 64);

        let surface =
            assemble_surface(&descriptor, &data[..64 + 8], None, Padding::Disabled).unwrap();
        assert_eq!(Some([1, 1, 0, 255]), surface.pixel(1, 1));
    }

    #[test]
    fn assemble_linear_not_enough_data() {
        let descriptor = linear_descriptor(2, 2, 64);
        let data = linear_data(2, 2, 64);

        assert_eq!(
            Err(AssemblyError::NotEnoughData {
                expected: 72,
                actual: 71
            }),
            assemble_surface(&descriptor, &data[..71], None, Padding::Disabled)
        );
    }

    #[test]
    fn assemble_swizzled_argb() {
        let linear = linear_data(8, 4, 32);
        let swizzled = swizzle(&linear, 4, 8, 4).unwrap();
        let descriptor = TextureDescriptor {
            format: TextureFormat::Argb8888,
            width: 8,
            height: 4,
            pitch: 32,
            data_offset: 0,
            mipmaps: 1,
        };

        let surface = assemble_surface(&descriptor, &swizzled, None, Padding::Disabled).unwrap();
        assert_eq!(linear, surface.data);
    }

    #[test]
    fn assemble_paletted() {
        let descriptor = TextureDescriptor {
            format: TextureFormat::P8,
            width: 2,
            height: 2,
            pitch: 2,
            data_offset: 0,
            mipmaps: 1,
        };
        let mut palette = [0u32; 256];
        palette[1] = 0xFF0000FF;
        palette[2] = 0xFF00FF00;
        palette[3] = 0xFFFF0000;

        // Swizzled 2x2 indices are stored in row-major order.
        let surface =
            assemble_surface(&descriptor, &[0, 1, 2, 3], Some(&palette), Padding::Disabled)
                .unwrap();
        assert_eq!(Some([0, 0, 0, 0]), surface.pixel(0, 0));
        assert_eq!(Some([255, 0, 0, 255]), surface.pixel(1, 0));
        assert_eq!(Some([0, 255, 0, 255]), surface.pixel(0, 1));
        assert_eq!(Some([0, 0, 255, 255]), surface.pixel(1, 1));
    }

    #[test]
    fn assemble_paletted_missing_palette() {
        let descriptor = TextureDescriptor {
            format: TextureFormat::P8,
            width: 4,
            height: 4,
            pitch: 4,
            data_offset: 0,
            mipmaps: 1,
        };

        assert_eq!(
            Err(AssemblyError::MissingPalette),
            assemble_surface(&descriptor, &[0u8; 16], None, Padding::Disabled)
        );
    }

    #[test]
    fn assemble_dxt4_padding() {
        let descriptor = TextureDescriptor {
            format: TextureFormat::Dxt4,
            width: 4,
            height: 4,
            pitch: 16,
            data_offset: 0,
            mipmaps: 1,
        };
        // Opaque white with alpha endpoints 255 and 0 and index 0 everywhere.
        let mut block = [0u8; 16];
        block[0] = 255;
        block[8..12].copy_from_slice(&[0xFF; 4]);

        let surface = assemble_surface(
            &descriptor,
            &block,
            None,
            Padding::Exact {
                width: 8,
                height: 4,
            },
        )
        .unwrap();
        assert_eq!(32, surface.pitch);
        assert!(surface
            .data
            .chunks_exact(4)
            .all(|p| p == [248u8, 252, 248, 255]));
    }

    #[test]
    fn assemble_invalid_descriptor() {
        let descriptor = linear_descriptor(4, 4, 8);
        assert_eq!(
            Err(AssemblyError::InvalidDescriptor(ParseError::PitchTooSmall {
                pitch: 8,
                min_pitch: 16,
                width: 4
            })),
            assemble_surface(&descriptor, &[0u8; 64], None, Padding::Disabled)
        );
    }

    #[test]
    fn surface_pixel_out_of_bounds() {
        let surface = Surface {
            width: 1,
            height: 1,
            pitch: 4,
            image_width: 1,
            image_height: 1,
            data: vec![1, 2, 3, 4],
        };
        assert_eq!(Some([1, 2, 3, 4]), surface.pixel(0, 0));
        assert_eq!(None, surface.pixel(1, 0));
        assert_eq!(None, surface.pixel(0, 1));
    }
}

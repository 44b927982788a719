use crate::{ParseError, TextureFormat};

/// The magic at the start of every packed resource file.
pub const XPR_MAGIC: u32 = u32::from_le_bytes(*b"XPR0");

/// The size in bytes of the package header preceding the texture resource header.
pub const PACKAGE_HEADER_SIZE: usize = 12;

/// The size in bytes of the texture resource header.
pub const RESOURCE_HEADER_SIZE: usize = 20;

// Field offsets in the texture resource header.
const COMMON_OFFSET: usize = 0;
const DATA_OFFSET: usize = 4;
const LOCK_OFFSET: usize = 8;
const FORMAT_OFFSET: usize = 12;
const SIZE_OFFSET: usize = 16;

// Resource type texture with a reference count of 1.
const COMMON_TEXTURE: u32 = 0x0004_0001;

/// The header at the start of a packed resource file.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PackageHeader {
    pub magic: u32,
    /// The size of the entire package in bytes.
    pub total_size: u32,
    /// The offset of the texture data relative to the start of the package.
    pub header_size: u32,
}

impl PackageHeader {
    pub fn read(bytes: &[u8]) -> Result<Self, ParseError> {
        let not_enough_data = || ParseError::NotEnoughData {
            expected: PACKAGE_HEADER_SIZE,
            actual: bytes.len(),
        };

        let magic = read_u32(bytes, 0).ok_or_else(not_enough_data)?;
        let total_size = read_u32(bytes, 4).ok_or_else(not_enough_data)?;
        let header_size = read_u32(bytes, 8).ok_or_else(not_enough_data)?;

        if magic != XPR_MAGIC {
            return Err(ParseError::InvalidMagic { magic });
        }

        Ok(Self {
            magic,
            total_size,
            header_size,
        })
    }
}

/// The format, dimensions, and data location for a single texture.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TextureDescriptor {
    pub format: TextureFormat,
    /// The width of the base mip level in pixels.
    pub width: u32,
    /// The height of the base mip level in pixels.
    pub height: u32,
    /// The number of bytes for each row of stored data.
    pub pitch: u32,
    /// The offset of the texture data after the package header.
    pub data_offset: u32,
    /// The number of mip levels in the data.
    /// Only the base level is decoded.
    pub mipmaps: u32,
}

impl TextureDescriptor {
    /// Parse the fixed size texture resource header in `header`.
    ///
    /// A zero `Size` field stores the dimensions as powers of two in the `Format` field.
    /// Otherwise the `Size` field stores the dimensions and pitch directly.
    pub fn parse(header: &[u8]) -> Result<Self, ParseError> {
        if header.len() < RESOURCE_HEADER_SIZE {
            return Err(ParseError::NotEnoughData {
                expected: RESOURCE_HEADER_SIZE,
                actual: header.len(),
            });
        }

        let field = |offset| read_u32(header, offset).unwrap_or_default();
        let data_offset = field(DATA_OFFSET);
        let format_field = field(FORMAT_OFFSET);
        let size_field = field(SIZE_OFFSET);

        let format = TextureFormat::from_code(bits(format_field, 8, 16) as u8);
        let mipmaps = bits(format_field, 16, 20).max(1);

        let (width, height, pitch) = if size_field == 0 {
            let width = 1 << bits(format_field, 20, 24);
            let height = 1 << bits(format_field, 24, 28);
            (width, height, width * format.bytes_per_pixel())
        } else {
            let width = bits(size_field, 0, 12) + 1;
            let height = bits(size_field, 12, 24) + 1;
            // The pitch is stored in units of 64 bytes.
            let pitch = (bits(size_field, 24, 32) + 1) << 6;
            (width, height, pitch)
        };

        let descriptor = Self {
            format,
            width,
            height,
            pitch,
            data_offset,
            mipmaps,
        };
        descriptor.validate()?;

        Ok(descriptor)
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        if let TextureFormat::Unknown(code) = self.format {
            return Err(ParseError::UnknownFormat { code });
        }

        if self.width == 0 || self.height == 0 {
            return Err(ParseError::ZeroSizedTexture {
                width: self.width,
                height: self.height,
            });
        }

        let min_pitch = self.width.saturating_mul(self.format.bytes_per_pixel());
        if self.pitch < min_pitch {
            return Err(ParseError::PitchTooSmall {
                pitch: self.pitch,
                min_pitch,
                width: self.width,
            });
        }

        Ok(())
    }

    /// Write the texture resource header for this descriptor.
    ///
    /// Power of two dimensions with a tightly packed pitch use the exponent form.
    /// Other textures use the `Size` field, which rounds the pitch down to a multiple of 64 bytes.
    pub fn resource_header(&self) -> [u8; RESOURCE_HEADER_SIZE] {
        let mut format_field =
            ((self.format.code() as u32) << 8) | ((self.mipmaps.min(15) & 0xF) << 16);

        let is_exponent_form = self.width.is_power_of_two()
            && self.height.is_power_of_two()
            && self.width.trailing_zeros() < 16
            && self.height.trailing_zeros() < 16
            && self.width.checked_mul(self.format.bytes_per_pixel()) == Some(self.pitch);

        let size_field = if is_exponent_form {
            format_field |= self.width.trailing_zeros() << 20;
            format_field |= self.height.trailing_zeros() << 24;
            0
        } else {
            (self.width.saturating_sub(1) & 0xFFF)
                | ((self.height.saturating_sub(1) & 0xFFF) << 12)
                | (((self.pitch / 64).saturating_sub(1) & 0xFF) << 24)
        };

        let mut header = [0u8; RESOURCE_HEADER_SIZE];
        header[COMMON_OFFSET..COMMON_OFFSET + 4].copy_from_slice(&COMMON_TEXTURE.to_le_bytes());
        header[DATA_OFFSET..DATA_OFFSET + 4].copy_from_slice(&self.data_offset.to_le_bytes());
        header[LOCK_OFFSET..LOCK_OFFSET + 4].copy_from_slice(&0u32.to_le_bytes());
        header[FORMAT_OFFSET..FORMAT_OFFSET + 4].copy_from_slice(&format_field.to_le_bytes());
        header[SIZE_OFFSET..SIZE_OFFSET + 4].copy_from_slice(&size_field.to_le_bytes());
        header
    }
}

/// Parse the headers in `package` and find the start of the texture data.
///
/// The texture resource header immediately follows the package header.
/// The returned data begins at the descriptor's data offset after the package's header size.
pub fn texture_from_package(package: &[u8]) -> Result<(TextureDescriptor, &[u8]), ParseError> {
    let header = PackageHeader::read(package)?;
    let descriptor = TextureDescriptor::parse(&package[PACKAGE_HEADER_SIZE..])?;

    let offset = (header.header_size as usize).saturating_add(descriptor.data_offset as usize);
    let data = package
        .get(offset..)
        .ok_or(ParseError::DataOutOfBounds {
            offset,
            package_length: package.len(),
        })?;

    Ok((descriptor, data))
}

/// Create a package containing a single texture.
///
/// The `data` is written at the descriptor's data offset after both headers.
pub fn package_from_texture(descriptor: &TextureDescriptor, data: &[u8]) -> Vec<u8> {
    let header_size = PACKAGE_HEADER_SIZE + RESOURCE_HEADER_SIZE;
    let data_start = header_size + descriptor.data_offset as usize;
    let total_size = data_start + data.len();

    let mut package = Vec::with_capacity(total_size);
    package.extend_from_slice(&XPR_MAGIC.to_le_bytes());
    package.extend_from_slice(&(total_size as u32).to_le_bytes());
    package.extend_from_slice(&(header_size as u32).to_le_bytes());
    package.extend_from_slice(&descriptor.resource_header());
    package.resize(data_start, 0u8);
    package.extend_from_slice(data);
    package
}

// Extract the bits in the range [start, end).
fn bits(value: u32, start: u32, end: u32) -> u32 {
    (value >> start) & ((1u64 << (end - start)) - 1) as u32
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let bytes = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected at least {expected} header bytes but found {actual}")]
    NotEnoughData { expected: usize, actual: usize },

    #[error("package magic {magic:#010x} does not match XPR0")]
    InvalidMagic { magic: u32 },

    #[error("texture format code {code:#04x} is not recognized")]
    UnknownFormat { code: u8 },

    #[error("texture dimensions {width} x {height} contain no pixels")]
    ZeroSizedTexture { width: u32, height: u32 },

    #[error("pitch {pitch} is smaller than the {min_pitch} bytes required for a row of {width} pixels")]
    PitchTooSmall { pitch: u32, min_pitch: u32, width: u32 },

    #[error("texture data at offset {offset} is outside the package of {package_length} bytes")]
    DataOutOfBounds { offset: usize, package_length: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DimensionError {
    #[error("surface dimensions {width} x {height} are not powers of two")]
    NotPowerOfTwo { width: u32, height: u32 },

    #[error("surface dimensions {width} x {height} are not divisible by the block dimensions {block_width} x {block_height}")]
    NonIntegralDimensionsInBlocks {
        width: u32,
        height: u32,
        block_width: u32,
        block_height: u32,
    },

    #[error("surface dimensions {width} x {height} exceed the maximum swizzled dimension of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("expected surface to have at least {expected} bytes but found {actual}")]
    NotEnoughData { expected: usize, actual: usize },

    #[error("surface size for {width} x {height} pixels would overflow")]
    SizeWouldOverflow { width: u32, height: u32 },

    #[error("pitch {pitch} is smaller than the {min_pitch} bytes required for each row")]
    PitchTooSmall { pitch: usize, min_pitch: usize },

    #[error("paletted texture was decoded without a palette")]
    MissingPalette,

    #[error("surface dimensions {width} x {height} can't hold an image of {image_width} x {image_height}")]
    SurfaceTooSmall {
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("invalid surface dimensions: {0}")]
    Dimension(#[from] DimensionError),

    #[error("invalid texture descriptor: {0}")]
    InvalidDescriptor(#[from] ParseError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("error parsing package: {0}")]
    Parse(#[from] ParseError),

    #[error("error assembling surface: {0}")]
    Assembly(#[from] AssemblyError),
}

#[derive(Debug, Error)]
pub enum UploadError<E> {
    #[error("error decoding texture: {0}")]
    Decode(#[from] DecodeError),

    #[error("error uploading surface")]
    Sink(#[source] E),
}

#[cfg(feature = "image")]
#[derive(Debug, Error)]
pub enum CreateImageError {
    #[error("data length {data_length} is not valid for a {width}x{height} image")]
    InvalidSurfaceDimensions {
        width: u32,
        height: u32,
        data_length: usize,
    },

    #[error("error encoding image: {0}")]
    Image(#[from] image::ImageError),
}

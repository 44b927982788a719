use tracing::warn;

use crate::{surface_from_package, Padding, Palette, Surface, UploadError};

/// A destination for decoded surfaces such as a GPU texture.
///
/// The sink determines any padding required for the surface dimensions.
pub trait UploadSink {
    type Error: std::error::Error + 'static;

    /// The padding applied to decoded surfaces before calling [UploadSink::upload].
    fn padding(&self) -> Padding {
        Padding::Disabled
    }

    /// Take ownership of a decoded surface.
    fn upload(&mut self, surface: Surface<Vec<u8>>) -> Result<(), Self::Error>;
}

/// Decode the texture in `package` and pass the resulting surface to `sink`.
pub fn upload_texture<S: UploadSink>(
    sink: &mut S,
    package: &[u8],
    palette: Option<&Palette>,
) -> Result<(), UploadError<S::Error>> {
    let surface = surface_from_package(package, palette, sink.padding()).map_err(|e| {
        warn!(error = %e, "failed to decode texture");
        e
    })?;

    sink.upload(surface).map_err(UploadError::Sink)
}

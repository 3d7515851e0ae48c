use crate::error::Result;
use crate::framing::Framing;
use crate::raster::ImageFile;
use crate::stego::{CapacityReport, StegoImage};
use std::path::{Path, PathBuf};

/// Options for the write command
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub framing: Framing,
    /// Save here instead of overwriting the input image
    pub output: Option<PathBuf>,
}

/// Embed `payload` into the image at `image_path` and save it
pub fn write_message(
    image_path: &Path,
    payload: &[u8],
    options: &WriteOptions,
) -> Result<CapacityReport> {
    let mut file = ImageFile::open(image_path)?;
    if let Some(output) = &options.output {
        file.set_path(output);
    }

    let mut stego = StegoImage::with_framing(file, options.framing);
    stego.write_bytes(payload)?;
    Ok(stego.report())
}

use crate::error::Result;
use crate::framing::Framing;
use crate::raster::ImageFile;
use crate::stego::{CapacityReport, StegoImage};
use std::path::Path;

/// Options for the read command
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub framing: Framing,
}

/// A message recovered from an image
#[derive(Debug, Clone)]
pub struct Recovered {
    pub payload: Vec<u8>,
    pub report: CapacityReport,
}

/// Extract the message hidden in the image at `image_path`
pub fn read_message(image_path: &Path, options: &ReadOptions) -> Result<Recovered> {
    let file = ImageFile::open(image_path)?;
    let mut stego = StegoImage::with_framing(file, options.framing);
    let payload = stego.read_bytes()?;
    Ok(Recovered {
        payload,
        report: stego.report(),
    })
}

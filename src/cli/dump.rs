use crate::bitbuf::BitBuffer;
use crate::codec;
use crate::error::Result;
use crate::raster::ImageFile;
use crate::stego::StegoImage;
use std::path::Path;

const BYTES_PER_ROW: usize = 4;

/// Render the first `count` bytes of the raw LSB stream, framing ignored
pub fn dump_lsb(path: &Path, count: usize) -> Result<String> {
    let stego = StegoImage::new(ImageFile::open(path)?);
    let raw = stego.raw_bytes()?;
    let shown = count.min(raw.len());

    let mut output = String::new();
    output.push_str(&format!(
        "LSB stream: {} of {} bytes\n",
        shown,
        stego.capacity_bytes()
    ));
    output.push_str(&format!("Hex: {}\n\n", codec::bytes_to_hex_range(&raw, 0, shown)?));

    for (row, chunk) in raw[..shown].chunks(BYTES_PER_ROW).enumerate() {
        output.push_str(&format!(
            "{:08X}  {}\n",
            row * BYTES_PER_ROW,
            BitBuffer::from_bytes(chunk)
        ));
    }
    Ok(output)
}

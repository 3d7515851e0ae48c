use crate::bitbuf::BitBuffer;
use crate::codec;
use crate::error::{Result, StegError};
use crate::framing::Framing;
use crate::raster::{Image, Rgb};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Usable LSBs per pixel, one per channel
pub const BITS_PER_PIXEL: u64 = 3;

/// Payload bytes a `width` x `height` image can hold: `floor(w * h * 3 / 8)`
pub fn capacity_bytes_for(width: u32, height: u32) -> usize {
    (u64::from(width) * u64::from(height) * BITS_PER_PIXEL / 8) as usize
}

/// Snapshot of an image's embedding capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub width: u32,
    pub height: u32,
    pub framing: Framing,
    pub capacity_bytes: usize,
    pub max_payload: usize,
    pub bytes_available: usize,
}

/// LSB embedding engine over an exclusively owned [`Image`].
///
/// Payload bits are laid out MSB-first per byte and written one per colour
/// channel, R then G then B, scanning pixels row by row. Channels past the end
/// of the payload get their LSB cleared so a shorter message leaves no residue
/// of a longer one.
#[derive(Debug)]
pub struct StegoImage<I: Image> {
    image: I,
    framing: Framing,
    capacity_bytes: usize,
    bytes_available: usize,
}

impl<I: Image> StegoImage<I> {
    pub fn new(image: I) -> Self {
        Self::with_framing(image, Framing::default())
    }

    pub fn with_framing(image: I, framing: Framing) -> Self {
        let capacity_bytes = capacity_bytes_for(image.width(), image.height());
        Self {
            image,
            framing,
            capacity_bytes,
            bytes_available: capacity_bytes.saturating_sub(framing.overhead()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Largest message the current framing leaves room for
    pub fn max_payload(&self) -> usize {
        self.capacity_bytes.saturating_sub(self.framing.overhead())
    }

    /// Room left after the last write or read
    pub fn bytes_available(&self) -> usize {
        self.bytes_available
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn into_inner(self) -> I {
        self.image
    }

    /// Embed ASCII `text`; see [`StegoImage::write_bytes`]
    pub fn write(&mut self, text: &str) -> Result<()> {
        self.write_bytes(&codec::ascii_to_bytes(text))
    }

    /// Embed `payload` and persist the image.
    ///
    /// An oversized payload is rejected before any pixel changes.
    pub fn write_bytes(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len().saturating_add(self.framing.overhead()) > self.capacity_bytes {
            return Err(StegError::CapacityExceeded {
                payload: payload.len(),
                capacity: self.max_payload(),
            });
        }

        let mut bits = self.framing.encode(payload)?;
        trace!(
            "Embedding {} bits into {}x{} pixels",
            bits.len(),
            self.width(),
            self.height()
        );

        for y in 0..self.height() {
            for x in 0..self.width() {
                let mut channels = self.image.get_pixel(x, y).channels();
                for channel in channels.iter_mut() {
                    let bit = if bits.is_empty() {
                        false
                    } else {
                        bits.next_bit()?
                    };
                    *channel = (*channel & 0xFE) | u8::from(bit);
                }
                self.image.set_pixel(x, y, Rgb::from_channels(channels));
            }
        }

        // The grid already holds the new payload, even if persisting it fails
        self.bytes_available = self.max_payload() - payload.len();
        self.image.save()?;
        debug!(
            "Wrote {} bytes ({:?}), {} available",
            payload.len(),
            self.framing,
            self.bytes_available
        );
        Ok(())
    }

    /// The capacity-sized byte stream assembled from every channel LSB
    pub fn raw_bytes(&self) -> Result<Vec<u8>> {
        let wanted = self.capacity_bytes * 8;
        let mut bits = BitBuffer::new();

        'scan: for y in 0..self.height() {
            for x in 0..self.width() {
                for channel in self.image.get_pixel(x, y).channels() {
                    if bits.len() == wanted {
                        break 'scan;
                    }
                    bits.append_bit(channel & 1 == 1);
                }
            }
        }

        bits.next_bytes(self.capacity_bytes)
    }

    /// Recover the embedded message bytes without touching the pixels
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let max_payload = self.max_payload();
        self.bytes_available = max_payload;

        let raw = self.raw_bytes()?;
        let payload = self.framing.decode(&raw, max_payload)?;

        self.bytes_available = max_payload - payload.len();
        debug!(
            "Read {} bytes ({:?}), {} available",
            payload.len(),
            self.framing,
            self.bytes_available
        );
        Ok(payload)
    }

    /// Recover the embedded message as text, dropping NUL bytes
    pub fn read(&mut self) -> Result<String> {
        Ok(codec::bytes_to_string(&self.read_bytes()?))
    }

    pub fn report(&self) -> CapacityReport {
        CapacityReport {
            width: self.width(),
            height: self.height(),
            framing: self.framing,
            capacity_bytes: self.capacity_bytes,
            max_payload: self.max_payload(),
            bytes_available: self.bytes_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use std::io;

    /// Grid whose persistence always fails
    struct UnsavableRaster(Raster);

    impl Image for UnsavableRaster {
        fn width(&self) -> u32 {
            self.0.width()
        }

        fn height(&self) -> u32 {
            self.0.height()
        }

        fn get_pixel(&self, x: u32, y: u32) -> Rgb {
            self.0.get_pixel(x, y)
        }

        fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb) {
            self.0.set_pixel(x, y, pixel);
        }

        fn save(&mut self) -> Result<()> {
            Err(StegError::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
        }
    }

    fn noisy(width: u32, height: u32) -> Raster {
        Raster::from_fn(width, height, |x, y| {
            let seed = (x * 31 + y * 17) as u8;
            Rgb::new(seed, seed.wrapping_mul(3), seed ^ 0x5A)
        })
    }

    #[test]
    fn test_capacity() {
        assert_eq!(capacity_bytes_for(10, 10), 37);
        assert_eq!(capacity_bytes_for(1, 1), 0);
        assert_eq!(capacity_bytes_for(3, 1), 1);
        assert_eq!(capacity_bytes_for(0, 50), 0);

        let stego = StegoImage::new(noisy(10, 10));
        assert_eq!(stego.capacity_bytes(), 37);
        assert_eq!(stego.bytes_available(), 37);
    }

    #[test]
    fn test_write_read_hello() {
        let mut stego = StegoImage::new(noisy(10, 10));
        stego.write("HELLO").unwrap();
        assert_eq!(stego.bytes_available(), 32);
        assert_eq!(stego.read().unwrap(), "HELLO");
        assert_eq!(stego.bytes_available(), 32);
    }

    #[test]
    fn test_write_only_touches_lsb() {
        let before = noisy(10, 10);
        let mut stego = StegoImage::new(before.clone());
        stego.write("HELLO").unwrap();

        for (old, new) in before.pixels().iter().zip(stego.image().pixels()) {
            for (a, b) in old.channels().iter().zip(new.channels()) {
                assert_eq!(a & 0xFE, b & 0xFE);
            }
        }
    }

    #[test]
    fn test_first_pixel_layout() {
        // 'H' = 0x48 = 0100_1000: pixels 0 and 1 carry 0,1,0 in R,G,B
        let mut stego = StegoImage::new(Raster::new(4, 4, Rgb::new(0xFF, 0xFF, 0xFF)));
        stego.write("H").unwrap();
        let image = stego.into_inner();
        assert_eq!(image.get_pixel(0, 0), Rgb::new(0xFE, 0xFF, 0xFE));
        assert_eq!(image.get_pixel(1, 0), Rgb::new(0xFE, 0xFF, 0xFE));
        assert_eq!(image.get_pixel(2, 0), Rgb::new(0xFE, 0xFE, 0xFE));
        assert_eq!(image.get_pixel(3, 3), Rgb::new(0xFE, 0xFE, 0xFE));
    }

    #[test]
    fn test_capacity_rejection_is_atomic() {
        let before = noisy(10, 10);
        let mut stego = StegoImage::new(before.clone());
        let err = stego.write(&"X".repeat(38)).unwrap_err();
        assert!(matches!(
            err,
            StegError::CapacityExceeded {
                payload: 38,
                capacity: 37
            }
        ));
        assert_eq!(stego.image(), &before);
    }

    #[test]
    fn test_full_capacity_has_no_terminator() {
        let mut stego = StegoImage::new(noisy(10, 10));
        let text = "Z".repeat(37);
        stego.write(&text).unwrap();
        assert_eq!(stego.bytes_available(), 0);
        assert_eq!(stego.read().unwrap(), text);
        assert_eq!(stego.bytes_available(), 0);
    }

    #[test]
    fn test_shorter_overwrite_clears_residue() {
        let mut stego = StegoImage::new(noisy(10, 10));
        stego.write("HELLO").unwrap();
        stego.write("A").unwrap();

        let raw = stego.raw_bytes().unwrap();
        assert_eq!(raw[0], b'A');
        assert!(raw[1..].iter().all(|&b| b == 0));
        assert_eq!(stego.read().unwrap(), "A");
        assert_eq!(stego.bytes_available(), 36);
    }

    #[test]
    fn test_read_stops_at_control_byte() {
        let mut stego = StegoImage::new(noisy(10, 10));
        stego.write("AB\nCD").unwrap();
        assert_eq!(stego.read().unwrap(), "AB");
        assert_eq!(stego.bytes_available(), 35);
    }

    #[test]
    fn test_empty_message() {
        let mut stego = StegoImage::new(noisy(10, 10));
        stego.write("").unwrap();
        assert_eq!(stego.read().unwrap(), "");
        assert_eq!(stego.bytes_available(), 37);
    }

    #[test]
    fn test_length_prefixed_binary_payload() {
        let mut stego = StegoImage::with_framing(noisy(10, 10), Framing::LengthPrefixed);
        assert_eq!(stego.max_payload(), 33);

        let payload = [0x00, 0x0A, 0xFF, 0x7F, 0x41];
        stego.write_bytes(&payload).unwrap();
        assert_eq!(stego.bytes_available(), 28);
        assert_eq!(stego.read_bytes().unwrap(), payload.to_vec());
        assert_eq!(stego.bytes_available(), 28);

        assert!(stego.write_bytes(&[0u8; 34]).is_err());
        assert!(stego.write_bytes(&[0u8; 33]).is_ok());
    }

    #[test]
    fn test_length_prefixed_rejects_tiny_image() {
        let mut stego = StegoImage::with_framing(Raster::new(2, 2, Rgb::default()), Framing::LengthPrefixed);
        assert_eq!(stego.capacity_bytes(), 1);
        assert!(matches!(
            stego.write_bytes(&[]),
            Err(StegError::CapacityExceeded { .. })
        ));
        assert!(matches!(stego.read_bytes(), Err(StegError::InvalidFrame(_))));
    }

    #[test]
    fn test_save_failure_keeps_accounting_in_step() {
        let mut stego = StegoImage::new(UnsavableRaster(noisy(10, 10)));
        assert!(matches!(stego.write("HELLO"), Err(StegError::Io(_))));
        assert_eq!(stego.bytes_available(), 32);

        // Pixels were mutated before the save failed
        assert_eq!(stego.read().unwrap(), "HELLO");
        assert_eq!(stego.bytes_available(), 32);
    }

    #[test]
    fn test_report() {
        let mut stego = StegoImage::new(noisy(8, 8));
        stego.write("hi").unwrap();
        let report = stego.report();
        assert_eq!(report.capacity_bytes, 24);
        assert_eq!(report.bytes_available, 22);
        assert_eq!(report.framing, Framing::Terminator);
    }
}

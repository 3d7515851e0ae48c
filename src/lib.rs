//! Stegvault - LSB steganography for RGB images
//!
//! Hides short messages in the least significant bit of each colour channel
//! of an 8-bit RGB image, three bits per pixel, and recovers them again.
//!
//! ## Layers
//!
//! ```text
//! text → codec (bytes) → BitBuffer (bits) → StegoImage (channel LSBs) → Image::save
//! ```
//!
//! - **codec**: hex / binary / ASCII / integer conversions
//! - **bitbuf**: alignment-agnostic bit buffer with MSB-first extraction
//! - **framing**: how a message's end is found (control-byte terminator or length header)
//! - **stego**: capacity accounting, embedding and recovery
//! - **raster**: the pixel grid collaborator, in memory or backed by an image file
//!
//! ## Example
//!
//! ```
//! use stegvault::raster::{Raster, Rgb};
//! use stegvault::StegoImage;
//!
//! let mut stego = StegoImage::new(Raster::new(10, 10, Rgb::new(128, 64, 32)));
//! assert_eq!(stego.capacity_bytes(), 37);
//!
//! stego.write("HELLO").unwrap();
//! assert_eq!(stego.bytes_available(), 32);
//! assert_eq!(stego.read().unwrap(), "HELLO");
//! ```

pub mod bitbuf;
pub mod cli;
pub mod codec;
pub mod error;
pub mod framing;
pub mod raster;
pub mod stego;

pub use bitbuf::BitBuffer;
pub use error::{Result, StegError};
pub use framing::Framing;
pub use raster::{Image, ImageFile, Raster, Rgb};
pub use stego::{CapacityReport, StegoImage};

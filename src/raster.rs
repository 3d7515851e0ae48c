use crate::error::Result;
use image::RgbImage;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// 8-bit RGB pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in embedding order: R, G, B
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_channels([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Pixel grid the embedding engine reads and mutates.
///
/// Coordinates are `(x, y)` with `x < width()` and `y < height()`;
/// implementations may panic on out-of-range coordinates.
pub trait Image {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn get_pixel(&self, x: u32, y: u32) -> Rgb;
    fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb);
    /// Persist the current pixels, if the image is backed by anything
    fn save(&mut self) -> Result<()>;
}

/// Owned in-memory pixel grid, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Raster {
    /// Grid filled with `fill`
    pub fn new(width: u32, height: u32, fill: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Grid whose pixels are produced by `f(x, y)`
    pub fn from_fn<F: FnMut(u32, u32) -> Rgb>(width: u32, height: u32, mut f: F) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} raster",
            x,
            y,
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

impl Image for Raster {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb) {
        let i = self.index(x, y);
        self.pixels[i] = pixel;
    }

    fn save(&mut self) -> Result<()> {
        Ok(())
    }
}

impl From<&RgbImage> for Raster {
    fn from(img: &RgbImage) -> Self {
        Raster::from_fn(img.width(), img.height(), |x, y| {
            Rgb::from_channels(img.get_pixel(x, y).0)
        })
    }
}

impl From<&Raster> for RgbImage {
    fn from(raster: &Raster) -> Self {
        RgbImage::from_fn(raster.width, raster.height, |x, y| {
            image::Rgb(raster.get_pixel(x, y).channels())
        })
    }
}

/// A raster loaded from disk, persisted back to `path` on [`Image::save`]
#[derive(Debug, Clone)]
pub struct ImageFile {
    raster: Raster,
    path: PathBuf,
}

impl ImageFile {
    /// Decode any format the `image` crate supports; alpha is dropped
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = image::open(path)?;
        debug!(
            "Opened {} ({}x{}, {:?})",
            path.display(),
            decoded.width(),
            decoded.height(),
            decoded.color()
        );
        let raster = Raster::from(&decoded.to_rgb8());
        Ok(Self {
            raster,
            path: path.to_path_buf(),
        })
    }

    pub fn from_raster(raster: Raster, path: &Path) -> Self {
        Self {
            raster,
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Redirect subsequent saves to `path`
    pub fn set_path(&mut self, path: &Path) {
        self.path = path.to_path_buf();
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

impl Image for ImageFile {
    fn width(&self) -> u32 {
        self.raster.width()
    }

    fn height(&self) -> u32 {
        self.raster.height()
    }

    fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        self.raster.get_pixel(x, y)
    }

    fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb) {
        self.raster.set_pixel(x, y, pixel);
    }

    fn save(&mut self) -> Result<()> {
        if is_lossy(&self.path) {
            warn!(
                "{} uses a lossy format; embedded data will not survive",
                self.path.display()
            );
        }
        RgbImage::from(&self.raster).save(&self.path)?;
        debug!("Saved {}", self.path.display());
        Ok(())
    }
}

fn is_lossy(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "webp"))
        .unwrap_or(false)
}

use color_eyre::{Result, eyre::WrapErr};
use image::{RgbaImage, imageops::FilterType};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Decoded sprite scaled to the size it is drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    pixels: RgbaImage,
}

impl ImageHandle {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Single-colour image, handy where no sprite file is involved.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// RGBA at (x, y), clamped to the image.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width().saturating_sub(1));
        let y = y.min(self.height().saturating_sub(1));
        self.pixels.get_pixel(x, y).0
    }
}

/// Something that can hand out sprites by (path, width, height).
pub trait ImageProvider {
    fn get_image(&mut self, path: &Path, width: u32, height: u32) -> Result<Rc<ImageHandle>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ImageKey {
    path: PathBuf,
    width: u32,
    height: u32,
}

/// Loads sprites from disk once per (path, width, height) and hands out
/// shared handles afterwards.
#[derive(Debug, Default)]
pub struct AssetCache {
    images: HashMap<ImageKey, Rc<ImageHandle>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct (path, size) entries loaded so far.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageProvider for AssetCache {
    fn get_image(&mut self, path: &Path, width: u32, height: u32) -> Result<Rc<ImageHandle>> {
        let key = ImageKey {
            path: path.to_path_buf(),
            width,
            height,
        };

        if let Some(handle) = self.images.get(&key) {
            log::debug!("using cached '{}' ({}x{})", path.display(), width, height);
            return Ok(Rc::clone(handle));
        }

        log::debug!("loading '{}' ({}x{})", path.display(), width, height);
        let decoded = image::open(path)
            .wrap_err_with(|| format!("failed to load image {}", path.display()))?;
        let scaled = decoded
            .resize_exact(width.max(1), height.max(1), FilterType::Nearest)
            .to_rgba8();

        let handle = Rc::new(ImageHandle::new(scaled));
        self.images.insert(key, Rc::clone(&handle));
        Ok(handle)
    }
}

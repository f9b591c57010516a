use crate::error::{OrbitError, Result};

/// Packed 8-bit RGB image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Image {
    /// Allocate a black image. Zero-sized dimensions are rejected.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(OrbitError::InvalidDimensions { width, height });
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(OrbitError::InvalidDimensions { width, height })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| OrbitError::Other(format!("cannot allocate {width}x{height} image: {e}")))?;
        data.resize(len, 0);

        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reset every channel to zero.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Byte offset of the red channel of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        3 * (y * self.width + x)
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = self.offset(x, y);
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let idx = self.offset(x, y);
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    pub fn same_dimensions(&self, other: &Image) -> bool {
        self.width == other.width && self.height == other.height
    }
}

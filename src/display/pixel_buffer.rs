use super::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Bytes per pixel in the RGBA8888 buffer
pub const BYTES_PER_PIXEL: usize = 4;

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
pub fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

/// RGBA8888 pixel buffer for software rendering
/// This is our canvas - the cloud renderer fills it every frame
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer with default resolution (640x480)
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Create a new pixel buffer with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the entire buffer with a solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            write_pixel(px, r, g, b);
        }
    }

    /// Set a single pixel, ignoring out-of-bounds coordinates
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        write_pixel(&mut self.pixels[idx..idx + BYTES_PER_PIXEL], r, g, b);
    }

    /// Read a pixel back as (r, g, b), or None if out of bounds
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some((
            self.pixels[idx + 3],
            self.pixels[idx + 2],
            self.pixels[idx + 1],
        ))
    }

    /// Mutable access to the raw pixel bytes, one scanline =
    /// `width * BYTES_PER_PIXEL` bytes. Used to split the buffer into
    /// independent rows for parallel rendering.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Raw bytes for uploading to the streaming texture
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

use std::io::Cursor;

use anyhow::Context;
use image::ImageEncoder;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::math::{mul_div255_u8, unpremul_u8};

/// Encoded image formats supported by [`PixelBuffer::to_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ImageFormat {
    /// Lossless PNG, alpha preserved.
    Png,
    /// Baseline JPEG; alpha is dropped.
    Jpeg {
        /// Encoder quality in `1..=100`.
        quality: u8,
    },
}

/// Straight-alpha RGBA8 raster surface, row-major, tightly packed.
///
/// `pixels.len() == width * height * 4` holds for every value of this type; constructors and
/// deserialization reject anything else.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "PixelBufferRepr", into = "PixelBufferRepr")]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PixelBufferRepr {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TryFrom<PixelBufferRepr> for PixelBuffer {
    type Error = FlipbookError;

    fn try_from(r: PixelBufferRepr) -> Result<Self, Self::Error> {
        Self::from_rgba(r.width, r.height, r.rgba)
    }
}

impl From<PixelBuffer> for PixelBufferRepr {
    fn from(b: PixelBuffer) -> Self {
        Self {
            width: b.width,
            height: b.height,
            rgba: b.pixels,
        }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; byte_len(width, height)],
        }
    }

    /// Buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> Self {
        let mut out = Self::new(width, height);
        out.fill(color);
        out
    }

    /// Wrap raw straight-alpha RGBA8 bytes.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> FlipbookResult<Self> {
        let expected = byte_len(width, height);
        if pixels.len() != expected {
            return Err(FlipbookError::invariant(format!(
                "pixel buffer {width}x{height} expects {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from premultiplied RGBA8 bytes (rasterizer output).
    pub fn from_premul(width: u32, height: u32, premul: &[u8]) -> FlipbookResult<Self> {
        let mut pixels = premul.to_vec();
        for px in pixels.chunks_exact_mut(4) {
            let a = px[3];
            px[0] = unpremul_u8(px[0], a);
            px[1] = unpremul_u8(px[1], a);
            px[2] = unpremul_u8(px[2], a);
        }
        Self::from_rgba(width, height, pixels)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Straight-alpha RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable view of the RGBA8 bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Give up the byte vector.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Whether `(x, y)` addresses a pixel.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    fn offset(&self, x: i64, y: i64) -> FlipbookResult<usize> {
        if !self.in_bounds(x, y) {
            return Err(FlipbookError::out_of_bounds(x, y, self.width, self.height));
        }
        Ok(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// Read one pixel; fails with `OutOfBounds` outside the surface.
    pub fn get(&self, x: i64, y: i64) -> FlipbookResult<Rgba8> {
        let i = self.offset(x, y)?;
        Ok(Rgba8::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    /// Write one pixel in place; fails with `OutOfBounds` outside the surface.
    pub fn set(&mut self, x: i64, y: i64, color: Rgba8) -> FlipbookResult<()> {
        let i = self.offset(x, y)?;
        self.pixels[i..i + 4].copy_from_slice(&color.to_array());
        Ok(())
    }

    /// Nearest-pixel read at a canvas-space position, clamped to the edges.
    ///
    /// Returns transparent for an empty buffer.
    pub fn sample(&self, x: f64, y: f64) -> Rgba8 {
        if self.width == 0 || self.height == 0 {
            return Rgba8::TRANSPARENT;
        }
        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        let sx = if x.is_finite() { x.floor().clamp(0.0, max_x) } else { 0.0 };
        let sy = if y.is_finite() { y.floor().clamp(0.0, max_y) } else { 0.0 };
        let i = ((sy as usize) * (self.width as usize) + (sx as usize)) * 4;
        Rgba8::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Rgba8) {
        let px = color.to_array();
        for dst in self.pixels.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Copy `src` onto `self` with its top-left corner at `(dx, dy)`, clipped to both surfaces.
    /// Pixels are replaced, not blended.
    pub fn blit(&mut self, src: &PixelBuffer, dx: i64, dy: i64) {
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + i64::from(src.width)).min(i64::from(self.width));
        let y1 = (dy + i64::from(src.height)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let row_bytes = ((x1 - x0) as usize) * 4;
        for y in y0..y1 {
            let sx = (x0 - dx) as usize;
            let sy = (y - dy) as usize;
            let s = (sy * (src.width as usize) + sx) * 4;
            let d = ((y as usize) * (self.width as usize) + (x0 as usize)) * 4;
            self.pixels[d..d + row_bytes].copy_from_slice(&src.pixels[s..s + row_bytes]);
        }
    }

    /// Premultiplied copy of the pixels, in the rasterizer's byte layout.
    pub fn to_premul(&self) -> Vec<u8> {
        let mut out = self.pixels.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 {
                px[..3].fill(0);
                continue;
            }
            px[0] = mul_div255_u8(u16::from(px[0]), a);
            px[1] = mul_div255_u8(u16::from(px[1]), a);
            px[2] = mul_div255_u8(u16::from(px[2]), a);
        }
        out
    }

    /// Copy into an `image` buffer for encoding.
    pub fn to_rgba_image(&self) -> FlipbookResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| FlipbookError::invariant("pixel buffer does not fit its dimensions"))
    }

    /// Decode a standard raster image (PNG, JPEG, GIF, ...) at its native size.
    pub fn from_image(bytes: &[u8]) -> FlipbookResult<Self> {
        let dyn_img = image::load_from_memory(bytes)
            .map_err(|e| FlipbookError::decode(format!("decode image from memory: {e}")))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    /// Encode the pixels. Output is deterministic for identical content and format.
    pub fn to_image(&self, format: ImageFormat) -> FlipbookResult<Vec<u8>> {
        let img = self.to_rgba_image()?;
        let mut buf = Vec::new();
        match format {
            ImageFormat::Png => {
                image::DynamicImage::ImageRgba8(img)
                    .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                    .context("encode png")?;
            }
            ImageFormat::Jpeg { quality } => {
                if !(1..=100).contains(&quality) {
                    return Err(FlipbookError::validation(
                        "jpeg quality must be in [1, 100]",
                    ));
                }
                let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
                    .write_image(
                        rgb.as_raw(),
                        self.width,
                        self.height,
                        image::ExtendedColorType::Rgb8,
                    )
                    .context("encode jpeg")?;
            }
        }
        Ok(buf)
    }

    /// Scaled copy (triangle filter); used for thumbnails and export scaling.
    pub fn resized(&self, width: u32, height: u32) -> FlipbookResult<Self> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        if width == 0 || height == 0 {
            return Ok(Self::new(width, height));
        }
        let img = self.to_rgba_image()?;
        let out = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        Self::from_rgba(width, height, out.into_raw())
    }

    /// Shrink (never enlarge) to fit inside `max_side` x `max_side`, keeping the aspect ratio.
    pub fn fit_within(&self, max_side: u32) -> FlipbookResult<Self> {
        if max_side == 0 {
            return Err(FlipbookError::validation("max_side must be > 0"));
        }
        let longest = self.width.max(self.height);
        if longest <= max_side {
            return Ok(self.clone());
        }
        let scale = f64::from(max_side) / f64::from(longest);
        let dim = |v: u32| ((f64::from(v) * scale).round() as u32).clamp(1, max_side);
        self.resized(dim(self.width), dim(self.height))
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/pixel_buffer.rs"]
mod tests;

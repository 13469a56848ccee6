//! The cursor bitmap shown magnified on the overlay

use crate::error::{Error, Result};
use image::{Rgba, RgbaImage};

/// Size and hotspot of a cursor glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: u32,
    pub height: u32,
    pub xhot: u32,
    pub yhot: u32,
}

/// Cursor image with premultiplied alpha, loaded once at startup
pub struct CursorGlyph {
    image: RgbaImage,
    xhot: u32,
    yhot: u32,
}

impl CursorGlyph {
    /// Build a glyph from packed 0xAARRGGBB pixels, row major
    pub fn from_argb(width: u32, height: u32, xhot: u32, yhot: u32, pixels: &[u32]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::GlyphUnavailable("cursor image is empty".into()));
        }
        if xhot >= width || yhot >= height {
            return Err(Error::GlyphUnavailable(format!(
                "hotspot {xhot},{yhot} outside {width}x{height} image"
            )));
        }

        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::GlyphUnavailable(format!(
                "expected {expected} pixels, got {}",
                pixels.len()
            )));
        }

        let mut image = RgbaImage::new(width, height);
        for (pixel, argb) in image.pixels_mut().zip(pixels) {
            let [a, r, g, b] = argb.to_be_bytes();
            *pixel = Rgba([r, g, b, a]);
        }

        Ok(Self { image, xhot, yhot })
    }

    pub fn metrics(&self) -> GlyphMetrics {
        GlyphMetrics {
            width: self.image.width(),
            height: self.image.height(),
            xhot: self.xhot,
            yhot: self.yhot,
        }
    }

    /// Pixel data for a 32bpp ZPixmap upload in the server's byte order
    pub fn to_zpixmap(&self, msb_first: bool) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.image.as_raw().len());
        for Rgba([r, g, b, a]) in self.image.pixels() {
            let argb = u32::from_be_bytes([*a, *r, *g, *b]);
            if msb_first {
                data.extend_from_slice(&argb.to_be_bytes());
            } else {
                data.extend_from_slice(&argb.to_le_bytes());
            }
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_one() -> CursorGlyph {
        CursorGlyph::from_argb(2, 1, 0, 0, &[0xff00_00ff, 0x8040_2010]).unwrap()
    }

    #[test]
    fn test_metrics() {
        let glyph = CursorGlyph::from_argb(3, 2, 1, 1, &[0; 6]).unwrap();
        assert_eq!(
            glyph.metrics(),
            GlyphMetrics {
                width: 3,
                height: 2,
                xhot: 1,
                yhot: 1
            }
        );
    }

    #[test]
    fn test_zpixmap_lsb_first_is_bgra() {
        let data = two_by_one().to_zpixmap(false);
        assert_eq!(data, vec![0xff, 0x00, 0x00, 0xff, 0x10, 0x20, 0x40, 0x80]);
    }

    #[test]
    fn test_zpixmap_msb_first_is_argb() {
        let data = two_by_one().to_zpixmap(true);
        assert_eq!(data, vec![0xff, 0x00, 0x00, 0xff, 0x80, 0x40, 0x20, 0x10]);
    }

    #[test]
    fn test_rejects_empty_image() {
        assert!(matches!(
            CursorGlyph::from_argb(0, 0, 0, 0, &[]),
            Err(Error::GlyphUnavailable(_))
        ));
    }

    #[test]
    fn test_rejects_short_pixel_buffer() {
        assert!(CursorGlyph::from_argb(4, 4, 0, 0, &[0; 15]).is_err());
    }

    #[test]
    fn test_rejects_hotspot_outside_image() {
        assert!(CursorGlyph::from_argb(4, 4, 4, 0, &[0; 16]).is_err());
    }
}

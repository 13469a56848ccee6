//! Placing and drawing the magnified cursor
//!
//! [`OverlayRenderer`] decides what the overlay should look like for a
//! pointer position and scale; a [`Compositor`] carries it out on a real
//! display server.

use crate::animation::MIN_SCALE;
use crate::error::Result;
use crate::glyph::GlyphMetrics;
use crate::motion::Point;

/// Where the overlay goes and how the glyph is scaled into it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub x: i32,
    pub y: i32,
    /// Width and height of the square overlay
    pub size: u32,
    /// Source transform factor; sampling the glyph at 1/scale magnifies it
    pub inverse_scale: f64,
}

impl OverlayFrame {
    /// Geometry that puts the scaled hotspot on the pointer
    pub fn compute(glyph: GlyphMetrics, position: Point, scale: f64) -> Self {
        let size = (glyph.width as f64 * scale) as i64;
        let x = position.x as i64 - size * glyph.xhot as i64 / glyph.width as i64;
        let y = position.y as i64 - size * glyph.yhot as i64 / glyph.height as i64;

        Self {
            x: x as i32,
            y: y as i32,
            size: size.max(1) as u32,
            inverse_scale: 1.0 / scale,
        }
    }
}

/// Draw operations against the overlay surface and the system pointer
pub trait Compositor {
    fn hide_pointer(&mut self) -> Result<()>;
    fn show_pointer(&mut self) -> Result<()>;
    fn map_overlay(&mut self) -> Result<()>;
    fn unmap_overlay(&mut self) -> Result<()>;
    /// Move and resize the overlay surface
    fn place_overlay(&mut self, frame: &OverlayFrame) -> Result<()>;
    /// Set the glyph's scale transform and resampling filter
    fn set_source_scale(&mut self, inverse_scale: f64) -> Result<()>;
    /// Replace the overlay contents with the transformed glyph
    fn composite(&mut self, size: u32) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

pub struct OverlayRenderer<C: Compositor> {
    compositor: C,
    glyph: GlyphMetrics,
    hiding_pointer: bool,
    mapped: bool,
}

impl<C: Compositor> OverlayRenderer<C> {
    pub fn new(compositor: C, glyph: GlyphMetrics) -> Self {
        Self {
            compositor,
            glyph,
            hiding_pointer: false,
            mapped: false,
        }
    }

    /// Whether the system pointer is currently hidden by us
    pub fn is_hiding_pointer(&self) -> bool {
        self.hiding_pointer
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// Draw the cursor at `position` magnified by `scale`.
    ///
    /// At minimum scale the overlay is taken down and the system pointer
    /// comes back instead.
    pub fn render(&mut self, position: Point, scale: f64) -> Result<Option<OverlayFrame>> {
        if scale <= MIN_SCALE {
            self.restore()?;
            return Ok(None);
        }

        self.set_pointer_hidden(true)?;

        let frame = OverlayFrame::compute(self.glyph, position, scale);
        tracing::trace!(?frame, scale, "render overlay");

        self.compositor.place_overlay(&frame)?;
        self.compositor.set_source_scale(frame.inverse_scale)?;
        if !self.mapped {
            self.compositor.map_overlay()?;
            self.mapped = true;
        }
        self.compositor.composite(frame.size)?;

        Ok(Some(frame))
    }

    /// Take the overlay down and give the system pointer back
    pub fn restore(&mut self) -> Result<()> {
        if self.mapped {
            self.compositor.unmap_overlay()?;
            self.mapped = false;
        }
        self.set_pointer_hidden(false)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.compositor.flush()
    }

    fn set_pointer_hidden(&mut self, hidden: bool) -> Result<()> {
        if self.hiding_pointer == hidden {
            return Ok(());
        }
        if hidden {
            self.compositor.hide_pointer()?;
        } else {
            self.compositor.show_pointer()?;
        }
        self.hiding_pointer = hidden;
        Ok(())
    }
}

impl<C: Compositor> Drop for OverlayRenderer<C> {
    fn drop(&mut self) {
        if !self.hiding_pointer && !self.mapped {
            return;
        }
        if let Err(e) = self.restore().and_then(|_| self.compositor.flush()) {
            tracing::warn!("failed to restore the system pointer: {}", e);
        }
    }
}

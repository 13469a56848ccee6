//! Overlay window drawn with the RENDER extension

use super::display::X11Display;
use crate::error::Result;
use crate::glyph::CursorGlyph;
use crate::overlay::{Compositor, OverlayFrame};
use x11rb::connection::Connection;
use x11rb::protocol::render::{
    ConnectionExt as RenderExt, CreatePictureAux, Fixed, PictOp, Picture, Transform,
};
use x11rb::protocol::shape::SK;
use x11rb::protocol::xfixes::ConnectionExt as XfixesExt;
use x11rb::protocol::xproto::{
    Colormap, ColormapAlloc, ConfigureWindowAux, ConnectionExt, CreateGCAux, CreateWindowAux,
    ImageFormat, Window, WindowClass,
};

/// Resampling filter used when magnifying the glyph
const FILTER: &[u8] = b"best";

/// Convert to the 16.16 fixed point format RENDER uses
pub fn to_fixed(value: f64) -> Fixed {
    (value * 65536.0) as Fixed
}

/// Scale-only transform; RENDER maps destination to source, so pass 1/scale
pub fn scale_transform(factor: f64) -> Transform {
    let f = to_fixed(factor);
    Transform {
        matrix11: f,
        matrix12: 0,
        matrix13: 0,
        matrix21: 0,
        matrix22: f,
        matrix23: 0,
        matrix31: 0,
        matrix32: 0,
        matrix33: to_fixed(1.0),
    }
}

/// Override-redirect ARGB window that ignores input, plus the pictures
/// needed to composite the cursor glyph onto it
pub struct XRenderOverlay<'a> {
    display: &'a X11Display,
    window: Window,
    colormap: Colormap,
    window_picture: Picture,
    glyph_picture: Picture,
}

impl<'a> XRenderOverlay<'a> {
    pub fn create(display: &'a X11Display, glyph: &CursorGlyph) -> Result<Self> {
        let conn = &display.conn;
        let argb = display.argb;
        let metrics = glyph.metrics();

        let colormap = conn.generate_id()?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, display.root, argb.visual)?;

        let window = conn.generate_id()?;
        conn.create_window(
            argb.depth,
            window,
            display.root,
            0,
            0,
            metrics.width as u16,
            metrics.height as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            argb.visual,
            &CreateWindowAux::new()
                .override_redirect(1u32)
                .background_pixel(0u32)
                .border_pixel(0u32)
                .colormap(colormap),
        )?;

        // An empty input shape lets clicks fall through to whatever is below
        let region = conn.generate_id()?;
        conn.xfixes_create_region(region, &[])?;
        conn.xfixes_set_window_shape_region(window, SK::INPUT, 0, 0, region)?;
        conn.xfixes_destroy_region(region)?;

        let glyph_picture = upload_glyph(display, window, glyph)?;

        let window_picture = conn.generate_id()?;
        conn.render_create_picture(window_picture, window, argb.format, &CreatePictureAux::new())?;

        conn.flush()?;

        Ok(Self {
            display,
            window,
            colormap,
            window_picture,
            glyph_picture,
        })
    }
}

/// Copy the glyph into a 32-bit pixmap and wrap it in a picture
fn upload_glyph(display: &X11Display, window: Window, glyph: &CursorGlyph) -> Result<Picture> {
    let conn = &display.conn;
    let metrics = glyph.metrics();
    let (width, height) = (metrics.width as u16, metrics.height as u16);

    let pixmap = conn.generate_id()?;
    conn.create_pixmap(32, pixmap, window, width, height)?;

    let gc = conn.generate_id()?;
    conn.create_gc(gc, pixmap, &CreateGCAux::new())?;
    conn.put_image(
        ImageFormat::Z_PIXMAP,
        pixmap,
        gc,
        width,
        height,
        0,
        0,
        0,
        32,
        &glyph.to_zpixmap(display.image_msb_first()),
    )?;
    conn.free_gc(gc)?;

    let picture = conn.generate_id()?;
    conn.render_create_picture(picture, pixmap, display.argb.format, &CreatePictureAux::new())?;
    conn.render_set_picture_filter(picture, FILTER, &[])?;

    // The picture keeps the pixmap contents alive
    conn.free_pixmap(pixmap)?;

    Ok(picture)
}

impl Compositor for XRenderOverlay<'_> {
    fn hide_pointer(&mut self) -> Result<()> {
        self.display.conn.xfixes_hide_cursor(self.display.root)?;
        Ok(())
    }

    fn show_pointer(&mut self) -> Result<()> {
        self.display.conn.xfixes_show_cursor(self.display.root)?;
        Ok(())
    }

    fn map_overlay(&mut self) -> Result<()> {
        self.display.conn.map_window(self.window)?;
        Ok(())
    }

    fn unmap_overlay(&mut self) -> Result<()> {
        self.display.conn.unmap_window(self.window)?;
        Ok(())
    }

    fn place_overlay(&mut self, frame: &OverlayFrame) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(frame.x)
            .y(frame.y)
            .width(frame.size)
            .height(frame.size);
        self.display.conn.configure_window(self.window, &aux)?;
        Ok(())
    }

    fn set_source_scale(&mut self, inverse_scale: f64) -> Result<()> {
        let conn = &self.display.conn;
        conn.render_set_picture_transform(self.glyph_picture, scale_transform(inverse_scale))?;
        conn.render_set_picture_filter(self.glyph_picture, FILTER, &[])?;
        Ok(())
    }

    fn composite(&mut self, size: u32) -> Result<()> {
        let size = size.min(u16::MAX as u32) as u16;
        self.display.conn.render_composite(
            PictOp::SRC,
            self.glyph_picture,
            x11rb::NONE,
            self.window_picture,
            0,
            0,
            0,
            0,
            0,
            0,
            size,
            size,
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.display.conn.flush()?;
        Ok(())
    }
}

impl Drop for XRenderOverlay<'_> {
    fn drop(&mut self) {
        let conn = &self.display.conn;
        let result = (|| -> Result<()> {
            conn.render_free_picture(self.glyph_picture)?;
            conn.render_free_picture(self.window_picture)?;
            conn.destroy_window(self.window)?;
            conn.free_colormap(self.colormap)?;
            conn.flush()?;
            Ok(())
        })();
        if let Err(e) = result {
            tracing::warn!("failed to release overlay resources: {}", e);
        }
    }
}

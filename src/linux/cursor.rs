//! Loading the arrow cursor glyph
//!
//! The glyph comes from the user's Xcursor theme, so the magnified cursor
//! looks like the normal arrow no matter what the pointer shows at startup.
//! If the theme has no usable arrow, the image the server currently shows
//! is taken instead.

use super::display::X11Display;
use crate::error::{Error, Result};
use crate::glyph::CursorGlyph;
use x11rb::protocol::xfixes::ConnectionExt as XfixesExt;
use x11rb::resource_manager::{self, Database};
use xcursor::parser::{parse_xcursor, Image};
use xcursor::CursorTheme;

/// The standard arrow in Xcursor themes
const ARROW: &str = "left_ptr";
const DEFAULT_THEME: &str = "default";
const DEFAULT_SIZE: u32 = 32;

/// Which cursor theme to read and the nominal size wanted from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSettings {
    pub theme: String,
    pub size: u32,
}

impl ThemeSettings {
    /// `XCURSOR_THEME`/`XCURSOR_SIZE` win over the `Xcursor.*` X resources
    pub fn resolve(env_theme: Option<String>, env_size: Option<String>, db: Option<&Database>) -> Self {
        let theme = env_theme
            .filter(|t| !t.is_empty())
            .or_else(|| db.and_then(|db| db.get_string("Xcursor.theme", "")).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_THEME.to_string());

        let size = env_size
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|size| *size > 0)
            .or_else(|| db.and_then(|db| db.get_value::<u32>("Xcursor.size", "").ok().flatten()))
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_SIZE);

        Self { theme, size }
    }

    fn from_environment(display: &X11Display) -> Self {
        let db = match resource_manager::new_from_default(&display.conn) {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::debug!("no X resource database: {}", e);
                None
            }
        };
        Self::resolve(
            std::env::var("XCURSOR_THEME").ok(),
            std::env::var("XCURSOR_SIZE").ok(),
            db.as_ref(),
        )
    }
}

/// Load the theme's arrow cursor, or the server's current cursor if that fails
pub fn load_cursor_glyph(display: &X11Display) -> Result<CursorGlyph> {
    let settings = ThemeSettings::from_environment(display);
    match load_theme_glyph(&settings) {
        Ok(glyph) => Ok(glyph),
        Err(e) => {
            tracing::warn!(
                theme = %settings.theme,
                "{}; falling back to the cursor currently shown",
                e
            );
            load_server_glyph(display)
        }
    }
}

fn load_theme_glyph(settings: &ThemeSettings) -> Result<CursorGlyph> {
    let path = CursorTheme::load(&settings.theme)
        .load_icon(ARROW)
        .ok_or_else(|| Error::GlyphUnavailable(format!("no {ARROW} cursor in theme")))?;
    let bytes = std::fs::read(&path)
        .map_err(|e| Error::GlyphUnavailable(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), size = settings.size, "loading cursor from theme");
    glyph_from_xcursor(&bytes, settings.size)
}

/// Decode an Xcursor file and keep the image closest to `size`
pub fn glyph_from_xcursor(bytes: &[u8], size: u32) -> Result<CursorGlyph> {
    let images = parse_xcursor(bytes)
        .ok_or_else(|| Error::GlyphUnavailable("malformed Xcursor file".into()))?;
    let image = nearest_size(&images, size)
        .ok_or_else(|| Error::GlyphUnavailable("Xcursor file has no images".into()))?;

    CursorGlyph::from_argb(
        image.width,
        image.height,
        image.xhot,
        image.yhot,
        &file_pixels(&image.pixels_rgba),
    )
}

/// First image whose nominal size is closest to `size`; for animated
/// cursors that is the first frame
fn nearest_size(images: &[Image], size: u32) -> Option<&Image> {
    images.iter().min_by_key(|image| image.size.abs_diff(size))
}

/// Xcursor stores premultiplied ARGB as little-endian words
fn file_pixels(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// The image the server shows for the pointer right now
fn load_server_glyph(display: &X11Display) -> Result<CursorGlyph> {
    let image = display
        .conn
        .xfixes_get_cursor_image()?
        .reply()
        .map_err(|e| Error::GlyphUnavailable(e.to_string()))?;

    tracing::debug!(
        serial = image.cursor_serial,
        "cursor image {}x{} hotspot {},{}",
        image.width,
        image.height,
        image.xhot,
        image.yhot
    );

    CursorGlyph::from_argb(
        image.width.into(),
        image.height.into(),
        image.xhot.into(),
        image.yhot.into(),
        &image.cursor_image,
    )
}

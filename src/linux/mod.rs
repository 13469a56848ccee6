//! Linux X11 backend
//!
//! Connection setup, the RENDER overlay window, cursor image loading and
//! XInput2 motion tracking.

pub mod cursor;
pub mod display;
pub mod motion;
pub mod overlay;

pub use cursor::load_cursor_glyph;
pub use display::X11Display;
pub use motion::RawMotionSource;
pub use overlay::XRenderOverlay;

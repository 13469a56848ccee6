//! X11 connection setup: extension checks and ARGB visual discovery

use crate::error::{Error, Result};
use crate::motion::Point;
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::render::{self, ConnectionExt as RenderExt, PictType};
use x11rb::protocol::xfixes::{self, ConnectionExt as XfixesExt};
use x11rb::protocol::xinput::{self, ConnectionExt as XinputExt};
use x11rb::protocol::xproto::{ConnectionExt, ImageOrder, Visualid, Window};
use x11rb::rust_connection::RustConnection;

/// A 32-bit visual with an alpha channel and its RENDER format
#[derive(Debug, Clone, Copy)]
pub struct ArgbVisual {
    pub visual: Visualid,
    pub depth: u8,
    pub format: render::Pictformat,
}

pub struct X11Display {
    pub conn: RustConnection,
    pub screen_num: usize,
    pub root: Window,
    pub argb: ArgbVisual,
}

impl X11Display {
    /// Connect to $DISPLAY and make sure everything the overlay needs is there
    pub fn open() -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let root = conn.setup().roots[screen_num].root;

        require_extension(&conn, render::X11_EXTENSION_NAME, "RENDER", (0, 11))?;
        let version = conn.render_query_version(0, 11)?.reply()?;
        tracing::debug!("RENDER {}.{}", version.major_version, version.minor_version);

        // Cursor hiding needs XFIXES 4
        require_extension(&conn, xfixes::X11_EXTENSION_NAME, "XFIXES", (4, 0))?;
        let version = conn.xfixes_query_version(4, 0)?.reply()?;
        if version.major_version < 4 {
            return Err(missing("XFIXES", (4, 0)));
        }

        require_extension(&conn, xinput::X11_EXTENSION_NAME, "XInput", (2, 0))?;
        let version = conn.xinput_xi_query_version(2, 0)?.reply()?;
        if version.major_version < 2 {
            return Err(missing("XInput", (2, 0)));
        }

        let argb = find_argb_visual(&conn, screen_num)?;

        Ok(Self {
            conn,
            screen_num,
            root,
            argb,
        })
    }

    /// Whether the server wants image data most significant byte first
    pub fn image_msb_first(&self) -> bool {
        self.conn.setup().image_byte_order == ImageOrder::MSB_FIRST
    }

    /// Absolute pointer position on this screen
    pub fn query_pointer(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;
        Ok(Point::new(reply.root_x as f64, reply.root_y as f64))
    }
}

fn require_extension(
    conn: &RustConnection,
    ext: &'static str,
    name: &'static str,
    version: (u32, u32),
) -> Result<()> {
    match conn.extension_information(ext)? {
        Some(_) => Ok(()),
        None => Err(missing(name, version)),
    }
}

fn missing(name: &'static str, (major, minor): (u32, u32)) -> Error {
    Error::MissingExtension { name, major, minor }
}

fn find_argb_visual(conn: &RustConnection, screen_num: usize) -> Result<ArgbVisual> {
    let formats = conn.render_query_pict_formats()?.reply()?;
    select_argb_visual(&formats, screen_num)
}

/// Pick the first depth-32 visual on `screen_num` whose RENDER format is a
/// direct format with an alpha channel
pub fn select_argb_visual(
    formats: &render::QueryPictFormatsReply,
    screen_num: usize,
) -> Result<ArgbVisual> {
    let has_alpha = |format: render::Pictformat| {
        formats.formats.iter().any(|info| {
            info.id == format
                && info.type_ == PictType::DIRECT
                && info.depth == 32
                && info.direct.alpha_mask != 0
        })
    };

    let screen = formats.screens.get(screen_num).ok_or(Error::NoArgbVisual)?;
    screen
        .depths
        .iter()
        .filter(|depth| depth.depth == 32)
        .flat_map(|depth| depth.visuals.iter().map(move |v| (depth.depth, v)))
        .find(|(_, v)| has_alpha(v.format))
        .map(|(depth, v)| ArgbVisual {
            visual: v.visual,
            depth,
            format: v.format,
        })
        .ok_or(Error::NoArgbVisual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use x11rb::protocol::render::{
        Directformat, Pictdepth, Pictforminfo, Pictscreen, Pictvisual, QueryPictFormatsReply,
    };

    const RGB24: render::Pictformat = 0x20;
    const XRGB32: render::Pictformat = 0x21;
    const ARGB32: render::Pictformat = 0x22;
    const INDEXED32: render::Pictformat = 0x23;

    fn format(id: render::Pictformat, type_: PictType, depth: u8, alpha_mask: u16) -> Pictforminfo {
        Pictforminfo {
            id,
            type_,
            depth,
            direct: Directformat {
                red_shift: 16,
                red_mask: 0xff,
                green_shift: 8,
                green_mask: 0xff,
                blue_shift: 0,
                blue_mask: 0xff,
                alpha_shift: 24,
                alpha_mask,
            },
            colormap: 0,
        }
    }

    fn depth(depth: u8, visuals: &[(u32, render::Pictformat)]) -> Pictdepth {
        Pictdepth {
            depth,
            visuals: visuals
                .iter()
                .map(|&(visual, format)| Pictvisual { visual, format })
                .collect(),
        }
    }

    fn reply(screens: Vec<Vec<Pictdepth>>) -> QueryPictFormatsReply {
        QueryPictFormatsReply {
            formats: vec![
                format(RGB24, PictType::DIRECT, 24, 0),
                format(XRGB32, PictType::DIRECT, 32, 0),
                format(ARGB32, PictType::DIRECT, 32, 0xff),
                format(INDEXED32, PictType::INDEXED, 32, 0xff),
            ],
            screens: screens
                .into_iter()
                .map(|depths| Pictscreen { fallback: RGB24, depths })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_picks_depth_32_direct_with_alpha() {
        let formats = reply(vec![vec![
            depth(24, &[(0x21, RGB24)]),
            depth(32, &[(0x60, XRGB32), (0x61, INDEXED32), (0x62, ARGB32)]),
        ]]);
        let argb = select_argb_visual(&formats, 0).unwrap();
        assert_eq!((argb.visual, argb.depth, argb.format), (0x62, 32, ARGB32));
    }

    #[test]
    fn test_alpha_format_listed_under_wrong_depth_is_skipped() {
        let formats = reply(vec![vec![depth(24, &[(0x70, ARGB32)])]]);
        assert!(matches!(select_argb_visual(&formats, 0), Err(Error::NoArgbVisual)));
    }

    #[test]
    fn test_no_alpha_visual() {
        let formats = reply(vec![vec![
            depth(24, &[(0x21, RGB24)]),
            depth(32, &[(0x60, XRGB32), (0x61, INDEXED32)]),
        ]]);
        assert!(matches!(select_argb_visual(&formats, 0), Err(Error::NoArgbVisual)));
    }

    #[test]
    fn test_uses_the_requested_screen() {
        let formats = reply(vec![
            vec![depth(32, &[(0x60, XRGB32)])],
            vec![depth(32, &[(0x90, ARGB32)])],
        ]);
        assert!(matches!(select_argb_visual(&formats, 0), Err(Error::NoArgbVisual)));
        assert_eq!(select_argb_visual(&formats, 1).unwrap().visual, 0x90);
        assert!(matches!(select_argb_visual(&formats, 2), Err(Error::NoArgbVisual)));
    }
}

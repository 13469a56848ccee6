//! Error types shared by the gesture pipeline and the X11 backend

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Could not open the display named by $DISPLAY
    #[error("cannot open display: {0}")]
    Connect(#[from] ConnectError),

    #[error("X11 connection failed: {0}")]
    Connection(#[from] ConnectionError),

    #[error("X11 request failed: {0}")]
    Reply(#[from] ReplyError),

    #[error("X11 resource allocation failed: {0}")]
    ReplyOrId(#[from] ReplyOrIdError),

    /// A required server extension is absent or too old
    #[error("{name} {major}.{minor} extension not available")]
    MissingExtension {
        name: &'static str,
        major: u32,
        minor: u32,
    },

    #[error("no ARGB visual found")]
    NoArgbVisual,

    #[error("failed to load cursor image: {0}")]
    GlyphUnavailable(String),

    #[error("waiting on the X11 connection failed: {0}")]
    Poll(#[from] nix::errno::Errno),
}

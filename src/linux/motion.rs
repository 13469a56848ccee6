//! Pointer motion from XInput2 raw events
//!
//! Raw motion is reported for every master pointer regardless of which
//! window is under it. The events carry device deltas only, so the absolute
//! position is queried once per batch.

use super::display::X11Display;
use crate::error::Result;
use crate::motion::{MotionSource, Point};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use std::os::fd::AsFd;
use std::time::Duration;
use x11rb::connection::Connection;
use x11rb::protocol::xinput::{self, ConnectionExt as XinputExt};
use x11rb::protocol::Event;

pub struct RawMotionSource<'a> {
    display: &'a X11Display,
}

impl<'a> RawMotionSource<'a> {
    /// Start receiving raw motion for all master devices on the root window
    pub fn subscribe(display: &'a X11Display) -> Result<Self> {
        display.conn.xinput_xi_select_events(
            display.root,
            &[xinput::EventMask {
                deviceid: xinput::Device::ALL_MASTER.into(),
                mask: vec![xinput::XIEventMask::RAW_MOTION],
            }],
        )?;
        display.conn.flush()?;
        Ok(Self { display })
    }

    /// Consume every event already queued; true if any of them was motion
    fn drain(&self) -> Result<bool> {
        let mut moved = false;
        while let Some(event) = self.display.conn.poll_for_event()? {
            moved |= note_event(&event);
        }
        Ok(moved)
    }

    /// Block until the connection is readable or `timeout` passes
    fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        let mut fds = [PollFd::new(
            self.display.conn.stream().as_fd(),
            PollFlags::POLLIN,
        )];
        let millis = timeout.as_millis().min(u16::MAX as u128) as u16;

        match poll(&mut fds, PollTimeout::from(millis)) {
            Ok(ready) => Ok(ready > 0),
            // A signal arrived; let the caller look at the shutdown flag
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// True for pointer motion. Failed requests sent without a reply cookie
/// (configure, composite, cursor hiding) come back here as error events.
fn note_event(event: &Event) -> bool {
    match event {
        Event::XinputRawMotion(_) => true,
        Event::Error(err) => {
            tracing::warn!(
                request = err.request_name.unwrap_or("unknown"),
                "X11 request failed: {:?}",
                err.error_kind
            );
            false
        }
        _ => false,
    }
}

impl MotionSource for RawMotionSource<'_> {
    fn current_position(&mut self) -> Result<Point> {
        self.display.query_pointer()
    }

    fn next_position(&mut self, timeout: Duration) -> Result<Option<Point>> {
        // Events may already sit in the client-side queue, where poll(2) can't see them
        let mut moved = self.drain()?;
        if !moved && self.wait_readable(timeout)? {
            moved = self.drain()?;
        }

        if moved {
            Ok(Some(self.display.query_pointer()?))
        } else {
            Ok(None)
        }
    }
}

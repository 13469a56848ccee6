mod animation;
mod cli;
mod clock;
mod drive;
mod error;
mod gesture;
mod glyph;
mod linux;
mod motion;
mod overlay;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use clock::MonotonicClock;
use drive::DriveLoop;
use linux::{load_cursor_glyph, RawMotionSource, X11Display, XRenderOverlay};
use overlay::OverlayRenderer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    Cli::parse();
    init_logging();

    // Termination signals only flip the flag; cleanup happens in the loop
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        tracing::debug!("termination signal received");
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set termination handler")?;

    let display = X11Display::open().context("Failed to set up X11 display")?;
    let glyph = load_cursor_glyph(&display)?;
    let metrics = glyph.metrics();
    // Bound first: inside the macro `display` names tracing's field helper
    let (screen, visual) = (display.screen_num, display.argb.visual);
    info!(
        screen,
        visual,
        "cursor {}x{} hotspot {},{}",
        metrics.width,
        metrics.height,
        metrics.xhot,
        metrics.yhot
    );

    let overlay =
        XRenderOverlay::create(&display, &glyph).context("Failed to create overlay window")?;
    let source = RawMotionSource::subscribe(&display).context("Failed to select motion events")?;
    let renderer = OverlayRenderer::new(overlay, metrics);

    let mut drive = DriveLoop::new(source, renderer, MonotonicClock::new())?;
    info!("shake the pointer to magnify the cursor");
    drive.run(&running)?;

    info!("shut down");
    Ok(())
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("shake_cursor=info,warn"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

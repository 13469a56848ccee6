use clap::Parser;

/// Thresholds are fixed; log output is controlled through RUST_LOG
#[derive(Parser)]
#[command(name = "shake-cursor")]
#[command(about = "Shake the pointer to magnify the cursor on X11")]
#[command(version)]
pub struct Cli {}

//! Command line options.

use std::path::PathBuf;

use clap::Parser;

/// Desktop twin of the robot eye firmware.
///
/// Commands are read from stdin one per line (e.g. `setState=4`); replies and
/// handshake requests go to stdout.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Settings file in `path=value` form
    #[arg(long, default_value = "settings.txt")]
    pub settings: PathBuf,

    /// Write the built-in defaults to the settings file and exit
    #[arg(long)]
    pub write_defaults: bool,

    /// Window pixel scale
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=8))]
    pub scale: u32,
}

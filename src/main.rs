use std::path::PathBuf;

use anyhow::ensure;
use clap::Parser;

use ocho::emulator::{DEFAULT_FRAME_RATE, DEFAULT_INSTRUCTIONS_PER_SECOND, Emulator, Settings};

#[derive(Parser)]
#[command(version, about = "CHIP-8 emulator with a terminal front end")]
struct Args {
    /// Path to a CHIP-8 ROM image.
    rom: PathBuf,

    /// Instructions executed per second.
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    ips: u64,

    /// Timer and render rate in Hz.
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
    frame_rate: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    ensure!(args.frame_rate > 0, "frame rate must be nonzero");

    let mut emulator = Emulator::new(Settings {
        frame_rate: args.frame_rate,
        ips: args.ips,
        rom: args.rom,
    });
    emulator.run()
}

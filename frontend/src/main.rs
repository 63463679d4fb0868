use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vermilion_machines::registry::{self, MachineOptions};
use vermilion_machines::rom_loader::RomImage;
use vermilion_machines::x16::{DEFAULT_RAM_BANKS, NUM_MAX_RAM_BANKS, RAM_BANK_SIZE};

mod config;
mod emulator;
mod input;
mod video;

#[derive(Parser)]
#[command(name = "vermilion", about = "8-bit home computer emulator")]
struct Args {
    /// System ROM image (flat file of 16 KiB banks)
    rom: PathBuf,

    /// Machine to emulate
    #[arg(long, default_value = "x16")]
    machine: String,

    /// Window scale factor
    #[arg(long)]
    scale: Option<u32>,

    /// Scaler quality: nearest or linear
    #[arg(long)]
    quality: Option<config::Quality>,

    /// Banked RAM size in KiB (8 KiB granularity, up to 2048)
    #[arg(long)]
    ram: Option<usize>,

    /// Skip rendering on most frames for fast-forward
    #[arg(long)]
    warp: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let file_config = config::Config::load();

    let scale = args.scale.or(file_config.scale).unwrap_or(1).max(1);
    let quality = args
        .quality
        .or(file_config.quality)
        .unwrap_or(config::Quality::Nearest);

    let num_ram_banks = match args.ram {
        None => DEFAULT_RAM_BANKS,
        Some(kib) => {
            let bank_kib = RAM_BANK_SIZE / 1024;
            if kib == 0 || !kib.is_multiple_of(bank_kib) || kib / bank_kib > NUM_MAX_RAM_BANKS {
                eprintln!("--ram must be a multiple of {bank_kib} KiB, at most {}", NUM_MAX_RAM_BANKS * bank_kib);
                return ExitCode::FAILURE;
            }
            kib / bank_kib
        }
    };

    let Some(entry) = registry::find(&args.machine) else {
        eprintln!("Unknown machine: {}", args.machine);
        eprintln!(
            "Available: {}",
            registry::all()
                .iter()
                .map(|e| e.name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        return ExitCode::FAILURE;
    };

    let rom = match RomImage::from_file(&args.rom) {
        Ok(rom) => rom,
        Err(e) => {
            eprintln!("Failed to load ROM: {e}");
            return ExitCode::FAILURE;
        }
    };

    let options = MachineOptions {
        num_ram_banks,
        warp: args.warp,
    };
    let mut machine = (entry.create)(rom, &options);

    emulator::run(machine.as_mut(), scale, quality);

    // Guest code may have requested a RAM dump via the control page.
    if machine.wants_dump_on_exit() {
        let dump_path = args.rom.with_extension("ram");
        match std::fs::File::create(&dump_path) {
            Ok(mut file) => {
                if let Err(e) = machine.dump_ram(&mut file) {
                    eprintln!("Warning: failed to write RAM dump: {e}");
                }
            }
            Err(e) => eprintln!("Warning: failed to create {}: {e}", dump_path.display()),
        }
    }

    ExitCode::SUCCESS
}

//! `rpiqa` — command-line interface for the Red Pitaya SDR receiver.
//!
//! ```text
//! USAGE:
//!   rpiqa configure <channel> <frequency> <rate>   Program NCO frequency and decimation
//!   rpiqa acquire <channel> <reads>                Drain <reads> FIFO chunks to the output file
//!   rpiqa acquire <channel> --duration <s> --rate <n>
//!   rpiqa setup                                    Load the FPGA image, mount the RAM disk
//!   rpiqa info                                     Print the register map and presets
//!   rpiqa decode <file> [--rate <n>]               Summarise a capture file
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rpiqa_driver::chip::{fifo, nco, regs};
use rpiqa_driver::{
    acquire_to_file, configure, AcquireConfig, BoardSetup, Capture, Channel, DeviceConfig,
    RegisterMap, RxConfig, SampleRate, SetupConfig,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rpiqa", about = "Red Pitaya SDR receiver control and acquisition", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Program a channel's down-conversion frequency and decimation rate.
    Configure {
        /// Input channel: 1 or 2.
        channel: Channel,
        /// Modulation frequency in Hz (nominally 0 to 60e6), single precision.
        frequency: f32,
        /// Decimation rate written to the rate register (e.g. 250 for 250 kSPS).
        rate: u16,
    },
    /// Drain FIFO chunks from a configured channel into the output file.
    Acquire {
        /// Input channel: 1 or 2.
        channel: Channel,
        /// Number of 16384-byte FIFO reads.
        #[arg(required_unless_present = "duration", conflicts_with = "duration")]
        reads: Option<u16>,
        /// Capture length in seconds instead of a read count.
        #[arg(long, requires = "rate")]
        duration: Option<f64>,
        /// Decimation rate the channel was configured with (for --duration).
        #[arg(long)]
        rate: Option<u16>,
        /// Output file [default: $RPIQA_OUTPUT or /mnt/RPIQA/output.bin].
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sleep between FIFO fill polls, in microseconds.
        #[arg(long, default_value_t = fifo::DEFAULT_POLL_INTERVAL_US)]
        poll_us: u64,
    },
    /// Load the SDR transceiver bitstream and mount the capture RAM disk.
    Setup {
        /// Bitstream to load [default: $RPIQA_BITSTREAM or the SD card image].
        #[arg(long)]
        bitstream: Option<PathBuf>,
        /// RAM disk mount point [default: $RPIQA_RAM_DISK or /mnt/RPIQA].
        #[arg(long)]
        ram_disk: Option<PathBuf>,
    },
    /// Print the channel address map, register offsets and rate presets.
    Info,
    /// Summarise a capture file.
    Decode {
        /// Capture file written by `acquire`.
        file: PathBuf,
        /// Decimation rate used for the capture, to report its duration.
        #[arg(long)]
        rate: Option<u16>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Configure {
            channel,
            frequency,
            rate,
        } => cmd_configure(channel, frequency, rate)?,
        Cmd::Acquire {
            channel,
            reads,
            duration,
            rate,
            output,
            poll_us,
        } => {
            let chunks = match reads {
                Some(n) => n,
                None => chunks_for_duration(duration.unwrap_or_default(), rate)?,
            };
            cmd_acquire(channel, chunks, output, poll_us)?;
        }
        Cmd::Setup {
            bitstream,
            ram_disk,
        } => cmd_setup(bitstream, ram_disk)?,
        Cmd::Info => cmd_info(),
        Cmd::Decode { file, rate } => cmd_decode(&file, rate)?,
    }

    Ok(())
}

fn cmd_configure(channel: Channel, frequency: f32, rate: u16) -> Result<()> {
    let config = RxConfig::new(frequency, rate)?;
    let device = DeviceConfig::from_env();

    let mut regs = RegisterMap::open(channel, &device.mem_device)
        .context("Couldn't open memory")?;
    configure(&mut regs, &config);
    Ok(())
}

fn cmd_acquire(channel: Channel, chunks: u16, output: Option<PathBuf>, poll_us: u64) -> Result<()> {
    let mut device = DeviceConfig::from_env();
    if let Some(path) = output {
        device = device.with_output(path);
    }
    let config = AcquireConfig::new(chunks).with_poll_interval(Duration::from_micros(poll_us));

    let mut regs = RegisterMap::open(channel, &device.mem_device)
        .context("Couldn't open memory")?;
    let report = acquire_to_file(&mut regs, &config, &device.output_path)?;

    info!(
        "Wrote {} bytes to {}",
        report.bytes_written,
        device.output_path.display()
    );
    Ok(())
}

/// FIFO reads covering `seconds` at a characterised decimation rate
fn chunks_for_duration(seconds: f64, rate: Option<u16>) -> Result<u16> {
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("Duration must be a non-negative number of seconds, got {seconds}");
    }
    let Some(rate) = rate else {
        bail!("--duration needs --rate");
    };
    let Some(preset) = SampleRate::from_decimation(rate) else {
        bail!(
            "Rate {rate} is not a characterised preset ({})",
            preset_list()
        );
    };

    let Ok(duration) = Duration::try_from_secs_f64(seconds) else {
        bail!(
            "{seconds} s at {preset} needs more than {} reads",
            u16::MAX
        );
    };
    if duration > preset.max_duration() {
        warn!(
            "{seconds} s exceeds the {:.1} s the RAM disk holds at {preset}",
            preset.max_duration().as_secs_f64()
        );
    }

    let chunks = preset.chunks_for(duration);
    u16::try_from(chunks)
        .with_context(|| format!("{seconds} s at {preset} needs {chunks} reads, more than {}", u16::MAX))
}

fn preset_list() -> String {
    SampleRate::ALL
        .iter()
        .map(|p| p.decimation().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn cmd_setup(bitstream: Option<PathBuf>, ram_disk: Option<PathBuf>) -> Result<()> {
    let mut config = SetupConfig::from_env();
    if let Some(path) = bitstream {
        config.bitstream = path;
    }
    if let Some(path) = ram_disk {
        config.ram_disk = path;
    }
    BoardSetup::new(config).run()
}

fn cmd_info() {
    println!("Channel  Config        Status        FIFO");
    for channel in Channel::ALL {
        let w = channel.windows();
        println!(
            "   {channel}     {:#010x}    {:#010x}    {:#010x}",
            w.config, w.status, w.fifo
        );
    }
    println!();
    println!(
        "Config registers : reset@{:#04x} gpio@{:#04x} freq@{:#04x} sync@{:#04x} rate@{:#04x}",
        regs::RESET,
        regs::GPIO,
        regs::FREQ,
        regs::SYNC,
        regs::RATE
    );
    println!("Status registers : fifo_count@{:#04x}", regs::FIFO_COUNT);
    println!(
        "FIFO             : {} bytes per read, fill >= {}, reset >= {}, poll {} us",
        fifo::CHUNK_BYTES,
        fifo::FILL_THRESHOLD,
        fifo::OVERFLOW_THRESHOLD,
        fifo::DEFAULT_POLL_INTERVAL_US
    );
    println!(
        "NCO              : {} MHz clock, {}-bit accumulator, {:.4} Hz/LSB",
        nco::CLOCK_HZ / 1e6,
        nco::PHASE_BITS,
        nco::word_frequency(1)
    );
    println!();
    println!("Rate presets:");
    for preset in SampleRate::ALL {
        println!(
            "  rate {:>4}  {:>9}  max capture {:>6.1} s",
            preset.decimation(),
            preset.to_string(),
            preset.max_duration().as_secs_f64()
        );
    }
}

fn cmd_decode(file: &Path, rate: Option<u16>) -> Result<()> {
    let capture = Capture::open(file)?;
    let iq = capture.samples()?;
    let summary = capture.summarize(&iq);

    println!("File          : {}", file.display());
    println!("Size          : {} bytes", capture.len());
    println!("Chunks        : {}", summary.chunks);
    if summary.partial_chunk_bytes > 0 {
        println!("Truncated tail: {} bytes", summary.partial_chunk_bytes);
    }
    println!("Samples       : {}", summary.samples);
    if let Some(preset) = rate.and_then(SampleRate::from_decimation) {
        println!(
            "Duration      : {:.6} s at {preset}",
            iq.duration(preset.samples_per_second()).as_secs_f64()
        );
    } else if let Some(rate) = rate {
        warn!("Rate {rate} is not a characterised preset; duration unknown");
    }
    println!("Mean |IQ|     : {:.6}", summary.mean_magnitude);
    println!("Peak |IQ|     : {:.6}", summary.peak_magnitude);
    Ok(())
}

//! On-board setup
//!
//! Prepares a freshly booted board for acquisition: loads the SDR transceiver
//! bitstream into the FPGA and mounts the RAM disk that captures are written
//! to. Must run on the board itself, as root.

use anyhow::{bail, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Default SDR transceiver bitstream on the SD card.
pub const DEFAULT_BITSTREAM: &str = "/media/mmcblk0p1/apps/sdr_transceiver/sdr_transceiver.bit";

/// Zynq FPGA configuration device.
pub const DEFAULT_FPGA_DEVICE: &str = "/dev/xdevcfg";

/// Default RAM disk mount point.
pub const DEFAULT_RAM_DISK: &str = "/mnt/RPIQA";

/// Default RAM disk size, as passed to `mount -o size=`.
pub const DEFAULT_RAM_DISK_SIZE: &str = "128m";

/// Environment override for [`SetupConfig::bitstream`].
pub const ENV_BITSTREAM: &str = "RPIQA_BITSTREAM";

/// Environment override for [`SetupConfig::ram_disk`].
pub const ENV_RAM_DISK: &str = "RPIQA_RAM_DISK";

/// Board setup locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    /// FPGA bitstream to load
    pub bitstream: PathBuf,
    /// FPGA configuration device
    pub fpga_device: PathBuf,
    /// tmpfs mount point for captures
    pub ram_disk: PathBuf,
    /// tmpfs size
    pub ram_disk_size: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            bitstream: PathBuf::from(DEFAULT_BITSTREAM),
            fpga_device: PathBuf::from(DEFAULT_FPGA_DEVICE),
            ram_disk: PathBuf::from(DEFAULT_RAM_DISK),
            ram_disk_size: DEFAULT_RAM_DISK_SIZE.to_string(),
        }
    }
}

impl SetupConfig {
    /// Defaults, overridden by `RPIQA_BITSTREAM` / `RPIQA_RAM_DISK` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(ENV_BITSTREAM) {
            config.bitstream = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var(ENV_RAM_DISK) {
            config.ram_disk = PathBuf::from(path);
        }
        config
    }
}

/// Board setup manager
pub struct BoardSetup {
    config: SetupConfig,
}

impl BoardSetup {
    /// Create a setup manager
    pub fn new(config: SetupConfig) -> Self {
        Self { config }
    }

    /// Run complete board setup
    ///
    /// # Errors
    ///
    /// Returns error if the bitstream is missing, the FPGA cannot be
    /// programmed or the RAM disk cannot be mounted.
    pub fn run(&self) -> Result<()> {
        info!("RPIQA board setup");

        self.load_bitstream()?;
        self.ensure_ram_disk()?;

        info!("Board setup complete!");
        Ok(())
    }

    /// Program the FPGA with the SDR transceiver image
    ///
    /// # Errors
    ///
    /// Returns error if the bitstream is missing or cannot be copied to the
    /// configuration device.
    pub fn load_bitstream(&self) -> Result<()> {
        let bitstream = &self.config.bitstream;
        if !bitstream.is_file() {
            bail!(
                "SDR transceiver bitstream not found at {}. Is the Alpine SDR image installed?",
                bitstream.display()
            );
        }

        info!(
            "Loading {} into {}",
            bitstream.display(),
            self.config.fpga_device.display()
        );

        let mut src = File::open(bitstream)
            .with_context(|| format!("Cannot open bitstream {}", bitstream.display()))?;
        let mut dst = OpenOptions::new()
            .write(true)
            .open(&self.config.fpga_device)
            .with_context(|| {
                format!(
                    "Cannot open FPGA device {} (need root?)",
                    self.config.fpga_device.display()
                )
            })?;
        let written = std::io::copy(&mut src, &mut dst).context("Programming FPGA failed")?;

        info!("Bitstream loaded ({written} bytes)");
        Ok(())
    }

    /// Mount the tmpfs capture directory unless already mounted
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or `mount` fails.
    pub fn ensure_ram_disk(&self) -> Result<()> {
        let dir = &self.config.ram_disk;

        let mounts = fs::read_to_string("/proc/mounts").unwrap_or_else(|e| {
            warn!("Cannot read /proc/mounts: {e}");
            String::new()
        });
        if is_mount_point(&mounts, dir) {
            info!("RAM disk {} already mounted", dir.display());
            return Ok(());
        }

        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create {}", dir.display()))?;

        let size = format!("size={}", self.config.ram_disk_size);
        debug!("mount -t tmpfs -o {size} tmpfs {}", dir.display());
        let output = Command::new("mount")
            .args(["-t", "tmpfs", "-o", size.as_str(), "tmpfs"])
            .arg(dir)
            .output()
            .context("Cannot run mount")?;

        if !output.status.success() {
            bail!(
                "Error mounting RAM disk {}: {}",
                dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        info!("RAM disk {} mounted ({})", dir.display(), self.config.ram_disk_size);
        Ok(())
    }

    /// Setup locations
    pub fn config(&self) -> &SetupConfig {
        &self.config
    }
}

impl Default for BoardSetup {
    fn default() -> Self {
        Self::new(SetupConfig::from_env())
    }
}

/// Whether `dir` appears as a mount point in `/proc/mounts` content
fn is_mount_point(mounts: &str, dir: &Path) -> bool {
    mounts
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|mount_point| Path::new(mount_point) == dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTS: &str = "\
/dev/root / ext4 rw,relatime 0 0
tmpfs /mnt/RPIQA tmpfs rw,relatime,size=131072k 0 0
proc /proc proc rw 0 0
";

    #[test]
    fn mount_point_detection() {
        assert!(is_mount_point(MOUNTS, Path::new("/mnt/RPIQA")));
        assert!(is_mount_point(MOUNTS, Path::new("/mnt/RPIQA/")));
        assert!(!is_mount_point(MOUNTS, Path::new("/mnt")));
        assert!(!is_mount_point("", Path::new("/mnt/RPIQA")));
    }

    #[test]
    fn missing_bitstream_fails_before_fpga_write() {
        let setup = BoardSetup::new(SetupConfig {
            bitstream: PathBuf::from("/nonexistent/sdr_transceiver.bit"),
            fpga_device: PathBuf::from("/nonexistent/xdevcfg"),
            ..SetupConfig::default()
        });
        let err = setup.load_bitstream().unwrap_err();
        assert!(err.to_string().contains("bitstream not found"));
    }

    #[test]
    fn bitstream_copied_to_fpga_device() {
        let dir = std::env::temp_dir().join(format!("rpiqa-setup-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let bit = dir.join("image.bit");
        let dev = dir.join("xdevcfg");
        fs::write(&bit, b"bitstream").unwrap();
        fs::write(&dev, b"").unwrap();

        let setup = BoardSetup::new(SetupConfig {
            bitstream: bit,
            fpga_device: dev.clone(),
            ..SetupConfig::default()
        });
        setup.load_bitstream().unwrap();
        assert_eq!(fs::read(&dev).unwrap(), b"bitstream");

        fs::remove_dir_all(&dir).unwrap();
    }
}

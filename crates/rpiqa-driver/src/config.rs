//! Device and output locations
//!
//! Defaults match the board image: physical memory through `/dev/mem`, samples
//! written to the tmpfs RAM disk so acquisition never waits on the SD card.

use std::path::PathBuf;

/// Default physical memory device.
pub const DEFAULT_MEM_DEVICE: &str = "/dev/mem";

/// Default capture destination.
pub const DEFAULT_OUTPUT: &str = "/mnt/RPIQA/output.bin";

/// Environment override for [`DeviceConfig::mem_device`].
pub const ENV_MEM_DEVICE: &str = "RPIQA_MEM_DEVICE";

/// Environment override for [`DeviceConfig::output_path`].
pub const ENV_OUTPUT: &str = "RPIQA_OUTPUT";

/// Where the driver finds hardware and puts samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device granting read/write mappings of physical addresses
    pub mem_device: PathBuf,

    /// Capture file written by acquisition
    pub output_path: PathBuf,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mem_device: PathBuf::from(DEFAULT_MEM_DEVICE),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl DeviceConfig {
    /// Defaults, overridden by `RPIQA_MEM_DEVICE` / `RPIQA_OUTPUT` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_MEM_DEVICE).filter(|v| !v.is_empty()) {
            config.mem_device = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_OUTPUT).filter(|v| !v.is_empty()) {
            config.output_path = PathBuf::from(path);
        }
        tracing::debug!(
            "Device config: mem={}, output={}",
            config.mem_device.display(),
            config.output_path.display()
        );
        config
    }

    /// Replace the output path.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DeviceConfig::default();
        assert_eq!(c.mem_device, PathBuf::from("/dev/mem"));
        assert_eq!(c.output_path, PathBuf::from("/mnt/RPIQA/output.bin"));
    }

    #[test]
    fn lookup_overrides() {
        let c = DeviceConfig::from_lookup(|k| match k {
            ENV_MEM_DEVICE => Some("/tmp/fake-mem".into()),
            ENV_OUTPUT => Some(String::new()),
            _ => None,
        });
        assert_eq!(c.mem_device, PathBuf::from("/tmp/fake-mem"));
        assert_eq!(c.output_path, PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn explicit_output_wins() {
        let c = DeviceConfig::default().with_output("/tmp/capture.bin");
        assert_eq!(c.output_path, PathBuf::from("/tmp/capture.bin"));
    }
}

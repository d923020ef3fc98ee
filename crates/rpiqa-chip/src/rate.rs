//! Decimation presets and capture duration planning.
//!
//! The CIC/FIR chain decimates the 125 MSPS ADC stream by `rate`; these are the
//! settings that were measured on the board. Other values are accepted by the
//! hardware but their output rate is not characterised.
//!
//! Each output sample is an interleaved `(I, Q)` pair of little-endian `f32`,
//! [`BYTES_PER_SAMPLE`] bytes in total.

use crate::fifo::CHUNK_BYTES;
use std::time::Duration;

/// Bytes per complex output sample.
pub const BYTES_PER_SAMPLE: usize = 8;

/// Capacity reserved for captures on the RAM disk, in bytes.
pub const CAPTURE_CAPACITY_BYTES: f64 = 100.0e6;

/// Characterised decimation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleRate {
    /// 50 kSPS.
    Ksps50,
    /// 100 kSPS.
    Ksps100,
    /// 250 kSPS.
    Ksps250,
    /// 500 kSPS.
    Ksps500,
    /// 1250 kSPS.
    Ksps1250,
}

impl SampleRate {
    /// All presets, slowest first.
    pub const ALL: [Self; 5] = [
        Self::Ksps50,
        Self::Ksps100,
        Self::Ksps250,
        Self::Ksps500,
        Self::Ksps1250,
    ];

    /// Value for the `rate` register.
    #[must_use]
    pub const fn decimation(self) -> u16 {
        match self {
            Self::Ksps50 => 1250,
            Self::Ksps100 => 625,
            Self::Ksps250 => 250,
            Self::Ksps500 => 125,
            Self::Ksps1250 => 50,
        }
    }

    /// Output samples per second.
    #[must_use]
    pub const fn samples_per_second(self) -> u32 {
        match self {
            Self::Ksps50 => 50_000,
            Self::Ksps100 => 100_000,
            Self::Ksps250 => 250_000,
            Self::Ksps500 => 500_000,
            Self::Ksps1250 => 1_250_000,
        }
    }

    /// Preset matching a raw `rate` register value, if characterised.
    #[must_use]
    pub fn from_decimation(rate: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.decimation() == rate)
    }

    /// FIFO drains needed to cover `duration` at this rate.
    ///
    /// `ceil(8 * seconds * sps / 16384)`; the capture ends on a chunk boundary,
    /// so the real duration is usually slightly longer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn chunks_for(self, duration: Duration) -> u64 {
        let bytes = BYTES_PER_SAMPLE as f64
            * duration.as_secs_f64()
            * f64::from(self.samples_per_second());
        (bytes / CHUNK_BYTES as f64).ceil() as u64
    }

    /// Longest capture that fits in [`CAPTURE_CAPACITY_BYTES`].
    #[must_use]
    pub fn max_duration(self) -> Duration {
        Duration::from_secs_f64(
            CAPTURE_CAPACITY_BYTES
                / (BYTES_PER_SAMPLE as f64 * f64::from(self.samples_per_second())),
        )
    }

    /// Time covered by one drained chunk.
    #[must_use]
    pub fn chunk_duration(self) -> Duration {
        Duration::from_secs_f64(
            (CHUNK_BYTES / BYTES_PER_SAMPLE) as f64 / f64::from(self.samples_per_second()),
        )
    }
}

impl std::fmt::Display for SampleRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kSPS", self.samples_per_second() / 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimation_times_rate_is_clock() {
        for p in SampleRate::ALL {
            assert_eq!(
                u64::from(p.decimation()) * u64::from(p.samples_per_second()),
                62_500_000
            );
        }
    }

    #[test]
    fn lookup_by_decimation() {
        assert_eq!(SampleRate::from_decimation(250), Some(SampleRate::Ksps250));
        assert_eq!(SampleRate::from_decimation(50), Some(SampleRate::Ksps1250));
        assert_eq!(SampleRate::from_decimation(251), None);
    }

    #[test]
    fn chunk_planning() {
        // 1 s at 250 kSPS = 2 MB = 122.07 chunks
        assert_eq!(SampleRate::Ksps250.chunks_for(Duration::from_secs(1)), 123);
        assert_eq!(SampleRate::Ksps50.chunks_for(Duration::ZERO), 0);
        // 2048 samples per chunk at 50 kSPS = 40.96 ms
        let one = SampleRate::Ksps50.chunk_duration();
        assert_eq!(SampleRate::Ksps50.chunks_for(one), 1);
    }

    #[test]
    fn max_duration_fills_capacity() {
        let d = SampleRate::Ksps250.max_duration();
        assert!((d.as_secs_f64() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn display() {
        assert_eq!(SampleRate::Ksps1250.to_string(), "1250 kSPS");
    }
}

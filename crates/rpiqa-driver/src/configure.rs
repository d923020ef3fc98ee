//! Configuration writer
//!
//! Arms a channel by programming the NCO phase increment, releasing sync and
//! setting the decimation divider. The pipeline reset is left alone; the
//! acquisition loop strobes it when it starts draining.

use crate::backend::RxRegisters;
use crate::error::{RpiqaError, Result};
use rpiqa_chip::{nco, regs, SampleRate};
use tracing::{debug, info, warn};

/// Receive settings for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RxConfig {
    /// Down-conversion frequency in Hz, single precision as the board
    /// firmware has always taken it
    pub frequency_hz: f32,

    /// Decimation divider written to `rate`
    pub rate: u16,
}

impl RxConfig {
    /// Create settings from a frequency and a raw divider
    ///
    /// The nominal tuning range is 0 to 60 MHz; values outside it are
    /// programmed anyway and only logged.
    ///
    /// # Errors
    ///
    /// Returns [`RpiqaError::InvalidArgument`] if the frequency is not finite.
    pub fn new(frequency_hz: f32, rate: u16) -> Result<Self> {
        if !frequency_hz.is_finite() {
            return Err(RpiqaError::invalid_argument(format!(
                "modulation frequency {frequency_hz} is not a finite number"
            )));
        }
        if !nco::is_nominal(f64::from(frequency_hz)) {
            warn!(
                "Modulation frequency {frequency_hz} Hz outside nominal 0..={} Hz",
                nco::NOMINAL_MAX_HZ
            );
        }
        Ok(Self { frequency_hz, rate })
    }

    /// Settings from a characterised preset
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_preset(frequency_hz: f32, preset: SampleRate) -> Result<Self> {
        Self::new(frequency_hz, preset.decimation())
    }

    /// NCO phase increment for [`Self::frequency_hz`]
    ///
    /// The `f32` value is widened before the division, so inputs that are not
    /// representable in single precision round first.
    pub fn freq_word(&self) -> u32 {
        nco::freq_word(f64::from(self.frequency_hz))
    }

    /// Preset matching [`Self::rate`], if characterised
    pub fn sample_rate(&self) -> Option<SampleRate> {
        SampleRate::from_decimation(self.rate)
    }
}

/// Program `config` into the channel behind `regs`
///
/// Writes `freq`, then `sync = 0`, then `rate`. Idempotent.
pub fn configure<R: RxRegisters + ?Sized>(regs: &mut R, config: &RxConfig) {
    let word = config.freq_word();

    info!(
        "Configuring channel {} ({}): {} Hz (word {word:#010x}, actual {:.3} Hz), rate {}",
        regs.channel(),
        regs.backend_type(),
        config.frequency_hz,
        nco::word_frequency(word),
        config.rate,
    );

    regs.write_freq(word);
    debug!("freq <- {word:#010x}");

    regs.write_sync(regs::sync::FREE_RUN);
    debug!("sync <- {}", regs::sync::FREE_RUN);

    regs.write_rate(config.rate);
    debug!("rate <- {}", config.rate);

    match config.sample_rate() {
        Some(preset) => debug!("rate {} is the {preset} preset", config.rate),
        None => debug!("rate {} is not a characterised preset", config.rate),
    }
}

//! Numerically-controlled oscillator arithmetic.
//!
//! The down-converter NCO runs from the 125 MHz ADC clock with a 30-bit phase
//! accumulator, so one LSB of the increment is `125e6 / 2^30` ≈ 0.116 Hz.

/// ADC / NCO clock in Hz.
pub const CLOCK_HZ: f64 = 125.0e6;

/// Width of the phase accumulator.
pub const PHASE_BITS: u32 = 30;

/// Upper end of the nominal tuning range (not enforced by hardware).
pub const NOMINAL_MAX_HZ: f64 = 60.0e6;

/// Phase increment for a modulation frequency.
///
/// `floor(f / 125e6 * 2^30 + 0.5)`, truncated to the low 32 bits. Negative and
/// NaN inputs produce 0.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn freq_word(frequency_hz: f64) -> u32 {
    let word = (frequency_hz / CLOCK_HZ * (1u64 << PHASE_BITS) as f64 + 0.5).floor();
    word as u64 as u32
}

/// Frequency the NCO actually produces for a given increment.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn word_frequency(word: u32) -> f64 {
    f64::from(word) * CLOCK_HZ / (1u64 << PHASE_BITS) as f64
}

/// Whether a requested frequency lies in the nominal tuning range.
#[must_use]
pub fn is_nominal(frequency_hz: f64) -> bool {
    (0.0..=NOMINAL_MAX_HZ).contains(&frequency_hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_zero() {
        assert_eq!(freq_word(0.0), 0);
    }

    #[test]
    fn known_words() {
        // 1 MHz: 2^30 / 125 = 8589934.592 -> 8589935
        assert_eq!(freq_word(1.0e6), 8_589_935);
        // 62.5 MHz is exactly half the accumulator range.
        assert_eq!(freq_word(62.5e6), 1 << 29);
        assert_eq!(freq_word(125.0e6 / f64::from(1u32 << 30)), 1);
    }

    #[test]
    #[allow(clippy::excessive_precision)]
    fn single_precision_input_parity() {
        // The frequency arrives as f32; 20000001 Hz is stored as 20000000.0.
        let f = 20_000_001.0f32;
        assert_eq!(freq_word(f64::from(f)), 171_798_692);
        assert_eq!(freq_word(20_000_001.0), 171_798_700);
    }

    #[test]
    fn rounds_half_up() {
        let lsb = CLOCK_HZ / f64::from(1u32 << 30);
        assert_eq!(freq_word(lsb * 0.5), 1);
        assert_eq!(freq_word(lsb * 0.49), 0);
        assert_eq!(freq_word(lsb * 2.5), 3);
    }

    #[test]
    fn monotonic_over_clock_range() {
        let mut prev = 0;
        let mut f = 0.0;
        while f < CLOCK_HZ {
            let w = freq_word(f);
            assert!(w >= prev, "freq_word({f}) = {w} < {prev}");
            prev = w;
            f += 97_531.7;
        }
        assert!(prev <= 1 << PHASE_BITS);
    }

    #[test]
    fn out_of_domain_inputs() {
        assert_eq!(freq_word(-5.0e6), 0);
        assert_eq!(freq_word(f64::NAN), 0);
        // 4 * 125 MHz wraps the 32-bit word exactly.
        assert_eq!(freq_word(500.0e6), 0);
    }

    #[test]
    fn word_frequency_within_one_lsb() {
        for f in [0.0, 1.0e6, 10.7e6, 59.999e6] {
            let back = word_frequency(freq_word(f));
            assert!((back - f).abs() <= CLOCK_HZ / f64::from(1u32 << 30));
        }
    }

    #[test]
    fn nominal_range() {
        assert!(is_nominal(0.0));
        assert!(is_nominal(60.0e6));
        assert!(!is_nominal(60.1e6));
        assert!(!is_nominal(-1.0));
    }
}

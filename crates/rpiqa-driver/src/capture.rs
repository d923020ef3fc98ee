//! Capture file reader
//!
//! A capture is the raw concatenation of drained FIFO chunks. The receiver
//! packs each output sample as two little-endian `f32`, in-phase first, so the
//! file decodes to interleaved `(I, Q)` pairs. There is no header, framing or
//! checksum; a run killed mid-write leaves a truncated final chunk.

use crate::error::{RpiqaError, Result};
use bytes::Bytes;
use rpiqa_chip::fifo::CHUNK_BYTES;
use rpiqa_chip::rate::BYTES_PER_SAMPLE;
use std::path::Path;
use std::time::Duration;

/// Raw capture contents
#[derive(Debug, Clone)]
pub struct Capture {
    data: Bytes,
}

/// De-interleaved quadrature samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IqSamples {
    /// In-phase component
    pub i: Vec<f32>,
    /// Quadrature component
    pub q: Vec<f32>,
}

/// Shape and level of a capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSummary {
    /// Complete chunks
    pub chunks: usize,
    /// Bytes of a trailing incomplete chunk
    pub partial_chunk_bytes: usize,
    /// Complex samples
    pub samples: usize,
    /// Mean of `sqrt(I² + Q²)`
    pub mean_magnitude: f32,
    /// Largest `sqrt(I² + Q²)`
    pub peak_magnitude: f32,
}

impl Capture {
    /// Read a capture file
    ///
    /// # Errors
    ///
    /// Returns [`RpiqaError::CaptureRead`] if the file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| RpiqaError::capture_read(path, e))?;
        tracing::debug!("Read capture {} ({} bytes)", path.display(), data.len());
        Ok(Self::from_bytes(data))
    }

    /// Wrap bytes already in memory
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Total size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the capture holds no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Complete chunks, in acquisition order (zero-copy)
    pub fn chunks(&self) -> impl Iterator<Item = Bytes> + '_ {
        (0..self.data.len() / CHUNK_BYTES)
            .map(|n| self.data.slice(n * CHUNK_BYTES..(n + 1) * CHUNK_BYTES))
    }

    /// Bytes after the last complete chunk
    pub fn partial_chunk_bytes(&self) -> usize {
        self.data.len() % CHUNK_BYTES
    }

    /// Decode to I/Q samples
    ///
    /// # Errors
    ///
    /// See [`decode_capture`].
    pub fn samples(&self) -> Result<IqSamples> {
        decode_capture(&self.data)
    }

    /// Decode and summarise
    ///
    /// # Errors
    ///
    /// See [`decode_capture`].
    pub fn summary(&self) -> Result<CaptureSummary> {
        Ok(self.summarize(&self.samples()?))
    }

    /// Summarise samples already decoded from this capture
    pub fn summarize(&self, iq: &IqSamples) -> CaptureSummary {
        let (sum, peak) = iq.magnitudes().fold((0.0f64, 0.0f32), |(sum, peak), m| {
            (sum + f64::from(m), peak.max(m))
        });
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let mean_magnitude = if iq.is_empty() {
            0.0
        } else {
            (sum / iq.len() as f64) as f32
        };

        CaptureSummary {
            chunks: self.data.len() / CHUNK_BYTES,
            partial_chunk_bytes: self.partial_chunk_bytes(),
            samples: iq.len(),
            mean_magnitude,
            peak_magnitude: peak,
        }
    }
}

/// Decode interleaved little-endian `(I, Q)` pairs
///
/// # Errors
///
/// Returns [`RpiqaError::MalformedCapture`] if the size is not a whole
/// number of samples.
pub fn decode_capture(bytes: &[u8]) -> Result<IqSamples> {
    if bytes.len() % BYTES_PER_SAMPLE != 0 {
        return Err(RpiqaError::malformed_capture(format!(
            "{} bytes is not a multiple of the {BYTES_PER_SAMPLE}-byte sample",
            bytes.len()
        )));
    }

    let n = bytes.len() / BYTES_PER_SAMPLE;
    let mut iq = IqSamples {
        i: Vec::with_capacity(n),
        q: Vec::with_capacity(n),
    };
    for sample in bytes.chunks_exact(BYTES_PER_SAMPLE) {
        iq.i.push(f32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]));
        iq.q.push(f32::from_le_bytes([sample[4], sample[5], sample[6], sample[7]]));
    }
    Ok(iq)
}

impl IqSamples {
    /// Number of complex samples
    pub fn len(&self) -> usize {
        self.i.len()
    }

    /// Whether there are no samples
    pub fn is_empty(&self) -> bool {
        self.i.is_empty()
    }

    /// `sqrt(I² + Q²)` per sample
    pub fn magnitudes(&self) -> impl Iterator<Item = f32> + '_ {
        self.i.iter().zip(&self.q).map(|(i, q)| i.hypot(*q))
    }

    /// Sample times in seconds for a given output rate
    #[allow(clippy::cast_precision_loss)]
    pub fn time_axis(&self, samples_per_second: u32) -> Vec<f64> {
        let dt = 1.0 / f64::from(samples_per_second);
        (0..self.len()).map(|n| n as f64 * dt).collect()
    }

    /// Duration covered at a given output rate
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self, samples_per_second: u32) -> Duration {
        Duration::from_secs_f64(self.len() as f64 / f64::from(samples_per_second))
    }
}

// threshold.rs — Binary masks from per-pixel intensity.
//
// Two steps per pixel:
//   1. Reduce all channels to one intensity: floor(sum / channels).
//   2. Compare against the threshold: 255 if the predicate holds, else 0.
//
// The output is always a single-channel GRAY buffer with the same width
// and height as the input, whatever the input's channel count or model.

use crate::buffer::{ColorModel, PixelBuffer};
use crate::error::Result;

/// Comparison applied between a pixel's intensity and the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl Predicate {
    #[inline]
    pub fn holds(self, intensity: u8, threshold: u8) -> bool {
        match self {
            Predicate::Less => intensity < threshold,
            Predicate::LessEqual => intensity <= threshold,
            Predicate::Greater => intensity > threshold,
            Predicate::GreaterEqual => intensity >= threshold,
            Predicate::Equal => intensity == threshold,
            Predicate::NotEqual => intensity != threshold,
        }
    }
}

/// Truncating channel mean. `samples` is never empty (channels >= 1).
#[inline]
fn mean_intensity(samples: &[u8]) -> u8 {
    let sum: u64 = samples.iter().map(|&s| u64::from(s)).sum();
    // The mean of u8 values is itself <= 255.
    (sum / samples.len() as u64) as u8
}

impl PixelBuffer {
    /// Intensity of the pixel at `(x, y)`: the truncated mean of its channels.
    pub fn intensity(&self, x: usize, y: usize) -> Result<u8> {
        Ok(mean_intensity(self.pixel(x, y)?))
    }

    /// Single-channel mask: 255 where `intensity <predicate> threshold`, 0 elsewhere.
    pub fn threshold(&self, predicate: Predicate, threshold: u8) -> PixelBuffer {
        let mask: Vec<u8> = self
            .as_slice()
            .chunks_exact(self.channels())
            .map(|px| {
                if predicate.holds(mean_intensity(px), threshold) {
                    255
                } else {
                    0
                }
            })
            .collect();
        PixelBuffer::from_parts(self.width(), self.height(), 1, ColorModel::Gray, mask)
    }

    pub fn threshold_less(&self, threshold: u8) -> PixelBuffer {
        self.threshold(Predicate::Less, threshold)
    }

    pub fn threshold_less_equal(&self, threshold: u8) -> PixelBuffer {
        self.threshold(Predicate::LessEqual, threshold)
    }

    pub fn threshold_greater(&self, threshold: u8) -> PixelBuffer {
        self.threshold(Predicate::Greater, threshold)
    }

    pub fn threshold_greater_equal(&self, threshold: u8) -> PixelBuffer {
        self.threshold(Predicate::GreaterEqual, threshold)
    }

    pub fn threshold_equal(&self, threshold: u8) -> PixelBuffer {
        self.threshold(Predicate::Equal, threshold)
    }

    pub fn threshold_not_equal(&self, threshold: u8) -> PixelBuffer {
        self.threshold(Predicate::NotEqual, threshold)
    }
}

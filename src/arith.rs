// arith.rs — Saturating element-wise arithmetic on PixelBuffer.
//
// Every operator works on samples widened to a signed integer and clamps
// the result back into [0, 255]. Nothing wraps.
//
// Three operand shapes are supported for add / subtract / abs-diff:
//
//   image  ⊕ image   both sides zero-padded to the pairwise max extent
//   image  ⊕ scalar  one integer applied to every sample
//   image  ⊕ pixel   one value per channel, repeated at every position
//
// Each comes in a non-mutating form returning a new buffer and an
// `_assign` form that mutates the receiver and returns `&mut Self` so
// calls can be chained.

use std::borrow::Cow;
use std::ops;

use log::trace;

use crate::buffer::PixelBuffer;
use crate::error::{PixelError, Result};

// ---------------------------------------------------------------------------
// Saturating sample rules
// ---------------------------------------------------------------------------

/// Clamp a widened intermediate into the 8-bit range.
#[inline]
fn saturate(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

/// Clamp, then round half away from zero. NaN maps to 0 through the cast.
#[inline]
fn saturate_f64(v: f64) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

/// The three saturating binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `clamp(a + b, 0, 255)`
    Add,
    /// `clamp(a - b, 0, 255)`. Floors at 0, so it is not antisymmetric.
    Subtract,
    /// `clamp(|a - b|, 0, 255)`
    AbsDiff,
}

impl BinaryOp {
    /// Combine one sample with one operand value.
    #[inline]
    pub fn apply(self, a: u8, b: i32) -> u8 {
        let a = i64::from(a);
        let b = i64::from(b);
        match self {
            BinaryOp::Add => saturate(a + b),
            BinaryOp::Subtract => saturate(a - b),
            BinaryOp::AbsDiff => saturate((a - b).abs()),
        }
    }
}

// ---------------------------------------------------------------------------
// Generic entry points
// ---------------------------------------------------------------------------

impl PixelBuffer {
    fn check_compatible(&self, other: &PixelBuffer) -> Result<()> {
        if self.channels() != other.channels() || self.model() != other.model() {
            return Err(PixelError::IncompatibleOperands {
                left_channels: self.channels(),
                right_channels: other.channels(),
                left_model: self.model().clone(),
                right_model: other.model().clone(),
            });
        }
        Ok(())
    }

    fn check_pixel_arity(&self, pixel: &[u8]) -> Result<()> {
        if pixel.len() != self.channels() {
            return Err(PixelError::PixelArityMismatch {
                expected: self.channels(),
                actual: pixel.len(),
            });
        }
        Ok(())
    }

    /// `self ⊕ other` into a new buffer of the pairwise max extent.
    ///
    /// Fails with `IncompatibleOperands` if channel counts or models differ.
    pub fn combine(&self, other: &PixelBuffer, op: BinaryOp) -> Result<PixelBuffer> {
        let mut out = self.clone();
        out.combine_assign(other, op)?;
        Ok(out)
    }

    /// In-place `self ⊕= other`. The receiver grows to the pairwise max
    /// extent; `other` is padded on a private copy when it is smaller.
    ///
    /// Fails with `InvalidDimensions` when the sample count of the max extent
    /// overflows `usize`. The receiver is untouched on every error.
    pub fn combine_assign(&mut self, other: &PixelBuffer, op: BinaryOp) -> Result<&mut Self> {
        self.check_compatible(other)?;
        let nw = self.width().max(other.width());
        let nh = self.height().max(other.height());
        trace!("{op:?}: {} with {} -> {nw}x{nh}", self, other);

        // Padding `other` first validates the extent before `self` changes.
        let rhs = if other.width() == nw && other.height() == nh {
            Cow::Borrowed(other)
        } else {
            Cow::Owned(other.enlarged_to(nw, nh)?)
        };
        self.enlarge_to(nw, nh)?;

        for (a, &b) in self.as_mut_slice().iter_mut().zip(rhs.as_slice()) {
            *a = op.apply(*a, i32::from(b));
        }
        Ok(self)
    }

    /// `self ⊕ value` for every sample of every channel.
    pub fn combine_scalar(&self, value: i32, op: BinaryOp) -> PixelBuffer {
        let mut out = self.clone();
        out.combine_scalar_assign(value, op);
        out
    }

    pub fn combine_scalar_assign(&mut self, value: i32, op: BinaryOp) -> &mut Self {
        for s in self.as_mut_slice() {
            *s = op.apply(*s, value);
        }
        self
    }

    /// `self ⊕ pixel`, where `pixel[c]` is applied to channel `c` of every
    /// position. Fails with `PixelArityMismatch` unless
    /// `pixel.len() == channels`.
    pub fn combine_pixel(&self, pixel: &[u8], op: BinaryOp) -> Result<PixelBuffer> {
        let mut out = self.clone();
        out.combine_pixel_assign(pixel, op)?;
        Ok(out)
    }

    pub fn combine_pixel_assign(&mut self, pixel: &[u8], op: BinaryOp) -> Result<&mut Self> {
        self.check_pixel_arity(pixel)?;
        let channels = self.channels();
        for px in self.as_mut_slice().chunks_exact_mut(channels) {
            for (s, &p) in px.iter_mut().zip(pixel) {
                *s = op.apply(*s, i32::from(p));
            }
        }
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Named forms
    // -----------------------------------------------------------------------

    pub fn add(&self, other: &PixelBuffer) -> Result<PixelBuffer> {
        self.combine(other, BinaryOp::Add)
    }

    pub fn add_assign(&mut self, other: &PixelBuffer) -> Result<&mut Self> {
        self.combine_assign(other, BinaryOp::Add)
    }

    pub fn add_scalar(&self, value: i32) -> PixelBuffer {
        self.combine_scalar(value, BinaryOp::Add)
    }

    pub fn add_scalar_assign(&mut self, value: i32) -> &mut Self {
        self.combine_scalar_assign(value, BinaryOp::Add)
    }

    pub fn add_pixel(&self, pixel: &[u8]) -> Result<PixelBuffer> {
        self.combine_pixel(pixel, BinaryOp::Add)
    }

    pub fn add_pixel_assign(&mut self, pixel: &[u8]) -> Result<&mut Self> {
        self.combine_pixel_assign(pixel, BinaryOp::Add)
    }

    /// Saturating subtract; results never drop below 0.
    pub fn subtract(&self, other: &PixelBuffer) -> Result<PixelBuffer> {
        self.combine(other, BinaryOp::Subtract)
    }

    pub fn subtract_assign(&mut self, other: &PixelBuffer) -> Result<&mut Self> {
        self.combine_assign(other, BinaryOp::Subtract)
    }

    pub fn subtract_scalar(&self, value: i32) -> PixelBuffer {
        self.combine_scalar(value, BinaryOp::Subtract)
    }

    pub fn subtract_scalar_assign(&mut self, value: i32) -> &mut Self {
        self.combine_scalar_assign(value, BinaryOp::Subtract)
    }

    pub fn subtract_pixel(&self, pixel: &[u8]) -> Result<PixelBuffer> {
        self.combine_pixel(pixel, BinaryOp::Subtract)
    }

    pub fn subtract_pixel_assign(&mut self, pixel: &[u8]) -> Result<&mut Self> {
        self.combine_pixel_assign(pixel, BinaryOp::Subtract)
    }

    /// Per-sample absolute difference.
    pub fn abs_diff(&self, other: &PixelBuffer) -> Result<PixelBuffer> {
        self.combine(other, BinaryOp::AbsDiff)
    }

    pub fn abs_diff_assign(&mut self, other: &PixelBuffer) -> Result<&mut Self> {
        self.combine_assign(other, BinaryOp::AbsDiff)
    }

    pub fn abs_diff_scalar(&self, value: i32) -> PixelBuffer {
        self.combine_scalar(value, BinaryOp::AbsDiff)
    }

    pub fn abs_diff_scalar_assign(&mut self, value: i32) -> &mut Self {
        self.combine_scalar_assign(value, BinaryOp::AbsDiff)
    }

    pub fn abs_diff_pixel(&self, pixel: &[u8]) -> Result<PixelBuffer> {
        self.combine_pixel(pixel, BinaryOp::AbsDiff)
    }

    pub fn abs_diff_pixel_assign(&mut self, pixel: &[u8]) -> Result<&mut Self> {
        self.combine_pixel_assign(pixel, BinaryOp::AbsDiff)
    }

    // -----------------------------------------------------------------------
    // Multiply / divide by a real factor
    // -----------------------------------------------------------------------

    /// Each sample becomes `clamp(round(sample * factor), 0, 255)`.
    pub fn scale(&self, factor: f64) -> PixelBuffer {
        let mut out = self.clone();
        out.scale_assign(factor);
        out
    }

    pub fn scale_assign(&mut self, factor: f64) -> &mut Self {
        for s in self.as_mut_slice() {
            *s = saturate_f64(f64::from(*s) * factor);
        }
        self
    }

    /// Each sample becomes `clamp(round(sample / divisor), 0, 255)`.
    ///
    /// Fails with `DivisionByZero` when `divisor == 0.0`.
    pub fn divide(&self, divisor: f64) -> Result<PixelBuffer> {
        let mut out = self.clone();
        out.divide_assign(divisor)?;
        Ok(out)
    }

    pub fn divide_assign(&mut self, divisor: f64) -> Result<&mut Self> {
        if divisor == 0.0 {
            return Err(PixelError::DivisionByZero);
        }
        for s in self.as_mut_slice() {
            *s = saturate_f64(f64::from(*s) / divisor);
        }
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Inversion
    // -----------------------------------------------------------------------

    /// `255 - sample` everywhere. Applying it twice is the identity.
    pub fn invert(&self) -> PixelBuffer {
        let mut out = self.clone();
        out.invert_assign();
        out
    }

    pub fn invert_assign(&mut self) -> &mut Self {
        for s in self.as_mut_slice() {
            *s = 255 - *s;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Operator sugar for the infallible forms
// ---------------------------------------------------------------------------
// Image-with-image, pixel and divide forms can fail and stay as methods.

impl ops::Add<i32> for &PixelBuffer {
    type Output = PixelBuffer;

    fn add(self, value: i32) -> PixelBuffer {
        self.add_scalar(value)
    }
}

impl ops::AddAssign<i32> for PixelBuffer {
    fn add_assign(&mut self, value: i32) {
        self.add_scalar_assign(value);
    }
}

impl ops::Sub<i32> for &PixelBuffer {
    type Output = PixelBuffer;

    fn sub(self, value: i32) -> PixelBuffer {
        self.subtract_scalar(value)
    }
}

impl ops::SubAssign<i32> for PixelBuffer {
    fn sub_assign(&mut self, value: i32) {
        self.subtract_scalar_assign(value);
    }
}

impl ops::BitXor<i32> for &PixelBuffer {
    type Output = PixelBuffer;

    fn bitxor(self, value: i32) -> PixelBuffer {
        self.abs_diff_scalar(value)
    }
}

impl ops::BitXorAssign<i32> for PixelBuffer {
    fn bitxor_assign(&mut self, value: i32) {
        self.abs_diff_scalar_assign(value);
    }
}

impl ops::Mul<f64> for &PixelBuffer {
    type Output = PixelBuffer;

    fn mul(self, factor: f64) -> PixelBuffer {
        self.scale(factor)
    }
}

impl ops::MulAssign<f64> for PixelBuffer {
    fn mul_assign(&mut self, factor: f64) {
        self.scale_assign(factor);
    }
}

impl ops::Not for &PixelBuffer {
    type Output = PixelBuffer;

    fn not(self) -> PixelBuffer {
        self.invert()
    }
}

impl ops::Not for PixelBuffer {
    type Output = PixelBuffer;

    fn not(mut self) -> PixelBuffer {
        self.invert_assign();
        self
    }
}

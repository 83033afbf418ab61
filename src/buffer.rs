// buffer.rs — Owned, runtime-sized, multi-channel 8-bit pixel buffer.
//
// Memory layout (width = 3, channels = 2):
//
//   data index:  0  1 | 2  3 | 4  5 | 6  7 | 8  9 | 10 11
//   sample:      c0 c1| c0 c1| c0 c1| c0 c1| c0 c1| c0 c1
//   pixel:       (0,0)| (1,0)| (2,0)| (0,1)| (1,1)| (2,1)
//
// Rows are packed: there is no stride padding, so row y starts at
// y * width * channels and the whole buffer is exactly
// width * height * channels bytes long.

use std::fmt;

use log::debug;

use crate::error::{PixelError, Result};

// ---------------------------------------------------------------------------
// ColorModel
// ---------------------------------------------------------------------------

/// Symbolic tag describing what the channels mean.
///
/// The tag is independent of the channel count: a 3-channel buffer tagged
/// `Gray` is legal. Binary operators only require both sides to agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ColorModel {
    Gray,
    Rgb,
    Rgba,
    #[default]
    None,
    /// Any other caller-chosen name.
    Other(String),
}

impl ColorModel {
    /// Model assigned to freshly decoded rasters: `Gray` for one channel,
    /// `Rgb` for anything else.
    pub fn for_channels(channels: usize) -> Self {
        if channels == 1 {
            ColorModel::Gray
        } else {
            ColorModel::Rgb
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColorModel::Gray => "GRAY",
            ColorModel::Rgb => "RGB",
            ColorModel::Rgba => "RGBA",
            ColorModel::None => "NONE",
            ColorModel::Other(name) => name,
        }
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ColorModel {
    fn from(name: &str) -> Self {
        match name {
            "GRAY" => ColorModel::Gray,
            "RGB" => ColorModel::Rgb,
            "RGBA" => ColorModel::Rgba,
            "NONE" => ColorModel::None,
            other => ColorModel::Other(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// PixelBuffer
// ---------------------------------------------------------------------------

/// A row-major, channel-interleaved 8-bit image with runtime dimensions.
///
/// The sample at `(x, y, c)` lives at `y*width*channels + x*channels + c`.
/// `Clone` is a deep copy of the sample storage.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
    model: ColorModel,
}

impl Default for PixelBuffer {
    /// An empty 0x0 buffer with one channel and model `None`.
    fn default() -> Self {
        PixelBuffer {
            data: Vec::new(),
            width: 0,
            height: 0,
            channels: 1,
            model: ColorModel::None,
        }
    }
}

impl PixelBuffer {
    // --- Constructors ---

    /// Create a buffer with every sample set to `fill`.
    ///
    /// Fails with `InvalidDimensions` if `channels == 0` or the total
    /// sample count does not fit in `usize`.
    pub fn filled(
        width: usize,
        height: usize,
        channels: usize,
        model: impl Into<ColorModel>,
        fill: u8,
    ) -> Result<Self> {
        let len = sample_count(width, height, channels)?;
        Ok(PixelBuffer {
            data: vec![fill; len],
            width,
            height,
            channels,
            model: model.into(),
        })
    }

    /// Create a zero-initialized buffer.
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        model: impl Into<ColorModel>,
    ) -> Result<Self> {
        Self::filled(width, height, channels, model, 0)
    }

    /// Wrap an existing interleaved sample vector.
    ///
    /// `data` must hold exactly `width * height * channels` bytes.
    pub fn from_vec(
        width: usize,
        height: usize,
        channels: usize,
        model: impl Into<ColorModel>,
        data: Vec<u8>,
    ) -> Result<Self> {
        let expected = sample_count(width, height, channels)?;
        if data.len() != expected {
            return Err(PixelError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelBuffer {
            data,
            width,
            height,
            channels,
            model: model.into(),
        })
    }

    /// Like `from_vec`, copying from a borrowed slice.
    pub fn from_slice(
        width: usize,
        height: usize,
        channels: usize,
        model: impl Into<ColorModel>,
        data: &[u8],
    ) -> Result<Self> {
        Self::from_vec(width, height, channels, model, data.to_vec())
    }

    /// Assemble a buffer whose length the caller already guarantees.
    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        channels: usize,
        model: ColorModel,
        data: Vec<u8>,
    ) -> Self {
        debug_assert!(channels >= 1);
        debug_assert_eq!(data.len(), width * height * channels);
        PixelBuffer {
            data,
            width,
            height,
            channels,
            model,
        }
    }

    // --- Accessors ---

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn model(&self) -> &ColorModel {
        &self.model
    }

    /// Retag the buffer. Samples are untouched.
    pub fn set_model(&mut self, model: impl Into<ColorModel>) {
        self.model = model.into();
    }

    /// Total number of samples (`width * height * channels`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes per row. Always `width * channels`.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width * self.channels
    }

    /// Read the sample at `(x, y, c)`.
    pub fn get(&self, x: usize, y: usize, c: usize) -> Result<u8> {
        let idx = self.index_of(x, y, c)?;
        Ok(self.data[idx])
    }

    /// Mutable reference to the sample at `(x, y, c)`.
    pub fn get_mut(&mut self, x: usize, y: usize, c: usize) -> Result<&mut u8> {
        let idx = self.index_of(x, y, c)?;
        Ok(&mut self.data[idx])
    }

    /// Write the sample at `(x, y, c)`.
    pub fn set(&mut self, x: usize, y: usize, c: usize, value: u8) -> Result<()> {
        *self.get_mut(x, y, c)? = value;
        Ok(())
    }

    /// All channels of the pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Result<&[u8]> {
        let start = self.index_of(x, y, 0)?;
        Ok(&self.data[start..start + self.channels])
    }

    /// Iterate over all pixels as `(x, y, samples)`.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, &[u8])> + '_ {
        let width = self.width;
        // chunks_exact panics on 0; channels >= 1 is an invariant.
        self.data
            .chunks_exact(self.channels)
            .enumerate()
            .map(move |(i, px)| (i % width, i / width, px))
    }

    /// The whole sample buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the samples. The length cannot change through this.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    // --- Shape reconciliation ---

    /// Zero-pad the canvas so it covers at least `new_width x new_height`.
    ///
    /// Existing samples keep their `(x, y, c)` coordinates. A request that
    /// does not exceed the current size on either axis is a no-op.
    ///
    /// Fails with `InvalidDimensions`, leaving the buffer untouched, when the
    /// grown extent has more samples than `usize` can count.
    pub fn enlarge_to(&mut self, new_width: usize, new_height: usize) -> Result<()> {
        if new_width <= self.width && new_height <= self.height {
            return Ok(());
        }
        let w = self.width.max(new_width);
        let h = self.height.max(new_height);
        let len = sample_count(w, h, self.channels)?;
        debug!(
            "enlarging {}x{}x{} to {w}x{h}",
            self.width, self.height, self.channels
        );

        let old_row = self.row_stride();
        let new_row = w * self.channels;
        let mut data = vec![0u8; len];
        if old_row > 0 {
            for (y, src) in self.data.chunks_exact(old_row).enumerate() {
                data[y * new_row..y * new_row + old_row].copy_from_slice(src);
            }
        }
        self.data = data;
        self.width = w;
        self.height = h;
        Ok(())
    }

    /// Non-mutating form of `enlarge_to`.
    pub fn enlarged_to(&self, new_width: usize, new_height: usize) -> Result<PixelBuffer> {
        let mut out = self.clone();
        out.enlarge_to(new_width, new_height)?;
        Ok(out)
    }

    // --- Internal helpers ---

    #[inline]
    fn index_of(&self, x: usize, y: usize, c: usize) -> Result<usize> {
        if x < self.width && y < self.height && c < self.channels {
            Ok(y * self.row_stride() + x * self.channels + c)
        } else {
            Err(PixelError::OutOfBounds {
                x,
                y,
                c,
                width: self.width,
                height: self.height,
                channels: self.channels,
            })
        }
    }
}

/// `width * height * channels`, validating the channel count and overflow.
fn sample_count(width: usize, height: usize, channels: usize) -> Result<usize> {
    let invalid = PixelError::InvalidDimensions {
        width,
        height,
        channels,
    };
    if channels == 0 {
        return Err(invalid);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(invalid)
}

impl fmt::Display for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{} ({})",
            self.width, self.height, self.channels, self.model
        )
    }
}

// Debug formatting — useful for small buffers in tests.
impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PixelBuffer {{ {} }}", self)?;
        let row = self.row_stride();
        if row == 0 {
            return Ok(());
        }
        for (y, samples) in self.data.chunks_exact(row).take(8).enumerate() {
            write!(f, "  row {y}: [")?;
            for (x, px) in samples.chunks_exact(self.channels).take(8).enumerate() {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{px:?}")?;
            }
            if self.width > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Index / IndexMut — buf[(x, y, c)] syntax
// ---------------------------------------------------------------------------
// For loops that already validated their coordinates. Out-of-range access
// panics; use get/get_mut for a Result.

impl std::ops::Index<(usize, usize, usize)> for PixelBuffer {
    type Output = u8;

    #[inline]
    fn index(&self, (x, y, c): (usize, usize, usize)) -> &u8 {
        match self.index_of(x, y, c) {
            Ok(idx) => &self.data[idx],
            Err(e) => panic!("{e}"),
        }
    }
}

impl std::ops::IndexMut<(usize, usize, usize)> for PixelBuffer {
    #[inline]
    fn index_mut(&mut self, (x, y, c): (usize, usize, usize)) -> &mut u8 {
        match self.index_of(x, y, c) {
            Ok(idx) => &mut self.data[idx],
            Err(e) => panic!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled() {
        let buf = PixelBuffer::filled(4, 3, 2, ColorModel::None, 7).unwrap();
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 3);
        assert_eq!(buf.channels(), 2);
        assert_eq!(buf.len(), 24);
        assert!(buf.as_slice().iter().all(|&v| v == 7));
    }

    #[test]
    fn test_zero_channels_rejected() {
        let err = PixelBuffer::new(2, 2, 0, ColorModel::Gray).unwrap_err();
        assert!(matches!(err, PixelError::InvalidDimensions { channels: 0, .. }));
    }

    #[test]
    fn test_overflow_rejected() {
        let err = PixelBuffer::new(usize::MAX, 2, 1, ColorModel::Gray).unwrap_err();
        assert!(matches!(err, PixelError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_zero_extent_is_valid() {
        let buf = PixelBuffer::new(0, 5, 3, ColorModel::Rgb).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.pixels().count(), 0);
    }

    #[test]
    fn test_from_vec_layout() {
        // 2x2 RGB: red, green / blue, white
        let data = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let buf = PixelBuffer::from_vec(2, 2, 3, ColorModel::Rgb, data).unwrap();
        assert_eq!(buf.pixel(0, 0).unwrap(), &[255, 0, 0]);
        assert_eq!(buf.pixel(1, 0).unwrap(), &[0, 255, 0]);
        assert_eq!(buf.pixel(0, 1).unwrap(), &[0, 0, 255]);
        assert_eq!(buf.get(1, 1, 2).unwrap(), 255);
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let err = PixelBuffer::from_vec(2, 2, 3, ColorModel::Rgb, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            PixelError::BufferSizeMismatch {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buf = PixelBuffer::new(2, 2, 1, ColorModel::Gray).unwrap();
        assert!(matches!(buf.get(2, 0, 0), Err(PixelError::OutOfBounds { .. })));
        assert!(matches!(buf.get(0, 2, 0), Err(PixelError::OutOfBounds { .. })));
        assert!(matches!(buf.get(0, 0, 1), Err(PixelError::OutOfBounds { .. })));
        assert!(buf.set(5, 5, 0, 1).is_err());
        assert!(buf.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut buf = PixelBuffer::new(3, 2, 2, ColorModel::None).unwrap();
        buf.set(2, 1, 1, 42).unwrap();
        *buf.get_mut(0, 1, 0).unwrap() = 9;
        assert_eq!(buf.get(2, 1, 1).unwrap(), 42);
        assert_eq!(buf.get(0, 1, 0).unwrap(), 9);
        assert_eq!(buf.as_slice()[1 * 6 + 2 * 2 + 1], 42);
    }

    #[test]
    fn test_enlarge_preserves_coordinates() {
        let data: Vec<u8> = (1..=6).collect();
        let mut buf = PixelBuffer::from_vec(3, 1, 2, ColorModel::None, data).unwrap();
        buf.enlarge_to(4, 2).unwrap();
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.len(), 16);
        assert_eq!(buf.pixel(0, 0).unwrap(), &[1, 2]);
        assert_eq!(buf.pixel(2, 0).unwrap(), &[5, 6]);
        assert_eq!(buf.pixel(3, 0).unwrap(), &[0, 0]);
        assert!(buf.as_slice()[8..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_enlarge_one_axis_only() {
        let mut buf = PixelBuffer::filled(4, 1, 1, ColorModel::Gray, 3).unwrap();
        buf.enlarge_to(2, 3).unwrap();
        assert_eq!((buf.width(), buf.height()), (4, 3));
        assert_eq!(buf.get(3, 0, 0).unwrap(), 3);
        assert_eq!(buf.get(3, 2, 0).unwrap(), 0);
    }

    #[test]
    fn test_enlarge_noop() {
        let buf = PixelBuffer::filled(3, 3, 1, ColorModel::Gray, 5).unwrap();
        assert_eq!(buf.enlarged_to(2, 3).unwrap(), buf);
        assert_eq!(buf.enlarged_to(0, 0).unwrap(), buf);
    }

    #[test]
    fn test_enlarge_from_empty() {
        let mut buf = PixelBuffer::default();
        buf.enlarge_to(2, 2).unwrap();
        assert_eq!(buf.len(), 4);
        assert!(buf.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_enlarge_overflow_rejected() {
        let mut buf = PixelBuffer::new(usize::MAX, 0, 1, ColorModel::Gray).unwrap();
        let err = buf.enlarge_to(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, PixelError::InvalidDimensions { height: 2, .. }));
        assert_eq!((buf.width(), buf.height()), (usize::MAX, 0));
        assert!(buf.is_empty());
        assert!(buf.enlarged_to(1, 2).is_err());
    }

    #[test]
    fn test_display() {
        let buf = PixelBuffer::new(200, 100, 3, ColorModel::Rgb).unwrap();
        assert_eq!(buf.to_string(), "200x100x3 (RGB)");
        assert_eq!(PixelBuffer::default().to_string(), "0x0x1 (NONE)");
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!(ColorModel::from("GRAY"), ColorModel::Gray);
        assert_eq!(ColorModel::from("HSV"), ColorModel::Other("HSV".into()));
        assert_eq!(ColorModel::Other("HSV".into()).to_string(), "HSV");
    }

    #[test]
    fn test_pixels_iterator() {
        let data: Vec<u8> = (0..6).collect();
        let buf = PixelBuffer::from_vec(3, 1, 2, ColorModel::None, data).unwrap();
        let px: Vec<_> = buf.pixels().collect();
        assert_eq!(px.len(), 3);
        assert_eq!(px[0], (0, 0, &[0u8, 1][..]));
        assert_eq!(px[2], (2, 0, &[4u8, 5][..]));
    }

    #[test]
    fn test_index_syntax() {
        let mut buf = PixelBuffer::new(2, 2, 3, ColorModel::Rgb).unwrap();
        buf[(1, 1, 2)] = 77;
        assert_eq!(buf[(1, 1, 2)], 77);
        assert_eq!(buf.get(1, 1, 2).unwrap(), 77);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_out_of_bounds() {
        let buf = PixelBuffer::new(2, 2, 1, ColorModel::Gray).unwrap();
        let _ = buf[(2, 0, 0)];
    }

    #[test]
    fn test_clone_is_deep() {
        let a = PixelBuffer::filled(2, 2, 1, ColorModel::Gray, 1).unwrap();
        let mut b = a.clone();
        b.set(0, 0, 0, 200).unwrap();
        assert_eq!(a.get(0, 0, 0).unwrap(), 1);
    }
}

// codec.rs — Boundary to the raster codec that reads and writes files.
//
// The arithmetic engine never parses a file format itself. It hands a path
// to a `RasterCodec` and gets back 8-bit interleaved bytes, or hands over
// bytes plus shape and gets back success or failure.
//
// `ImageCodec` is the default implementation, backed by the `image` crate.
// Any other transcoder (an in-memory fake in tests, a different library)
// can be plugged in through `load_with` / `save_with`.

use std::fs;
use std::path::Path;

use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, Pixel};
use log::{debug, warn};

use crate::buffer::{ColorModel, PixelBuffer};
use crate::error::{PixelError, Result};

/// Highest channel count the encoders can represent (RGBA).
pub const MAX_CODEC_CHANNELS: usize = 4;

/// A decoded raster: 8-bit samples, interleaved, rows packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub bytes: Vec<u8>,
}

/// Borrowed raster handed to an encoder.
#[derive(Debug, Clone, Copy)]
pub struct RasterRef<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// Bytes between the starts of consecutive rows.
    pub stride: usize,
    pub bytes: &'a [u8],
}

/// Opaque file transcoder.
pub trait RasterCodec {
    /// Decode `path` into 8-bit interleaved samples.
    ///
    /// `desired_channels == 0` keeps the file's own channel count; any other
    /// value forces conversion to that many channels.
    fn decode(&self, path: &Path, desired_channels: usize) -> Result<Decoded>;

    /// Encode `raster` to `path`.
    fn encode(&self, path: &Path, raster: RasterRef<'_>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// ImageCodec
// ---------------------------------------------------------------------------

/// Configuration for `ImageCodec`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecConfig {
    /// Container written by `encode`. Decoding sniffs the format from the file.
    pub format: ImageFormat,
    /// Create missing parent directories before writing.
    pub create_parent_dirs: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            format: ImageFormat::Png,
            create_parent_dirs: true,
        }
    }
}

/// `RasterCodec` backed by the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct ImageCodec {
    config: CodecConfig,
}

impl ImageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        ImageCodec { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl RasterCodec for ImageCodec {
    fn decode(&self, path: &Path, desired_channels: usize) -> Result<Decoded> {
        if desired_channels > MAX_CODEC_CHANNELS {
            return Err(PixelError::codec(
                path,
                format!("cannot decode to {desired_channels} channels"),
            ));
        }
        let img = image::open(path).map_err(|e| PixelError::codec(path, e.to_string()))?;
        let channels = match desired_channels {
            0 => usize::from(img.color().channel_count()),
            n => n,
        };
        let (width, height, bytes) = into_interleaved(img, channels);
        Ok(Decoded {
            width,
            height,
            channels,
            bytes,
        })
    }

    fn encode(&self, path: &Path, raster: RasterRef<'_>) -> Result<()> {
        let color = match raster.channels {
            1 => ColorType::L8,
            2 => ColorType::La8,
            3 => ColorType::Rgb8,
            4 => ColorType::Rgba8,
            n => {
                return Err(PixelError::codec(
                    path,
                    format!("cannot encode {n} channels"),
                ))
            }
        };
        if raster.stride != raster.width * raster.channels {
            return Err(PixelError::codec(
                path,
                format!("unsupported row stride {}", raster.stride),
            ));
        }
        let width = u32::try_from(raster.width)
            .map_err(|_| PixelError::codec(path, "width exceeds u32"))?;
        let height = u32::try_from(raster.height)
            .map_err(|_| PixelError::codec(path, "height exceeds u32"))?;

        if self.config.create_parent_dirs {
            ensure_parent_dir(path)?;
        }
        image::save_buffer_with_format(
            path,
            raster.bytes,
            width,
            height,
            color,
            self.config.format,
        )
        .map_err(|e| PixelError::codec(path, e.to_string()))
    }
}

/// Convert any decoded image to 8-bit interleaved samples with `channels`
/// channels (1 to 4). Returns `(width, height, bytes)`.
fn into_interleaved(img: DynamicImage, channels: usize) -> (usize, usize, Vec<u8>) {
    fn parts<P: Pixel<Subpixel = u8>>(buf: ImageBuffer<P, Vec<u8>>) -> (usize, usize, Vec<u8>) {
        let (w, h) = buf.dimensions();
        (w as usize, h as usize, buf.into_raw())
    }
    match channels {
        1 => parts(img.into_luma8()),
        2 => parts(img.into_luma_alpha8()),
        3 => parts(img.into_rgb8()),
        _ => parts(img.into_rgba8()),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                PixelError::codec(path, format!("failed to create {}: {e}", parent.display()))
            })?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PixelBuffer load / save
// ---------------------------------------------------------------------------

impl PixelBuffer {
    /// Load `path` with the default `ImageCodec`.
    ///
    /// `desired_channels == 0` keeps the file's channel count. Model is
    /// `Gray` for one channel, `Rgb` otherwise, taken from the requested
    /// count when one is given.
    pub fn load(path: impl AsRef<Path>, desired_channels: usize) -> Result<Self> {
        Self::load_with(&ImageCodec::default(), path, desired_channels)
    }

    /// Load `path` through any `RasterCodec`.
    pub fn load_with<C: RasterCodec + ?Sized>(
        codec: &C,
        path: impl AsRef<Path>,
        desired_channels: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let decoded = codec.decode(path, desired_channels)?;
        let channels = match desired_channels {
            0 => decoded.channels,
            n => n,
        };
        let buf = PixelBuffer::from_vec(
            decoded.width,
            decoded.height,
            channels,
            ColorModel::for_channels(channels),
            decoded.bytes,
        )
        .map_err(|e| PixelError::codec(path, e.to_string()))?;
        debug!("loaded {} as {}", path.display(), buf);
        Ok(buf)
    }

    /// Save to `path` with the default `ImageCodec` (PNG).
    ///
    /// Fails with `Codec` when the buffer has more than four channels or
    /// the encoder reports an error. Never panics.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_with(&ImageCodec::default(), path)
    }

    /// Save to `path` through any `RasterCodec`.
    pub fn save_with<C: RasterCodec + ?Sized>(&self, codec: &C, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if self.channels() > MAX_CODEC_CHANNELS {
            warn!("refusing to save {} to {}: too many channels", self, path.display());
            return Err(PixelError::codec(
                path,
                format!(
                    "{} channels exceeds the encoder limit of {MAX_CODEC_CHANNELS}",
                    self.channels()
                ),
            ));
        }
        let raster = RasterRef {
            width: self.width(),
            height: self.height(),
            channels: self.channels(),
            stride: self.row_stride(),
            bytes: self.as_slice(),
        };
        match codec.encode(path, raster) {
            Ok(()) => {
                debug!("saved {} to {}", self, path.display());
                Ok(())
            }
            Err(e) => {
                warn!("save failed: {e}");
                Err(e)
            }
        }
    }
}

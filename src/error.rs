// error.rs — Error type shared by every fallible PixelBuffer operation.
//
// Clamping a sample into [0, 255] is NOT an error: it is the documented
// saturation rule of the arithmetic operators. Everything listed here is a
// contract violation that stops the operation before it touches any sample.

use std::path::PathBuf;

use thiserror::Error;

use crate::buffer::ColorModel;

/// Errors raised by construction, access, arithmetic and codec operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PixelError {
    #[error("invalid dimensions {width}x{height}x{channels}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("buffer holds {actual} bytes, expected width*height*channels = {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("sample ({x},{y},{c}) out of bounds for {width}x{height}x{channels}")]
    OutOfBounds {
        x: usize,
        y: usize,
        c: usize,
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error(
        "incompatible operands: {left_channels} channels ({left_model}) vs \
         {right_channels} channels ({right_model})"
    )]
    IncompatibleOperands {
        left_channels: usize,
        right_channels: usize,
        left_model: ColorModel,
        right_model: ColorModel,
    },

    #[error("pixel operand has {actual} values, buffer has {expected} channels")]
    PixelArityMismatch { expected: usize, actual: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("codec error for {}: {message}", .path.display())]
    Codec { path: PathBuf, message: String },
}

impl PixelError {
    pub(crate) fn codec(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PixelError::Codec {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PixelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let e = PixelError::BufferSizeMismatch {
            expected: 12,
            actual: 11,
        };
        assert!(e.to_string().contains("11"));
        assert!(e.to_string().contains("12"));

        let e = PixelError::IncompatibleOperands {
            left_channels: 3,
            right_channels: 1,
            left_model: ColorModel::Rgb,
            right_model: ColorModel::Gray,
        };
        let msg = e.to_string();
        assert!(msg.contains("RGB") && msg.contains("GRAY"), "{msg}");
    }

    #[test]
    fn test_codec_helper() {
        let e = PixelError::codec("/tmp/x.png", "boom");
        assert_eq!(e.to_string(), "codec error for /tmp/x.png: boom");
    }
}

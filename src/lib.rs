// pixarith: saturating arithmetic on 8-bit multi-channel pixel buffers.
//
// Images of different extents combine by zero-padding both sides to the
// pairwise maximum width and height. Scalars and single pixels broadcast
// over every position. Results always saturate into [0, 255].

pub mod arith;
pub mod buffer;
pub mod codec;
pub mod error;
pub mod threshold;

pub use arith::BinaryOp;
pub use buffer::{ColorModel, PixelBuffer};
pub use codec::{CodecConfig, Decoded, ImageCodec, RasterCodec, RasterRef};
pub use error::{PixelError, Result};
pub use threshold::Predicate;

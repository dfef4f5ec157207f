//! A decoder for baseline sequential JPEG images, producing pixel data
//! suitable for writing out as an uncompressed 24-bit BMP.
//!
//! Supports 8-bit-precision, single-scan, Huffman-coded (not arithmetic),
//! 1x1-sampled (no chroma subsampling) images with 1 (grayscale) or 3
//! (YCbCr) components and no restart intervals. See [`errors::DecodeErrors`]
//! for the ways an unsupported or malformed file is reported.
//!
//! ```no_run
//! use baseline_jpeg::Decoder;
//!
//! let mut decoder = Decoder::new();
//! let image = decoder.decode_file("photo.jpg").unwrap();
//! println!("decoded a {}x{} image", image.width, image.height);
//! ```

pub mod bitstream;
pub mod bmp;
pub mod color_convert;
pub mod components;
pub mod decoder;
pub mod errors;
pub mod headers;
pub mod huffman;
pub mod idct;
pub mod marker;
pub mod mcu;
pub mod misc;
pub mod quant;

pub use decoder::{DecodedImage, Decoder};
pub use errors::DecodeErrors;

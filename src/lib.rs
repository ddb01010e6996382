//! A pure Rust zlib/DEFLATE decompressor.
//!
//! Given a complete `RFC 1950` zlib stream, [`DeflateDecoder`] produces the
//! original uncompressed bytes. Compression (the deflate direction), gzip
//! framing and preset dictionaries are not implemented.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bitstream;
mod constants;
mod decoder;
pub mod errors;
mod huffman;
mod options;
mod utils;

pub use crate::decoder::DeflateDecoder;
pub use crate::options::DeflateOptions;

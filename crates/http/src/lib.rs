//! Transparent decoding of compressed HTTP responses.
//!
//! [`DecompressionHandler`] reads a response's `Content-Encoding` headers,
//! looks every listed encoding up in a
//! [`CompressionProvider`](squash_compress::CompressionProvider), and undoes
//! them outermost first, either eagerly on a buffered body or lazily by
//! wrapping a streaming one. Responses with an encoding that cannot be decoded
//! are handed back untouched.

mod body;
pub mod error;
mod handler;

pub use crate::body::{AsyncDecoder, Body};
pub use crate::handler::{Chain, DecompressionHandler, Outcome, accept_encoding};

//! Lane message set.
//!
//! Typed messages exchanged between a lane, its front desk and its paired
//! lane, with a newline-delimited JSON codec. The transport that carries the
//! lines is not part of this crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{LineDecoder, MAX_LINE_LEN, decode_line, encode_line};
pub use error::ProtocolError;
pub use message::LaneMessage;

//! Wire types for the ihop line-delimited JSON harness protocol.
//!
//! Decodes one request line into a typed [`Command`] and encodes typed
//! [`Response`] values back into exactly one JSON line. Everything that makes a
//! request unusable is reported as a [`ProtocolError`].

pub mod error;
pub mod request;
pub mod response;

pub use error::*;
pub use request::*;
pub use response::*;

/// The only protocol version this harness speaks.
pub const PROTOCOL_VERSION: u64 = 1;

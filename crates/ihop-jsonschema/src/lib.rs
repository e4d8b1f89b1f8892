//! ihop validation backend powered by the `jsonschema` crate.

pub mod adapter;
pub mod dialects;
pub mod implementation;

pub use adapter::*;
pub use dialects::*;
pub use implementation::*;

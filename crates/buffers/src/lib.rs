//! Byte buffer primitives for the BERT decoder.
//!
//! The [`Reader`] is a cursor over an immutable byte slice. Every read is
//! bounds-checked and returns [`BufferError`] instead of panicking.

mod error;
mod reader;

pub use error::BufferError;
pub use reader::Reader;

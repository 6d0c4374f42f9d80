use thiserror::Error;

/// Error returned by [`Reader`](crate::Reader) reads.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read needed more bytes than remain between the cursor and the end.
    #[error("unexpected end of buffer at offset {position}: needed {needed} bytes, {remaining} remaining")]
    EndOfBuffer {
        position: usize,
        needed: usize,
        remaining: usize,
    },
}

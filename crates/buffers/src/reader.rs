//! Binary buffer reader with cursor tracking.

use crate::BufferError;

/// A bounds-checked reader over a byte slice.
///
/// The reader views `data[x..end]`. Every read checks that enough bytes
/// remain before touching the slice, and leaves the cursor where it was when
/// the check fails. The cursor only moves forward.
///
/// # Example
///
/// ```
/// use bert_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.try_u8(), Ok(0x01));
/// assert_eq!(reader.try_u16(), Ok(0x0203));
/// assert!(reader.try_u8().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    x: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the whole slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            x: 0,
            end: data.len(),
        }
    }

    /// Current cursor offset from the start of the slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.x
    }

    /// Number of bytes between the cursor and the end.
    #[inline]
    pub fn size(&self) -> usize {
        self.end - self.x
    }

    /// Returns `true` when no bytes remain.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x == self.end
    }

    /// Returns the unread tail without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.x..self.end]
    }

    /// Checks that `n` more bytes are available from the current cursor.
    #[inline]
    pub fn check(&self, n: usize) -> Result<(), BufferError> {
        let remaining = self.size();
        if n > remaining {
            Err(BufferError::EndOfBuffer {
                position: self.x,
                needed: n,
                remaining,
            })
        } else {
            Ok(())
        }
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn try_u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.data[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads an unsigned 16-bit big-endian integer.
    #[inline]
    pub fn try_u16(&mut self) -> Result<u16, BufferError> {
        self.check(2)?;
        let val = u16::from_be_bytes([self.data[self.x], self.data[self.x + 1]]);
        self.x += 2;
        Ok(val)
    }

    /// Reads an unsigned 32-bit big-endian integer.
    #[inline]
    pub fn try_u32(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let val = u32::from_be_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    /// Reads a signed 32-bit big-endian integer.
    #[inline]
    pub fn try_i32(&mut self) -> Result<i32, BufferError> {
        self.try_u32().map(|v| v as i32)
    }

    /// Reads `size` raw bytes and advances the cursor.
    pub fn try_buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        let end = x + size;
        let bin = &self.data[x..end];
        self.x = end;
        Ok(bin)
    }
}

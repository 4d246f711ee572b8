//! Sequential bounds-checked reader over a packet buffer
//!
//! [`HeaderCursor`] is the primitive every header parser in this crate is
//! built on. It tracks a position inside an immutable byte slice and only
//! moves forward; an advance succeeds if and only if the requested bytes lie
//! entirely within the buffer. There is no seek, no rewind, and no
//! speculative read past the header currently being resolved, the property
//! that keeps the pipeline bounded in both time and memory accesses.

/// A forward-only, bounds-checked cursor over packet bytes.
///
/// # Example
///
/// ```
/// use flowmark::parse::HeaderCursor;
///
/// let data = [0x12, 0x34, 0x56];
/// let mut cur = HeaderCursor::new(&data);
/// assert_eq!(cur.advance(2), Some(&data[..2]));
/// assert_eq!(cur.offset(), 2);
/// assert_eq!(cur.advance(2), None); // only one byte left
/// assert_eq!(cur.offset(), 2); // failed advance does not move
/// ```
#[derive(Debug)]
pub struct HeaderCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> HeaderCursor<'a> {
    /// Create a cursor at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the buffer.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check whether the next `n` bytes lie entirely within the buffer.
    #[must_use]
    pub const fn fits(&self, n: usize) -> bool {
        n <= self.remaining()
    }

    /// Advance over the next `n` bytes, returning them.
    ///
    /// Returns `None` without moving if fewer than `n` bytes remain.
    pub fn advance(&mut self, n: usize) -> Option<&'a [u8]> {
        if !self.fits(n) {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Some(bytes)
    }

    /// Read the big-endian u16 at `delta` bytes past the cursor without
    /// advancing.
    ///
    /// Returns `None` if the two bytes do not fit.
    #[must_use]
    pub fn peek_u16_at(&self, delta: usize) -> Option<u16> {
        let at = self.pos + delta;
        if at + 2 > self.data.len() {
            return None;
        }
        Some(u16::from_be_bytes([self.data[at], self.data[at + 1]]))
    }
}

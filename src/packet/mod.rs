//! Owned packet buffer with bounded in-place growth
//!
//! [`PacketBuf`] stands in for the frame buffer the network hook hands the
//! pipeline. It owns the packet bytes and tracks a hard byte budget (its
//! *room*) independent of the current length: a splice that would push the
//! packet past its room fails, modelling the host refusing to extend the
//! underlying buffer.
//!
//! The single mutating primitive is [`PacketBuf::insert_gap`], the
//! "insert N bytes at offset, shift tail" operation the tag embedder builds
//! on. It is all-or-nothing: on failure the packet is untouched.

use crate::error::GrowthError;

/// An owned, growable packet buffer.
///
/// # Example
///
/// ```
/// use flowmark::packet::PacketBuf;
///
/// let mut pkt = PacketBuf::new(vec![0xAA; 54]);
/// pkt.insert_gap(54, 8).unwrap();
/// assert_eq!(pkt.len(), 62);
/// assert_eq!(&pkt.as_slice()[54..62], &[0u8; 8]);
/// ```
#[derive(Debug, Clone)]
pub struct PacketBuf {
    data: Vec<u8>,
    /// Maximum total length the buffer may grow to.
    room: usize,
}

impl PacketBuf {
    /// Wrap packet bytes with effectively unlimited growth room.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            room: usize::MAX,
        }
    }

    /// Wrap packet bytes with an explicit growth budget.
    ///
    /// `room` is the maximum *total* length, not extra headroom. A `room`
    /// smaller than the current length simply means no growth is possible.
    #[must_use]
    pub fn with_room(data: Vec<u8>, room: usize) -> Self {
        Self { data, room }
    }

    /// Current packet length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the packet holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Growth budget (maximum total length).
    #[must_use]
    pub const fn room(&self) -> usize {
        self.room
    }

    /// Borrow the packet bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Borrow the packet bytes mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer, returning the packet bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Splice `len` zero bytes into the packet at `offset`, shifting the
    /// tail forward.
    ///
    /// The operation is transactional: if the grown packet would exceed the
    /// buffer's room, or `offset` lies past the end, nothing is modified.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::NoRoom`] if the grown length would exceed the
    /// room, [`GrowthError::OffsetOutOfBounds`] if `offset > len()`.
    pub fn insert_gap(&mut self, offset: usize, len: usize) -> Result<(), GrowthError> {
        if offset > self.data.len() {
            return Err(GrowthError::OffsetOutOfBounds {
                offset,
                len: self.data.len(),
            });
        }

        let needed = self.data.len() + len;
        if needed > self.room {
            return Err(GrowthError::NoRoom {
                needed,
                room: self.room,
            });
        }

        self.data
            .splice(offset..offset, std::iter::repeat(0u8).take(len));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_gap_shifts_tail() {
        let mut pkt = PacketBuf::new(vec![1, 2, 3, 4]);
        pkt.insert_gap(2, 3).unwrap();
        assert_eq!(pkt.as_slice(), &[1, 2, 0, 0, 0, 3, 4]);
    }

    #[test]
    fn test_insert_gap_at_end() {
        let mut pkt = PacketBuf::new(vec![1, 2]);
        pkt.insert_gap(2, 2).unwrap();
        assert_eq!(pkt.as_slice(), &[1, 2, 0, 0]);
    }

    #[test]
    fn test_insert_gap_no_room() {
        let mut pkt = PacketBuf::with_room(vec![1, 2, 3, 4], 6);
        let err = pkt.insert_gap(2, 8).unwrap_err();
        assert!(matches!(err, GrowthError::NoRoom { needed: 12, room: 6 }));
        // Untouched on failure
        assert_eq!(pkt.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_insert_gap_exactly_fills_room() {
        let mut pkt = PacketBuf::with_room(vec![0; 4], 8);
        pkt.insert_gap(4, 4).unwrap();
        assert_eq!(pkt.len(), 8);
    }

    #[test]
    fn test_insert_gap_offset_out_of_bounds() {
        let mut pkt = PacketBuf::new(vec![1, 2]);
        let err = pkt.insert_gap(3, 1).unwrap_err();
        assert!(matches!(
            err,
            GrowthError::OffsetOutOfBounds { offset: 3, len: 2 }
        ));
    }

    #[test]
    fn test_room_smaller_than_len_blocks_growth() {
        let mut pkt = PacketBuf::with_room(vec![0; 10], 4);
        assert!(pkt.insert_gap(0, 1).is_err());
        assert_eq!(pkt.len(), 10);
    }
}

//! Frame type for the client binary protocol.

use bytes::{Buf, BufMut, BytesMut};
use uuid::Uuid;

use super::builtin::fixed;
use super::constants::*;
use crate::error::{HzError, Result};

/// A single frame of a client message.
///
/// On the wire each frame consists of:
/// - A 4-byte length field (little-endian), counting the whole frame
/// - A 2-byte flags field (little-endian)
/// - Variable-length content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame content (payload after flags).
    pub content: BytesMut,
    /// Frame flags indicating frame type and properties.
    pub flags: u16,
}

impl Frame {
    /// Creates a new frame with the given content and flags.
    pub fn new(content: BytesMut, flags: u16) -> Self {
        Self { content, flags }
    }

    /// Creates a new frame with content and default flags.
    pub fn with_content(content: BytesMut) -> Self {
        Self::new(content, DEFAULT_FLAGS)
    }

    /// Creates a new empty frame with the given flags.
    pub fn with_flags(flags: u16) -> Self {
        Self::new(BytesMut::new(), flags)
    }

    /// Creates a zero-filled frame of `size` bytes, ready for fixed-offset writes.
    pub fn zeroed(size: usize, flags: u16) -> Self {
        Self::new(BytesMut::zeroed(size), flags)
    }

    /// Creates a frame holding a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Self {
        Self::with_content(BytesMut::from(data))
    }

    /// Creates a frame that opens a nested data structure.
    pub fn new_begin_frame() -> Self {
        Self::with_flags(BEGIN_DATA_STRUCTURE_FLAG)
    }

    /// Creates a frame that closes a nested data structure.
    pub fn new_end_frame() -> Self {
        Self::with_flags(END_DATA_STRUCTURE_FLAG)
    }

    /// Creates a null frame (represents an absent value).
    pub fn new_null_frame() -> Self {
        Self::with_flags(IS_NULL_FLAG)
    }

    /// Returns true if this frame opens a nested data structure.
    pub fn is_begin_frame(&self) -> bool {
        self.flags & BEGIN_DATA_STRUCTURE_FLAG != 0
    }

    /// Returns true if this frame closes a nested data structure.
    pub fn is_end_frame(&self) -> bool {
        self.flags & END_DATA_STRUCTURE_FLAG != 0
    }

    /// Returns true if this frame has the NULL flag set.
    pub fn is_null_frame(&self) -> bool {
        self.flags & IS_NULL_FLAG != 0
    }

    /// Returns true if this frame has the FINAL flag set.
    pub fn is_final_frame(&self) -> bool {
        self.flags & IS_FINAL_FLAG != 0
    }

    /// Returns true if this frame has the EVENT flag set.
    pub fn is_event_frame(&self) -> bool {
        self.flags & IS_EVENT_FLAG != 0
    }

    /// Returns true if this frame has the BACKUP_EVENT flag set.
    pub fn is_backup_event_frame(&self) -> bool {
        self.flags & BACKUP_EVENT_FLAG != 0
    }

    /// Returns true if this frame starts a fragmented message.
    pub fn is_begin_fragment(&self) -> bool {
        self.flags & BEGIN_FRAGMENT_FLAG != 0
    }

    /// Returns true if this frame ends a fragmented message.
    pub fn is_end_fragment(&self) -> bool {
        self.flags & END_FRAGMENT_FLAG != 0
    }

    /// Returns true if this frame carries both fragment flags.
    pub fn is_unfragmented(&self) -> bool {
        self.flags & UNFRAGMENTED_MESSAGE == UNFRAGMENTED_MESSAGE
    }

    /// Returns the size of this frame on the wire.
    pub fn wire_size(&self) -> usize {
        FRAME_HEADER_SIZE + self.content.len()
    }

    /// Writes this frame to the given buffer.
    pub fn write_to(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_size());
        dst.put_u32_le(self.wire_size() as u32);
        dst.put_u16_le(self.flags);
        dst.put_slice(&self.content);
    }

    /// Reads a frame from the given buffer.
    ///
    /// Returns `Ok(None)` if there isn't enough data to read a complete frame,
    /// and a framing error if the length field is smaller than the header.
    pub fn read_from(src: &mut BytesMut) -> Result<Option<Self>> {
        let Some(length_bytes) = src.get(..SIZE_OF_FRAME_LENGTH_FIELD) else {
            return Ok(None);
        };
        let mut length_field = [0u8; SIZE_OF_FRAME_LENGTH_FIELD];
        length_field.copy_from_slice(length_bytes);
        let frame_length = u32::from_le_bytes(length_field) as usize;

        if frame_length < FRAME_HEADER_SIZE {
            return Err(HzError::Framing(format!(
                "frame length {} is smaller than the {}-byte header",
                frame_length, FRAME_HEADER_SIZE
            )));
        }

        if src.len() < frame_length {
            return Ok(None);
        }

        src.advance(SIZE_OF_FRAME_LENGTH_FIELD);
        let flags = src.get_u16_le();
        let content = src.split_to(frame_length - FRAME_HEADER_SIZE);

        Ok(Some(Self::new(content, flags)))
    }

    /// Reads an int32 at `offset` of the frame content.
    pub fn read_int_at(&self, offset: usize) -> Result<i32> {
        fixed::decode_int(&self.content, offset)
    }

    /// Reads an int64 at `offset` of the frame content.
    pub fn read_long_at(&self, offset: usize) -> Result<i64> {
        fixed::decode_long(&self.content, offset)
    }

    /// Reads a byte at `offset` of the frame content.
    pub fn read_byte_at(&self, offset: usize) -> Result<u8> {
        fixed::decode_byte(&self.content, offset)
    }

    /// Reads a boolean at `offset` of the frame content.
    pub fn read_bool_at(&self, offset: usize) -> Result<bool> {
        fixed::decode_bool(&self.content, offset)
    }

    /// Reads a nullable guid at `offset` of the frame content.
    pub fn read_guid_at(&self, offset: usize) -> Result<Option<Uuid>> {
        fixed::decode_guid(&self.content, offset)
    }

    /// Writes an int32 at `offset` of the frame content.
    pub fn write_int_at(&mut self, offset: usize, value: i32) -> Result<()> {
        fixed::encode_int(&mut self.content, offset, value)
    }

    /// Writes an int64 at `offset` of the frame content.
    pub fn write_long_at(&mut self, offset: usize, value: i64) -> Result<()> {
        fixed::encode_long(&mut self.content, offset, value)
    }

    /// Writes a byte at `offset` of the frame content.
    pub fn write_byte_at(&mut self, offset: usize, value: u8) -> Result<()> {
        fixed::encode_byte(&mut self.content, offset, value)
    }

    /// Writes a boolean at `offset` of the frame content.
    pub fn write_bool_at(&mut self, offset: usize, value: bool) -> Result<()> {
        fixed::encode_bool(&mut self.content, offset, value)
    }

    /// Writes a nullable guid at `offset` of the frame content.
    pub fn write_guid_at(&mut self, offset: usize, value: Option<Uuid>) -> Result<()> {
        fixed::encode_guid(&mut self.content, offset, value)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::with_flags(DEFAULT_FLAGS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_flags() {
        let begin = Frame::new_begin_frame();
        assert!(begin.is_begin_frame());
        assert!(!begin.is_end_frame());

        let end = Frame::new_end_frame();
        assert!(!end.is_begin_frame());
        assert!(end.is_end_frame());

        assert!(Frame::new_null_frame().is_null_frame());
        assert!(Frame::with_flags(IS_FINAL_FLAG).is_final_frame());
        assert!(Frame::with_flags(IS_EVENT_FLAG).is_event_frame());
        assert!(Frame::with_flags(BACKUP_EVENT_FLAG).is_backup_event_frame());

        let unfragmented = Frame::with_flags(UNFRAGMENTED_MESSAGE);
        assert!(unfragmented.is_unfragmented());
        assert!(!Frame::with_flags(BEGIN_FRAGMENT_FLAG).is_unfragmented());
    }

    #[test]
    fn test_wire_size_counts_header() {
        assert_eq!(Frame::default().wire_size(), 6);
        assert_eq!(Frame::from_slice(&[1, 2, 3, 4, 5]).wire_size(), 11);
    }

    #[test]
    fn test_write_and_read_frame() {
        let original = Frame::new(BytesMut::from(&[0xDE, 0xAD, 0xBE, 0xEF][..]), IS_FINAL_FLAG);
        let mut buf = BytesMut::new();
        original.write_to(&mut buf);

        assert_eq!(&buf[..4], &10u32.to_le_bytes());

        let decoded = Frame::read_from(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, original);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_read_incomplete_length() {
        let mut buf = BytesMut::from(&[0x01, 0x02][..]);
        assert!(Frame::read_from(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_read_incomplete_content() {
        let mut buf = BytesMut::from(&[
            0x0A, 0x00, 0x00, 0x00, // length = 10 (header + 4 bytes content)
            0x00, 0x20, // flags
            0x01, 0x02, // only 2 bytes of content
        ][..]);
        assert!(Frame::read_from(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn test_read_length_below_header_is_framing_error() {
        let mut buf = BytesMut::from(&[0x03, 0x00, 0x00, 0x00, 0x00, 0x00][..]);
        let err = Frame::read_from(&mut buf).unwrap_err();
        assert!(matches!(err, HzError::Framing(_)));
    }

    #[test]
    fn test_read_empty_frame() {
        let mut buf = BytesMut::from(&[
            0x06, 0x00, 0x00, 0x00, // length = 6 (just the header)
            0x00, 0x08, // END_DATA_STRUCTURE_FLAG
        ][..]);

        let frame = Frame::read_from(&mut buf).unwrap().unwrap();
        assert!(frame.is_end_frame());
        assert!(frame.content.is_empty());
    }

    #[test]
    fn test_fixed_field_access() {
        let mut frame = Frame::zeroed(INT_SIZE + LONG_SIZE + BOOL_SIZE + GUID_SIZE, DEFAULT_FLAGS);
        let guid = Uuid::new_v4();

        frame.write_int_at(0, -7).unwrap();
        frame.write_long_at(4, i64::MAX).unwrap();
        frame.write_bool_at(12, true).unwrap();
        frame.write_guid_at(13, Some(guid)).unwrap();

        assert_eq!(frame.read_int_at(0).unwrap(), -7);
        assert_eq!(frame.read_long_at(4).unwrap(), i64::MAX);
        assert!(frame.read_bool_at(12).unwrap());
        assert_eq!(frame.read_guid_at(13).unwrap(), Some(guid));
    }

    #[test]
    fn test_fixed_field_out_of_bounds() {
        let mut frame = Frame::zeroed(3, DEFAULT_FLAGS);
        assert!(matches!(frame.read_int_at(0), Err(HzError::Framing(_))));
        assert!(matches!(frame.write_int_at(0, 1), Err(HzError::Framing(_))));
        assert!(matches!(frame.read_byte_at(3), Err(HzError::Framing(_))));
    }

    #[test]
    fn test_read_large_frame() {
        let content: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
        let original = Frame::from_slice(&content);

        let mut buf = BytesMut::new();
        original.write_to(&mut buf);

        let decoded = Frame::read_from(&mut buf).unwrap().unwrap();
        assert_eq!(&decoded.content[..], &content[..]);
    }

    #[test]
    fn test_default_frame_properties() {
        let frame = Frame::default();

        assert!(!frame.is_begin_frame());
        assert!(!frame.is_end_frame());
        assert!(!frame.is_null_frame());
        assert!(!frame.is_final_frame());
        assert!(!frame.is_event_frame());
        assert!(!frame.is_backup_event_frame());
        assert!(frame.content.is_empty());
    }
}

//! Protocol constants for the client binary protocol.

/// Size of the frame length field in bytes.
pub const SIZE_OF_FRAME_LENGTH_FIELD: usize = 4;

/// Size of the frame flags field in bytes.
pub const SIZE_OF_FRAME_FLAGS_FIELD: usize = 2;

/// Total frame header size (length + flags).
///
/// The length field on the wire counts these header bytes as well.
pub const FRAME_HEADER_SIZE: usize = SIZE_OF_FRAME_LENGTH_FIELD + SIZE_OF_FRAME_FLAGS_FIELD;

// Frame flags.

/// Marks the first fragment of a message.
pub const BEGIN_FRAGMENT_FLAG: u16 = 1 << 15;

/// Marks the last fragment of a message.
pub const END_FRAGMENT_FLAG: u16 = 1 << 14;

/// Marks the last frame of a message (or of a fragment).
pub const IS_FINAL_FLAG: u16 = 1 << 13;

/// Opens a nested data structure (list, custom type).
pub const BEGIN_DATA_STRUCTURE_FLAG: u16 = 1 << 12;

/// Closes a nested data structure.
pub const END_DATA_STRUCTURE_FLAG: u16 = 1 << 11;

/// The frame stands for an absent value.
pub const IS_NULL_FLAG: u16 = 1 << 10;

/// The message is a server-pushed event.
pub const IS_EVENT_FLAG: u16 = 1 << 9;

/// The request may be acknowledged by backups.
pub const BACKUP_AWARE_FLAG: u16 = 1 << 8;

/// The message is a backup acknowledgement event.
pub const BACKUP_EVENT_FLAG: u16 = 1 << 7;

/// Default frame flags (no special flags set).
pub const DEFAULT_FLAGS: u16 = 0;

/// Flags of the initial frame of a message that is not fragmented.
pub const UNFRAGMENTED_MESSAGE: u16 = BEGIN_FRAGMENT_FLAG | END_FRAGMENT_FLAG;

// Fixed-size field widths.

/// Width of a byte field.
pub const BYTE_SIZE: usize = 1;
/// Width of a boolean field.
pub const BOOL_SIZE: usize = 1;
/// Width of an int32 field.
pub const INT_SIZE: usize = 4;
/// Width of an int64 field.
pub const LONG_SIZE: usize = 8;
/// Width of a guid field: a null flag followed by two int64 halves.
pub const GUID_SIZE: usize = BOOL_SIZE + 2 * LONG_SIZE;

// Initial frame layout.

/// Offset of the message type in the initial frame.
pub const TYPE_FIELD_OFFSET: usize = 0;

/// Offset of the correlation id in the initial frame.
pub const CORRELATION_ID_FIELD_OFFSET: usize = TYPE_FIELD_OFFSET + INT_SIZE;

/// Offset of the partition id in request and event initial frames.
pub const PARTITION_ID_FIELD_OFFSET: usize = CORRELATION_ID_FIELD_OFFSET + LONG_SIZE;

/// Offset of the backup acknowledgement count in response initial frames.
pub const RESPONSE_BACKUP_ACKS_FIELD_OFFSET: usize = CORRELATION_ID_FIELD_OFFSET + LONG_SIZE;

/// Size of the shared request header; operation fields start here.
pub const REQUEST_HEADER_SIZE: usize = PARTITION_ID_FIELD_OFFSET + INT_SIZE;

/// Size of the shared response header; operation fields start here.
pub const RESPONSE_HEADER_SIZE: usize = RESPONSE_BACKUP_ACKS_FIELD_OFFSET + BYTE_SIZE;

/// Size of the shared event header; event fields start here.
pub const EVENT_HEADER_SIZE: usize = PARTITION_ID_FIELD_OFFSET + INT_SIZE;

/// Offset of the fragment id in the leading frame of a fragment.
pub const FRAGMENTATION_ID_OFFSET: usize = 0;

/// Partition id meaning "no partition affinity, route by policy".
pub const PARTITION_ID_ANY: i32 = -1;

/// Message type of the error response a member sends instead of a regular response.
pub const EXCEPTION_MESSAGE_TYPE: i32 = 0;

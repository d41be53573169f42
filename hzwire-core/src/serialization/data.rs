//! The portable serialized form of a value.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{HzError, Result};

/// Offset of the partition hash in a serialized blob.
pub const PARTITION_HASH_OFFSET: usize = 0;
/// Offset of the serializer type id in a serialized blob.
pub const TYPE_OFFSET: usize = 4;
/// Offset of the serializer payload in a serialized blob.
pub const DATA_OFFSET: usize = 8;

const MURMUR_SEED: u32 = 0x0100_0193;

/// A type-tagged, serialized value.
///
/// Layout (big-endian): partition hash (int32), serializer type id (int32),
/// then the serializer's payload. A partition hash of zero means "derive it
/// from the payload". Higher layers treat the bytes as opaque.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Data {
    bytes: Bytes,
}

impl Data {
    /// Builds a blob from its parts.
    pub fn new(type_id: i32, partition_hash: i32, payload: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(DATA_OFFSET + payload.len());
        buf.put_i32(partition_hash);
        buf.put_i32(type_id);
        buf.put_slice(payload);
        Self { bytes: buf.freeze() }
    }

    /// Wraps received bytes, validating that the header is present.
    pub fn from_bytes(bytes: Bytes) -> Result<Self> {
        if bytes.len() < DATA_OFFSET {
            return Err(HzError::short_frame("serialized data header", DATA_OFFSET, bytes.len()));
        }
        Ok(Self { bytes })
    }

    fn header_int(&self, offset: usize) -> i32 {
        let mut field = [0u8; 4];
        field.copy_from_slice(&self.bytes[offset..offset + 4]);
        i32::from_be_bytes(field)
    }

    /// Returns the serializer type id.
    pub fn type_id(&self) -> i32 {
        self.header_int(TYPE_OFFSET)
    }

    /// Returns the serializer payload following the header.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[DATA_OFFSET..]
    }

    /// Returns the complete serialized form, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the size of the complete serialized form.
    pub fn total_size(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the header carries an explicit partition hash.
    pub fn has_partition_hash(&self) -> bool {
        self.header_int(PARTITION_HASH_OFFSET) != 0
    }

    /// Returns the partition hash, falling back to a hash of the payload.
    pub fn partition_hash(&self) -> i32 {
        if self.has_partition_hash() {
            self.header_int(PARTITION_HASH_OFFSET)
        } else {
            murmur_hash3_x86_32(self.payload(), MURMUR_SEED)
        }
    }

    /// Maps this value onto one of `partition_count` partitions.
    pub fn partition_id(&self, partition_count: i32) -> i32 {
        if partition_count <= 0 {
            return 0;
        }
        let hash = self.partition_hash();
        if hash == i32::MIN {
            0
        } else {
            hash.abs() % partition_count
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("type_id", &self.type_id())
            .field("payload_len", &self.payload().len())
            .finish()
    }
}

/// MurmurHash3 x86 32-bit.
fn murmur_hash3_x86_32(data: &[u8], seed: u32) -> i32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let mix = |k1: u32| k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);

    let mut h1 = seed;
    let mut blocks = data.chunks_exact(4);
    for block in blocks.by_ref() {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= mix(k1);
        h1 = h1.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k1 = tail
            .iter()
            .rev()
            .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte));
        h1 ^= mix(k1);
    }

    h1 ^= data.len() as u32;
    h1 ^= h1 >> 16;
    h1 = h1.wrapping_mul(0x85eb_ca6b);
    h1 ^= h1 >> 13;
    h1 = h1.wrapping_mul(0xc2b2_ae35);
    h1 ^= h1 >> 16;
    h1 as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout_is_big_endian() {
        let data = Data::new(-7, 0, &[0, 0, 0, 5]);
        assert_eq!(
            data.as_bytes(),
            &[0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xF9, 0, 0, 0, 5]
        );
        assert_eq!(data.type_id(), -7);
        assert_eq!(data.payload(), &[0, 0, 0, 5]);
        assert_eq!(data.total_size(), 12);
    }

    #[test]
    fn test_from_bytes_rejects_short_input() {
        let err = Data::from_bytes(Bytes::from_static(&[0, 0, 0, 0, 0, 0, 0])).unwrap_err();
        assert!(matches!(err, HzError::Framing(_)));
        assert!(Data::from_bytes(Bytes::from_static(&[0; 8])).is_ok());
    }

    #[test]
    fn test_explicit_partition_hash_wins() {
        let data = Data::new(1, 42, b"abc");
        assert!(data.has_partition_hash());
        assert_eq!(data.partition_hash(), 42);
        assert_eq!(data.partition_id(271), 42);
    }

    #[test]
    fn test_partition_hash_falls_back_to_payload() {
        let a = Data::new(1, 0, b"key1");
        let b = Data::new(2, 0, b"key1");
        let c = Data::new(1, 0, b"key2");
        assert!(!a.has_partition_hash());
        assert_eq!(a.partition_hash(), b.partition_hash());
        assert_ne!(a.partition_hash(), c.partition_hash());
    }

    #[test]
    fn test_partition_id_range() {
        for payload in [&b""[..], b"a", b"ab", b"abc", b"abcd", b"abcde"] {
            let id = Data::new(1, 0, payload).partition_id(271);
            assert!((0..271).contains(&id));
        }
        assert_eq!(Data::new(1, i32::MIN, b"").partition_id(271), 0);
        assert_eq!(Data::new(1, 5, b"").partition_id(0), 0);
    }

    #[test]
    fn test_murmur_known_value() {
        assert_eq!(murmur_hash3_x86_32(b"", 0), 0);
        assert_eq!(murmur_hash3_x86_32(b"", 1), 0x514E_28B7);
    }
}

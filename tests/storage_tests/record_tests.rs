//! Tests for the record codec
//!
//! These tests verify:
//! - On-disk layout of data records and tombstones
//! - Decoding records at arbitrary offsets in a region
//! - Rejection of truncated, overrunning and empty-key records

use mmapkv::storage::record::{self, Record, RecordHeader, HEADER_SIZE, TOMBSTONE_MARKER};
use mmapkv::KvError;

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let bytes = record::encode(b"hello", b"world!").unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE + 5 + 6);
    assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 5);
    assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 6);
    assert_eq!(&bytes[8..13], b"hello");
    assert_eq!(&bytes[13..], b"world!");
}

#[test]
fn test_encode_empty_value() {
    let bytes = record::encode(b"k", b"").unwrap();
    assert_eq!(bytes, vec![1, 0, 0, 0, 0, 0, 0, 0, b'k']);
}

#[test]
fn test_encode_tombstone_layout() {
    let bytes = record::encode_tombstone(b"gone").unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE + 4);
    assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 4);
    assert_eq!(
        u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        TOMBSTONE_MARKER
    );
    assert_eq!(&bytes[8..], b"gone");
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_lengths_are_little_endian() {
    let bytes = record::encode(b"ab", b"xyz").unwrap();
    assert_eq!(&bytes[..8], &[2, 0, 0, 0, 3, 0, 0, 0]);
    assert_eq!(&bytes[8..], b"abxyz");
}

#[test]
fn test_tombstone_header_has_no_value_bytes() {
    let bytes = record::encode_tombstone(b"k").unwrap();
    let header = RecordHeader::read(&bytes, 0).unwrap();

    assert!(header.is_tombstone());
    assert_eq!(header.value_len(), 0);
    assert_eq!(header.record_len(), Some(bytes.len()));
    assert_eq!(header.record_len(), Some(9));
}

#[test]
fn test_zero_header_is_sentinel() {
    let header = RecordHeader::decode([0; HEADER_SIZE]);
    assert!(header.is_sentinel());
    assert_eq!(header.record_len(), Some(HEADER_SIZE));
}

#[test]
fn test_record_len_of_largest_header() {
    let header = RecordHeader {
        key_len: u32::MAX,
        val_len: u32::MAX - 1,
    };

    // Only representable where usize is wider than 32 bits
    let expected: Option<usize> = (HEADER_SIZE as u64 + u32::MAX as u64 + (u32::MAX - 1) as u64)
        .try_into()
        .ok();
    assert_eq!(header.record_len(), expected);
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_value_record() {
    let bytes = record::encode(b"key", b"value").unwrap();
    let (rec, len) = record::decode(&bytes, 0).unwrap();

    assert_eq!(len, bytes.len());
    assert_eq!(
        rec,
        Record::Value {
            key: b"key",
            value: b"value"
        }
    );
    assert_eq!(rec.key(), b"key");
    assert_eq!(rec.value(), Some(&b"value"[..]));
}

#[test]
fn test_decode_tombstone_record() {
    let bytes = record::encode_tombstone(b"key").unwrap();
    let (rec, len) = record::decode(&bytes, 0).unwrap();

    assert_eq!(len, HEADER_SIZE + 3);
    assert_eq!(rec, Record::Tombstone { key: b"key" });
    assert_eq!(rec.value(), None);
}

#[test]
fn test_decode_packed_records_at_offsets() {
    let mut region = Vec::new();
    region.extend(record::encode(b"a", b"1").unwrap());
    region.extend(record::encode_tombstone(b"a").unwrap());
    region.extend(record::encode(b"bb", b"22").unwrap());
    region.extend(vec![0u8; 32]);

    let (first, len1) = record::decode(&region, 0).unwrap();
    let (second, len2) = record::decode(&region, len1).unwrap();
    let (third, len3) = record::decode(&region, len1 + len2).unwrap();

    assert_eq!(first.value(), Some(&b"1"[..]));
    assert_eq!(second, Record::Tombstone { key: b"a" });
    assert_eq!(third.key(), b"bb");

    let header = RecordHeader::read(&region, len1 + len2 + len3).unwrap();
    assert!(header.is_sentinel());
}

#[test]
fn test_decode_truncated_header() {
    let region = [1u8, 0, 0];
    let err = record::decode(&region, 0).unwrap_err();
    assert!(matches!(err, KvError::Malformed { offset: 0, .. }));
}

#[test]
fn test_decode_body_overruns_region() {
    let mut region = record::encode(b"key", b"value").unwrap();
    region.truncate(region.len() - 1);

    let err = record::decode(&region, 0).unwrap_err();
    assert!(matches!(err, KvError::Malformed { offset: 0, .. }));
}

#[test]
fn test_decode_huge_lengths_are_malformed() {
    let mut region = vec![0u8; 64];
    region[0..4].copy_from_slice(&1u32.to_le_bytes());
    region[4..8].copy_from_slice(&(u32::MAX - 1).to_le_bytes());

    let err = record::decode(&region, 0).unwrap_err();
    assert!(matches!(err, KvError::Malformed { .. }));
}

#[test]
fn test_decode_largest_lengths_are_malformed() {
    let mut region = vec![0u8; 64];
    region[0..4].copy_from_slice(&u32::MAX.to_le_bytes());
    region[4..8].copy_from_slice(&(u32::MAX - 1).to_le_bytes());

    let err = record::decode(&region, 0).unwrap_err();
    assert!(matches!(err, KvError::Malformed { offset: 0, .. }));
}

#[test]
fn test_decode_sentinel_is_not_a_record() {
    let region = [0u8; 16];
    let err = record::decode(&region, 0).unwrap_err();
    assert!(matches!(err, KvError::Malformed { .. }));
}

#[test]
fn test_decode_empty_key_is_malformed() {
    let mut region = vec![0u8; 16];
    region[4..8].copy_from_slice(&3u32.to_le_bytes());

    let err = record::decode(&region, 0).unwrap_err();
    assert!(matches!(err, KvError::Malformed { .. }));
}

#[test]
fn test_decode_offset_past_end() {
    let region = record::encode(b"k", b"v").unwrap();
    let err = record::decode(&region, region.len()).unwrap_err();
    assert!(matches!(err, KvError::Malformed { .. }));
}

#[test]
fn test_binary_key_and_value() {
    let key = b"\x00\x01\xFF";
    let value = b"\xFF\x00\x00\xAB";
    let bytes = record::encode(key, value).unwrap();
    let (rec, _) = record::decode(&bytes, 0).unwrap();

    assert_eq!(rec.key(), key);
    assert_eq!(rec.value(), Some(&value[..]));
}

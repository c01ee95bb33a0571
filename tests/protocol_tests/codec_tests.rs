//! Codec Tests
//!
//! Tests for command and response encoding/decoding.

use std::io::Cursor;

use mmapkv::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, Command, Response, Status, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
use mmapkv::{KvError, Result};

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_put_layout() {
    let cmd = Command::Put {
        key: b"k".to_vec(),
        value: b"vv".to_vec(),
    };

    let encoded = encode_command(&cmd).unwrap();

    assert_eq!(
        &encoded[..],
        &[0x02, 0, 0, 0, 7, 0, 0, 0, 1, b'k', b'v', b'v']
    );
}

#[test]
fn test_decode_each_command() {
    let commands = vec![
        Command::Get {
            key: b"hello".to_vec(),
        },
        Command::Put {
            key: b"mykey".to_vec(),
            value: b"myvalue".to_vec(),
        },
        Command::Put {
            key: b"novalue".to_vec(),
            value: vec![],
        },
        Command::Delete {
            key: b"todelete".to_vec(),
        },
        Command::Ping,
    ];

    for cmd in commands {
        let decoded = decode_command(&encode_command(&cmd).unwrap()).unwrap();
        assert_eq!(decoded, cmd);
    }
}

#[test]
fn test_decode_unknown_command() {
    let bytes = [0x09, 0, 0, 0, 0];
    let err = decode_command(&bytes).unwrap_err();
    assert!(matches!(err, KvError::Protocol(_)));
}

#[test]
fn test_decode_incomplete_header() {
    let bytes = [0x01, 0, 0];
    assert!(matches!(decode_command(&bytes), Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_payload() {
    let mut bytes = encode_command(&Command::Get {
        key: b"hello".to_vec(),
    })
    .unwrap()
    .to_vec();
    bytes.truncate(bytes.len() - 2);

    assert!(matches!(decode_command(&bytes), Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_key_length_overruns_payload() {
    // GET with key_len 10 but only 2 key bytes
    let bytes = [0x01, 0, 0, 0, 6, 0, 0, 0, 10, b'a', b'b'];
    assert!(matches!(decode_command(&bytes), Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_get_with_trailing_bytes() {
    let bytes = [0x01, 0, 0, 0, 6, 0, 0, 0, 1, b'a', b'x'];
    assert!(matches!(decode_command(&bytes), Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_ping_with_payload() {
    let bytes = [0x04, 0, 0, 0, 1, 0xFF];
    assert!(matches!(decode_command(&bytes), Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_payload_too_large() {
    let len = (MAX_PAYLOAD_SIZE + 1).to_be_bytes();
    let bytes = [0x01, len[0], len[1], len[2], len[3]];
    assert!(matches!(decode_command(&bytes), Err(KvError::Protocol(_))));
}

#[test]
fn test_encode_put_over_frame_limit() {
    let cmd = Command::Put {
        key: b"k".to_vec(),
        value: vec![0u8; MAX_PAYLOAD_SIZE as usize],
    };

    // key_len prefix and key push the payload one frame past the limit
    assert!(matches!(encode_command(&cmd), Err(KvError::Protocol(_))));

    let mut buf = Vec::new();
    let err = write_command(&mut buf, &cmd).unwrap_err();
    assert!(matches!(err, KvError::Protocol(_)));
    assert!(buf.is_empty());
}

#[test]
fn test_encode_put_at_frame_limit() {
    let cmd = Command::Put {
        key: b"k".to_vec(),
        value: vec![0u8; MAX_PAYLOAD_SIZE as usize - 5],
    };

    let encoded = encode_command(&cmd).unwrap();
    assert_eq!(encoded.len(), HEADER_SIZE + MAX_PAYLOAD_SIZE as usize);
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_responses() {
    let responses = vec![
        Response::ok(Some(b"value".to_vec())),
        Response::ok(None),
        Response::not_found(),
        Response::full("no room"),
        Response::error("boom"),
    ];

    for response in responses {
        let encoded = encode_response(&response).unwrap();
        assert_eq!(encoded[0], response.status as u8);
        assert_eq!(decode_response(&encoded).unwrap(), response);
    }
}

#[test]
fn test_encode_response_over_frame_limit() {
    let response = Response::ok(Some(vec![0u8; MAX_PAYLOAD_SIZE as usize + 1]));
    assert!(matches!(encode_response(&response), Err(KvError::Protocol(_))));
}

#[test]
fn test_decode_unknown_status() {
    let bytes = [0x7F, 0, 0, 0, 0];
    assert!(matches!(decode_response(&bytes), Err(KvError::Protocol(_))));
}

#[test]
fn test_response_message() {
    assert_eq!(Response::error("bad key").message(), "bad key");
    assert_eq!(Response::not_found().message(), "");
}

#[test]
fn test_response_from_engine_results() {
    let ok: Result<Option<Vec<u8>>> = Ok(Some(b"v".to_vec()));
    assert_eq!(Response::from(ok).status, Status::Ok);

    let missing: Result<Option<Vec<u8>>> = Err(KvError::KeyNotFound);
    assert_eq!(Response::from(missing).status, Status::NotFound);

    let full: Result<Option<Vec<u8>>> = Err(KvError::Full {
        requested: 9,
        available: 1,
    });
    let response = Response::from(full);
    assert_eq!(response.status, Status::Full);
    assert!(response.message().contains("9 bytes"));

    let empty: Result<Option<Vec<u8>>> = Err(KvError::EmptyKey);
    assert_eq!(Response::from(empty).status, Status::Error);
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_multiple_commands() {
    let mut buf = Vec::new();
    write_command(&mut buf, &Command::Ping).unwrap();
    write_command(
        &mut buf,
        &Command::Delete {
            key: b"gone".to_vec(),
        },
    )
    .unwrap();

    let mut cursor = Cursor::new(buf);
    assert_eq!(read_command(&mut cursor).unwrap(), Command::Ping);
    assert_eq!(
        read_command(&mut cursor).unwrap(),
        Command::Delete {
            key: b"gone".to_vec()
        }
    );

    // Stream exhausted
    let err = read_command(&mut cursor).unwrap_err();
    match err {
        KvError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_stream_response() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Response::ok(Some(b"abc".to_vec()))).unwrap();
    assert_eq!(buf.len(), HEADER_SIZE + 3);

    let response = read_response(&mut Cursor::new(buf)).unwrap();
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.payload, Some(b"abc".to_vec()));
}

#[test]
fn test_stream_rejects_oversized_frame_before_reading_payload() {
    let len = (MAX_PAYLOAD_SIZE + 1).to_be_bytes();
    let bytes = vec![0x02, len[0], len[1], len[2], len[3]];

    let err = read_command(&mut Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, KvError::Protocol(_)));
}

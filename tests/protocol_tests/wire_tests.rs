//! Wire Protocol Tests
//!
//! Tests for command and response framing, stats payloads and malformed input.

use std::io::Cursor;

use stratakv::engine::{CommandOutput, EngineStats};
use stratakv::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, Command, CommandType, Response, Status,
    MAX_PAYLOAD_SIZE,
};
use stratakv::StrataError;

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_set() {
    let cmd = Command::Set {
        key: b"mykey".to_vec(),
        value: b"myvalue".to_vec(),
    };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();

    assert_eq!(decoded, cmd);
}

#[test]
fn test_encode_decode_set_empty_value() {
    let cmd = Command::Set {
        key: b"key".to_vec(),
        value: vec![],
    };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();

    match decoded {
        Command::Set { key, value } => {
            assert_eq!(key, b"key");
            assert!(value.is_empty());
        }
        _ => panic!("Expected SET command"),
    }
}

#[test]
fn test_encode_decode_binary_data() {
    // Null bytes and high bytes in both key and value
    let binary_key: Vec<u8> = vec![0x00, 0x01, 0xFF, 0xFE, 0x80];
    let binary_value: Vec<u8> = (0..=255).collect();

    let cmd = Command::Set {
        key: binary_key.clone(),
        value: binary_value.clone(),
    };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();

    assert_eq!(
        decoded,
        Command::Set {
            key: binary_key,
            value: binary_value
        }
    );
}

#[test]
fn test_empty_key_survives_the_wire() {
    // Rejecting empty keys is the engine's job, not the codec's
    let cmd = Command::Get { key: vec![] };
    assert_eq!(decode_command(&encode_command(&cmd)).unwrap(), cmd);
}

#[test]
fn test_command_type_bytes() {
    assert_eq!(encode_command(&Command::Get { key: vec![] })[0], CommandType::Get as u8);
    assert_eq!(
        encode_command(&Command::Set {
            key: vec![],
            value: vec![]
        })[0],
        0x02
    );
    assert_eq!(encode_command(&Command::Stats)[0], 0x03);
    assert_eq!(encode_command(&Command::Ping)[0], 0x04);
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_encode_decode_response_ok_no_payload() {
    let decoded = decode_response(&encode_response(&Response::ok(None))).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, None);
}

#[test]
fn test_encode_decode_response_error() {
    let resp = Response::error("something went wrong");
    let decoded = decode_response(&encode_response(&resp)).unwrap();

    assert_eq!(decoded.status, Status::Error);
    assert_eq!(decoded.error_message().as_deref(), Some("something went wrong"));
}

#[test]
fn test_error_message_only_for_errors() {
    assert_eq!(Response::ok(Some(b"x".to_vec())).error_message(), None);
    assert_eq!(Response::not_found().error_message(), None);
}

#[test]
fn test_stats_response_roundtrip() {
    let stats = EngineStats {
        memtable_size_bytes: 4096,
        sstable_count: 7,
    };

    let resp = Response::stats(&stats).unwrap();
    let decoded = decode_response(&encode_response(&resp)).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.decode_stats().unwrap(), stats);
}

#[test]
fn test_decode_stats_without_payload() {
    let result = Response::ok(None).decode_stats();
    assert!(matches!(result, Err(StrataError::Protocol(_))));
}

#[test]
fn test_response_from_output() {
    assert_eq!(Response::from_output(CommandOutput::Done), Response::ok(None));
    assert_eq!(
        Response::from_output(CommandOutput::Value(b"v".to_vec())),
        Response::ok(Some(b"v".to_vec()))
    );
    assert_eq!(
        Response::from_output(CommandOutput::NotFound),
        Response::not_found()
    );

    let stats = EngineStats {
        memtable_size_bytes: 1,
        sstable_count: 2,
    };
    let resp = Response::from_output(CommandOutput::Stats(stats));
    assert_eq!(resp.decode_stats().unwrap(), stats);
}

#[test]
fn test_found_empty_value_is_distinct_from_not_found() {
    let resp = Response::from_output(CommandOutput::Value(Vec::new()));
    let decoded = decode_response(&encode_response(&resp)).unwrap();

    assert_eq!(decoded.status, Status::Ok);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_incomplete_header() {
    let bytes = [0x01, 0x00, 0x00]; // Only 3 bytes, need 5
    let result = decode_command(&bytes);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Incomplete command header"));
}

#[test]
fn test_incomplete_payload() {
    // Header says 10 bytes payload, but only 5 provided
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x05, 0x68];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("Incomplete"));
}

#[test]
fn test_unknown_command_type() {
    let bytes = [0xFF, 0x00, 0x00, 0x00, 0x00];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("Unknown command type"));
}

#[test]
fn test_unknown_response_status() {
    let bytes = [0xFF, 0x00, 0x00, 0x00, 0x00];
    let result = decode_response(&bytes);
    assert!(result.unwrap_err().to_string().contains("Unknown response status"));
}

#[test]
fn test_get_missing_key_length() {
    // GET command with payload too short for key length
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00];
    assert!(matches!(decode_command(&bytes), Err(StrataError::Protocol(_))));
}

#[test]
fn test_set_key_length_past_payload() {
    // key_len says 9 but only 2 bytes follow
    let bytes = [0x02, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x09, b'a', b'b'];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("incomplete key"));
}

#[test]
fn test_get_with_trailing_bytes() {
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, b'k', b'x'];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("trailing bytes"));
}

#[test]
fn test_stats_with_unexpected_payload() {
    let bytes = [0x03, 0x00, 0x00, 0x00, 0x01, 0x00];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("unexpected payload"));
}

#[test]
fn test_oversized_payload_rejected_before_reading() {
    let too_big = (MAX_PAYLOAD_SIZE + 1).to_be_bytes();
    let bytes = [0x02, too_big[0], too_big[1], too_big[2], too_big[3]];

    let mut cursor = Cursor::new(bytes.to_vec());
    let result = read_command(&mut cursor);

    assert!(result.unwrap_err().to_string().contains("Payload too large"));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_multiple_commands() {
    let commands = vec![
        Command::Ping,
        Command::Set {
            key: b"k1".to_vec(),
            value: b"v1".to_vec(),
        },
        Command::Get { key: b"k1".to_vec() },
        Command::Stats,
    ];

    let mut buffer = Vec::new();
    for cmd in &commands {
        write_command(&mut buffer, cmd).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &commands {
        assert_eq!(&read_command(&mut cursor).unwrap(), expected);
    }
}

#[test]
fn test_stream_multiple_responses() {
    let responses = vec![
        Response::ok(Some(b"data".to_vec())),
        Response::not_found(),
        Response::error("oops"),
        Response::ok(None),
    ];

    let mut buffer = Vec::new();
    for resp in &responses {
        write_response(&mut buffer, resp).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &responses {
        assert_eq!(&read_response(&mut cursor).unwrap(), expected);
    }
}

#[test]
fn test_stream_eof_is_io_error() {
    let mut cursor = Cursor::new(Vec::new());
    assert!(matches!(read_command(&mut cursor), Err(StrataError::Io(_))));
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_wire_format_get() {
    let encoded = encode_command(&Command::Get {
        key: b"test".to_vec(),
    });

    // [0x01][0x00 0x00 0x00 0x08][0x00 0x00 0x00 0x04][t e s t]
    //  cmd   payload_len(8)       key_len(4)          key
    assert_eq!(encoded[0], 0x01);
    assert_eq!(&encoded[1..5], &[0x00, 0x00, 0x00, 0x08]);
    assert_eq!(&encoded[5..9], &[0x00, 0x00, 0x00, 0x04]);
    assert_eq!(&encoded[9..13], b"test");
}

#[test]
fn test_wire_format_set() {
    let encoded = encode_command(&Command::Set {
        key: b"k".to_vec(),
        value: b"vv".to_vec(),
    });

    // Value runs to the end of the payload, no length prefix of its own
    assert_eq!(
        encoded,
        vec![0x02, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x01, b'k', b'v', b'v']
    );
}

#[test]
fn test_wire_format_not_found() {
    assert_eq!(
        encode_response(&Response::not_found()),
        vec![0x01, 0x00, 0x00, 0x00, 0x00]
    );
}

//! Error conditions reported by the cursor, and their POSIX error numbers.

use at_parser_core::{AtParser, AtParserError, codes};

// ─── Initialization ──────────────────────────────────────────────────────────

#[test]
fn uninitialized_parser_is_rejected_with_eperm() {
    let mut p = AtParser::default();
    let err = p.get_u16(1).unwrap_err();
    assert_eq!(err, AtParserError::NotInitialized);
    assert_eq!(err.errno(), -1);
    assert_eq!(p.get_i64(1), Err(AtParserError::NotInitialized));
    assert_eq!(p.get_str(1), Err(AtParserError::NotInitialized));
    assert_eq!(p.get_token(0), Err(AtParserError::NotInitialized));
    assert_eq!(p.subparameter_count_strict(), Err(AtParserError::NotInitialized));
}

#[test]
fn non_utf8_input_is_invalid_argument() {
    let mut p = AtParser::default();
    let err = p.init_bytes(b"+NOTIF: \xff").unwrap_err();
    assert_eq!(err.errno(), -22);
    assert!(!p.is_initialized());
}

// ─── Range ───────────────────────────────────────────────────────────────────

#[test]
fn u16_range() {
    let input = format!("+NOTIF: {},-2,3\r\nOK\r\n", u32::from(u16::MAX) + 1);
    let mut p = AtParser::new(&input);
    assert_eq!(p.get_u16(1), Err(AtParserError::OutOfRange));
    assert_eq!(p.get_u16(2), Err(AtParserError::OutOfRange));
    assert_eq!(p.get_u16(3), Ok(3));
}

#[test]
fn i16_range() {
    let input = format!("+NOTIF: {},{},3", i32::from(i16::MAX) + 1, i32::from(i16::MIN) - 1);
    let mut p = AtParser::new(&input);
    assert_eq!(p.get_i16(1), Err(AtParserError::OutOfRange));
    assert_eq!(p.get_i16(2), Err(AtParserError::OutOfRange));
}

#[test]
fn u32_and_i32_range() {
    let input = format!("+NOTIF: {},-2,{}", u64::from(u32::MAX) + 1, i64::from(i32::MIN) - 1);
    let mut p = AtParser::new(&input);
    assert_eq!(p.get_u32(1), Err(AtParserError::OutOfRange));
    assert_eq!(p.get_u32(2), Err(AtParserError::OutOfRange));
    assert_eq!(p.get_i32(3), Err(AtParserError::OutOfRange));
    assert_eq!(p.get_i32(2), Ok(-2));
}

#[test]
fn sixty_four_bit_range() {
    let mut p = AtParser::new("+NOTIF: 100000000000000000000,-2,3\r\nOK\r\n");
    assert_eq!(p.get_u64(1), Err(AtParserError::OutOfRange));
    assert_eq!(p.get_i64(1), Err(AtParserError::OutOfRange));
    assert_eq!(p.get_u64(2), Err(AtParserError::OutOfRange));

    let mut p = AtParser::new("+NOTIF: -100000000000000000000,-2,3\r\nOK\r\n");
    let err = p.get_i64(1).unwrap_err();
    assert_eq!(err, AtParserError::OutOfRange);
    assert_eq!(err.errno(), -34);
}

#[test]
fn out_of_range_still_consumes_the_token() {
    let mut p = AtParser::new("+NOTIF: 70000,5");
    assert_eq!(p.get_u16(1), Err(AtParserError::OutOfRange));
    assert_eq!(p.state().count, 2);
    assert_eq!(p.get_u16(2), Ok(5));
}

// ─── Type mismatch ───────────────────────────────────────────────────────────

#[test]
fn notification_is_not_an_integer() {
    let mut p = AtParser::new("+NOTIF: 1,2");
    let err = p.get_u16(0).unwrap_err();
    assert_eq!(err, AtParserError::Unsupported);
    assert_eq!(err.errno(), -95);
    assert_eq!(p.get_i64(0), Err(AtParserError::Unsupported));
}

#[test]
fn integer_is_not_a_string() {
    let mut p = AtParser::new("+NOTIF: 1,2,3");
    assert_eq!(p.get_str(1), Err(AtParserError::Unsupported));
    let mut buf = [0u8; 32];
    assert_eq!(p.get_string(1, &mut buf), Err(AtParserError::Unsupported));
}

#[test]
fn empty_subparameter_has_no_data() {
    let mut p = AtParser::new("+NOTIF: 1,,3");
    let err = p.get_u32(2).unwrap_err();
    assert_eq!(err, AtParserError::NoData);
    assert_eq!(err.errno(), -61);
    assert_eq!(p.get_i16(2), Err(AtParserError::NoData));
}

#[test]
fn non_command_lines_have_no_command_type() {
    let mut p = AtParser::new("ABBA");
    assert_eq!(p.command_type(), Err(AtParserError::Unsupported));

    let mut p = AtParser::new("+NOTIF: 1,2,3\r\nOK\r\n");
    assert_eq!(p.command_type(), Err(AtParserError::Unsupported));
}

#[test]
fn no_next_line_after_final_response() {
    let mut p = AtParser::new("+NOTIF: 1,2,3\r\nOK\r\n");
    let err = p.next_command().unwrap_err();
    assert_eq!(err, AtParserError::Unsupported);
    assert_eq!(err.code(), codes::UNSUPPORTED);
}

// ─── Malformed input ─────────────────────────────────────────────────────────

#[test]
fn space_is_not_a_separator() {
    for input in ["+NOTIF: 1,2,3 4,5,6 7,8,9", "+NOTIF: 1,2,3 -4,5,6 7,8,9"] {
        let mut p = AtParser::new(input);
        let err = p.get_u16(4).unwrap_err();
        assert_eq!(err, AtParserError::Malformed { offset: 14 }, "{input:?}");
        assert_eq!(err.errno(), -74);
    }
}

#[test]
fn quoted_string_cannot_start_a_line() {
    for input in ["\"abba\",1,2", "\"abba\",-1,2"] {
        let mut p = AtParser::new(input);
        assert_eq!(p.get_i32(1), Err(AtParserError::Malformed { offset: 0 }));
    }
}

#[test]
fn malformed_strings() {
    for input in [
        "+NOTIF: 1,2 3,\"test\"",
        "++NOTIF: 1,2,3,\"test\"",
        "+NOTIF+: 1,2,3,\"test\"",
        "AT+CMD+: 1,2,3,\"test\"",
        "AT+CMD+: 1,2,3,4",
        "+NOTIF: (),2,3,\"test\"",
    ] {
        let mut p = AtParser::new(input);
        assert!(
            matches!(p.get_str(4), Err(AtParserError::Malformed { .. })),
            "{input:?}"
        );
        let mut p = AtParser::new(input);
        let mut buf = [0u8; 32];
        assert!(
            matches!(p.get_string(4, &mut buf), Err(AtParserError::Malformed { .. })),
            "{input:?}"
        );
    }
}

#[test]
fn broken_command_is_not_text() {
    for input in ["AT+CMD+: 1,2,3", "AT+CFUN?1", "AT+=1", "AT?1\r\nOK\r\n"] {
        let mut p = AtParser::new(input);
        assert_eq!(
            p.get_token(0),
            Err(AtParserError::Malformed { offset: 0 }),
            "{input:?}"
        );
        let mut p = AtParser::new(input);
        assert_eq!(p.get_token(2), Err(AtParserError::Malformed { offset: 0 }), "{input:?}");
        assert_eq!(
            p.command_type(),
            Err(AtParserError::Malformed { offset: 0 }),
            "{input:?}"
        );
        assert_eq!(p.subparameter_count(), Ok(0), "{input:?}");
    }
}

#[test]
fn malformed_line_cannot_be_skipped() {
    let mut p = AtParser::new("+A: 1 2\r\n+B: 3\r\n");
    assert_eq!(p.next_command(), Err(AtParserError::Unsupported));
}

#[test]
fn cursor_stays_at_failure_point() {
    let mut p = AtParser::new("+NOTIF: 1,2 3");
    let before = p.get_token(2).unwrap_err();
    let again = p.get_token(2).unwrap_err();
    assert_eq!(before, again);
    assert_eq!(p.state().count, 2);
}

// ─── Buffers ─────────────────────────────────────────────────────────────────

#[test]
fn buffer_too_small_writes_nothing() {
    let mut p = AtParser::new("+NOTIF: 1,2,3\r\nOK\r\n");
    let mut buf = [0xAAu8; 1];
    let err = p.get_string(0, &mut buf).unwrap_err();
    assert_eq!(
        err,
        AtParserError::NoMemory {
            needed: 7,
            available: 1
        }
    );
    assert_eq!(err.errno(), -12);
    assert_eq!(buf, [0xAA]);
}

#[test]
fn buffer_needs_room_for_terminator() {
    let mut p = AtParser::new("AT+CMD=\"hello\"");
    let mut exact = [0u8; 5];
    assert!(matches!(
        p.get_string(1, &mut exact),
        Err(AtParserError::NoMemory { needed: 6, .. })
    ));
    let mut room = [0xFFu8; 6];
    assert_eq!(p.get_string(1, &mut room), Ok(5));
    assert_eq!(&room, b"hello\0");
}

//! Tests for statement parsing
//!
//! The parser is the engine's boundary: lexically invalid input (negative
//! ids, malformed ints, oversize fields) must be rejected here, before any
//! row reaches the tree.

use oriondb::row::{EMAIL_SIZE, USERNAME_SIZE};
use oriondb::{OrionError, Statement};

// =============================================================================
// Insert Statements
// =============================================================================

#[test]
fn test_parse_insert() {
    let statement = Statement::parse("insert 1 braden braden@gmail.com").unwrap();

    match statement {
        Statement::Insert(row) => {
            assert_eq!(row.id(), 1);
            assert_eq!(row.username(), "braden");
            assert_eq!(row.email(), "braden@gmail.com");
        }
        other => panic!("expected insert, got {:?}", other),
    }
}

#[test]
fn test_parse_insert_tolerates_extra_whitespace() {
    let statement = Statement::parse("  insert   2  alice  alice@example.com ").unwrap();
    assert!(matches!(statement, Statement::Insert(_)));
}

#[test]
fn test_negative_id_rejected() {
    let result = Statement::parse("insert -1 braden braden@gmail.com");
    assert!(matches!(result, Err(OrionError::Parse(_))));
}

#[test]
fn test_non_numeric_id_rejected() {
    let result = Statement::parse("insert abc braden braden@gmail.com");
    assert!(matches!(result, Err(OrionError::Parse(_))));
}

#[test]
fn test_id_beyond_u32_rejected() {
    let result = Statement::parse("insert 4294967296 braden braden@gmail.com");
    assert!(matches!(result, Err(OrionError::Parse(_))));
}

#[test]
fn test_missing_fields_rejected() {
    for input in ["insert", "insert 1", "insert 1 braden"] {
        let result = Statement::parse(input);
        assert!(matches!(result, Err(OrionError::Parse(_))), "accepted {:?}", input);
    }
}

#[test]
fn test_username_at_capacity_accepted() {
    let input = format!("insert 1 {} ok@example.com", "u".repeat(USERNAME_SIZE));
    assert!(Statement::parse(&input).is_ok());
}

#[test]
fn test_oversize_username_rejected() {
    let input = format!("insert 1 {} ok@example.com", "u".repeat(USERNAME_SIZE + 1));
    let result = Statement::parse(&input);
    assert!(matches!(
        result,
        Err(OrionError::FieldTooLong { field: "username", .. })
    ));
}

#[test]
fn test_oversize_email_rejected() {
    let input = format!("insert 1 braden {}", "e".repeat(EMAIL_SIZE + 1));
    let result = Statement::parse(&input);
    assert!(matches!(
        result,
        Err(OrionError::FieldTooLong { field: "email", .. })
    ));
}

// =============================================================================
// Select Statements
// =============================================================================

#[test]
fn test_parse_select() {
    let statement = Statement::parse("select").unwrap();
    assert!(matches!(statement, Statement::Select));
}

// =============================================================================
// Unrecognized Input
// =============================================================================

#[test]
fn test_unrecognized_statement_rejected() {
    for input in ["update 1 a b", "delete 1", "droptable"] {
        let result = Statement::parse(input);
        assert!(matches!(result, Err(OrionError::Parse(_))), "accepted {:?}", input);
    }
}

#[test]
fn test_empty_input_rejected() {
    let result = Statement::parse("   ");
    assert!(matches!(result, Err(OrionError::Parse(_))));
}

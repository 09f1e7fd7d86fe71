//! Structural validation of field tables.
//!
//! Checks run in a fixed order and stop at the first failure: required
//! fields, domain codes, widths, then data types. Domain code checks are
//! record specific and are called by the owning entity between the required
//! and width phases.

use crate::error::{NachError, Result};
use crate::field::{FieldTable, FieldType};

/// Addenda type codes accepted on addenda records.
pub const ADDENDA_TYPE_CODES: &[&str] = &["02", "05", "98", "99"];

/// Addenda type code carrying a return reason.
pub const RETURN_ADDENDA_TYPE_CODE: &str = "99";

/// Checking, savings, general ledger and loan credit codes.
pub const CREDIT_TRANSACTION_CODES: &[&str] = &[
    "21", "22", "23", "24", "31", "32", "33", "34", "41", "42", "43", "44", "51", "52", "53",
    "54",
];

/// Checking, savings, general ledger and loan debit codes.
pub const DEBIT_TRANSACTION_CODES: &[&str] = &[
    "26", "27", "28", "29", "36", "37", "38", "39", "46", "47", "48", "49", "55", "56",
];

/// Mixed, credits-only and debits-only batches.
pub const SERVICE_CLASS_CODES: &[&str] = &["200", "220", "225"];

pub const STANDARD_ENTRY_CLASS_CODES: &[&str] = &[
    "ACK", "ARC", "ATX", "BOC", "CCD", "CIE", "COR", "CTX", "DNE", "ENR", "IAT", "POP", "POS",
    "PPD", "RCK", "TEL", "WEB",
];

/// Fails with `MissingField` for the first required field without a value.
pub fn validate_required_fields(table: &FieldTable) -> Result<()> {
    match table.iter().find(|f| f.spec().required && f.is_empty()) {
        Some(field) => Err(NachError::MissingField {
            field: field.name().to_string(),
        }),
        None => Ok(()),
    }
}

/// Fails with `FieldTooLong` for the first value wider than its window.
pub fn validate_lengths(table: &FieldTable) -> Result<()> {
    for field in table.iter() {
        let length = field.value().chars().count();
        if length > field.spec().width {
            return Err(NachError::FieldTooLong {
                field: field.name().to_string(),
                width: field.spec().width,
                length,
            });
        }
    }
    Ok(())
}

/// Fails with `InvalidFieldType` for the first value that does not match its
/// declared type. Numeric values must be digits only (amounts are whole minor
/// units); alphanumeric values must be printable ASCII.
pub fn validate_data_types(table: &FieldTable) -> Result<()> {
    for field in table.iter() {
        let value = field.value();
        let valid = match field.spec().field_type {
            FieldType::Numeric => value.chars().all(|c| c.is_ascii_digit()),
            FieldType::Alphanumeric => value.chars().all(|c| (' '..='~').contains(&c)),
        };
        if !valid {
            return Err(NachError::InvalidFieldType {
                field: field.name().to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Width and type checks, the phases every record shares.
pub fn validate_structure(table: &FieldTable) -> Result<()> {
    validate_lengths(table)?;
    validate_data_types(table)
}

pub fn validate_addenda_type_code(code: &str) -> Result<()> {
    if ADDENDA_TYPE_CODES.contains(&code) {
        Ok(())
    } else {
        Err(NachError::InvalidAddendaTypeCode {
            code: code.to_string(),
        })
    }
}

pub fn validate_transaction_code(code: &str) -> Result<()> {
    if is_credit(code) || is_debit(code) {
        Ok(())
    } else {
        Err(NachError::InvalidTransactionCode {
            code: code.to_string(),
        })
    }
}

pub fn validate_service_class_code(code: &str) -> Result<()> {
    if SERVICE_CLASS_CODES.contains(&code) {
        Ok(())
    } else {
        Err(NachError::InvalidServiceClassCode {
            code: code.to_string(),
        })
    }
}

pub fn validate_standard_entry_class(code: &str) -> Result<()> {
    if STANDARD_ENTRY_CLASS_CODES.contains(&code) {
        Ok(())
    } else {
        Err(NachError::InvalidStandardEntryClass {
            code: code.to_string(),
        })
    }
}

pub fn is_credit(transaction_code: &str) -> bool {
    CREDIT_TRANSACTION_CODES.contains(&transaction_code)
}

pub fn is_debit(transaction_code: &str) -> bool {
    DEBIT_TRANSACTION_CODES.contains(&transaction_code)
}

/// Computes the check digit for an 8-digit routing prefix.
///
/// Returns `None` unless `prefix` is exactly eight ASCII digits.
pub fn check_digit(prefix: &str) -> Option<u32> {
    if prefix.len() != 8 || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    const WEIGHTS: [u32; 8] = [3, 7, 1, 3, 7, 1, 3, 7];
    let sum: u32 = prefix
        .chars()
        .zip(WEIGHTS)
        .filter_map(|(c, w)| c.to_digit(10).map(|d| d * w))
        .sum();
    Some((10 - sum % 10) % 10)
}

/// Appends the check digit to an 8-digit routing prefix. Any other input is
/// returned unchanged.
pub fn routing_with_check_digit(routing: &str) -> String {
    match check_digit(routing) {
        Some(digit) => format!("{}{}", routing, digit),
        None => routing.to_string(),
    }
}

/// Verifies a 9-digit routing number against its check digit.
pub fn validate_routing_number(routing: &str) -> Result<()> {
    let expected = routing
        .get(..8)
        .and_then(check_digit)
        .and_then(|d| char::from_digit(d, 10));
    match (expected, routing.chars().nth(8)) {
        (Some(expected), Some(actual)) if routing.len() == 9 && expected == actual => Ok(()),
        _ => Err(NachError::InvalidRoutingNumber {
            routing: routing.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RecordKind;

    #[test]
    fn test_missing_required_field() {
        let table = FieldTable::new(RecordKind::Entry);
        match validate_required_fields(&table) {
            Err(NachError::MissingField { field }) => assert_eq!(field, "transaction_code"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_field_too_long() {
        let mut table = FieldTable::new(RecordKind::Entry);
        table.set("individual_name", "X".repeat(23)).unwrap();
        match validate_lengths(&table) {
            Err(NachError::FieldTooLong {
                field,
                width,
                length,
            }) => {
                assert_eq!(field, "individual_name");
                assert_eq!(width, 22);
                assert_eq!(length, 23);
            }
            other => panic!("Expected FieldTooLong, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_rejects_sign_and_decimal() {
        for value in ["-100", "10.50", "12a"] {
            let mut table = FieldTable::new(RecordKind::Entry);
            table.set("amount", value).unwrap();
            assert!(matches!(
                validate_data_types(&table),
                Err(NachError::InvalidFieldType { .. })
            ));
        }
    }

    #[test]
    fn test_alphanumeric_rejects_non_ascii() {
        let mut table = FieldTable::new(RecordKind::Entry);
        table.set("individual_name", "JOSÉ").unwrap();
        assert!(matches!(
            validate_data_types(&table),
            Err(NachError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn test_addenda_type_codes() {
        assert!(validate_addenda_type_code("05").is_ok());
        assert!(validate_addenda_type_code("99").is_ok());
        assert!(matches!(
            validate_addenda_type_code("10"),
            Err(NachError::InvalidAddendaTypeCode { .. })
        ));
    }

    #[test]
    fn test_transaction_code_direction() {
        assert!(is_credit("22"));
        assert!(is_debit("27"));
        assert!(!is_credit("27"));
        assert!(validate_transaction_code("99").is_err());
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(check_digit("08100003"), Some(2));
        assert_eq!(check_digit("12345678"), Some(0));
        assert_eq!(check_digit("1234567"), None);
        assert_eq!(routing_with_check_digit("08100003"), "081000032");
        assert_eq!(routing_with_check_digit("081000032"), "081000032");
    }

    #[test]
    fn test_validate_routing_number() {
        assert!(validate_routing_number("081000032").is_ok());
        assert!(validate_routing_number("123456780").is_ok());
        assert!(matches!(
            validate_routing_number("081000033"),
            Err(NachError::InvalidRoutingNumber { .. })
        ));
        assert!(validate_routing_number("08100003").is_err());
    }
}

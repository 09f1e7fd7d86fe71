//! Column layouts for the six physical record types.
//!
//! Positions are zero-based column offsets. Every layout tiles the full
//! 94-character record with no gaps or overlaps.

use crate::field::FieldSpec;
use std::fmt;

/// The physical record types, identified by the digit in column 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    FileHeader,
    BatchHeader,
    Entry,
    Addenda,
    BatchControl,
    FileControl,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::FileHeader,
        RecordKind::BatchHeader,
        RecordKind::Entry,
        RecordKind::Addenda,
        RecordKind::BatchControl,
        RecordKind::FileControl,
    ];

    /// Maps a record type digit to its record kind.
    pub fn from_type_code(code: char) -> Option<Self> {
        match code {
            '1' => Some(RecordKind::FileHeader),
            '5' => Some(RecordKind::BatchHeader),
            '6' => Some(RecordKind::Entry),
            '7' => Some(RecordKind::Addenda),
            '8' => Some(RecordKind::BatchControl),
            '9' => Some(RecordKind::FileControl),
            _ => None,
        }
    }

    pub fn type_code(self) -> char {
        match self {
            RecordKind::FileHeader => '1',
            RecordKind::BatchHeader => '5',
            RecordKind::Entry => '6',
            RecordKind::Addenda => '7',
            RecordKind::BatchControl => '8',
            RecordKind::FileControl => '9',
        }
    }

    pub fn layout(self) -> &'static [FieldSpec] {
        match self {
            RecordKind::FileHeader => FILE_HEADER,
            RecordKind::BatchHeader => BATCH_HEADER,
            RecordKind::Entry => ENTRY,
            RecordKind::Addenda => ADDENDA,
            RecordKind::BatchControl => BATCH_CONTROL,
            RecordKind::FileControl => FILE_CONTROL,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::FileHeader => "file header",
            RecordKind::BatchHeader => "batch header",
            RecordKind::Entry => "entry",
            RecordKind::Addenda => "addenda",
            RecordKind::BatchControl => "batch control",
            RecordKind::FileControl => "file control",
        };
        f.write_str(name)
    }
}

pub const FILE_HEADER: &[FieldSpec] = &[
    FieldSpec::numeric("record_type_code", 0, 1, true, "1"),
    FieldSpec::numeric("priority_code", 1, 2, true, "01"),
    FieldSpec::routing("immediate_destination", 3, 10, true),
    FieldSpec::routing("immediate_origin", 13, 10, true),
    FieldSpec::numeric("file_creation_date", 23, 6, true, ""),
    FieldSpec::numeric("file_creation_time", 29, 4, false, ""),
    FieldSpec::alphanumeric("file_id_modifier", 33, 1, true, "A"),
    FieldSpec::numeric("record_size", 34, 3, true, "094"),
    FieldSpec::numeric("blocking_factor", 37, 2, true, "10"),
    FieldSpec::numeric("format_code", 39, 1, true, "1"),
    FieldSpec::alphanumeric("immediate_destination_name", 40, 23, false, ""),
    FieldSpec::alphanumeric("immediate_origin_name", 63, 23, false, ""),
    FieldSpec::alphanumeric("reference_code", 86, 8, false, ""),
];

pub const FILE_CONTROL: &[FieldSpec] = &[
    FieldSpec::numeric("record_type_code", 0, 1, true, "9"),
    FieldSpec::numeric("batch_count", 1, 6, true, "0"),
    FieldSpec::numeric("block_count", 7, 6, true, "0"),
    FieldSpec::numeric("addenda_count", 13, 8, true, "0"),
    FieldSpec::numeric("entry_hash", 21, 10, true, "0"),
    FieldSpec::numeric("total_debit", 31, 12, true, "0"),
    FieldSpec::numeric("total_credit", 43, 12, true, "0"),
    FieldSpec::alphanumeric("reserved", 55, 39, false, ""),
];

pub const BATCH_HEADER: &[FieldSpec] = &[
    FieldSpec::numeric("record_type_code", 0, 1, true, "5"),
    FieldSpec::numeric("service_class_code", 1, 3, true, ""),
    FieldSpec::alphanumeric("company_name", 4, 16, true, ""),
    FieldSpec::alphanumeric("company_discretionary_data", 20, 20, false, ""),
    FieldSpec::alphanumeric("company_identification", 40, 10, true, ""),
    FieldSpec::alphanumeric("standard_entry_class_code", 50, 3, true, ""),
    FieldSpec::alphanumeric("company_entry_description", 53, 10, true, ""),
    FieldSpec::alphanumeric("company_descriptive_date", 63, 6, false, ""),
    FieldSpec::numeric("effective_entry_date", 69, 6, true, ""),
    // assigned by the clearing house
    FieldSpec::alphanumeric("settlement_date", 75, 3, false, ""),
    FieldSpec::alphanumeric("originator_status_code", 78, 1, true, "1"),
    FieldSpec::numeric("originating_dfi", 79, 8, true, ""),
    FieldSpec::numeric("batch_number", 87, 7, true, "0"),
];

pub const BATCH_CONTROL: &[FieldSpec] = &[
    FieldSpec::numeric("record_type_code", 0, 1, true, "8"),
    FieldSpec::numeric("service_class_code", 1, 3, true, ""),
    FieldSpec::numeric("addenda_count", 4, 6, true, "0"),
    FieldSpec::numeric("entry_hash", 10, 10, true, "0"),
    FieldSpec::numeric("total_debit", 20, 12, true, "0"),
    FieldSpec::numeric("total_credit", 32, 12, true, "0"),
    FieldSpec::alphanumeric("company_identification", 44, 10, true, ""),
    FieldSpec::alphanumeric("message_authentication_code", 54, 19, false, ""),
    FieldSpec::alphanumeric("reserved", 73, 6, false, ""),
    FieldSpec::numeric("originating_dfi", 79, 8, true, ""),
    FieldSpec::numeric("batch_number", 87, 7, true, "0"),
];

pub const ENTRY: &[FieldSpec] = &[
    FieldSpec::numeric("record_type_code", 0, 1, true, "6"),
    FieldSpec::numeric("transaction_code", 1, 2, true, ""),
    FieldSpec::numeric("receiving_dfi", 3, 8, true, ""),
    FieldSpec::numeric("check_digit", 11, 1, true, ""),
    FieldSpec::alphanumeric("dfi_account", 12, 17, true, ""),
    FieldSpec::numeric("amount", 29, 10, true, ""),
    FieldSpec::alphanumeric("id_number", 39, 15, false, ""),
    FieldSpec::alphanumeric("individual_name", 54, 22, true, ""),
    FieldSpec::alphanumeric("discretionary_data", 76, 2, false, ""),
    FieldSpec::numeric("addenda_id", 78, 1, true, "0"),
    FieldSpec::numeric("trace_number", 79, 15, false, ""),
];

pub const ADDENDA: &[FieldSpec] = &[
    FieldSpec::numeric("record_type_code", 0, 1, true, "7"),
    FieldSpec::numeric("addenda_type_code", 1, 2, true, "05"),
    FieldSpec::alphanumeric("payment_related_information", 3, 80, false, ""),
    FieldSpec::numeric("addenda_sequence_number", 83, 4, true, "1"),
    FieldSpec::numeric("entry_detail_sequence_number", 87, 7, false, ""),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::RECORD_WIDTH;

    #[test]
    fn test_layouts_tile_the_record() {
        for kind in RecordKind::ALL {
            let mut column = 0;
            for spec in kind.layout() {
                assert_eq!(spec.position, column, "{} field {}", kind, spec.name);
                assert!(spec.width > 0);
                column += spec.width;
            }
            assert_eq!(column, RECORD_WIDTH, "{}", kind);
        }
    }

    #[test]
    fn test_record_type_default_matches_kind() {
        for kind in RecordKind::ALL {
            let first = kind.layout()[0];
            assert_eq!(first.name, "record_type_code");
            assert_eq!(first.default, kind.type_code().to_string());
            assert_eq!(RecordKind::from_type_code(kind.type_code()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_type_code() {
        assert_eq!(RecordKind::from_type_code('2'), None);
        assert_eq!(RecordKind::from_type_code('A'), None);
    }
}

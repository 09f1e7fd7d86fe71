//! Entry addenda records: free-form continuation of one entry.

use crate::error::Result;
use crate::field::{FieldTable, FieldValues};
use crate::layout::RecordKind;
use crate::validate;

/// Width of the return reason code at the start of the payment information.
const RETURN_CODE_WIDTH: usize = 3;

/// Construction options for an [`EntryAddenda`].
///
/// High-level options take precedence over the raw `fields` overrides.
#[derive(Debug, Clone, Default)]
pub struct AddendaOptions {
    pub addenda_type_code: Option<String>,
    pub payment_related_information: Option<String>,

    /// Return reason code (e.g. `R01`), stored as the leading columns of the
    /// payment-related information.
    pub return_code: Option<String>,

    pub addenda_sequence_number: Option<u32>,
    pub entry_detail_sequence_number: Option<String>,

    /// Raw per-field overrides applied over the layout defaults.
    pub fields: FieldValues,
}

/// An addenda record owned by one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAddenda {
    fields: FieldTable,
}

impl EntryAddenda {
    /// Builds and validates an addenda record.
    pub fn new(options: AddendaOptions) -> Result<Self> {
        Self::with_validation(options, true)
    }

    /// Builds an addenda record, validating it only when `auto_validate` is set.
    pub fn with_validation(options: AddendaOptions, auto_validate: bool) -> Result<Self> {
        let mut fields = FieldTable::with_overrides(RecordKind::Addenda, &options.fields)?;

        if let Some(code) = options.addenda_type_code {
            fields.set("addenda_type_code", code)?;
        }
        if let Some(number) = options.addenda_sequence_number {
            fields.set_number("addenda_sequence_number", u64::from(number))?;
        }

        let mut addenda = EntryAddenda { fields };
        if let Some(info) = options.payment_related_information {
            addenda.set("payment_related_information", &info)?;
        }
        if let Some(code) = options.return_code {
            addenda.apply_return_code(&code)?;
        }
        if let Some(sequence) = options.entry_detail_sequence_number {
            addenda.set("entry_detail_sequence_number", &sequence)?;
        }

        if auto_validate {
            addenda.validate()?;
        }
        Ok(addenda)
    }

    /// Runs the validation phases over the addenda fields.
    pub fn validate(&self) -> Result<()> {
        validate::validate_required_fields(&self.fields)?;
        validate::validate_addenda_type_code(self.addenda_type_code())?;
        validate::validate_structure(&self.fields)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }

    /// Sets a field value.
    ///
    /// The entry detail sequence number keeps its rightmost digits when the
    /// value is wider than the field, the payment-related information keeps its
    /// leftmost characters.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let width = self
            .fields
            .field(field)
            .map(|f| f.spec().width)
            .unwrap_or_default();
        let coerced = match field {
            "entry_detail_sequence_number" => keep_rightmost(value, width),
            "payment_related_information" => keep_leftmost(value, width),
            _ => value.to_string(),
        };
        self.fields.set(field, coerced)
    }

    pub fn addenda_type_code(&self) -> &str {
        self.fields.get("addenda_type_code").unwrap_or_default()
    }

    pub fn payment_related_information(&self) -> &str {
        self.fields
            .get("payment_related_information")
            .unwrap_or_default()
    }

    /// Returns the first three characters of the payment-related information,
    /// or `None` when it is blank.
    ///
    /// Only meaningful on return addenda (type code `99`).
    pub fn return_code(&self) -> Option<&str> {
        let info = self.payment_related_information();
        if info.trim().is_empty() {
            return None;
        }
        let end = info
            .char_indices()
            .nth(RETURN_CODE_WIDTH)
            .map(|(i, _)| i)
            .unwrap_or(info.len());
        Some(&info[..end])
    }

    /// Returns `true` if the type code marks this as a return addenda.
    pub fn is_return(&self) -> bool {
        self.addenda_type_code() == validate::RETURN_ADDENDA_TYPE_CODE
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    /// Renders the addenda as one fixed-width line.
    pub fn generate_string(&self) -> String {
        self.fields.generate_string()
    }

    /// Writes the return code over the leading columns of the payment-related
    /// information. The code is cut to three characters, never padded.
    fn apply_return_code(&mut self, code: &str) -> Result<()> {
        let code = keep_leftmost(code, RETURN_CODE_WIDTH);
        let rest: String = self
            .payment_related_information()
            .chars()
            .skip(RETURN_CODE_WIDTH)
            .collect();
        self.set("payment_related_information", &format!("{}{}", code, rest))
    }
}

fn keep_leftmost(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

fn keep_rightmost(value: &str, width: usize) -> String {
    let length = value.chars().count();
    value.chars().skip(length.saturating_sub(width)).collect()
}

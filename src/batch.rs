//! Batches: entries that share settlement parameters, framed by a batch
//! header and batch control record.

use crate::amount::Amount;
use crate::entry::Entry;
use crate::error::{NachError, Result};
use crate::field::{FieldTable, FieldValues};
use crate::layout::RecordKind;
use crate::validate;
use chrono::NaiveDate;

/// Entry hashes keep only their last ten decimal digits.
pub(crate) const ENTRY_HASH_MODULUS: u64 = 10_000_000_000;

/// Fields carried by both the batch header and the batch control.
const MIRRORED_FIELDS: [&str; 3] = [
    "service_class_code",
    "company_identification",
    "originating_dfi",
];

/// Construction options for a [`Batch`].
///
/// High-level options take precedence over the raw `header` and `control`
/// overrides.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// `200` mixed, `220` credits only, `225` debits only.
    pub service_class_code: Option<String>,
    pub company_name: Option<String>,
    pub company_discretionary_data: Option<String>,
    pub company_identification: Option<String>,
    pub standard_entry_class_code: Option<String>,
    pub company_entry_description: Option<String>,
    pub company_descriptive_date: Option<String>,
    pub effective_entry_date: Option<NaiveDate>,

    /// Originating routing number; a 9-digit value loses its check digit.
    pub originating_dfi: Option<String>,

    pub header: FieldValues,
    pub control: FieldValues,
}

/// An ordered group of entries with its header and control records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    header: FieldTable,
    control: FieldTable,
    entries: Vec<Entry>,
}

impl Batch {
    /// Builds and validates a batch.
    pub fn new(options: BatchOptions) -> Result<Self> {
        Self::with_validation(options, true)
    }

    /// Builds a batch, validating it only when `auto_validate` is set.
    pub fn with_validation(options: BatchOptions, auto_validate: bool) -> Result<Self> {
        let mut batch = Batch {
            header: FieldTable::with_overrides(RecordKind::BatchHeader, &options.header)?,
            control: FieldTable::with_overrides(RecordKind::BatchControl, &options.control)?,
            entries: Vec::new(),
        };

        let originating_dfi = options
            .originating_dfi
            .map(|dfi| dfi.trim().chars().take(8).collect::<String>());
        let effective_entry_date = options
            .effective_entry_date
            .map(|date| date.format("%y%m%d").to_string());

        let overrides = [
            ("service_class_code", options.service_class_code),
            ("company_name", options.company_name),
            (
                "company_discretionary_data",
                options.company_discretionary_data,
            ),
            ("company_identification", options.company_identification),
            (
                "standard_entry_class_code",
                options.standard_entry_class_code,
            ),
            ("company_entry_description", options.company_entry_description),
            ("company_descriptive_date", options.company_descriptive_date),
            ("effective_entry_date", effective_entry_date),
            ("originating_dfi", originating_dfi),
        ];
        for (name, value) in overrides {
            if let Some(value) = value {
                batch.set(name, &value)?;
            }
        }

        for name in MIRRORED_FIELDS {
            let control_blank = batch.control.field(name).map_or(true, |f| f.is_empty());
            if control_blank {
                let value = batch.header.get(name).unwrap_or_default().to_string();
                batch.control.set(name, value)?;
            }
        }

        if auto_validate {
            batch.validate()?;
        }
        Ok(batch)
    }

    /// Runs the validation phases over the header and control records.
    pub fn validate(&self) -> Result<()> {
        validate::validate_required_fields(&self.header)?;
        validate::validate_required_fields(&self.control)?;
        validate::validate_service_class_code(self.header.get("service_class_code").unwrap_or_default())?;
        validate::validate_standard_entry_class(
            self.header
                .get("standard_entry_class_code")
                .unwrap_or_default(),
        )?;
        validate::validate_structure(&self.header)?;
        validate::validate_structure(&self.control)
    }

    /// Returns a field value, looking in the header before the control.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.header.get(field).or_else(|| self.control.get(field))
    }

    /// Sets a field on every record of the batch that carries it.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let in_header = self.header.contains(field);
        let in_control = self.control.contains(field);
        if !in_header && !in_control {
            return Err(NachError::UnknownField {
                record: "batch".to_string(),
                field: field.to_string(),
            });
        }
        if in_header {
            self.header.set(field, value)?;
        }
        if in_control {
            self.control.set(field, value)?;
        }
        Ok(())
    }

    /// Appends an entry. Trace numbers are assigned later, at generation.
    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub fn header(&self) -> &FieldTable {
        &self.header
    }

    pub fn control(&self) -> &FieldTable {
        &self.control
    }

    pub fn batch_number(&self) -> u64 {
        self.header.number("batch_number")
    }

    pub(crate) fn set_batch_number(&mut self, number: u64) -> Result<()> {
        self.header.set_number("batch_number", number)?;
        self.control.set_number("batch_number", number)
    }

    pub fn total_debit(&self) -> Amount {
        Amount::from_minor_units(self.control.number("total_debit"))
    }

    pub fn total_credit(&self) -> Amount {
        Amount::from_minor_units(self.control.number("total_credit"))
    }

    pub fn entry_hash(&self) -> u64 {
        self.control.number("entry_hash")
    }

    /// Physical lines the batch occupies when generated.
    pub fn row_count(&self) -> usize {
        2 + self.entries.iter().map(Entry::row_count).sum::<usize>()
    }

    /// Recomputes the control totals, entry count and entry hash from the
    /// current entries.
    ///
    /// Every entry is validated first, so oversized amounts are reported as
    /// errors before they are summed.
    pub fn compute_control(&mut self) -> Result<()> {
        for entry in &self.entries {
            entry.validate()?;
        }

        let total_debit: Amount = self
            .entries
            .iter()
            .filter(|e| e.is_debit())
            .map(Entry::amount)
            .sum();
        let total_credit: Amount = self
            .entries
            .iter()
            .filter(|e| e.is_credit())
            .map(Entry::amount)
            .sum();
        let entry_hash = self
            .entries
            .iter()
            .fold(0, |hash, e| {
                (hash + e.receiving_dfi_number() % ENTRY_HASH_MODULUS) % ENTRY_HASH_MODULUS
            });

        self.control
            .set_number("addenda_count", self.entries.len() as u64)?;
        self.control.set_number("entry_hash", entry_hash)?;
        self.control
            .set_number("total_debit", total_debit.minor_units())?;
        self.control
            .set_number("total_credit", total_credit.minor_units())
    }

    /// Renders header, entries with their addenda, and control as lines
    /// joined by newlines, after recomputing the control record.
    pub fn generate_string(&mut self) -> Result<String> {
        self.compute_control()?;
        self.validate()?;

        let mut lines = Vec::with_capacity(self.entries.len() + 2);
        lines.push(self.header.generate_string());
        for entry in &self.entries {
            lines.push(entry.generate_string());
        }
        lines.push(self.control.generate_string());
        Ok(lines.join("\n"))
    }
}

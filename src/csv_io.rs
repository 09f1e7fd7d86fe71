//! CSV bridge: payment instructions in, entry listings out.
//!
//! Input rows describe one entry each together with the batch it belongs
//! to. Consecutive rows with the same batch columns form one batch, so a
//! spreadsheet sorted by company produces one batch per company.

use crate::addenda::{AddendaOptions, EntryAddenda};
use crate::amount::Amount;
use crate::batch::{Batch, BatchOptions};
use crate::entry::{Entry, EntryOptions};
use crate::error::{NachError, Result};
use crate::file::{FileOptions, NachFile};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Addenda type code used for free-text remittance information.
const REMITTANCE_ADDENDA_TYPE: &str = "05";

/// One payment instruction as read from CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryRecord {
    pub company_name: String,
    pub company_id: String,
    pub sec_code: String,
    pub service_class: String,
    pub description: String,

    /// Effective entry date as `YYYY-MM-DD`.
    pub effective_date: String,

    pub originating_dfi: String,
    pub transaction_code: String,
    pub routing: String,
    pub account: String,

    /// Amount in major units, e.g. `125.50`.
    pub amount: Amount,

    pub name: String,
    pub id_number: Option<String>,

    /// Remittance text carried on a single addenda record.
    pub addenda: Option<String>,
}

/// Columns that decide which batch a row belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BatchKey {
    company_name: String,
    company_id: String,
    sec_code: String,
    service_class: String,
    description: String,
    effective_date: String,
    originating_dfi: String,
}

impl EntryRecord {
    fn batch_key(&self) -> BatchKey {
        BatchKey {
            company_name: self.company_name.clone(),
            company_id: self.company_id.clone(),
            sec_code: self.sec_code.clone(),
            service_class: self.service_class.clone(),
            description: self.description.clone(),
            effective_date: self.effective_date.clone(),
            originating_dfi: self.originating_dfi.clone(),
        }
    }

    /// Batch options for the batch this row opens.
    pub fn batch_options(&self) -> Result<BatchOptions> {
        let effective_entry_date = NaiveDate::parse_from_str(&self.effective_date, "%Y-%m-%d")
            .map_err(|_| NachError::InvalidFieldType {
                field: "effective_entry_date".to_string(),
                value: self.effective_date.clone(),
            })?;

        Ok(BatchOptions {
            service_class_code: Some(self.service_class.clone()),
            company_name: Some(self.company_name.clone()),
            company_identification: Some(self.company_id.clone()),
            standard_entry_class_code: Some(self.sec_code.to_uppercase()),
            company_entry_description: Some(self.description.clone()),
            effective_entry_date: Some(effective_entry_date),
            originating_dfi: Some(self.originating_dfi.clone()),
            ..Default::default()
        })
    }

    /// Builds the entry, with its addenda when remittance text is present.
    pub fn to_entry(&self) -> Result<Entry> {
        let mut entry = Entry::new(EntryOptions {
            transaction_code: Some(self.transaction_code.clone()),
            receiving_dfi: Some(self.routing.clone()),
            dfi_account: Some(self.account.clone()),
            amount: Some(self.amount),
            id_number: self.id_number.clone(),
            individual_name: Some(self.name.clone()),
            ..Default::default()
        })?;

        if let Some(text) = self.addenda.as_deref().filter(|t| !t.is_empty()) {
            entry.add_addenda(EntryAddenda::new(AddendaOptions {
                addenda_type_code: Some(REMITTANCE_ADDENDA_TYPE.to_string()),
                payment_related_information: Some(text.to_string()),
                ..Default::default()
            })?)?;
        }
        Ok(entry)
    }
}

/// One line of the entry listing written for a parsed file.
#[derive(Debug, Serialize)]
pub struct EntrySummary<'a> {
    pub batch_number: u64,
    pub company_name: &'a str,
    pub transaction_code: &'a str,
    pub routing: String,
    pub account: &'a str,
    pub amount: Amount,
    pub name: &'a str,
    pub trace_number: &'a str,
    pub addenda_count: usize,
    pub return_code: Option<&'a str>,
}

impl<'a> EntrySummary<'a> {
    fn new(batch: &'a Batch, entry: &'a Entry) -> Self {
        EntrySummary {
            batch_number: batch.batch_number(),
            company_name: batch.get("company_name").unwrap_or_default(),
            transaction_code: entry.transaction_code(),
            routing: entry.routing_number(),
            account: entry.get("dfi_account").unwrap_or_default(),
            amount: entry.amount(),
            name: entry.get("individual_name").unwrap_or_default(),
            trace_number: entry.trace_number().unwrap_or_default(),
            addenda_count: entry.addendas().len(),
            return_code: entry
                .addendas()
                .iter()
                .find(|a| a.is_return())
                .and_then(EntryAddenda::return_code),
        }
    }
}

/// Builds a file from CSV payment instructions.
///
/// Rows are read in order; a row whose batch columns differ from the previous
/// row starts a new batch. The first invalid row aborts the whole file.
pub fn build_file<R: Read>(reader: R, options: FileOptions) -> Result<NachFile> {
    let mut file = NachFile::new(options)?;
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut current: Option<(BatchKey, Batch)> = None;

    for (row_idx, result) in csv_reader.deserialize::<EntryRecord>().enumerate() {
        let row = row_idx + 2; // 1-indexed, accounting for header row
        let record = result?;
        let entry = record.to_entry().map_err(|e| invalid_row(row, e))?;
        let key = record.batch_key();

        if let Some((current_key, batch)) = current.as_mut() {
            if *current_key == key {
                batch.add_entry(entry);
                continue;
            }
        }

        if let Some((_, batch)) = current.take() {
            file.add_batch(batch)?;
        }
        let options = record.batch_options().map_err(|e| invalid_row(row, e))?;
        let mut batch = Batch::new(options).map_err(|e| invalid_row(row, e))?;
        batch.add_entry(entry);
        debug!("Row {}: opened batch for {}", row, record.company_name);
        current = Some((key, batch));
    }

    if let Some((_, batch)) = current {
        file.add_batch(batch)?;
    }
    Ok(file)
}

/// Writes one CSV row per entry of `file`, in file order.
pub fn write_entries<W: Write>(file: &NachFile, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for batch in file.batches() {
        for entry in batch.entries() {
            csv_writer.serialize(EntrySummary::new(batch, entry))?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

fn invalid_row(row: usize, err: NachError) -> NachError {
    NachError::InvalidRecord {
        row,
        message: err.to_string(),
    }
}

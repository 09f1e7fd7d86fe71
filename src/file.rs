//! NACH files: the top-level aggregate and the generate/parse pipeline.
//!
//! Generation is strictly ordered. The file header is rendered first, then
//! every non-empty batch (assigning trace numbers and accumulating the entry
//! hash and row count as it goes), then the file control from the finished
//! aggregates, and finally the filler rows that complete the last block.

use crate::addenda::{AddendaOptions, EntryAddenda};
use crate::amount::Amount;
use crate::batch::{Batch, BatchOptions, ENTRY_HASH_MODULUS};
use crate::entry::{Entry, EntryOptions};
use crate::error::{NachError, Result};
use crate::field::{FieldTable, FieldValues, RECORD_WIDTH};
use crate::layout::RecordKind;
use crate::validate;
use chrono::{Local, NaiveDate, NaiveTime};
use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Physical rows per block.
pub const BLOCKING_FACTOR: usize = 10;

/// Construction options for a [`NachFile`].
///
/// High-level options take precedence over the raw `header` and `control`
/// overrides. Creation date and time default to the local clock.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// Destination routing number; an 8-digit value gets its check digit.
    pub immediate_destination: Option<String>,
    pub immediate_origin: Option<String>,
    pub file_creation_date: Option<NaiveDate>,
    pub file_creation_time: Option<NaiveTime>,
    pub file_id_modifier: Option<String>,
    pub immediate_destination_name: Option<String>,
    pub immediate_origin_name: Option<String>,
    pub reference_code: Option<String>,

    /// Number stamped on the first attached batch. Defaults to 0.
    pub batch_sequence_number: Option<u64>,

    pub header: FieldValues,
    pub control: FieldValues,
}

/// A complete NACH file: header, batches and control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NachFile {
    header: FieldTable,
    control: FieldTable,
    batches: Vec<Batch>,
    batch_sequence_number: u64,
}

/// A batch being collected from parsed lines.
struct ParsedBatch {
    row: usize,
    header: FieldTable,
    control: Option<FieldTable>,
    entries: Vec<Entry>,
}

impl NachFile {
    /// Builds and validates a file.
    pub fn new(options: FileOptions) -> Result<Self> {
        Self::with_validation(options, true)
    }

    /// Builds a file, validating it only when `auto_validate` is set.
    pub fn with_validation(options: FileOptions, auto_validate: bool) -> Result<Self> {
        let now = Local::now();
        let mut header = FieldTable::new(RecordKind::FileHeader);
        header.set("file_creation_date", now.format("%y%m%d").to_string())?;
        header.set("file_creation_time", now.format("%H%M").to_string())?;
        header.apply_overrides(&options.header)?;

        let control = FieldTable::with_overrides(RecordKind::FileControl, &options.control)?;

        let immediate_destination = options
            .immediate_destination
            .map(|routing| validate::routing_with_check_digit(routing.trim()));
        let file_creation_date = options
            .file_creation_date
            .map(|date| date.format("%y%m%d").to_string());
        let file_creation_time = options
            .file_creation_time
            .map(|time| time.format("%H%M").to_string());

        let overrides = [
            ("immediate_destination", immediate_destination),
            ("immediate_origin", options.immediate_origin),
            ("file_creation_date", file_creation_date),
            ("file_creation_time", file_creation_time),
            ("file_id_modifier", options.file_id_modifier),
            (
                "immediate_destination_name",
                options.immediate_destination_name,
            ),
            ("immediate_origin_name", options.immediate_origin_name),
            ("reference_code", options.reference_code),
        ];
        for (name, value) in overrides {
            if let Some(value) = value {
                header.set(name, value)?;
            }
        }

        let file = NachFile {
            header,
            control,
            batches: Vec::new(),
            batch_sequence_number: options.batch_sequence_number.unwrap_or(0),
        };
        if auto_validate {
            file.validate()?;
        }
        Ok(file)
    }

    /// Runs the validation phases over the file header and control.
    pub fn validate(&self) -> Result<()> {
        validate::validate_required_fields(&self.header)?;
        validate::validate_structure(&self.header)?;
        validate::validate_structure(&self.control)
    }

    /// Returns a field value, looking in the header before the control.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.header.get(field).or_else(|| self.control.get(field))
    }

    /// Sets a field on the header or control record that carries it.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        if self.header.contains(field) {
            self.header.set(field, value)
        } else if self.control.contains(field) {
            self.control.set(field, value)
        } else {
            Err(NachError::UnknownField {
                record: "file".to_string(),
                field: field.to_string(),
            })
        }
    }

    pub fn header(&self) -> &FieldTable {
        &self.header
    }

    pub fn control(&self) -> &FieldTable {
        &self.control
    }

    /// Attaches a batch, stamping it with the next batch number.
    ///
    /// The counter advances on every call, even for a batch that turns out to
    /// have no entries at generation time.
    pub fn add_batch(&mut self, mut batch: Batch) -> Result<()> {
        batch.set_batch_number(self.batch_sequence_number)?;
        self.batch_sequence_number += 1;
        self.batches.push(batch);
        Ok(())
    }

    /// Attaches a batch under the number it already carries and moves the
    /// counter past it.
    fn attach_numbered(&mut self, batch: Batch) {
        self.batch_sequence_number = self.batch_sequence_number.max(batch.batch_number() + 1);
        self.batches.push(batch);
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn batches_mut(&mut self) -> &mut [Batch] {
        &mut self.batches
    }

    /// Number the next attached batch will receive.
    pub fn batch_sequence_number(&self) -> u64 {
        self.batch_sequence_number
    }

    /// Renders the complete file.
    ///
    /// Assigns missing trace numbers and recomputes every batch and file
    /// control field before rendering them. The work is done on copies of the
    /// batches and control, so a failed generation leaves the file unchanged.
    pub fn generate_file(&mut self) -> Result<String> {
        self.validate()?;
        let header = self.header.generate_string();

        let mut batches = self.batches.clone();
        let mut control = self.control.clone();
        let (body, rows) = self.generate_batches(&mut batches, &mut control)?;
        validate::validate_structure(&control)?;

        self.batches = batches;
        self.control = control;
        let control = self.control.generate_string();
        let padding = padding_rows(rows);

        debug!(
            "Generated file with {} batches, {} rows before padding",
            self.control.number("batch_count"),
            rows
        );
        Ok(format!("{}\n{}{}{}", header, body, control, padding))
    }

    /// Generates the file and writes it to `path`.
    pub fn write_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = self.generate_file()?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Renders every non-empty batch of `batches` and stores the file
    /// aggregates in `control`.
    ///
    /// Returns the rendered batches, each line newline-terminated, and the
    /// physical row count including the file header and control.
    fn generate_batches(
        &self,
        batches: &mut [Batch],
        control: &mut FieldTable,
    ) -> Result<(String, usize)> {
        let origin_prefix: String = self
            .header
            .get("immediate_origin")
            .unwrap_or_default()
            .trim()
            .chars()
            .take(8)
            .collect();

        let mut output = String::new();
        let mut rows = 2;
        let mut batch_count = 0u64;
        let mut entry_count = 0u64;
        let mut entry_hash = 0u64;
        let mut total_debit = Amount::ZERO;
        let mut total_credit = Amount::ZERO;

        for batch in batches.iter_mut() {
            if batch.entries().is_empty() {
                debug!("Skipping batch {} with no entries", batch.batch_number());
                continue;
            }

            for entry in batch.entries_mut() {
                entry_count += 1;
                if entry.trace_number().is_none() {
                    entry.assign_trace_number(format!("{}{:07}", origin_prefix, entry_count))?;
                } else {
                    entry.link_addendas()?;
                }
                let dfi = entry.receiving_dfi_number() % ENTRY_HASH_MODULUS;
                entry_hash = (entry_hash + dfi) % ENTRY_HASH_MODULUS;
                rows += entry.row_count();
            }

            rows += 2;
            batch_count += 1;
            output.push_str(&batch.generate_string()?);
            output.push('\n');
            total_debit += batch.total_debit();
            total_credit += batch.total_credit();
        }

        let block_count = rows.div_ceil(BLOCKING_FACTOR);
        control.set_number("batch_count", batch_count)?;
        control.set_number("block_count", block_count as u64)?;
        control.set_number("addenda_count", entry_count)?;
        control.set_number("entry_hash", entry_hash)?;
        control.set_number("total_debit", total_debit.minor_units())?;
        control.set_number("total_credit", total_credit.minor_units())?;

        Ok((output, rows))
    }

    /// Reads and parses the file at `path`.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses NACH text into a file.
    ///
    /// Records may be newline separated or concatenated in fixed-width
    /// blocks. Every record is rebuilt through the same constructors used for
    /// hand-built files, so a parsed file generates the same text.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(NachError::Parse("Input string is empty".to_string()));
        }
        if !text.is_ascii() {
            return Err(NachError::Parse(
                "Input contains non-ASCII characters".to_string(),
            ));
        }

        let mut header: Option<(usize, FieldTable)> = None;
        let mut control: Option<FieldTable> = None;
        let mut batches: Vec<ParsedBatch> = Vec::new();

        for (index, line) in split_records(text).into_iter().enumerate() {
            let row = index + 1;
            if line.trim().is_empty() || is_filler(line) {
                continue;
            }

            let kind = match line.chars().next().and_then(RecordKind::from_type_code) {
                Some(kind) => kind,
                None => {
                    warn!("Line {}: unknown record type, ignoring", row);
                    continue;
                }
            };
            let table = FieldTable::parse_line(kind, line).map_err(|e| invalid_record(row, e))?;

            match kind {
                RecordKind::FileHeader => {
                    if header.is_some() {
                        warn!("Line {}: duplicate file header, ignoring", row);
                    } else {
                        header = Some((row, table));
                    }
                }
                RecordKind::FileControl => {
                    if control.is_some() {
                        warn!("Line {}: duplicate file control, ignoring", row);
                    } else {
                        control = Some(table);
                    }
                }
                RecordKind::BatchHeader => batches.push(ParsedBatch {
                    row,
                    header: table,
                    control: None,
                    entries: Vec::new(),
                }),
                RecordKind::BatchControl => {
                    let batch = batches
                        .last_mut()
                        .ok_or_else(|| outside(row, "batch control", "batch"))?;
                    batch.control = Some(table);
                }
                RecordKind::Entry => {
                    let batch = batches
                        .last_mut()
                        .ok_or_else(|| outside(row, "entry", "batch"))?;
                    let entry = Entry::new(EntryOptions {
                        fields: table.values(),
                        ..Default::default()
                    })
                    .map_err(|e| invalid_record(row, e))?;
                    batch.entries.push(entry);
                }
                RecordKind::Addenda => {
                    let entry = batches
                        .last_mut()
                        .and_then(|b| b.entries.last_mut())
                        .ok_or_else(|| outside(row, "addenda", "entry"))?;
                    let addenda = EntryAddenda::new(AddendaOptions {
                        fields: table.values(),
                        ..Default::default()
                    })
                    .map_err(|e| invalid_record(row, e))?;
                    entry.add_addenda(addenda).map_err(|e| invalid_record(row, e))?;
                }
            }
        }

        let ((header_row, header), control) = match (header, control) {
            (Some(header), Some(control)) => (header, control),
            _ => return Err(NachError::Parse("File records parse error".to_string())),
        };
        if batches.is_empty() {
            return Err(NachError::Parse("No batches found".to_string()));
        }

        let mut file = NachFile::new(FileOptions {
            header: header.values(),
            control: control.values(),
            ..Default::default()
        })
        .map_err(|e| invalid_record(header_row, e))?;

        let batch_total = batches.len();
        for parsed in batches {
            let mut batch = Batch::new(BatchOptions {
                header: parsed.header.values(),
                control: parsed.control.map(|c| c.values()).unwrap_or_default(),
                ..Default::default()
            })
            .map_err(|e| invalid_record(parsed.row, e))?;
            for entry in parsed.entries {
                batch.add_entry(entry);
            }
            file.attach_numbered(batch);
        }

        debug!("Parsed file with {} batches", batch_total);
        Ok(file)
    }
}

impl FromStr for NachFile {
    type Err = NachError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NachFile::parse(s)
    }
}

/// Splits text into record lines: by newline when present, otherwise into
/// fixed-width chunks. Expects ASCII input.
fn split_records(text: &str) -> Vec<&str> {
    if text.contains('\n') {
        return text
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .collect();
    }
    (0..text.len())
        .step_by(RECORD_WIDTH)
        .map(|start| &text[start..(start + RECORD_WIDTH).min(text.len())])
        .collect()
}

/// Filler rows are full-width runs of `9`.
fn is_filler(line: &str) -> bool {
    line.len() == RECORD_WIDTH && line.bytes().all(|b| b == b'9')
}

/// Filler rows needed to bring `rows` up to a whole block.
fn padding_rows(rows: usize) -> String {
    let missing = (BLOCKING_FACTOR - rows % BLOCKING_FACTOR) % BLOCKING_FACTOR;
    let filler = "9".repeat(RECORD_WIDTH);
    let mut padding = String::with_capacity(missing * (RECORD_WIDTH + 1));
    for _ in 0..missing {
        padding.push('\n');
        padding.push_str(&filler);
    }
    padding
}

fn invalid_record(row: usize, err: NachError) -> NachError {
    NachError::InvalidRecord {
        row,
        message: err.to_string(),
    }
}

fn outside(row: usize, record: &str, container: &str) -> NachError {
    NachError::InvalidRecord {
        row,
        message: format!("{} record outside of any {}", record, container),
    }
}

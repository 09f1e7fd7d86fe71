//! # NACH File
//!
//! Generation, parsing and validation of NACH/ACH fixed-width batch payment
//! files.
//!
//! ## Design Principles
//!
//! - **Table-driven records**: every record is a field table whose column
//!   windows tile exactly 94 characters
//! - **One representation**: parsed records are replayed through the same
//!   constructors as hand-built ones
//! - **Recomputed aggregates**: control totals, entry hash, counts and trace
//!   numbers are derived at generation time, never trusted from input
//! - **Whole blocks**: output is padded with filler rows to a multiple of ten
//!
//! ## Example
//!
//! ```no_run
//! use nach_file::{Amount, Batch, BatchOptions, Entry, EntryOptions, FileOptions, NachFile};
//!
//! let mut file = NachFile::new(FileOptions {
//!     immediate_destination: Some("081000032".to_string()),
//!     immediate_origin: Some("123456789".to_string()),
//!     ..Default::default()
//! })?;
//!
//! let mut batch = Batch::new(BatchOptions {
//!     service_class_code: Some("220".to_string()),
//!     company_name: Some("ACME CORP".to_string()),
//!     company_identification: Some("1234567890".to_string()),
//!     standard_entry_class_code: Some("PPD".to_string()),
//!     company_entry_description: Some("PAYROLL".to_string()),
//!     effective_entry_date: chrono::NaiveDate::from_ymd_opt(2026, 10, 19),
//!     originating_dfi: Some("08100003".to_string()),
//!     ..Default::default()
//! })?;
//!
//! batch.add_entry(Entry::new(EntryOptions {
//!     transaction_code: Some("22".to_string()),
//!     receiving_dfi: Some("081000032".to_string()),
//!     dfi_account: Some("12345678".to_string()),
//!     amount: Some(Amount::from_minor_units(150_00)),
//!     individual_name: Some("JANE DOE".to_string()),
//!     ..Default::default()
//! })?);
//! file.add_batch(batch)?;
//!
//! let text = file.generate_file()?;
//! let parsed = NachFile::parse(&text)?;
//! assert_eq!(parsed.batches().len(), 1);
//! # Ok::<(), nach_file::NachError>(())
//! ```

pub mod addenda;
pub mod amount;
pub mod batch;
pub mod config;
pub mod csv_io;
pub mod entry;
pub mod error;
pub mod field;
pub mod file;
pub mod layout;
pub mod validate;

pub use addenda::{AddendaOptions, EntryAddenda};
pub use amount::Amount;
pub use batch::{Batch, BatchOptions};
pub use config::FileConfig;
pub use entry::{Entry, EntryOptions};
pub use error::{NachError, Result};
pub use field::{Field, FieldSpec, FieldTable, FieldType, FieldValues, Justification, RECORD_WIDTH};
pub use file::{FileOptions, NachFile};
pub use layout::RecordKind;

//! Entry detail records: one payment instruction each.

use crate::addenda::EntryAddenda;
use crate::amount::Amount;
use crate::error::{NachError, Result};
use crate::field::{FieldTable, FieldValues};
use crate::layout::RecordKind;
use crate::validate;
use log::debug;

/// Construction options for an [`Entry`].
///
/// High-level options take precedence over the raw `fields` overrides.
#[derive(Debug, Clone, Default)]
pub struct EntryOptions {
    pub transaction_code: Option<String>,

    /// Receiving routing number: 8 digits (check digit computed) or 9 digits
    /// (check digit verified).
    pub receiving_dfi: Option<String>,

    pub dfi_account: Option<String>,
    pub amount: Option<Amount>,
    pub id_number: Option<String>,
    pub individual_name: Option<String>,
    pub discretionary_data: Option<String>,

    /// Left unset to have a trace number assigned when the file is generated.
    pub trace_number: Option<String>,

    /// Raw per-field overrides applied over the layout defaults.
    pub fields: FieldValues,
}

/// A payment instruction and the addenda records it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    fields: FieldTable,
    addendas: Vec<EntryAddenda>,
}

impl Entry {
    /// Builds and validates an entry.
    pub fn new(options: EntryOptions) -> Result<Self> {
        Self::with_validation(options, true)
    }

    /// Builds an entry, validating it only when `auto_validate` is set.
    pub fn with_validation(options: EntryOptions, auto_validate: bool) -> Result<Self> {
        let mut fields = FieldTable::with_overrides(RecordKind::Entry, &options.fields)?;

        if let Some(routing) = options.receiving_dfi {
            let (prefix, check) = split_routing(routing.trim())?;
            fields.set("receiving_dfi", prefix)?;
            fields.set("check_digit", check)?;
        }
        if let Some(amount) = options.amount {
            fields.set_number("amount", amount.minor_units())?;
        }

        let overrides = [
            ("transaction_code", options.transaction_code),
            ("dfi_account", options.dfi_account),
            ("id_number", options.id_number),
            ("individual_name", options.individual_name),
            ("discretionary_data", options.discretionary_data),
            ("trace_number", options.trace_number),
        ];
        for (name, value) in overrides {
            if let Some(value) = value {
                fields.set(name, value)?;
            }
        }

        let entry = Entry {
            fields,
            addendas: Vec::new(),
        };
        if auto_validate {
            entry.validate()?;
        }
        Ok(entry)
    }

    /// Runs the validation phases over the entry fields and its addenda.
    pub fn validate(&self) -> Result<()> {
        validate::validate_required_fields(&self.fields)?;
        validate::validate_transaction_code(self.transaction_code())?;
        validate::validate_structure(&self.fields)?;
        for addenda in &self.addendas {
            addenda.validate()?;
        }
        Ok(())
    }

    /// Attaches an addenda record.
    ///
    /// Flags the entry as carrying addenda, numbers the addenda by position and
    /// links it to this entry's trace number when one is already known.
    pub fn add_addenda(&mut self, mut addenda: EntryAddenda) -> Result<()> {
        self.fields.set("addenda_id", "1")?;
        addenda.set(
            "addenda_sequence_number",
            &(self.addendas.len() + 1).to_string(),
        )?;
        if let Some(trace) = self.trace_number() {
            addenda.set("entry_detail_sequence_number", trace)?;
        }
        self.addendas.push(addenda);
        Ok(())
    }

    pub fn addendas(&self) -> &[EntryAddenda] {
        &self.addendas
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        self.fields.set(field, value)
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn transaction_code(&self) -> &str {
        self.fields.get("transaction_code").unwrap_or_default()
    }

    pub fn amount(&self) -> Amount {
        Amount::from_minor_units(self.fields.number("amount"))
    }

    pub fn is_credit(&self) -> bool {
        validate::is_credit(self.transaction_code())
    }

    pub fn is_debit(&self) -> bool {
        validate::is_debit(self.transaction_code())
    }

    /// The 8-digit receiving routing prefix read as a number, the entry's
    /// contribution to the entry hash.
    pub fn receiving_dfi_number(&self) -> u64 {
        self.fields.number("receiving_dfi")
    }

    /// Full 9-digit receiving routing number.
    pub fn routing_number(&self) -> String {
        let prefix = self.fields.field("receiving_dfi").map(|f| f.render());
        let check = self.fields.get("check_digit").unwrap_or_default();
        format!("{}{}", prefix.unwrap_or_default(), check)
    }

    pub fn trace_number(&self) -> Option<&str> {
        self.fields
            .get("trace_number")
            .filter(|trace| !trace.trim().is_empty())
    }

    /// Sets the trace number and propagates it to the owned addenda.
    pub(crate) fn assign_trace_number(&mut self, trace: String) -> Result<()> {
        debug!("Assigning trace number {}", trace);
        self.fields.set("trace_number", trace)?;
        self.link_addendas()
    }

    /// Copies the trace number into every addenda's entry detail sequence.
    pub(crate) fn link_addendas(&mut self) -> Result<()> {
        let trace = match self.trace_number() {
            Some(trace) => trace.to_string(),
            None => return Ok(()),
        };
        for addenda in &mut self.addendas {
            addenda.set("entry_detail_sequence_number", &trace)?;
        }
        Ok(())
    }

    /// Physical lines this entry occupies: itself plus its addenda.
    pub fn row_count(&self) -> usize {
        1 + self.addendas.len()
    }

    /// Renders the entry followed by its addenda, one line each.
    pub fn generate_string(&self) -> String {
        let mut lines = vec![self.fields.generate_string()];
        lines.extend(self.addendas.iter().map(EntryAddenda::generate_string));
        lines.join("\n")
    }
}

/// Splits a routing number into its 8-digit prefix and check digit.
fn split_routing(routing: &str) -> Result<(String, String)> {
    if !routing.chars().all(|c| c.is_ascii_digit()) {
        return Err(NachError::InvalidFieldType {
            field: "receiving_dfi".to_string(),
            value: routing.to_string(),
        });
    }

    if routing.len() == 9 {
        validate::validate_routing_number(routing)?;
        return Ok((routing[..8].to_string(), routing[8..].to_string()));
    }

    let padded = format!("{:0>8}", routing);
    match validate::check_digit(&padded) {
        Some(digit) => Ok((routing.to_string(), digit.to_string())),
        None => Err(NachError::InvalidRoutingNumber {
            routing: routing.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addenda::AddendaOptions;
    use crate::field::RECORD_WIDTH;

    fn options() -> EntryOptions {
        EntryOptions {
            transaction_code: Some("22".to_string()),
            receiving_dfi: Some("08100003".to_string()),
            dfi_account: Some("12345678".to_string()),
            amount: Some(Amount::from_minor_units(1500)),
            individual_name: Some("JANE DOE".to_string()),
            ..Default::default()
        }
    }

    fn addenda() -> EntryAddenda {
        EntryAddenda::new(AddendaOptions {
            addenda_type_code: Some("05".to_string()),
            payment_related_information: Some("INVOICE 1001".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_check_digit_is_computed() {
        let entry = Entry::new(options()).unwrap();
        assert_eq!(entry.get("receiving_dfi"), Some("08100003"));
        assert_eq!(entry.get("check_digit"), Some("2"));
        assert_eq!(entry.routing_number(), "081000032");
    }

    #[test]
    fn test_nine_digit_routing_is_verified() {
        let mut opts = options();
        opts.receiving_dfi = Some("081000032".to_string());
        assert!(Entry::new(opts).is_ok());

        let mut opts = options();
        opts.receiving_dfi = Some("081000039".to_string());
        assert!(matches!(
            Entry::new(opts),
            Err(NachError::InvalidRoutingNumber { .. })
        ));
    }

    #[test]
    fn test_missing_name_aborts_construction() {
        let mut opts = options();
        opts.individual_name = None;
        match Entry::new(opts) {
            Err(NachError::MissingField { field }) => assert_eq!(field, "individual_name"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_transaction_code() {
        let mut opts = options();
        opts.transaction_code = Some("99".to_string());
        assert!(matches!(
            Entry::new(opts),
            Err(NachError::InvalidTransactionCode { .. })
        ));
    }

    #[test]
    fn test_generate_line() {
        let entry = Entry::new(options()).unwrap();
        let line = entry.generate_string();

        assert_eq!(line.len(), RECORD_WIDTH);
        assert_eq!(&line[0..12], "622081000032");
        assert_eq!(&line[29..39], "0000001500");
        assert_eq!(&line[78..79], "0");
    }

    #[test]
    fn test_direction_and_amount() {
        let entry = Entry::new(options()).unwrap();
        assert!(entry.is_credit());
        assert!(!entry.is_debit());
        assert_eq!(entry.amount().to_string(), "15.00");
    }

    #[test]
    fn test_add_addenda_links_records() {
        let mut opts = options();
        opts.trace_number = Some("081000030000042".to_string());
        let mut entry = Entry::new(opts).unwrap();
        entry.add_addenda(addenda()).unwrap();
        entry.add_addenda(addenda()).unwrap();

        assert_eq!(entry.get("addenda_id"), Some("1"));
        assert_eq!(entry.row_count(), 3);
        assert_eq!(entry.addendas()[1].get("addenda_sequence_number"), Some("2"));
        assert_eq!(
            entry.addendas()[0].get("entry_detail_sequence_number"),
            Some("0000042")
        );

        let text = entry.generate_string();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.len() == RECORD_WIDTH));
    }

    #[test]
    fn test_assigned_trace_reaches_addenda() {
        let mut entry = Entry::new(options()).unwrap();
        entry.add_addenda(addenda()).unwrap();
        assert_eq!(entry.trace_number(), None);

        entry
            .assign_trace_number("123456780000003".to_string())
            .unwrap();
        assert_eq!(entry.trace_number(), Some("123456780000003"));
        assert_eq!(
            entry.addendas()[0].get("entry_detail_sequence_number"),
            Some("0000003")
        );
    }
}

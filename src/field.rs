//! Field descriptors and the fixed-width table codec.
//!
//! Every physical record is a [`FieldTable`]: an ordered set of [`Field`]s
//! whose column windows tile exactly [`RECORD_WIDTH`] characters. Generation
//! renders each field into its window; parsing slices the same windows back
//! out, so hand-built and parsed records share one representation.

use crate::error::{NachError, Result};
use crate::layout::RecordKind;
use std::collections::BTreeMap;

/// Physical width of every record line.
pub const RECORD_WIDTH: usize = 94;

/// Field name to raw value mapping used to override layout defaults.
pub type FieldValues = BTreeMap<String, String>;

/// Declared data type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// ASCII digits only.
    Numeric,
    /// Printable ASCII.
    Alphanumeric,
}

/// Side of the column window the value is aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Left,
    Right,
}

/// Static description of one column window in a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, unique within its layout.
    pub name: &'static str,

    /// Zero-based column where the window starts.
    pub position: usize,

    /// Window width in characters.
    pub width: usize,

    pub field_type: FieldType,
    pub required: bool,

    /// Character used to pad short values.
    pub fill: char,

    pub justification: Justification,

    /// Value a freshly built record starts with.
    pub default: &'static str,
}

impl FieldSpec {
    /// Numeric field, zero-filled and right-justified.
    pub const fn numeric(
        name: &'static str,
        position: usize,
        width: usize,
        required: bool,
        default: &'static str,
    ) -> Self {
        FieldSpec {
            name,
            position,
            width,
            field_type: FieldType::Numeric,
            required,
            fill: '0',
            justification: Justification::Right,
            default,
        }
    }

    /// Alphanumeric field, blank-filled and left-justified.
    pub const fn alphanumeric(
        name: &'static str,
        position: usize,
        width: usize,
        required: bool,
        default: &'static str,
    ) -> Self {
        FieldSpec {
            name,
            position,
            width,
            field_type: FieldType::Alphanumeric,
            required,
            fill: ' ',
            justification: Justification::Left,
            default,
        }
    }

    /// Routing field: digits right-justified behind leading blanks.
    pub const fn routing(name: &'static str, position: usize, width: usize, required: bool) -> Self {
        FieldSpec {
            name,
            position,
            width,
            field_type: FieldType::Numeric,
            required,
            fill: ' ',
            justification: Justification::Right,
            default: "",
        }
    }

    /// Removes the padding `render` adds, leaving the value itself intact.
    ///
    /// Left-justified values lose trailing fill only, so leading blanks
    /// survive. Zero-filled numerics keep their zeros and drop stray blanks.
    pub fn strip_fill<'a>(&self, window: &'a str) -> &'a str {
        match (self.justification, self.fill) {
            (Justification::Left, fill) => window.trim_end_matches(fill),
            (Justification::Right, ' ') => window.trim_start_matches(' '),
            (Justification::Right, _) => window.trim_matches(' '),
        }
    }
}

/// A field descriptor together with its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    spec: FieldSpec,
    value: String,
}

impl Field {
    /// Creates a field holding its layout default.
    pub fn new(spec: FieldSpec) -> Self {
        Field {
            spec,
            value: spec.default.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Returns `true` if the value is empty or blank.
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Interprets the value as an unsigned number. Blank values read as zero.
    pub fn as_number(&self) -> u64 {
        self.value.trim().parse().unwrap_or(0)
    }

    /// Renders the value into exactly `width` columns.
    ///
    /// Short values are padded with the fill character on the side opposite
    /// the justification; values at or over the width are cut to the width.
    pub fn render(&self) -> String {
        let width = self.spec.width;
        let length = self.value.chars().count();
        if length >= width {
            return self.value.chars().take(width).collect();
        }

        let padding: String = std::iter::repeat(self.spec.fill)
            .take(width - length)
            .collect();
        match self.spec.justification {
            Justification::Left => format!("{}{}", self.value, padding),
            Justification::Right => format!("{}{}", padding, self.value),
        }
    }
}

/// Ordered field table for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    kind: RecordKind,
    fields: Vec<Field>,
}

impl FieldTable {
    /// Builds a table holding the layout defaults for `kind`.
    pub fn new(kind: RecordKind) -> Self {
        let mut fields: Vec<Field> = kind.layout().iter().copied().map(Field::new).collect();
        fields.sort_by_key(|f| f.spec.position);
        FieldTable { kind, fields }
    }

    /// Builds the default table for `kind` and overlays `overrides` on it.
    ///
    /// Only the named fields change; every other field keeps its default.
    /// Naming a field outside the layout is an error.
    pub fn with_overrides(kind: RecordKind, overrides: &FieldValues) -> Result<Self> {
        let mut table = Self::new(kind);
        table.apply_overrides(overrides)?;
        Ok(table)
    }

    /// Replaces the values of the named fields, leaving the rest untouched.
    pub fn apply_overrides(&mut self, overrides: &FieldValues) -> Result<()> {
        for (name, value) in overrides {
            self.set(name, value.as_str())?;
        }
        Ok(())
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut Field> {
        let kind = self.kind;
        self.fields
            .iter_mut()
            .find(|f| f.name() == name)
            .ok_or_else(|| NachError::UnknownField {
                record: kind.to_string(),
                field: name.to_string(),
            })
    }

    /// Returns the current value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field(name).map(Field::value)
    }

    /// Replaces the value of a field.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.field_mut(name)?.set_value(value);
        Ok(())
    }

    pub fn set_number(&mut self, name: &str, value: u64) -> Result<()> {
        self.set(name, value.to_string())
    }

    /// Reads a field as a number; unknown or blank fields read as zero.
    pub fn number(&self, name: &str) -> u64 {
        self.field(name).map(Field::as_number).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Snapshot of every field value, keyed by name.
    pub fn values(&self) -> FieldValues {
        self.fields
            .iter()
            .map(|f| (f.name().to_string(), f.value().to_string()))
            .collect()
    }

    /// Renders the table as one fixed-width line with no terminator.
    pub fn generate_string(&self) -> String {
        let mut line = String::with_capacity(RECORD_WIDTH);
        for field in &self.fields {
            line.push_str(&field.render());
        }
        line
    }

    /// Slices a fixed-width line into a table of `kind`.
    ///
    /// Each field takes the text in its column window minus the fill on its
    /// padded side. Lines shorter than [`RECORD_WIDTH`] are treated as if padded
    /// with trailing blanks.
    pub fn parse_line(kind: RecordKind, line: &str) -> Result<Self> {
        if !line.is_ascii() {
            return Err(NachError::Parse(format!(
                "{} record contains non-ASCII characters",
                kind
            )));
        }
        if line.len() > RECORD_WIDTH {
            return Err(NachError::Parse(format!(
                "{} record is {} characters, expected {}",
                kind,
                line.len(),
                RECORD_WIDTH
            )));
        }

        let padded = format!("{:<width$}", line, width = RECORD_WIDTH);
        let mut table = Self::new(kind);
        for field in &mut table.fields {
            let start = field.spec.position;
            let window = &padded[start..start + field.spec.width];
            field.value = field.spec.strip_fill(window).to_string();
        }
        Ok(table)
    }
}

//! Parsing of tab-separated vocabulary tables
//!
//! Four table shapes are used by the vocabularies:
//!
//! - attribute and dimension tables, one row per name (`Name` column)
//! - variable tables, where a variable spans several rows: the first row
//!   carries the variable name and every following row with an empty
//!   `Variable` cell adds another attribute to it
//! - instrument tables, one row per instrument (`New Instrument Name`)
//! - the data product list (`Data Product`)

use crate::errors::{Result, TemplateError};
use crate::section::Section;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;

/// Attributes of one variable, in table order
pub type VariableDef = Section<String>;

/// One row of an attribute or dimension table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabEntry {
    fields: BTreeMap<String, String>,
}

impl VocabEntry {
    /// Entry holding only a fixed value
    pub fn fixed(value: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("Fixed Value".to_string(), value.into());
        Self { fields }
    }

    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// Cell value for a column, empty when the column is absent
    pub fn field(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn fixed_value(&self) -> &str {
        self.field("Fixed Value")
    }

    pub fn description(&self) -> &str {
        self.field("Description")
    }

    pub fn compliance(&self) -> &str {
        self.field("Compliance checking rules")
    }

    pub fn length(&self) -> &str {
        self.field("Length")
    }
}

/// One instrument from an instrument vocabulary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentRecord {
    pub name: String,
    pub descriptor: String,
    pub data_products: Vec<String>,
    pub location: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

fn tsv_reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes())
}

fn column(headers: &StringRecord, name: &str, table: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| TemplateError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

/// Parse a table with one row per name into entries keyed by `key_column`
fn parse_keyed(text: &str, key_column: &str, table: &str) -> Result<Section<VocabEntry>> {
    let mut reader = tsv_reader(text);
    let headers = reader.headers()?.clone();
    let key = column(&headers, key_column, table)?;

    let mut entries = Section::new();
    for record in reader.records() {
        let record = record?;
        let name = cell(&record, key);
        if name.is_empty() {
            continue;
        }
        let fields = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key)
            .map(|(i, h)| (h.to_string(), cell(&record, i).to_string()))
            .collect();
        entries.insert(name, VocabEntry::from_fields(fields));
    }
    Ok(entries)
}

/// Parse a global attribute table
pub fn parse_attributes(text: &str, table: &str) -> Result<Section<VocabEntry>> {
    parse_keyed(text, "Name", table)
}

/// Parse a dimension table
pub fn parse_dimensions(text: &str, table: &str) -> Result<Section<VocabEntry>> {
    parse_keyed(text, "Name", table)
}

/// Parse a variable table, grouping continuation rows under their variable
///
/// The block being built is flushed when the next named row starts and once
/// more at the end, so a table with no rows still yields a single variable
/// with an empty name.
pub fn parse_variables(text: &str, table: &str) -> Result<Section<VariableDef>> {
    let mut reader = tsv_reader(text);
    let headers = reader.headers()?.clone();
    let variable_col = column(&headers, "Variable", table)?;
    let attribute_col = column(&headers, "Attribute", table)?;
    let value_col = column(&headers, "Value", table)?;
    let example_col = headers.iter().position(|h| h == "example value");

    let mut variables = Section::new();
    let mut current_name = String::new();
    let mut current = VariableDef::new();
    let mut first_row = true;

    for record in reader.records() {
        let record = record?;
        let variable = cell(&record, variable_col);
        if !variable.is_empty() {
            if first_row {
                // rows before the first named variable belong to nothing
                first_row = false;
                current = VariableDef::new();
            } else {
                variables.insert(
                    std::mem::take(&mut current_name),
                    std::mem::take(&mut current),
                );
            }
            current_name = variable.to_string();
        }

        let attribute = cell(&record, attribute_col);
        if !attribute.is_empty() {
            let value = cell(&record, value_col);
            let example = example_col.map(|i| cell(&record, i)).unwrap_or("");
            let stored = if value.is_empty() && !example.is_empty() {
                format!("EXAMPLE: {example}")
            } else {
                value.to_string()
            };
            current.insert(attribute, stored);
        }
    }
    variables.insert(current_name, current);

    Ok(variables)
}

/// Split a data product cell on commas, spaces and pipes
pub fn split_products(cell: &str) -> Vec<String> {
    cell.split([',', ' ', '|'])
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse an instrument vocabulary table
pub fn parse_instruments(text: &str, table: &str) -> Result<Section<InstrumentRecord>> {
    let rows = parse_keyed(text, "New Instrument Name", table)?;
    Ok(rows
        .iter()
        .map(|(name, row)| {
            let record = InstrumentRecord {
                name: name.to_string(),
                descriptor: row.field("Descriptor").to_string(),
                data_products: split_products(row.field("Data Product(s)")),
                location: row.field("Mobile/Fixed (loc)").to_string(),
                manufacturer: row.field("Manufacturer").to_string(),
                model: row.field("Model No.").to_string(),
                serial_number: row.field("Serial Number").to_string(),
            };
            (name.to_string(), record)
        })
        .collect())
}

/// Parse the list of all data products
pub fn parse_data_products(text: &str, table: &str) -> Result<Vec<String>> {
    let mut reader = tsv_reader(text);
    let headers = reader.headers()?.clone();
    let product_col = column(&headers, "Data Product", table)?;

    let mut products = Vec::new();
    for record in reader.records() {
        let record = record?;
        let product = cell(&record, product_col);
        if !product.is_empty() {
            products.push(product.to_string());
        }
    }
    Ok(products)
}

//! Site metadata files applied to a created template
//!
//! Metadata files let a data producer fill in the `CHANGE:` placeholders
//! without editing the netCDF file by hand. Four formats are read:
//!
//! - CSV, one attribute per line: `name,value[,more value][,type=int]`
//! - JSON or YAML mappings of `name: value` or `name: {value: .., type: ..}`
//! - XML, one element per attribute holding `<value>` and `<type>` elements
//!
//! Values are converted to the requested type (`str`, `int`, `float` or
//! `bool`), falling back to text with a warning. `latitude` and `longitude`
//! set the scalar variables of the same name; everything else becomes a
//! global attribute.

use crate::data::update_variable;
use crate::errors::Result;
use csv::ReaderBuilder;
use netcdf::{AttributeValue, FileMut};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Names that set variables rather than global attributes
pub const POSITION_VARIABLES: [&str; 2] = ["latitude", "longitude"];

/// Requested type of a metadata value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    #[default]
    Str,
    Int,
    Float,
    Bool,
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "str" | "string" => Ok(ValueKind::Str),
            "int" | "integer" => Ok(ValueKind::Int),
            "float" => Ok(ValueKind::Float),
            "bool" => Ok(ValueKind::Bool),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Str => "str",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
        };
        write!(f, "{}", name)
    }
}

/// A value ready to be written
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl MetadataValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Int(v) => Some(*v as f64),
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Text(v) => v.trim().parse().ok(),
            MetadataValue::Bool(_) => None,
        }
    }
}

impl From<MetadataValue> for AttributeValue {
    fn from(value: MetadataValue) -> Self {
        match value {
            MetadataValue::Text(v) => AttributeValue::Str(v),
            MetadataValue::Int(v) => AttributeValue::Longlong(v),
            MetadataValue::Float(v) => AttributeValue::Double(v),
            MetadataValue::Bool(v) => AttributeValue::Schar(i8::from(v)),
        }
    }
}

/// One line of a metadata file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub name: String,
    pub value: String,
    pub kind: ValueKind,
}

impl MetadataEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
        }
    }

    /// Value converted to its requested type, text when it does not convert
    pub fn typed_value(&self) -> MetadataValue {
        let value = self.value.trim();
        let converted = match self.kind {
            ValueKind::Str => return MetadataValue::Text(self.value.clone()),
            ValueKind::Int => value.parse().ok().map(MetadataValue::Int),
            ValueKind::Float => value.parse().ok().map(MetadataValue::Float),
            ValueKind::Bool => match value.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(MetadataValue::Bool(true)),
                "false" | "no" | "0" => Some(MetadataValue::Bool(false)),
                _ => None,
            },
        };
        converted.unwrap_or_else(|| {
            warn!(
                "Value '{}' for attribute '{}' could not be converted to type '{}'",
                self.value, self.name, self.kind
            );
            MetadataValue::Text(self.value.clone())
        })
    }
}

fn parse_kind(name: &str, kind: &str) -> ValueKind {
    kind.parse().unwrap_or_else(|unknown| {
        warn!("Unknown type '{}' for metadata {}, using str", unknown, name);
        ValueKind::Str
    })
}

/// Add an entry, replacing an earlier one of the same name
fn push_entry(entries: &mut Vec<MetadataEntry>, entry: MetadataEntry) {
    match entries.iter_mut().find(|e| e.name == entry.name) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

/// Parse CSV metadata
///
/// The first field is the name. A trailing `type=..` field sets the type and
/// the fields in between are joined back together with commas, so values
/// may contain unquoted commas.
pub fn read_csv_metadata(text: &str) -> Result<Vec<MetadataEntry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut entries: Vec<MetadataEntry> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields: Vec<&str> = record.iter().collect();
        if fields.len() < 2 {
            continue;
        }
        let name = fields[0];
        let (value_fields, kind) = match fields[fields.len() - 1].trim().strip_prefix("type=") {
            Some(kind) => (&fields[1..fields.len() - 1], parse_kind(name, kind)),
            None => (&fields[1..], ValueKind::Str),
        };
        push_entry(
            &mut entries,
            MetadataEntry::new(name, value_fields.join(",").trim(), kind),
        );
    }
    Ok(entries)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Typed {
        value: Scalar,
        #[serde(rename = "type")]
        kind: Option<String>,
    },
    Bare(Scalar),
}

fn entries_from_map(raw: BTreeMap<String, RawEntry>) -> Vec<MetadataEntry> {
    raw.into_iter()
        .map(|(name, entry)| match entry {
            RawEntry::Typed { value, kind } => {
                let kind = kind
                    .map(|k| parse_kind(&name, &k))
                    .unwrap_or_default();
                MetadataEntry::new(name, value.to_string(), kind)
            }
            RawEntry::Bare(value) => MetadataEntry::new(name, value.to_string(), ValueKind::Str),
        })
        .collect()
}

/// Parse JSON metadata
pub fn read_json_metadata(text: &str) -> Result<Vec<MetadataEntry>> {
    let raw: BTreeMap<String, RawEntry> = serde_json::from_str(text)?;
    Ok(entries_from_map(raw))
}

/// Parse YAML metadata
pub fn read_yaml_metadata(text: &str) -> Result<Vec<MetadataEntry>> {
    let raw: BTreeMap<String, RawEntry> = serde_yaml::from_str(text)?;
    Ok(entries_from_map(raw))
}

/// Parse XML metadata
///
/// ```xml
/// <metadata>
///   <project><value>My project</value></project>
///   <latitude><value>51.25</value><type>float</type></latitude>
/// </metadata>
/// ```
///
/// Each child of the root element is one entry named by its tag. Other
/// elements inside an entry are ignored.
pub fn read_xml_metadata(text: &str) -> Result<Vec<MetadataEntry>> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut entries: Vec<MetadataEntry> = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<MetadataEntry> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match depth {
                    2 => current = Some(MetadataEntry::new(tag, "", ValueKind::Str)),
                    3 => field = Some(tag),
                    _ => {}
                }
            }
            Event::Empty(e) if depth == 1 => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                push_entry(&mut entries, MetadataEntry::new(tag, "", ValueKind::Str));
            }
            Event::Text(t) if depth == 3 => {
                let text = t.unescape()?.into_owned();
                if let (Some(entry), Some(field)) = (current.as_mut(), field.as_deref()) {
                    match field {
                        "value" => entry.value = text,
                        "type" => entry.kind = parse_kind(&entry.name, &text),
                        _ => {}
                    }
                }
            }
            Event::End(_) => {
                match depth {
                    2 => {
                        if let Some(entry) = current.take() {
                            push_entry(&mut entries, entry);
                        }
                    }
                    3 => field = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(entries)
}

/// Read a metadata file, choosing the parser by extension
pub fn read_metadata_file(path: &Path) -> Result<Vec<MetadataEntry>> {
    let text = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => read_csv_metadata(&text),
        "json" => read_json_metadata(&text),
        "yaml" | "yml" => read_yaml_metadata(&text),
        "xml" => read_xml_metadata(&text),
        _ => {
            warn!(
                "Unknown metadata file type for {}, trying csv",
                path.display()
            );
            read_csv_metadata(&text)
        }
    }
}

/// Write a single value into a scalar variable, updating its valid range
pub fn set_position_variable(file: &mut FileMut, name: &str, value: f64) -> Result<()> {
    if file.variable(name).is_none() {
        warn!("No {} variable in file, metadata value not written", name);
        return Ok(());
    }
    update_variable(file, name, &[value], true)
}

/// Apply parsed metadata to an open file
pub fn apply_metadata(file: &mut FileMut, entries: &[MetadataEntry]) -> Result<()> {
    for entry in entries {
        let value = entry.typed_value();
        if POSITION_VARIABLES.contains(&entry.name.as_str()) {
            match value.as_f64() {
                Some(position) => set_position_variable(file, &entry.name, position)?,
                None => warn!("Non-numeric {} '{}' not written", entry.name, entry.value),
            }
        } else {
            debug!(name = %entry.name, "setting global attribute from metadata");
            file.add_attribute(&entry.name, AttributeValue::from(value))?;
        }
    }
    Ok(())
}

/// Read a metadata file and apply it to the netCDF file at `ncfile`
pub fn add_metadata_to_file(ncfile: &Path, metadata_file: &Path) -> Result<()> {
    let entries = read_metadata_file(metadata_file)?;
    let mut file = netcdf::append(ncfile)?;
    apply_metadata(&mut file, &entries)
}

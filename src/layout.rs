//! Structure of a netCDF variable extracted from its vocabulary definition
//!
//! A variable definition is a flat list of attributes. Some of them describe
//! the variable itself rather than being netCDF attributes (`dimension`,
//! `type`, `_FillValue`, chunking and compression); those are taken out here
//! and the rest are cleaned up for writing.

use crate::tables::VariableDef;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Default deflate level when compression is requested without `complevel`
pub const DEFAULT_DEFLATE_LEVEL: i32 = 4;

const STRUCTURAL_KEYS: [&str; 7] = [
    "dimension",
    "type",
    "_FillValue",
    "chunksizes",
    "compression",
    "complevel",
    "shuffle",
];

/// Numeric types available in NETCDF4_CLASSIC files
///
/// The classic data model stops at `double`; unsigned and 64-bit integer
/// types are refused by the library, see [`is_non_classic_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NcType {
    Byte,
    Short,
    Int,
    Float,
    Double,
}

impl FromStr for NcType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "byte" | "int8" | "i1" | "b" => Ok(NcType::Byte),
            "short" | "int16" | "i2" => Ok(NcType::Short),
            "int" | "int32" | "i4" => Ok(NcType::Int),
            "float" | "float32" | "f4" => Ok(NcType::Float),
            "double" | "float64" | "f8" => Ok(NcType::Double),
            other => Err(other.to_string()),
        }
    }
}

/// Enhanced-model type names that a classic-model file cannot hold
pub fn is_non_classic_type(name: &str) -> bool {
    matches!(
        name.trim().to_lowercase().as_str(),
        "ubyte"
            | "uint8"
            | "u1"
            | "ushort"
            | "uint16"
            | "u2"
            | "uint"
            | "uint32"
            | "u4"
            | "int64"
            | "i8"
            | "uint64"
            | "u8"
    )
}

/// Deflate settings for a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub level: i32,
    pub shuffle: bool,
}

/// Value of a variable attribute as it will be written
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Bytes(Vec<i8>),
}

/// Why a variable definition cannot be turned into a variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutIssue {
    MissingDimensions,
    MissingType,
    UnsupportedType(String),
    NonClassicType(String),
    InvalidFillValue(String),
    InvalidChunkSizes(String),
}

impl fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutIssue::MissingDimensions => write!(f, "missing dimensions"),
            LayoutIssue::MissingType => write!(f, "missing type"),
            LayoutIssue::UnsupportedType(t) => write!(f, "unsupported type '{}'", t),
            LayoutIssue::NonClassicType(t) => {
                write!(f, "type '{}' not allowed in NETCDF4_CLASSIC files", t)
            }
            LayoutIssue::InvalidFillValue(v) => write!(f, "invalid _FillValue '{}'", v),
            LayoutIssue::InvalidChunkSizes(v) => write!(f, "invalid chunksizes '{}'", v),
        }
    }
}

/// Everything needed to create one variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableLayout {
    pub name: String,
    pub dimensions: Vec<String>,
    pub nctype: NcType,
    pub fill_value: Option<f64>,
    pub chunk_sizes: Option<Vec<usize>>,
    pub compression: Option<Compression>,
    pub attributes: Vec<(String, AttrValue)>,
}

impl VariableLayout {
    /// Split a variable definition into structure and attributes
    pub fn from_definition(name: &str, def: &VariableDef) -> Result<Self, LayoutIssue> {
        let dimensions = def
            .get("dimension")
            .map(|d| split_dimensions(d))
            .ok_or(LayoutIssue::MissingDimensions)?;

        let type_name = def.get("type").ok_or(LayoutIssue::MissingType)?;
        if is_non_classic_type(type_name) {
            return Err(LayoutIssue::NonClassicType(type_name.trim().to_string()));
        }
        let nctype = type_name
            .parse::<NcType>()
            .map_err(LayoutIssue::UnsupportedType)?;

        let fill_value = match def.get("_FillValue").map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Some(
                v.parse::<f64>()
                    .map_err(|_| LayoutIssue::InvalidFillValue(v.to_string()))?,
            ),
            _ => None,
        };

        let chunk_sizes = match def.get("chunksizes").map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Some(
                v.split(',')
                    .map(|c| c.trim().parse::<usize>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| LayoutIssue::InvalidChunkSizes(v.to_string()))?,
            ),
            _ => None,
        };

        let compression = compression_settings(def);

        let attributes = def
            .iter()
            .filter(|(key, _)| !STRUCTURAL_KEYS.contains(key))
            .filter_map(|(key, value)| munge_attribute(name, nctype, key, value))
            .collect();

        Ok(Self {
            name: name.to_string(),
            dimensions,
            nctype,
            fill_value,
            chunk_sizes,
            compression,
            attributes,
        })
    }
}

/// Dimension names from a `dimension` cell; `.` is a common typo for `,`
pub fn split_dimensions(cell: &str) -> Vec<String> {
    cell.replace('.', ",")
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "1" | "zlib"
    )
}

fn compression_settings(def: &VariableDef) -> Option<Compression> {
    let requested = def.get("compression").map(|c| is_truthy(c)).unwrap_or(false);
    if !requested {
        return None;
    }
    let level = def
        .get("complevel")
        .and_then(|l| l.trim().parse::<i32>().ok())
        .unwrap_or(DEFAULT_DEFLATE_LEVEL)
        .clamp(0, 9);
    let shuffle = def.get("shuffle").map(|s| is_truthy(s)).unwrap_or(true);
    Some(Compression { level, shuffle })
}

/// Parse `0b,1b,2b` style flag values
pub fn parse_byte_flags(value: &str) -> Option<Vec<i8>> {
    value
        .trim()
        .trim_matches(',')
        .split(',')
        .map(|v| v.trim().trim_matches('b').parse::<i8>().ok())
        .collect()
}

/// Clean up one attribute, `None` when it should not be written
fn munge_attribute(var: &str, nctype: NcType, key: &str, value: &str) -> Option<(String, AttrValue)> {
    let is_example = value.contains("EXAMPLE");

    if key == "standard_name" && (is_example || value.is_empty()) {
        info!("No standard name for variable {}, standard_name attribute not added", var);
        return None;
    }
    if value.is_empty() {
        info!("No value for attribute {} for variable {}, attribute not added", key, var);
        return None;
    }
    if is_example {
        info!("Example value for attribute {} for variable {}", key, var);
    }

    if key.contains("flag_meaning") && value.contains('|') {
        let joined = value
            .split('|')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ");
        return Some((key.to_string(), AttrValue::Text(joined)));
    }

    if key.contains("flag_value") && var.contains("qc") && nctype == NcType::Byte {
        if let Some(flags) = parse_byte_flags(value) {
            return Some((key.to_string(), AttrValue::Bytes(flags)));
        }
    }

    Some((key.to_string(), AttrValue::Text(value.to_string())))
}

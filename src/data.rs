//! Adding data to a created template
//!
//! Writing data also keeps the variable metadata in step with it:
//! `valid_min`/`valid_max` follow the data, and quality control variables
//! only take values their `flag_values` list.

use crate::errors::{Result, TemplateError};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{AttributeValue, FileMut};
use tracing::{debug, warn};

/// Meanings every QC variable starts with, in this order
pub const REQUIRED_FLAG_MEANINGS: [&str; 2] = ["not_used", "good_data"];

/// Numbers held by a numeric attribute, scalar or array
pub fn attribute_numbers(value: &AttributeValue) -> Option<Vec<f64>> {
    macro_rules! many {
        ($values:expr) => {
            Some($values.iter().map(|v| *v as f64).collect())
        };
    }
    match value {
        AttributeValue::Schar(v) => Some(vec![f64::from(*v)]),
        AttributeValue::Uchar(v) => Some(vec![f64::from(*v)]),
        AttributeValue::Short(v) => Some(vec![f64::from(*v)]),
        AttributeValue::Ushort(v) => Some(vec![f64::from(*v)]),
        AttributeValue::Int(v) => Some(vec![f64::from(*v)]),
        AttributeValue::Uint(v) => Some(vec![f64::from(*v)]),
        AttributeValue::Longlong(v) => Some(vec![*v as f64]),
        AttributeValue::Ulonglong(v) => Some(vec![*v as f64]),
        AttributeValue::Float(v) => Some(vec![f64::from(*v)]),
        AttributeValue::Double(v) => Some(vec![*v]),
        AttributeValue::Schars(v) => many!(v),
        AttributeValue::Uchars(v) => many!(v),
        AttributeValue::Shorts(v) => many!(v),
        AttributeValue::Ushorts(v) => many!(v),
        AttributeValue::Ints(v) => many!(v),
        AttributeValue::Uints(v) => many!(v),
        AttributeValue::Longlongs(v) => many!(v),
        AttributeValue::Ulonglongs(v) => many!(v),
        AttributeValue::Floats(v) => many!(v),
        AttributeValue::Doubles(v) => many!(v),
        AttributeValue::Str(_) | AttributeValue::Strs(_) => None,
    }
}

/// Smallest and largest values, ignoring NaN
pub fn data_range(data: &[f64]) -> Option<(f64, f64)> {
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Distinct data values missing from `flag_values`, in order of appearance
pub fn unexpected_flags(data: &[f64], flag_values: &[f64]) -> Vec<f64> {
    let mut unexpected: Vec<f64> = Vec::new();
    for value in data {
        if !flag_values.contains(value) && !unexpected.contains(value) {
            unexpected.push(*value);
        }
    }
    unexpected
}

macro_rules! put_typed {
    ($var:expr, $t:ty, $data:expr, $range:expr) => {{
        if let Some((lo, hi)) = $range {
            $var.put_attribute("valid_min", lo as $t)?;
            $var.put_attribute("valid_max", hi as $t)?;
        }
        let values: Vec<$t> = $data.iter().map(|v| *v as $t).collect();
        $var.put_values(&values, ..)?;
    }};
}

/// Write `data` into a variable
///
/// When the variable has a `valid_min`, both `valid_min` and `valid_max`
/// are set to the range of the data in the variable's type. Variables with
/// `qc` in their name and a `flag_values` attribute are checked first:
/// values outside `flag_values` fail with [`TemplateError::InvalidQcData`],
/// or only log a warning when `qc_data_error` is false.
pub fn update_variable(
    file: &mut FileMut,
    name: &str,
    data: &[f64],
    qc_data_error: bool,
) -> Result<()> {
    let mut var = file
        .variable_mut(name)
        .ok_or_else(|| TemplateError::VariableNotFound {
            name: name.to_string(),
        })?;

    if name.to_lowercase().contains("qc") {
        let flag_values = match var.attribute("flag_values") {
            Some(attr) => attribute_numbers(&attr.value()?),
            None => None,
        };
        if let Some(flag_values) = flag_values {
            let unexpected = unexpected_flags(data, &flag_values);
            if !unexpected.is_empty() {
                if qc_data_error {
                    return Err(TemplateError::InvalidQcData {
                        variable: name.to_string(),
                        values: unexpected,
                    });
                }
                warn!(
                    "Data for {} contains values {:?} not in flag_values {:?}",
                    name, unexpected, flag_values
                );
            }
        }
    }

    let range = if var.attribute("valid_min").is_some() {
        let range = data_range(data);
        if range.is_none() {
            warn!("No valid data for {}, valid_min and valid_max left unchanged", name);
        }
        range
    } else {
        None
    };

    match var.vartype() {
        NcVariableType::Int(IntType::I8) => put_typed!(var, i8, data, range),
        NcVariableType::Int(IntType::U8) => put_typed!(var, u8, data, range),
        NcVariableType::Int(IntType::I16) => put_typed!(var, i16, data, range),
        NcVariableType::Int(IntType::U16) => put_typed!(var, u16, data, range),
        NcVariableType::Int(IntType::I32) => put_typed!(var, i32, data, range),
        NcVariableType::Int(IntType::U32) => put_typed!(var, u32, data, range),
        NcVariableType::Int(IntType::I64) => put_typed!(var, i64, data, range),
        NcVariableType::Int(IntType::U64) => put_typed!(var, u64, data, range),
        NcVariableType::Float(FloatType::F32) => put_typed!(var, f32, data, range),
        NcVariableType::Float(FloatType::F64) => put_typed!(var, f64, data, range),
        other => {
            return Err(TemplateError::Generic(format!(
                "Variable {} has non-numeric type {:?}",
                name, other
            )))
        }
    }
    debug!(variable = name, count = data.len(), "data written");
    Ok(())
}

macro_rules! put_flags {
    ($var:expr, $t:ty, $values:expr) => {{
        let flags: Vec<$t> = $values.iter().map(|v| *v as $t).collect();
        $var.put_attribute("flag_values", flags)?;
    }};
}

fn invalid_flags(variable: &str, reason: impl Into<String>) -> TemplateError {
    TemplateError::InvalidQcFlags {
        variable: variable.to_string(),
        reason: reason.into(),
    }
}

/// Replace the flag meanings, and values, of a QC variable
///
/// Spaces in meanings become underscores. The first two meanings must be
/// `not_used` and `good_data`. Given values must start with 0 and 1 and
/// match the meanings one to one; without values, `0..n` is used. Values
/// are written in the variable's own type.
pub fn change_qc_flags(
    file: &mut FileMut,
    name: &str,
    flag_meanings: &[&str],
    flag_values: Option<&[i64]>,
) -> Result<()> {
    let mut var = file
        .variable_mut(name)
        .ok_or_else(|| TemplateError::VariableNotFound {
            name: name.to_string(),
        })?;

    let meanings: Vec<String> = flag_meanings
        .iter()
        .map(|meaning| {
            if meaning.contains(' ') {
                let replaced = meaning.replace(' ', "_");
                warn!("Flag meaning '{}' changed to '{}'", meaning, replaced);
                replaced
            } else {
                meaning.to_string()
            }
        })
        .collect();

    if meanings.len() < 2 || meanings[..2] != REQUIRED_FLAG_MEANINGS {
        return Err(invalid_flags(
            name,
            "first two flag meanings must be 'not_used' and 'good_data'",
        ));
    }

    let values: Vec<i64> = match flag_values {
        Some(values) => {
            if values.len() < 2 || values[..2] != [0, 1] {
                return Err(invalid_flags(name, "first two flag values must be 0 and 1"));
            }
            if values.len() != meanings.len() {
                return Err(invalid_flags(
                    name,
                    format!(
                        "{} flag values given for {} flag meanings",
                        values.len(),
                        meanings.len()
                    ),
                ));
            }
            values.to_vec()
        }
        None => (0..meanings.len() as i64).collect(),
    };

    match var.vartype() {
        NcVariableType::Int(IntType::I8) => put_flags!(var, i8, values),
        NcVariableType::Int(IntType::U8) => put_flags!(var, u8, values),
        NcVariableType::Int(IntType::I16) => put_flags!(var, i16, values),
        NcVariableType::Int(IntType::U16) => put_flags!(var, u16, values),
        NcVariableType::Int(IntType::I32) => put_flags!(var, i32, values),
        NcVariableType::Int(IntType::U32) => put_flags!(var, u32, values),
        NcVariableType::Int(IntType::I64) => put_flags!(var, i64, values),
        NcVariableType::Int(IntType::U64) => put_flags!(var, u64, values),
        NcVariableType::Float(FloatType::F32) => put_flags!(var, f32, values),
        NcVariableType::Float(FloatType::F64) => put_flags!(var, f64, values),
        other => {
            return Err(invalid_flags(name, format!("non-numeric type {:?}", other)));
        }
    }
    var.put_attribute("flag_meanings", meanings.join(" "))?;
    Ok(())
}

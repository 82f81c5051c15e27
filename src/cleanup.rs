//! Removal of empty product-specific variables
//!
//! netCDF has no way to delete a variable, so the file is rewritten without
//! the empty ones: global attributes and dimensions are copied, then every
//! remaining variable with its fill value, attributes and data. The new file
//! can then replace the original.
//!
//! Only variables defined by the product's own vocabulary are candidates;
//! common variables such as `time` are always kept.

use crate::errors::{Result, TemplateError};
use crate::locator::VocabLocator;
use crate::naming::product_from_filename;
use crate::source::VocabSource;
use crate::tables::parse_variables;
use ndarray::parallel::prelude::*;
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{AttributeValue, FileMut, Options, Variable};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `valid_min` left in a template that never had data added
pub const DERIVED_PLACEHOLDER: &str = "<derived from file>";

/// How the cleaned file is written
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Where to write the cleaned file, `tmp_<name>` beside the input by default
    pub outfile: Option<PathBuf>,
    /// Replace the input with the cleaned file
    pub overwrite: bool,
}

/// Numeric types variable data can be compared and copied as
trait TemplateNumber: Copy + PartialEq {
    /// netCDF default fill value for the type
    const DEFAULT_FILL: Self;

    fn from_attribute(value: &AttributeValue) -> Option<Self>;
}

macro_rules! template_number {
    ($t:ty, $fill:expr) => {
        impl TemplateNumber for $t {
            const DEFAULT_FILL: Self = $fill;

            fn from_attribute(value: &AttributeValue) -> Option<Self> {
                Some(match *value {
                    AttributeValue::Schar(v) => v as $t,
                    AttributeValue::Uchar(v) => v as $t,
                    AttributeValue::Short(v) => v as $t,
                    AttributeValue::Ushort(v) => v as $t,
                    AttributeValue::Int(v) => v as $t,
                    AttributeValue::Uint(v) => v as $t,
                    AttributeValue::Longlong(v) => v as $t,
                    AttributeValue::Ulonglong(v) => v as $t,
                    AttributeValue::Float(v) => v as $t,
                    AttributeValue::Double(v) => v as $t,
                    _ => return None,
                })
            }
        }
    };
}

template_number!(i8, -127);
template_number!(u8, 255);
template_number!(i16, -32767);
template_number!(u16, 65535);
template_number!(i32, -2147483647);
template_number!(u32, 4294967295);
template_number!(i64, -9223372036854775806);
template_number!(u64, 18446744073709551614);
template_number!(f32, 9.969_21e36);
template_number!(f64, 9.969_209_968_386_869e36);

/// Equality that also treats NaN as equal to NaN
#[allow(clippy::eq_op)]
fn same<T: TemplateNumber>(a: T, b: T) -> bool {
    a == b || (a != a && b != b)
}

fn fill_value<T: TemplateNumber>(var: &Variable<'_>) -> Result<T> {
    Ok(match var.attribute("_FillValue") {
        Some(attr) => T::from_attribute(&attr.value()?).unwrap_or(T::DEFAULT_FILL),
        None => T::DEFAULT_FILL,
    })
}

macro_rules! all_fill {
    ($var:expr, $t:ty) => {{
        let fill = fill_value::<$t>($var)?;
        let values = $var.get::<$t, _>(..)?;
        values.par_iter().all(|v| same(*v, fill))
    }};
}

/// Whether a variable holds nothing but its fill value
///
/// A `valid_min` still reading `<derived from file>` also marks a variable
/// that was never filled in.
pub fn is_empty_variable(var: &Variable<'_>) -> Result<bool> {
    if let Some(attr) = var.attribute("valid_min") {
        if let AttributeValue::Str(value) = attr.value()? {
            if value == DERIVED_PLACEHOLDER {
                return Ok(true);
            }
        }
    }

    let empty = match var.vartype() {
        NcVariableType::Int(IntType::I8) => all_fill!(var, i8),
        NcVariableType::Int(IntType::U8) => all_fill!(var, u8),
        NcVariableType::Int(IntType::I16) => all_fill!(var, i16),
        NcVariableType::Int(IntType::U16) => all_fill!(var, u16),
        NcVariableType::Int(IntType::I32) => all_fill!(var, i32),
        NcVariableType::Int(IntType::U32) => all_fill!(var, u32),
        NcVariableType::Int(IntType::I64) => all_fill!(var, i64),
        NcVariableType::Int(IntType::U64) => all_fill!(var, u64),
        NcVariableType::Float(FloatType::F32) => all_fill!(var, f32),
        NcVariableType::Float(FloatType::F64) => all_fill!(var, f64),
        other => {
            debug!("Not checking variable {} of type {:?}", var.name(), other);
            false
        }
    };
    Ok(empty)
}

/// Product-specific variables in the file that hold no data
pub fn find_empty_variables(file: &netcdf::File, candidates: &[String]) -> Result<Vec<String>> {
    let mut empty = Vec::new();
    for var in file.variables() {
        let name = var.name().to_string();
        if candidates.contains(&name) && is_empty_variable(&var)? {
            empty.push(name);
        }
    }
    Ok(empty)
}

macro_rules! copy_typed {
    ($output:expr, $var:expr, $t:ty) => {{
        let dims: Vec<String> = $var.dimensions().iter().map(|d| d.name().to_string()).collect();
        let dim_refs: Vec<&str> = dims.iter().map(String::as_str).collect();
        let data = $var.get::<$t, _>(..)?;
        let name = $var.name().to_string();
        let mut new_var = $output.add_variable::<$t>(&name, &dim_refs)?;
        if let Some(attr) = $var.attribute("_FillValue") {
            if let Some(fill) = <$t as TemplateNumber>::from_attribute(&attr.value()?) {
                new_var.set_fill_value(fill)?;
            }
        }
        for attr in $var.attributes().filter(|a| a.name() != "_FillValue") {
            new_var.put_attribute(attr.name(), attr.value()?)?;
        }
        new_var.put(data.view(), ..)?;
    }};
}

fn copy_variable(output: &mut FileMut, var: &Variable<'_>) -> Result<()> {
    match var.vartype() {
        NcVariableType::Int(IntType::I8) => copy_typed!(output, var, i8),
        NcVariableType::Int(IntType::U8) => copy_typed!(output, var, u8),
        NcVariableType::Int(IntType::I16) => copy_typed!(output, var, i16),
        NcVariableType::Int(IntType::U16) => copy_typed!(output, var, u16),
        NcVariableType::Int(IntType::I32) => copy_typed!(output, var, i32),
        NcVariableType::Int(IntType::U32) => copy_typed!(output, var, u32),
        NcVariableType::Int(IntType::I64) => copy_typed!(output, var, i64),
        NcVariableType::Int(IntType::U64) => copy_typed!(output, var, u64),
        NcVariableType::Float(FloatType::F32) => copy_typed!(output, var, f32),
        NcVariableType::Float(FloatType::F64) => copy_typed!(output, var, f64),
        other => {
            return Err(TemplateError::Generic(format!(
                "Cannot copy variable {} of type {:?}",
                var.name(),
                other
            )))
        }
    }
    Ok(())
}

/// Write a copy of `infile` to `outfile` leaving out the named variables
pub fn rewrite_without(infile: &Path, outfile: &Path, exclude: &[String]) -> Result<()> {
    let input = netcdf::open(infile)?;
    if outfile.exists() {
        fs::remove_file(outfile)?;
    }
    let mut output = netcdf::create_with(outfile, Options::NETCDF4 | Options::CLASSIC)?;

    for attr in input.attributes() {
        output.add_attribute(attr.name(), attr.value()?)?;
    }

    for dim in input.dimensions() {
        let name = dim.name().to_string();
        if dim.is_unlimited() {
            output.add_unlimited_dimension(&name)?;
        } else {
            output.add_dimension(&name, dim.len())?;
        }
    }

    for var in input.variables() {
        if exclude.iter().any(|e| *e == var.name().to_string()) {
            continue;
        }
        copy_variable(&mut output, &var)?;
    }

    Ok(())
}

/// `tmp_<name>` in the same directory as the input
pub fn temporary_path(infile: &Path) -> PathBuf {
    let name = infile
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    infile.with_file_name(format!("tmp_{}", name))
}

/// Remove empty variables given the product's variable names
///
/// Returns the names of the variables that were left out.
pub fn remove_empty_variables_with(
    infile: &Path,
    product_variables: &[String],
    options: &CleanOptions,
) -> Result<Vec<String>> {
    let empty = {
        let file = netcdf::open(infile)?;
        find_empty_variables(&file, product_variables)?
    };
    info!("Empty variables being removed: [{}]", empty.join(", "));

    let outfile = options
        .outfile
        .clone()
        .unwrap_or_else(|| temporary_path(infile));
    rewrite_without(infile, &outfile, &empty)?;

    if options.overwrite {
        fs::rename(&outfile, infile)?;
    }
    Ok(empty)
}

/// Remove empty product-specific variables, reading the product from the file name
pub async fn remove_empty_variables(
    infile: &Path,
    source: &dyn VocabSource,
    locator: &VocabLocator,
    options: &CleanOptions,
) -> Result<Vec<String>> {
    let file_name = infile
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let product = product_from_filename(&file_name)?;

    let location = locator.product_variables(&product);
    let Some(text) = source.fetch(&location).await? else {
        info!(
            "No variables-specific table for {}, nothing to remove from {}",
            product,
            infile.display()
        );
        return Ok(Vec::new());
    };
    let product_variables: Vec<String> = parse_variables(&text, &location)?
        .names()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();

    remove_empty_variables_with(infile, &product_variables, options)
}

//! Creation of template netCDF files from a [`FileInfo`]
//!
//! The writer creates a NETCDF4_CLASSIC file and populates it in three
//! passes: global attributes, dimensions, then variables with their storage
//! settings and attributes. No data is written; every variable is left at its
//! fill value for the data producer to fill in.
//!
//! Problems with individual variables (no dimensions, unknown type, a
//! dimension without a length) are logged and the variable is skipped so the
//! rest of the file is still produced. If the library fails part way through,
//! the partially written file is left on disk.

use crate::errors::Result;
use crate::file_info::FileInfo;
use crate::layout::{AttrValue, NcType, VariableLayout};
use crate::locator::release_url;
use crate::tables::VocabEntry;
use chrono::{DateTime, Utc};
use netcdf::{FileMut, Options, VariableMut};
use std::collections::BTreeMap;
use std::{env, fs, path::Path};
use tracing::{debug, warn};

/// Value of the `institution` attribute
pub const INSTITUTION: &str = "National Centre for Atmospheric Science (NCAS)";

/// Run-time values substituted into global attributes
#[derive(Debug, Clone)]
pub struct WriteContext {
    pub created: DateTime<Utc>,
    pub platform: String,
    pub user: Option<String>,
    pub host: Option<String>,
}

impl WriteContext {
    /// Context for a file created now by the current user on this host
    pub fn now(platform: impl Into<String>) -> Self {
        Self {
            created: Utc::now(),
            platform: platform.into(),
            user: current_user(),
            host: current_host(),
        }
    }

    /// Creation time as written into `history` and `last_revised_date`
    pub fn created_string(&self) -> String {
        self.created.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    fn history(&self) -> String {
        let created = self.created_string();
        match (&self.user, &self.host) {
            (Some(user), Some(host)) => {
                format!("{} - File created by {} on {}", created, user, host)
            }
            (Some(user), None) => format!("{} - File created by {}", created, user),
            _ => format!("{} - File created", created),
        }
    }
}

fn current_user() -> Option<String> {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}

fn current_host() -> Option<String> {
    env::var("HOSTNAME")
        .ok()
        .or_else(|| fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

/// Value for one global attribute
///
/// A fixed value from the vocabulary always wins. Otherwise a handful of
/// attributes are filled from the instrument and run context, and anything
/// else becomes a `CHANGE:` placeholder built from the vocabulary description
/// and compliance rules.
pub fn resolve_global_attribute(
    key: &str,
    entry: &VocabEntry,
    info: &FileInfo,
    ctx: &WriteContext,
) -> String {
    if !entry.fixed_value().is_empty() {
        return entry.fixed_value().to_string();
    }
    match key {
        "source" => info.instrument.descriptor.clone(),
        "institution" => INSTITUTION.to_string(),
        "platform" => ctx.platform.clone(),
        "instrument_manufacturer" => info.instrument.manufacturer.clone(),
        "instrument_model" => info.instrument.model.clone(),
        "instrument_serial_number" => info.instrument.serial_number.clone(),
        "amf_vocabularies_release" => release_url(&info.tag),
        "history" => ctx.history(),
        "last_revised_date" => ctx.created_string(),
        "deployment_mode" => info.deployment_mode.to_string(),
        _ => format!(
            "CHANGE: {}. {}",
            entry.description(),
            entry.compliance()
        ),
    }
}

/// All global attributes of a file, in vocabulary order
pub fn global_attributes(info: &FileInfo, ctx: &WriteContext) -> Vec<(String, String)> {
    info.attributes
        .iter()
        .map(|(key, entry)| (key.to_string(), resolve_global_attribute(key, entry, info, ctx)))
        .collect()
}

/// What ended up in a written file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteSummary {
    pub dimensions: Vec<String>,
    pub variables: Vec<String>,
    /// Variables left out, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Writes one template file
pub struct TemplateWriter<'a> {
    info: &'a FileInfo,
    output_path: &'a Path,
}

impl<'a> TemplateWriter<'a> {
    pub fn new(info: &'a FileInfo, output_path: &'a Path) -> Self {
        Self { info, output_path }
    }

    /// Create the file, replacing any existing file at the path
    pub fn write(&self, lengths: &BTreeMap<String, usize>, ctx: &WriteContext) -> Result<WriteSummary> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = netcdf::create_with(self.output_path, Options::NETCDF4 | Options::CLASSIC)?;
        let mut summary = WriteSummary::default();

        for (key, value) in global_attributes(self.info, ctx) {
            file.add_attribute(&key, value.as_str())?;
        }

        for name in self.info.dimensions.names() {
            match lengths.get(name) {
                Some(&length) => {
                    file.add_dimension(name, length)?;
                    summary.dimensions.push(name.to_string());
                }
                None => warn!("No length for dimension {}, dimension not added", name),
            }
        }

        for (name, def) in self.info.variables.iter() {
            if name.is_empty() {
                continue;
            }
            let layout = match VariableLayout::from_definition(name, def) {
                Ok(layout) => layout,
                Err(issue) => {
                    warn!(
                        "Variable {} for product {} not added to file: {}",
                        name, self.info.data_product, issue
                    );
                    summary.skipped.push((name.to_string(), issue.to_string()));
                    continue;
                }
            };
            if let Some(missing) = layout
                .dimensions
                .iter()
                .find(|d| !summary.dimensions.contains(d))
            {
                let reason = format!("dimension '{}' not in file", missing);
                warn!("Variable {} not added to file: {}", name, reason);
                summary.skipped.push((name.to_string(), reason));
                continue;
            }
            add_variable(&mut file, &layout)?;
            summary.variables.push(name.to_string());
        }

        debug!(
            path = %self.output_path.display(),
            variables = summary.variables.len(),
            skipped = summary.skipped.len(),
            "template written"
        );
        Ok(summary)
    }
}

macro_rules! add_typed_variable {
    ($file:expr, $layout:expr, $t:ty) => {{
        let dims: Vec<&str> = $layout.dimensions.iter().map(String::as_str).collect();
        let mut var = $file.add_variable::<$t>(&$layout.name, &dims)?;
        configure_storage(&mut var, $layout)?;
        if let Some(fill) = $layout.fill_value {
            var.set_fill_value(fill as $t)?;
        }
        put_attributes(&mut var, &$layout.attributes)?;
    }};
}

fn add_variable(file: &mut FileMut, layout: &VariableLayout) -> Result<()> {
    match layout.nctype {
        NcType::Byte => add_typed_variable!(file, layout, i8),
        NcType::Short => add_typed_variable!(file, layout, i16),
        NcType::Int => add_typed_variable!(file, layout, i32),
        NcType::Float => add_typed_variable!(file, layout, f32),
        NcType::Double => add_typed_variable!(file, layout, f64),
    }
    Ok(())
}

fn configure_storage(var: &mut VariableMut<'_>, layout: &VariableLayout) -> Result<()> {
    if let Some(compression) = layout.compression {
        var.set_compression(compression.level, compression.shuffle)?;
    }
    if let Some(chunks) = &layout.chunk_sizes {
        if chunks.len() == layout.dimensions.len() && !chunks.is_empty() {
            var.set_chunking(chunks)?;
        } else {
            warn!(
                "Ignoring chunksizes for {}: {} sizes for {} dimensions",
                layout.name,
                chunks.len(),
                layout.dimensions.len()
            );
        }
    }
    Ok(())
}

fn put_attributes(var: &mut VariableMut<'_>, attributes: &[(String, AttrValue)]) -> Result<()> {
    for (key, value) in attributes {
        match value {
            AttrValue::Text(text) => {
                var.put_attribute(key, text.as_str())?;
            }
            AttrValue::Bytes(bytes) => {
                var.put_attribute(key, bytes.clone())?;
            }
        }
    }
    Ok(())
}

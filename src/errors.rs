//! Centralized error handling for amof_template
//!
//! Every fallible operation in the crate returns [`Result`], carrying a
//! [`TemplateError`] that describes what went wrong with enough context to
//! report it to the user without a backtrace.

use std::fmt;

/// Main error type for template generation
#[derive(Debug)]
pub enum TemplateError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Network errors while retrieving vocabularies
    HttpError(reqwest::Error),

    /// Malformed delimited table
    TableError(csv::Error),

    /// Malformed JSON metadata
    JsonError(serde_json::Error),

    /// Malformed YAML metadata
    YamlError(serde_yaml::Error),

    /// Malformed XML metadata
    XmlError(quick_xml::Error),

    /// Deployment mode outside land/sea/air/trajectory
    InvalidDeploymentMode { mode: String },

    /// Requested vocabulary release does not exist
    VersionNotFound { tag: String },

    /// A required vocabulary table could not be found
    MissingTable { location: String },

    /// A vocabulary table lacks a column the parser relies on
    MissingColumn { table: String, column: String },

    /// Instrument is in neither instrument vocabulary
    UnknownInstrument { instrument: String },

    /// No platform is known for the instrument and none was supplied
    UnknownPlatform { instrument: String },

    /// None of the requested products apply to the instrument
    NoValidProducts { valid: Vec<String> },

    /// More than three file name options
    TooManyOptions { count: usize },

    /// A dimension length could not be parsed as an integer
    InvalidDimensionLength { dim: String, value: String },

    /// Dimension length overrides not given as `name length` pairs
    UnpairedDimensionLengths,

    /// A dimension length is unknown and prompting is disabled
    UnresolvedDimension { dim: String },

    /// File name does not follow the AMOF naming convention
    InvalidFileName { name: String },

    /// Variable missing from the netCDF file
    VariableNotFound { name: String },

    /// Flag meanings or values break the QC flag conventions
    InvalidQcFlags { variable: String, reason: String },

    /// QC data holds values its `flag_values` do not list
    InvalidQcData { variable: String, values: Vec<f64> },

    /// Times that cannot be turned into AMOF time coordinates
    InvalidTimes { reason: String },

    /// Generic error for anything else
    Generic(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            TemplateError::IoError(e) => write!(f, "I/O error: {}", e),
            TemplateError::HttpError(e) => write!(f, "HTTP error: {}", e),
            TemplateError::TableError(e) => write!(f, "Table error: {}", e),
            TemplateError::JsonError(e) => write!(f, "JSON error: {}", e),
            TemplateError::YamlError(e) => write!(f, "YAML error: {}", e),
            TemplateError::XmlError(e) => write!(f, "XML error: {}", e),
            TemplateError::InvalidDeploymentMode { mode } => write!(
                f,
                "Invalid deployment mode {}, must be one of 'land', 'sea', 'air', 'trajectory'.",
                mode
            ),
            TemplateError::VersionNotFound { tag } => write!(
                f,
                "Cannot find release version {} in https://github.com/ncasuk/AMF_CVs",
                tag
            ),
            TemplateError::MissingTable { location } => {
                write!(f, "Required vocabulary table not found: {}", location)
            }
            TemplateError::MissingColumn { table, column } => {
                write!(f, "Column '{}' missing from table {}", column, table)
            }
            TemplateError::UnknownInstrument { instrument } => {
                write!(f, "No details found for instrument {}", instrument)
            }
            TemplateError::UnknownPlatform { instrument } => write!(
                f,
                "No platform known for instrument {}, supply one with --platform",
                instrument
            ),
            TemplateError::NoValidProducts { valid } => write!(
                f,
                "No valid products specified, valid products are [{}]",
                valid.join(", ")
            ),
            TemplateError::TooManyOptions { count } => write!(
                f,
                "Too many options, maximum allowed 3, given {}",
                count
            ),
            TemplateError::InvalidDimensionLength { dim, value } => write!(
                f,
                "Invalid length '{}' for dimension '{}'",
                value, dim
            ),
            TemplateError::UnpairedDimensionLengths => write!(
                f,
                "Dimension lengths should be given as `dimension length` pairs"
            ),
            TemplateError::UnresolvedDimension { dim } => {
                write!(f, "No length available for dimension '{}'", dim)
            }
            TemplateError::InvalidFileName { name } => write!(
                f,
                "File name '{}' does not follow <instrument>_<platform>_<date>_<product>[_<options>]_v<version>.nc",
                name
            ),
            TemplateError::VariableNotFound { name } => {
                write!(f, "Variable '{}' not found in file", name)
            }
            TemplateError::InvalidQcFlags { variable, reason } => {
                write!(f, "Invalid QC flags for {}: {}", variable, reason)
            }
            TemplateError::InvalidQcData { variable, values } => write!(
                f,
                "Data for {} contains values not in flag_values: {:?}",
                variable, values
            ),
            TemplateError::InvalidTimes { reason } => write!(f, "Invalid times: {}", reason),
            TemplateError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::NetCDFError(e) => Some(e),
            TemplateError::IoError(e) => Some(e),
            TemplateError::HttpError(e) => Some(e),
            TemplateError::TableError(e) => Some(e),
            TemplateError::JsonError(e) => Some(e),
            TemplateError::YamlError(e) => Some(e),
            TemplateError::XmlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for TemplateError {
    fn from(error: netcdf::Error) -> Self {
        TemplateError::NetCDFError(error)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(error: std::io::Error) -> Self {
        TemplateError::IoError(error)
    }
}

impl From<reqwest::Error> for TemplateError {
    fn from(error: reqwest::Error) -> Self {
        TemplateError::HttpError(error)
    }
}

impl From<csv::Error> for TemplateError {
    fn from(error: csv::Error) -> Self {
        TemplateError::TableError(error)
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(error: serde_json::Error) -> Self {
        TemplateError::JsonError(error)
    }
}

impl From<serde_yaml::Error> for TemplateError {
    fn from(error: serde_yaml::Error) -> Self {
        TemplateError::YamlError(error)
    }
}

impl From<quick_xml::Error> for TemplateError {
    fn from(error: quick_xml::Error) -> Self {
        TemplateError::XmlError(error)
    }
}

impl From<String> for TemplateError {
    fn from(error: String) -> Self {
        TemplateError::Generic(error)
    }
}

impl From<&str> for TemplateError {
    fn from(error: &str) -> Self {
        TemplateError::Generic(error.to_string())
    }
}

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

//! AMOF file naming convention
//!
//! `<instrument>_<platform>_<date>_<product>[_<option1>[_<option2>[_<option3>]]]_v<version>.nc`

use crate::errors::{Result, TemplateError};

/// Maximum number of `_`-separated options in a file name
pub const MAX_OPTIONS: usize = 3;

/// Parts of an AMOF file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName {
    pub instrument: String,
    pub platform: String,
    pub date: String,
    pub product: String,
    /// Options joined by `_`, empty for none
    pub options: String,
    pub version: String,
}

impl FileName {
    /// Render the file name, rejecting more than three options
    pub fn render(&self) -> Result<String> {
        let options = if self.options.is_empty() {
            String::new()
        } else {
            let count = self.options.split('_').count();
            if count > MAX_OPTIONS {
                return Err(TemplateError::TooManyOptions { count });
            }
            format!("_{}", self.options)
        };
        Ok(format!(
            "{}_{}_{}_{}{}_v{}.nc",
            self.instrument, self.platform, self.date, self.product, options, self.version
        ))
    }
}

/// Data product encoded in an AMOF file name
pub fn product_from_filename(name: &str) -> Result<String> {
    let invalid = || TemplateError::InvalidFileName {
        name: name.to_string(),
    };
    if !name.ends_with(".nc") {
        return Err(invalid());
    }
    name.split('_')
        .nth(3)
        .filter(|p| !p.is_empty() && !p.ends_with(".nc"))
        .map(str::to_string)
        .ok_or_else(invalid)
}

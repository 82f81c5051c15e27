//! amof_template: template netCDF files for NCAS AMOF instruments
//!
//! Builds "just add data" netCDF files that follow the NCAS-GENERAL
//! standard. The structure of every file (global attributes, dimensions and
//! variables with their attributes) comes from the AMF controlled
//! vocabularies, published as tab-separated tables in the AMF_CVs and
//! ncas-data-instrument-vocabs repositories or mirrored locally.
//!
//! ## Module Organization
//!
//! - [`locator`] and [`source`]: where vocabulary tables live and how they are fetched
//! - [`tables`] and [`section`]: parsing tables into ordered sections
//! - [`file_info`]: merging common, deployment, product and instrument vocabularies
//! - [`dimensions`], [`layout`], [`naming`], [`writer`]: turning a merged
//!   vocabulary into a netCDF file
//! - [`generate`]: the whole pipeline for an instrument's products
//! - [`cleanup`]: removing empty product variables from a filled file
//! - [`metadata`]: applying site metadata files to a template
//! - [`data`] and [`times`]: adding data, QC flags and time coordinates
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use amof_template::prelude::*;
//!
//! # async fn run() -> amof_template::Result<()> {
//! let mut config = GeneratorConfig::new("ncas-ceilometer-3");
//! config.products = Some(vec!["aerosol-backscatter".to_string()]);
//!
//! let vocab = Vocabulary::open(&config.tag, None).await?;
//! let generated = make_products(&config, &vocab, &mut NoPrompt).await?;
//! for file in generated {
//!     println!("{}", file.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod cli;
pub mod data;
pub mod deployment;
pub mod dimensions;
pub mod errors;
pub mod file_info;
pub mod generate;
pub mod layout;
pub mod locator;
pub mod metadata;
pub mod naming;
pub mod section;
pub mod source;
pub mod tables;
pub mod times;
pub mod writer;

pub use errors::{Result, TemplateError};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::deployment::DeploymentMode;
    pub use crate::dimensions::{LengthPrompt, NoPrompt, StdinPrompt};
    pub use crate::data::{change_qc_flags, update_variable};
    pub use crate::errors::{Result, TemplateError};
    pub use crate::file_info::{FileInfo, InstrumentInfo};
    pub use crate::generate::{make_products, GeneratorConfig, Vocabulary};
    pub use crate::locator::VocabLocator;
    pub use crate::source::{HttpSource, LocalSource, VocabSource};
    pub use crate::times::{get_times, TimeCoordinates};
    pub use crate::writer::{TemplateWriter, WriteContext};
}

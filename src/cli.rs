//! Defines command-line interface options using `clap` for amof-template.

use crate::deployment::DeploymentMode;
use crate::dimensions::parse_length_pairs;
use crate::errors::Result;
use crate::generate::GeneratorConfig;
use chrono::NaiveDate;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Create template netCDF files for NCAS AMOF instruments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    name = "amof-template",
    about = "Create just-add-data AMOF netCDF files from the AMF vocabularies"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read vocabulary tables from this directory instead of GitHub
    #[arg(long, env = "AMOF_VOCAB_DIR", global = true)]
    pub vocab_dir: Option<PathBuf>,

    /// AMF_CVs release to use
    #[arg(short, long, env = "AMOF_VOCAB_TAG", default_value = "latest", global = true)]
    pub tag: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create template files for an instrument
    Create(CreateArgs),

    /// List the data products of an instrument, or every product
    ListProducts {
        /// Instrument name, all products when omitted
        instrument: Option<String>,
    },

    /// Remove empty product-specific variables from a file
    RemoveEmpty(RemoveEmptyArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CreateArgs {
    /// Instrument name, e.g. ncas-ceilometer-3
    pub instrument: String,

    /// File date, formatted as YYYYmmdd. Defaults to today
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<String>,

    /// Dimension lengths as name/length pairs, e.g. `-l time 86400 altitude 770`
    #[arg(short = 'l', long = "dim-lengths", num_args = 2.., value_names = ["NAME", "LENGTH"])]
    pub dim_lengths: Vec<String>,

    /// Deployment mode: land, sea, air or trajectory
    #[arg(short, long, default_value = "land", value_parser = parse_mode)]
    pub mode: DeploymentMode,

    /// Data products to create, all of the instrument's products by default
    #[arg(short, long, num_args = 1..)]
    pub products: Option<Vec<String>>,

    /// File name options, up to three joined by `_`
    #[arg(short, long, default_value = "")]
    pub options: String,

    /// Product version in the file name
    #[arg(long, default_value = "1.0")]
    pub product_version: String,

    /// Directory the files are written to
    #[arg(short = 'O', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// CSV, JSON, YAML or XML file of attribute values to add
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Platform name, overriding the instrument vocabulary
    #[arg(long)]
    pub platform: Option<String>,

    /// Fail instead of asking for unknown dimension lengths
    #[arg(long)]
    pub no_prompt: bool,
}

impl CreateArgs {
    /// Combine with the global vocabulary options into a generator config
    pub fn into_config(self, tag: String, vocab_dir: Option<PathBuf>) -> Result<GeneratorConfig> {
        let dimension_lengths = parse_length_pairs(&self.dim_lengths)?;
        Ok(GeneratorConfig {
            instrument: self.instrument,
            date: self.date,
            dimension_lengths,
            deployment_mode: self.mode,
            products: self.products,
            options: self.options,
            product_version: self.product_version,
            output_dir: self.output_dir,
            tag,
            vocab_dir,
            metadata_file: self.metadata,
            platform: self.platform,
        })
    }
}

#[derive(ClapArgs, Debug)]
pub struct RemoveEmptyArgs {
    /// File to clean, named following the AMOF convention
    pub infile: PathBuf,

    /// Where to write the cleaned file, tmp_<name> by default
    #[arg(long)]
    pub outfile: Option<PathBuf>,

    /// Replace the input file with the cleaned one
    #[arg(long)]
    pub overwrite: bool,
}

fn parse_mode(s: &str) -> std::result::Result<DeploymentMode, String> {
    s.parse::<DeploymentMode>().map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> std::result::Result<String, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map(|_| s.to_string())
        .map_err(|_| format!("Invalid date '{}': expected YYYYmmdd", s))
}

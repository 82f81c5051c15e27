//! Locations of the vocabulary tables
//!
//! The AMF_CVs repository lays out its tab-separated tables under
//! `product-definitions/tsv`, with `_common` holding tables shared by every
//! product and one directory per data product. Instrument tables live in the
//! separate ncas-data-instrument-vocabs repository. A local directory with the
//! same layout can stand in for both.

use crate::deployment::DeploymentMode;
use std::path::{Path, PathBuf};

/// GitHub repository holding the product definitions
pub const AMF_CVS_REPO: &str = "https://github.com/ncasuk/AMF_CVs";

/// GitHub repository holding the instrument vocabularies
pub const INSTRUMENT_VOCABS_REPO: &str = "https://github.com/ncasuk/ncas-data-instrument-vocabs";

const RAW_CONTENT_ROOT: &str = "https://raw.githubusercontent.com/ncasuk";
const TSV_SUBPATH: &str = "product-definitions/tsv";

/// Where vocabulary tables are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabRoot {
    /// Raw GitHub content at resolved release tags
    Remote {
        cvs_tag: String,
        instrument_tag: String,
    },
    /// Local mirror of `product-definitions/tsv`
    Local(PathBuf),
}

/// Builds table locations for one vocabulary root
#[derive(Debug, Clone)]
pub struct VocabLocator {
    root: VocabRoot,
}

impl VocabLocator {
    pub fn new(root: VocabRoot) -> Self {
        Self { root }
    }

    /// Locator for GitHub-hosted tables at already-resolved tags
    pub fn remote(cvs_tag: impl Into<String>, instrument_tag: impl Into<String>) -> Self {
        Self::new(VocabRoot::Remote {
            cvs_tag: cvs_tag.into(),
            instrument_tag: instrument_tag.into(),
        })
    }

    /// Locator for tables stored under a local directory
    pub fn local(dir: impl AsRef<Path>) -> Self {
        Self::new(VocabRoot::Local(dir.as_ref().to_path_buf()))
    }

    pub fn root(&self) -> &VocabRoot {
        &self.root
    }

    pub fn is_local(&self) -> bool {
        matches!(self.root, VocabRoot::Local(_))
    }

    fn product_definitions(&self, relative: &str) -> String {
        match &self.root {
            VocabRoot::Remote { cvs_tag, .. } => {
                format!("{RAW_CONTENT_ROOT}/AMF_CVs/{cvs_tag}/{TSV_SUBPATH}/{relative}")
            }
            VocabRoot::Local(dir) => dir.join(relative).to_string_lossy().into_owned(),
        }
    }

    fn instrument_vocabs(&self, relative: &str) -> String {
        match &self.root {
            VocabRoot::Remote { instrument_tag, .. } => format!(
                "{RAW_CONTENT_ROOT}/ncas-data-instrument-vocabs/{instrument_tag}/{TSV_SUBPATH}/{relative}"
            ),
            VocabRoot::Local(dir) => dir.join(relative).to_string_lossy().into_owned(),
        }
    }

    pub fn common_attributes(&self) -> String {
        self.product_definitions("_common/global-attributes.tsv")
    }

    pub fn deployment_dimensions(&self, mode: DeploymentMode) -> String {
        self.product_definitions(&format!("_common/dimensions-{mode}.tsv"))
    }

    pub fn deployment_variables(&self, mode: DeploymentMode) -> String {
        self.product_definitions(&format!("_common/variables-{mode}.tsv"))
    }

    pub fn product_attributes(&self, product: &str) -> String {
        self.product_definitions(&format!("{product}/global-attributes-specific.tsv"))
    }

    pub fn product_dimensions(&self, product: &str) -> String {
        self.product_definitions(&format!("{product}/dimensions-specific.tsv"))
    }

    pub fn product_variables(&self, product: &str) -> String {
        self.product_definitions(&format!("{product}/variables-specific.tsv"))
    }

    pub fn data_products(&self) -> String {
        self.product_definitions("_vocabularies/data-products.tsv")
    }

    pub fn ncas_instruments(&self) -> String {
        self.instrument_vocabs("_instrument_vocabs/ncas-instrument-name-and-descriptors.tsv")
    }

    pub fn community_instruments(&self) -> String {
        self.instrument_vocabs("_instrument_vocabs/community-instrument-name-and-descriptors.tsv")
    }

    /// Instrument table an instrument name is registered in
    pub fn instruments_for(&self, instrument: &str) -> String {
        if instrument.starts_with("ncas-") {
            self.ncas_instruments()
        } else {
            self.community_instruments()
        }
    }
}

/// Release page of a vocabulary version, used for `amf_vocabularies_release`
pub fn release_url(tag: &str) -> String {
    format!("{AMF_CVS_REPO}/releases/tag/{tag}")
}

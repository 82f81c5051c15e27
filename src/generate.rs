//! Creation of template files for an instrument's data products
//!
//! This is the top level of the library: pick the vocabulary, work out which
//! products to make, gather every product's tables, settle dimension lengths
//! once for all of them, then write one file per product.

use crate::deployment::DeploymentMode;
use crate::dimensions::{resolve_lengths, LengthPrompt};
use crate::errors::{Result, TemplateError};
use crate::file_info::{list_all_products, list_products, FileInfo};
use crate::locator::{VocabLocator, VocabRoot};
use crate::metadata::add_metadata_to_file;
use crate::naming::FileName;
use crate::source::{HttpSource, LocalSource, VocabSource};
use crate::writer::{TemplateWriter, WriteContext, WriteSummary};
use chrono::Utc;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything needed to generate templates for one instrument
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub instrument: String,
    /// File date as `YYYYmmdd`, today (UTC) when not given
    pub date: Option<String>,
    pub dimension_lengths: BTreeMap<String, usize>,
    pub deployment_mode: DeploymentMode,
    /// Products to create, all of the instrument's products when not given
    pub products: Option<Vec<String>>,
    /// Up to three `_`-separated file name options
    pub options: String,
    pub product_version: String,
    pub output_dir: PathBuf,
    /// Vocabulary release, or `latest`
    pub tag: String,
    /// Local copy of the vocabulary tables, used instead of GitHub
    pub vocab_dir: Option<PathBuf>,
    pub metadata_file: Option<PathBuf>,
    /// Platform to use instead of the one in the instrument vocabulary
    pub platform: Option<String>,
}

impl GeneratorConfig {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            date: None,
            dimension_lengths: BTreeMap::new(),
            deployment_mode: DeploymentMode::default(),
            products: None,
            options: String::new(),
            product_version: "1.0".to_string(),
            output_dir: PathBuf::from("."),
            tag: "latest".to_string(),
            vocab_dir: None,
            metadata_file: None,
            platform: None,
        }
    }

    /// Date used in file names
    pub fn file_date(&self) -> String {
        self.date
            .clone()
            .unwrap_or_else(|| Utc::now().format("%Y%m%d").to_string())
    }
}

/// A vocabulary source with the locator and tag it serves
pub struct Vocabulary {
    pub source: Box<dyn VocabSource>,
    pub locator: VocabLocator,
    pub tag: String,
}

impl Vocabulary {
    /// Tables under a local directory, labelled with the given tag
    pub fn local(dir: impl AsRef<Path>, tag: impl Into<String>) -> Self {
        Self {
            source: Box::new(LocalSource),
            locator: VocabLocator::local(dir),
            tag: tag.into(),
        }
    }

    /// Tables from GitHub, resolving `latest` and checking the tag exists
    pub async fn remote(tag: &str) -> Result<Self> {
        let source = HttpSource::new()?;
        let locator = source.resolve_locator(tag).await?;
        let tag = match locator.root() {
            VocabRoot::Remote { cvs_tag, .. } => cvs_tag.clone(),
            VocabRoot::Local(_) => tag.to_string(),
        };
        Ok(Self {
            source: Box::new(source),
            locator,
            tag,
        })
    }

    /// Local tables when a directory is given, GitHub otherwise
    pub async fn open(tag: &str, vocab_dir: Option<&Path>) -> Result<Self> {
        match vocab_dir {
            Some(dir) => Ok(Self::local(dir, tag)),
            None => Self::remote(tag).await,
        }
    }

    pub fn source(&self) -> &dyn VocabSource {
        self.source.as_ref()
    }
}

/// One file written by [`make_products`]
#[derive(Debug, Clone)]
pub struct Generated {
    pub product: String,
    pub path: PathBuf,
    pub summary: WriteSummary,
}

/// Products to create, dropping any the instrument does not have
///
/// An instrument missing from the vocabularies can still be given explicit
/// products, which are then checked against the full product list.
pub async fn select_products(config: &GeneratorConfig, vocab: &Vocabulary) -> Result<Vec<String>> {
    let source = vocab.source();
    let (valid, requested) = match list_products(source, &vocab.locator, &config.instrument).await {
        Ok(products) => {
            let requested = config.products.clone().unwrap_or_else(|| products.clone());
            (products, requested)
        }
        Err(TemplateError::UnknownInstrument { .. }) if config.products.is_some() => {
            warn!(
                "Instrument {} not in vocabulary, checking products against all data products",
                config.instrument
            );
            let all = list_all_products(source, &vocab.locator).await?;
            (all, config.products.clone().unwrap_or_default())
        }
        Err(e) => return Err(e),
    };

    let mut selected: Vec<String> = Vec::with_capacity(requested.len());
    for product in requested {
        if selected.contains(&product) {
            warn!("{} requested more than once, creating it once", product);
            continue;
        }
        selected.push(product);
    }

    let selected: Vec<String> = selected
        .into_iter()
        .filter(|product| {
            let ok = valid.contains(product);
            if !ok {
                warn!(
                    "{} is not a valid data product for {}, file will not be created",
                    product, config.instrument
                );
            }
            ok
        })
        .collect();

    if selected.is_empty() {
        return Err(TemplateError::NoValidProducts { valid });
    }
    Ok(selected)
}

/// Gather the merged vocabulary for each product
pub async fn gather_products(
    config: &GeneratorConfig,
    vocab: &Vocabulary,
    products: &[String],
) -> Result<Vec<FileInfo>> {
    let gathers = products.iter().map(|product| async move {
        let mut info = FileInfo::new(
            config.instrument.as_str(),
            product.as_str(),
            config.deployment_mode,
            vocab.tag.as_str(),
        );
        info.gather(vocab.source(), &vocab.locator).await?;
        info!("{}", info);
        Ok::<_, TemplateError>(info)
    });
    futures::future::try_join_all(gathers).await
}

/// Create template files for the configured instrument and products
pub async fn make_products(
    config: &GeneratorConfig,
    vocab: &Vocabulary,
    prompt: &mut dyn LengthPrompt,
) -> Result<Vec<Generated>> {
    let products = select_products(config, vocab).await?;
    let infos = gather_products(config, vocab, &products).await?;

    let platform = match &config.platform {
        Some(platform) => platform.clone(),
        None => infos
            .iter()
            .find_map(|info| info.instrument.platform())
            .ok_or_else(|| TemplateError::UnknownPlatform {
                instrument: config.instrument.clone(),
            })?,
    };

    let date = config.file_date();
    let paths = infos
        .iter()
        .map(|info| {
            let name = FileName {
                instrument: config.instrument.clone(),
                platform: platform.clone(),
                date: date.clone(),
                product: info.data_product.clone(),
                options: config.options.clone(),
                version: config.product_version.clone(),
            };
            Ok(config.output_dir.join(name.render()?))
        })
        .collect::<Result<Vec<PathBuf>>>()?;

    let lengths = resolve_lengths(&infos, &config.dimension_lengths, prompt)?;
    let ctx = WriteContext::now(platform);

    let generated = infos
        .par_iter()
        .zip(paths.par_iter())
        .map(|(info, path)| {
            let summary = TemplateWriter::new(info, path).write(&lengths, &ctx)?;
            Ok(Generated {
                product: info.data_product.clone(),
                path: path.clone(),
                summary,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(metadata) = &config.metadata_file {
        for file in &generated {
            add_metadata_to_file(&file.path, metadata)?;
        }
    }

    Ok(generated)
}

//! Aggregation of vocabulary tables into the description of one output file
//!
//! A [`FileInfo`] collects everything needed to create a single netCDF file:
//! the instrument, data product and deployment mode, plus the merged
//! attribute, dimension and variable sections. Sections are built from, in
//! order, the common attributes, the deployment-mode tables, the
//! product-specific tables and the instrument vocabulary, with later sources
//! replacing earlier definitions of the same name.

use crate::deployment::DeploymentMode;
use crate::errors::{Result, TemplateError};
use crate::locator::VocabLocator;
use crate::section::Section;
use crate::source::VocabSource;
use crate::tables::{
    parse_attributes, parse_data_products, parse_dimensions, parse_instruments, parse_variables,
    InstrumentRecord, VariableDef, VocabEntry,
};
use std::fmt;
use tracing::{debug, warn};

/// Identity of the instrument the file is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentInfo {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub data_products: Vec<String>,
    /// `Mobile/Fixed (loc)` column, e.g. `fixed - cao`
    pub location: String,
    pub descriptor: String,
    /// Whether the instrument was found in a vocabulary
    pub registered: bool,
}

impl InstrumentInfo {
    /// Placeholders for an instrument without a vocabulary entry
    pub fn placeholder() -> Self {
        Self {
            manufacturer: "CHANGE: Manufacturer of instrument and key sub components. \
                           String: min 2 characters."
                .to_string(),
            model: "CHANGE: Model number of instrument and key sub components. \
                    String: min 3 characters"
                .to_string(),
            serial_number: "CHANGE: Serial number of instrument and key sub components. \
                            String: min 3 characters."
                .to_string(),
            data_products: Vec::new(),
            location: String::new(),
            descriptor: "CHANGE: Descripton of instrument.".to_string(),
            registered: false,
        }
    }

    /// Platform name for file names and the `platform` attribute
    ///
    /// Taken from the last `-` separated part of the location, so
    /// `fixed - cao` gives `cao`.
    pub fn platform(&self) -> Option<String> {
        let platform = self
            .location
            .rsplit('-')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        (!platform.is_empty()).then_some(platform)
    }
}

impl Default for InstrumentInfo {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl From<&InstrumentRecord> for InstrumentInfo {
    fn from(record: &InstrumentRecord) -> Self {
        Self {
            manufacturer: record.manufacturer.clone(),
            model: record.model.clone(),
            serial_number: record.serial_number.clone(),
            data_products: record.data_products.clone(),
            location: record.location.clone(),
            descriptor: record.descriptor.clone(),
            registered: true,
        }
    }
}

/// Product-specific tables, each absent when the product does not define it
#[derive(Debug, Default)]
struct ProductTables {
    attributes: Option<Section<VocabEntry>>,
    dimensions: Option<Section<VocabEntry>>,
    variables: Option<Section<VariableDef>>,
}

/// Everything needed to create one netCDF file
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub instrument_name: String,
    pub data_product: String,
    pub deployment_mode: DeploymentMode,
    /// Vocabulary release the tables came from
    pub tag: String,
    pub instrument: InstrumentInfo,
    pub attributes: Section<VocabEntry>,
    pub dimensions: Section<VocabEntry>,
    pub variables: Section<VariableDef>,
    /// Variables defined by the product tables rather than the common ones
    pub product_variables: Vec<String>,
}

impl FileInfo {
    pub fn new(
        instrument_name: impl Into<String>,
        data_product: impl Into<String>,
        deployment_mode: DeploymentMode,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            instrument_name: instrument_name.into(),
            data_product: data_product.into(),
            deployment_mode,
            tag: tag.into(),
            instrument: InstrumentInfo::placeholder(),
            attributes: Section::new(),
            dimensions: Section::new(),
            variables: Section::new(),
            product_variables: Vec::new(),
        }
    }

    /// Fetch and merge every table for this file
    ///
    /// Tables are fetched concurrently and merged in precedence order once
    /// all of them have arrived.
    pub async fn gather(&mut self, source: &dyn VocabSource, locator: &VocabLocator) -> Result<()> {
        let (common, deployment, product, instrument) = futures::try_join!(
            fetch_common(source, locator),
            fetch_deployment(source, locator, self.deployment_mode),
            fetch_product(source, locator, &self.data_product),
            fetch_instrument(source, locator, &self.instrument_name),
        )?;

        self.attributes.extend(common);
        self.apply_deployment(deployment);
        self.apply_product(product);
        self.apply_instrument(instrument);
        Ok(())
    }

    /// Add the global attributes shared by all products
    pub async fn get_common_info(
        &mut self,
        source: &dyn VocabSource,
        locator: &VocabLocator,
    ) -> Result<()> {
        let attributes = fetch_common(source, locator).await?;
        self.attributes.extend(attributes);
        Ok(())
    }

    /// Add the dimensions and variables of the deployment mode
    pub async fn get_deployment_info(
        &mut self,
        source: &dyn VocabSource,
        locator: &VocabLocator,
    ) -> Result<()> {
        let tables = fetch_deployment(source, locator, self.deployment_mode).await?;
        self.apply_deployment(tables);
        Ok(())
    }

    /// Add whatever attributes, dimensions and variables the product defines
    pub async fn get_product_info(
        &mut self,
        source: &dyn VocabSource,
        locator: &VocabLocator,
    ) -> Result<()> {
        let tables = fetch_product(source, locator, &self.data_product).await?;
        self.apply_product(tables);
        Ok(())
    }

    /// Look the instrument up in its vocabulary
    pub async fn get_instrument_info(
        &mut self,
        source: &dyn VocabSource,
        locator: &VocabLocator,
    ) -> Result<()> {
        let record = fetch_instrument(source, locator, &self.instrument_name).await?;
        self.apply_instrument(record);
        Ok(())
    }

    /// Whether the instrument lists the given data product
    pub fn has_product(&self, product: &str) -> bool {
        self.instrument.data_products.iter().any(|p| p == product)
    }

    fn apply_deployment(&mut self, (dimensions, variables): (Section<VocabEntry>, Section<VariableDef>)) {
        self.dimensions.extend(dimensions);
        self.variables.extend(variables);
    }

    fn apply_product(&mut self, tables: ProductTables) {
        if let Some(attributes) = tables.attributes {
            self.attributes.extend(attributes);
        }
        if let Some(dimensions) = tables.dimensions {
            self.dimensions.extend(dimensions);
        }
        if let Some(variables) = tables.variables {
            self.product_variables = variables.names().map(str::to_string).collect();
            self.variables.extend(variables);
        }
    }

    fn apply_instrument(&mut self, record: Option<InstrumentRecord>) {
        match record {
            Some(record) => self.instrument = InstrumentInfo::from(&record),
            None => {
                warn!(
                    "No details found for instrument {}, using placeholder values",
                    self.instrument_name
                );
                self.instrument = InstrumentInfo::placeholder();
            }
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Information for {} instrument and {} product ({} deployment, vocabulary {})",
            self.instrument_name, self.data_product, self.deployment_mode, self.tag
        )
    }
}

async fn fetch_common(
    source: &dyn VocabSource,
    locator: &VocabLocator,
) -> Result<Section<VocabEntry>> {
    let location = locator.common_attributes();
    let text = source.fetch_required(&location).await?;
    parse_attributes(&text, &location)
}

async fn fetch_deployment(
    source: &dyn VocabSource,
    locator: &VocabLocator,
    mode: DeploymentMode,
) -> Result<(Section<VocabEntry>, Section<VariableDef>)> {
    let dims_location = locator.deployment_dimensions(mode);
    let vars_location = locator.deployment_variables(mode);
    let (dims_text, vars_text) = futures::try_join!(
        source.fetch_required(&dims_location),
        source.fetch_required(&vars_location),
    )?;
    Ok((
        parse_dimensions(&dims_text, &dims_location)?,
        parse_variables(&vars_text, &vars_location)?,
    ))
}

async fn fetch_product(
    source: &dyn VocabSource,
    locator: &VocabLocator,
    product: &str,
) -> Result<ProductTables> {
    let attrs_location = locator.product_attributes(product);
    let dims_location = locator.product_dimensions(product);
    let vars_location = locator.product_variables(product);
    let (attrs, dims, vars) = futures::try_join!(
        source.fetch(&attrs_location),
        source.fetch(&dims_location),
        source.fetch(&vars_location),
    )?;

    let mut tables = ProductTables::default();
    if let Some(text) = attrs {
        tables.attributes = Some(parse_attributes(&text, &attrs_location)?);
    }
    if let Some(text) = dims {
        tables.dimensions = Some(parse_dimensions(&text, &dims_location)?);
    }
    if let Some(text) = vars {
        tables.variables = Some(parse_variables(&text, &vars_location)?);
    }
    if tables.variables.is_none() {
        debug!("No product-specific variables for {}", product);
    }
    Ok(tables)
}

async fn fetch_instrument(
    source: &dyn VocabSource,
    locator: &VocabLocator,
    instrument: &str,
) -> Result<Option<InstrumentRecord>> {
    let location = locator.instruments_for(instrument);
    let Some(text) = source.fetch(&location).await? else {
        return Ok(None);
    };
    let instruments = parse_instruments(&text, &location)?;
    Ok(instruments.get(instrument).cloned())
}

/// Data products registered for an instrument
pub async fn list_products(
    source: &dyn VocabSource,
    locator: &VocabLocator,
    instrument: &str,
) -> Result<Vec<String>> {
    fetch_instrument(source, locator, instrument)
        .await?
        .map(|record| record.data_products)
        .ok_or_else(|| TemplateError::UnknownInstrument {
            instrument: instrument.to_string(),
        })
}

/// Every data product defined by the vocabulary
pub async fn list_all_products(
    source: &dyn VocabSource,
    locator: &VocabLocator,
) -> Result<Vec<String>> {
    let location = locator.data_products();
    let text = source.fetch_required(&location).await?;
    parse_data_products(&text, &location)
}

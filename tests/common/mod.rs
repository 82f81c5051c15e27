//! Small vocabulary tree shared by the integration tests
//!
//! Mirrors the `product-definitions/tsv` layout with one instrument, three
//! data products and the land deployment tables.

#![allow(dead_code)]

use amof_template::generate::{GeneratorConfig, Vocabulary};
use netcdf::AttributeValue;
use std::fs;
use std::path::Path;

pub const TAG: &str = "v2.0.0";
pub const INSTRUMENT: &str = "ncas-test-1";

const GLOBAL_ATTRIBUTES: &str = "\
Name\tDescription\tExample\tFixed Value\tCompliance checking rules\tConvention Providence
Conventions\tConventions used\t\tCF-1.6, NCAS-AMF-2.0.0\tExact match\tCF
source\tInstrument used\t\t\tString\tNCAS
title\tTitle of the file\t\t\tString: min 10 characters\tNCAS
institution\tInstitution\t\t\tExact match\tNCAS
platform\tPlatform name\t\t\tString\tNCAS
instrument_manufacturer\tManufacturer\t\t\tString\tNCAS
instrument_serial_number\tSerial number\t\t\tString\tNCAS
amf_vocabularies_release\tVocabulary release\t\t\tString\tNCAS
history\tFile history\t\t\tString\tNCAS
deployment_mode\tDeployment mode\t\t\tOne of: land, sea, air, trajectory\tNCAS
project\tProject the data was collected for\t\t\tString: min 2 characters\tNCAS
";

const LAND_DIMENSIONS: &str = "\
Name\tLength\tunits
time\t<i>\t
latitude\t1\tdegree_north
longitude\t1\tdegree_east
";

const LAND_VARIABLES: &str = "\
Variable\tAttribute\tValue\texample value
time\t\t\t
\ttype\tfloat64\t
\tdimension\ttime\t
\tunits\tseconds since 1970-01-01 00:00:00\t
\tstandard_name\ttime\t
\tlong_name\tTime (seconds since 1970-01-01 00:00:00)\t
latitude\t\t\t
\ttype\tfloat32\t
\tdimension\tlatitude\t
\tunits\tdegree_north\t
\tstandard_name\tlatitude\t
\tvalid_min\t<derived from file>\t
\tvalid_max\t<derived from file>\t
longitude\t\t\t
\ttype\tfloat32\t
\tdimension\tlongitude\t
\tunits\tdegree_east\t
\tstandard_name\tlongitude\t
";

const PRODUCT_ATTRIBUTES: &str = "\
Name\tDescription\tFixed Value\tCompliance checking rules
title\tTitle of the file\tMy product title\tExact match
product_note\tA note about the product\t\tString: min 5 characters
";

const PRODUCT_VARIABLES: &str = "\
Variable\tAttribute\tValue\texample value
air_temperature\t\t\t
\ttype\tfloat32\t
\tdimension\ttime\t
\t_FillValue\t-1.00E+20\t
\tunits\tK\t
\tstandard_name\tair_temperature\t
\tlong_name\tAir Temperature\t
\tvalid_min\t<derived from file>\t
\tcell_methods\t\ttime: mean
qc_flag_temperature\t\t\t
\ttype\tbyte\t
\tdimension\ttime\t
\tunits\t1\t
\tstandard_name\t\tflag
\tlong_name\tData Quality flag: Temperature\t
\tflag_values\t0b,1b,2b\t
\tflag_meanings\tnot_used|good_data|bad_data\t
wind_speed\t\t\t
\ttype\tfloat32\t
\tdimension\ttime\t
\t_FillValue\t-1.00E+20\t
\tcompression\tzlib\t
\tcomplevel\t6\t
\tchunksizes\t5\t
\tunits\tm s-1\t
\tcomment\t\t
profile\t\t\t
\ttype\tfloat32\t
\tdimension\ttime, height\t
\tunits\tm\t
";

const DATA_PRODUCTS: &str = "\
Data Product\tDescription
my-product\tProduct with its own tables
other-product\tProduct using common tables only
third-product\tProduct no instrument lists
";

const NCAS_INSTRUMENTS: &str = "\
New Instrument Name\tOld Instrument Name\tDescriptor\tData Product(s)\tMobile/Fixed (loc)\tManufacturer\tModel No.\tSerial Number
ncas-test-1\tncas-old-test\tNCAS Test Instrument\tmy-product, other-product\tfixed - CAO\tAcme\tT-1000\t42
";

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create vocabulary directory");
    }
    fs::write(path, text).expect("Failed to write vocabulary table");
}

/// Write the vocabulary tree under `root`
pub fn write_vocabulary(root: &Path) {
    write(root, "_common/global-attributes.tsv", GLOBAL_ATTRIBUTES);
    write(root, "_common/dimensions-land.tsv", LAND_DIMENSIONS);
    write(root, "_common/variables-land.tsv", LAND_VARIABLES);
    write(root, "my-product/global-attributes-specific.tsv", PRODUCT_ATTRIBUTES);
    write(root, "my-product/variables-specific.tsv", PRODUCT_VARIABLES);
    write(root, "_vocabularies/data-products.tsv", DATA_PRODUCTS);
    write(
        root,
        "_instrument_vocabs/ncas-instrument-name-and-descriptors.tsv",
        NCAS_INSTRUMENTS,
    );
}

pub fn vocabulary(root: &Path) -> Vocabulary {
    Vocabulary::local(root, TAG)
}

/// Config creating files in `output` with `time` set to 10
pub fn config(root: &Path, output: &Path) -> GeneratorConfig {
    let mut config = GeneratorConfig::new(INSTRUMENT);
    config.date = Some("20240101".to_string());
    config.output_dir = output.to_path_buf();
    config.tag = TAG.to_string();
    config.vocab_dir = Some(root.to_path_buf());
    config.dimension_lengths.insert("time".to_string(), 10);
    config
}

/// Text value of a global attribute
pub fn text_attribute(file: &netcdf::File, name: &str) -> String {
    let attr = file
        .attribute(name)
        .unwrap_or_else(|| panic!("Attribute {} not found", name));
    match attr.value().expect("Failed to read attribute") {
        AttributeValue::Str(s) => s,
        other => panic!("Attribute {} is not text: {:?}", name, other),
    }
}

/// Text value of a variable attribute
pub fn variable_text_attribute(file: &netcdf::File, var: &str, name: &str) -> String {
    let var = file
        .variable(var)
        .unwrap_or_else(|| panic!("Variable {} not found", var));
    let attr = var
        .attribute(name)
        .unwrap_or_else(|| panic!("Attribute {} not found", name));
    match attr.value().expect("Failed to read attribute") {
        AttributeValue::Str(s) => s,
        other => panic!("Attribute {} is not text: {:?}", name, other),
    }
}

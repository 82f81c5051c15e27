//! Unit tests for the amof_template modules
//!
//! Covers table parsing, vocabulary locations, naming, variable layout,
//! dimension resolution and attribute resolution without touching the
//! network.

use amof_template::{
    cli::{Args, Command},
    data::{attribute_numbers, data_range, unexpected_flags},
    deployment::DeploymentMode,
    dimensions::{parse_length_pairs, resolve_lengths, LengthPrompt, NoPrompt},
    errors::{Result, TemplateError},
    file_info::{FileInfo, InstrumentInfo},
    layout::{parse_byte_flags, split_dimensions, AttrValue, Compression, LayoutIssue, NcType, VariableLayout},
    locator::{release_url, VocabLocator},
    metadata::{
        read_csv_metadata, read_xml_metadata, read_yaml_metadata, MetadataEntry, MetadataValue,
        ValueKind,
    },
    naming::{product_from_filename, FileName},
    section::Section,
    source::tag_from_release_url,
    tables::{parse_attributes, parse_instruments, parse_variables, split_products, VariableDef, VocabEntry},
    times::{file_date, get_times, zero_pad_number},
    writer::{global_attributes, resolve_global_attribute, TemplateWriter, WriteContext},
};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use netcdf::open;
use std::collections::BTreeMap;
use tempfile::tempdir;

#[test]
fn test_error_types() {
    let netcdf_err = TemplateError::NetCDFError(netcdf::Error::NotFound("test".to_string()));
    assert!(format!("{}", netcdf_err).contains("NetCDF error"));

    let generic_err = TemplateError::Generic("Test error".to_string());
    assert_eq!(format!("{}", generic_err), "Test error");

    let options_err = TemplateError::TooManyOptions { count: 4 };
    assert_eq!(
        format!("{}", options_err),
        "Too many options, maximum allowed 3, given 4"
    );

    let products_err = TemplateError::NoValidProducts {
        valid: vec!["a".to_string(), "b".to_string()],
    };
    assert!(format!("{}", products_err).contains("[a, b]"));
}

#[test]
fn test_deployment_mode() {
    for mode in DeploymentMode::ALL {
        assert_eq!(mode.to_string().parse::<DeploymentMode>().ok(), Some(mode));
    }
    assert_eq!(DeploymentMode::default(), DeploymentMode::Land);

    let err = "seaside".parse::<DeploymentMode>().unwrap_err();
    assert!(matches!(err, TemplateError::InvalidDeploymentMode { ref mode } if mode == "seaside"));
    assert!(err.to_string().contains("'land', 'sea', 'air', 'trajectory'"));

    assert!("Land".parse::<DeploymentMode>().is_err());
}

#[test]
fn test_parse_variables_groups_rows() -> Result<()> {
    let text = "Variable\tAttribute\tValue\texample value\n\
                wind_speed\t\t\t\n\
                \ttype\tfloat32\t\n\
                \tdimension\ttime\t\n\
                \tcell_methods\t\ttime: mean\n\
                \tcomment\t\t\n\
                wind_from_direction\t\t\t\n\
                \ttype\tfloat32\t\n";
    let variables = parse_variables(text, "variables-specific.tsv")?;

    assert_eq!(
        variables.names().collect::<Vec<_>>(),
        ["wind_speed", "wind_from_direction"]
    );
    let wind_speed = variables.get("wind_speed").expect("wind_speed missing");
    assert_eq!(wind_speed.get("type").map(String::as_str), Some("float32"));
    assert_eq!(
        wind_speed.get("cell_methods").map(String::as_str),
        Some("EXAMPLE: time: mean")
    );
    assert_eq!(wind_speed.get("comment").map(String::as_str), Some(""));
    assert_eq!(
        wind_speed.names().collect::<Vec<_>>(),
        ["type", "dimension", "cell_methods", "comment"]
    );
    Ok(())
}

#[test]
fn test_parse_variables_ignores_rows_before_first_variable() -> Result<()> {
    let text = "Variable\tAttribute\tValue\texample value\n\
                \tstray\tleftover\t\n\
                air_temperature\t\t\t\n\
                \ttype\tfloat32\t\n\
                \tunits\tK\t\n";
    let variables = parse_variables(text, "variables-specific.tsv")?;

    assert_eq!(variables.names().collect::<Vec<_>>(), ["air_temperature"]);
    let air_temperature = variables.get("air_temperature").expect("air_temperature missing");
    assert!(!air_temperature.contains("stray"));
    assert_eq!(air_temperature.names().collect::<Vec<_>>(), ["type", "units"]);
    Ok(())
}

#[test]
fn test_parse_variables_empty_table() -> Result<()> {
    let variables = parse_variables("Variable\tAttribute\tValue\n", "empty.tsv")?;
    assert_eq!(variables.len(), 1);
    assert_eq!(variables.get("").map(|v| v.len()), Some(0));
    Ok(())
}

#[test]
fn test_parse_variables_missing_column() {
    let result = parse_variables("Variable\tAttribute\n", "broken.tsv");
    match result {
        Err(TemplateError::MissingColumn { table, column }) => {
            assert_eq!(table, "broken.tsv");
            assert_eq!(column, "Value");
        }
        other => panic!("Expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_parse_attributes() -> Result<()> {
    let text = "Name\tDescription\tFixed Value\tCompliance checking rules\n\
                Conventions\tConventions used\tCF-1.6\tExact match\n\
                \t\t\t\n\
                title\tTitle\t\tString\n";
    let attributes = parse_attributes(text, "global-attributes.tsv")?;

    assert_eq!(attributes.names().collect::<Vec<_>>(), ["Conventions", "title"]);
    let title = attributes.get("title").expect("title missing");
    assert_eq!(title.fixed_value(), "");
    assert_eq!(title.description(), "Title");
    assert_eq!(title.compliance(), "String");
    assert_eq!(title.field("not a column"), "");
    Ok(())
}

#[test]
fn test_parse_instruments() -> Result<()> {
    let text = "New Instrument Name\tDescriptor\tData Product(s)\tMobile/Fixed (loc)\tManufacturer\tModel No.\tSerial Number\n\
                ncas-ceilometer-3\tNCAS Lidar Ceilometer 3\taerosol-backscatter, cloud-base|cloud-coverage\tfixed - Chilbolton\tVaisala\tCL51\tN1234\n";
    let instruments = parse_instruments(text, "ncas-instruments.tsv")?;
    let record = instruments.get("ncas-ceilometer-3").expect("instrument missing");

    assert_eq!(
        record.data_products,
        ["aerosol-backscatter", "cloud-base", "cloud-coverage"]
    );
    assert_eq!(record.model, "CL51");

    let info = InstrumentInfo::from(record);
    assert!(info.registered);
    assert_eq!(info.platform(), Some("chilbolton".to_string()));
    Ok(())
}

#[test]
fn test_split_products() {
    assert_eq!(split_products("a,b c|d"), ["a", "b", "c", "d"]);
    assert_eq!(split_products(" a ,, b "), ["a", "b"]);
    assert!(split_products("").is_empty());
}

#[test]
fn test_instrument_placeholder() {
    let info = InstrumentInfo::placeholder();
    assert!(!info.registered);
    assert!(info.manufacturer.starts_with("CHANGE:"));
    assert!(info.data_products.is_empty());
    assert_eq!(info.platform(), None);
}

#[test]
fn test_remote_locator() {
    let locator = VocabLocator::remote("v2.0.0", "v1.3.0");
    assert!(!locator.is_local());
    assert_eq!(
        locator.common_attributes(),
        "https://raw.githubusercontent.com/ncasuk/AMF_CVs/v2.0.0/product-definitions/tsv/_common/global-attributes.tsv"
    );
    assert_eq!(
        locator.deployment_variables(DeploymentMode::Trajectory),
        "https://raw.githubusercontent.com/ncasuk/AMF_CVs/v2.0.0/product-definitions/tsv/_common/variables-trajectory.tsv"
    );
    assert_eq!(
        locator.product_dimensions("surface-met"),
        "https://raw.githubusercontent.com/ncasuk/AMF_CVs/v2.0.0/product-definitions/tsv/surface-met/dimensions-specific.tsv"
    );
    assert_eq!(
        locator.instruments_for("ncas-ceilometer-3"),
        "https://raw.githubusercontent.com/ncasuk/ncas-data-instrument-vocabs/v1.3.0/product-definitions/tsv/_instrument_vocabs/ncas-instrument-name-and-descriptors.tsv"
    );
    assert!(locator
        .instruments_for("uol-lidar-1")
        .ends_with("community-instrument-name-and-descriptors.tsv"));
}

#[test]
fn test_local_locator() {
    let dir = tempdir().expect("Failed to create temp dir");
    let locator = VocabLocator::local(dir.path());
    assert!(locator.is_local());

    let expected = dir.path().join("surface-met/variables-specific.tsv");
    assert_eq!(
        locator.product_variables("surface-met"),
        expected.to_string_lossy()
    );
    let expected = dir.path().join("_common/dimensions-sea.tsv");
    assert_eq!(
        locator.deployment_dimensions(DeploymentMode::Sea),
        expected.to_string_lossy()
    );
}

#[test]
fn test_release_urls() {
    assert_eq!(
        release_url("v2.0.0"),
        "https://github.com/ncasuk/AMF_CVs/releases/tag/v2.0.0"
    );
    assert_eq!(
        tag_from_release_url("https://github.com/ncasuk/AMF_CVs/releases/tag/v2.0.0"),
        "v2.0.0"
    );
    assert_eq!(
        tag_from_release_url("https://github.com/ncasuk/AMF_CVs/releases/tag/"),
        ""
    );
}

#[test]
fn test_section_override_keeps_position() {
    let mut common: Section<String> = Section::new();
    common.insert("Conventions", "CF-1.6".to_string());
    common.insert("title", "common".to_string());
    common.insert("source", "common".to_string());

    let specific: Section<String> = vec![
        ("title".to_string(), "specific".to_string()),
        ("product_note".to_string(), "note".to_string()),
    ]
    .into_iter()
    .collect();

    common.extend(specific);
    assert_eq!(
        common.names().collect::<Vec<_>>(),
        ["Conventions", "title", "source", "product_note"]
    );
    assert_eq!(common.get("title").map(String::as_str), Some("specific"));

    let previous = common.insert("source", "replaced".to_string());
    assert_eq!(previous.as_deref(), Some("common"));
    assert_eq!(common.len(), 4);
}

#[test]
fn test_file_naming() -> Result<()> {
    let mut name = FileName {
        instrument: "ncas-ceilometer-3".to_string(),
        platform: "cao".to_string(),
        date: "20240101".to_string(),
        product: "aerosol-backscatter".to_string(),
        options: String::new(),
        version: "1.0".to_string(),
    };
    assert_eq!(
        name.render()?,
        "ncas-ceilometer-3_cao_20240101_aerosol-backscatter_v1.0.nc"
    );

    name.options = "tower_5m_high".to_string();
    assert_eq!(
        name.render()?,
        "ncas-ceilometer-3_cao_20240101_aerosol-backscatter_tower_5m_high_v1.0.nc"
    );

    name.options = "a_b_c_d".to_string();
    assert!(matches!(
        name.render(),
        Err(TemplateError::TooManyOptions { count: 4 })
    ));
    Ok(())
}

#[test]
fn test_product_from_filename() -> Result<()> {
    assert_eq!(
        product_from_filename("ncas-ceilometer-3_cao_20240101_aerosol-backscatter_v1.0.nc")?,
        "aerosol-backscatter"
    );
    assert_eq!(
        product_from_filename("inst_plat_20240101_surface-met_opt1_v2.0.nc")?,
        "surface-met"
    );
    assert!(product_from_filename("inst_plat_20240101_surface-met_v1.0.txt").is_err());
    assert!(product_from_filename("inst_plat_v1.0.nc").is_err());
    Ok(())
}

fn definition(pairs: &[(&str, &str)]) -> VariableDef {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_layout_qc_flag_variable() {
    let def = definition(&[
        ("type", "byte"),
        ("dimension", "time"),
        ("units", "1"),
        ("standard_name", "EXAMPLE: flag"),
        ("flag_values", "0b,1b,2b"),
        ("flag_meanings", "not_used|good_data|bad_data"),
        ("comment", ""),
    ]);
    let layout = VariableLayout::from_definition("qc_flag", &def).expect("layout");

    assert_eq!(layout.nctype, NcType::Byte);
    assert_eq!(layout.dimensions, ["time"]);
    assert_eq!(layout.fill_value, None);
    assert_eq!(layout.compression, None);
    assert_eq!(
        layout.attributes,
        vec![
            ("units".to_string(), AttrValue::Text("1".to_string())),
            ("flag_values".to_string(), AttrValue::Bytes(vec![0, 1, 2])),
            (
                "flag_meanings".to_string(),
                AttrValue::Text("not_used good_data bad_data".to_string())
            ),
        ]
    );
}

#[test]
fn test_layout_structural_keys() {
    let def = definition(&[
        ("type", "float32"),
        ("dimension", "time. altitude"),
        ("_FillValue", "-1.00E+20"),
        ("chunksizes", "100, 10"),
        ("compression", "zlib"),
        ("units", "m"),
    ]);
    let layout = VariableLayout::from_definition("backscatter", &def).expect("layout");

    assert_eq!(layout.nctype, NcType::Float);
    assert_eq!(layout.dimensions, ["time", "altitude"]);
    assert_eq!(layout.fill_value, Some(-1.0e20));
    assert_eq!(layout.chunk_sizes, Some(vec![100, 10]));
    assert_eq!(
        layout.compression,
        Some(Compression {
            level: 4,
            shuffle: true
        })
    );
    assert_eq!(layout.attributes.len(), 1);
}

#[test]
fn test_layout_compression_settings() {
    let def = definition(&[
        ("type", "double"),
        ("dimension", ""),
        ("compression", "zlib"),
        ("complevel", "12"),
        ("shuffle", "false"),
    ]);
    let layout = VariableLayout::from_definition("scalar", &def).expect("layout");
    assert!(layout.dimensions.is_empty());
    assert_eq!(
        layout.compression,
        Some(Compression {
            level: 9,
            shuffle: false
        })
    );
}

#[test]
fn test_layout_issues() {
    let no_dims = definition(&[("type", "float32")]);
    assert_eq!(
        VariableLayout::from_definition("a", &no_dims),
        Err(LayoutIssue::MissingDimensions)
    );

    let no_type = definition(&[("dimension", "time")]);
    assert_eq!(
        VariableLayout::from_definition("a", &no_type),
        Err(LayoutIssue::MissingType)
    );

    let string_type = definition(&[("dimension", "time"), ("type", "string")]);
    assert_eq!(
        VariableLayout::from_definition("a", &string_type),
        Err(LayoutIssue::UnsupportedType("string".to_string()))
    );

    for name in ["ubyte", "uint16", "uint", "int64", "u8"] {
        let wide = definition(&[("dimension", "time"), ("type", name)]);
        assert_eq!(
            VariableLayout::from_definition("a", &wide),
            Err(LayoutIssue::NonClassicType(name.to_string()))
        );
    }
    assert_eq!(
        LayoutIssue::NonClassicType("ubyte".to_string()).to_string(),
        "type 'ubyte' not allowed in NETCDF4_CLASSIC files"
    );

    let bad_fill = definition(&[("dimension", "time"), ("type", "int"), ("_FillValue", "none")]);
    assert_eq!(
        VariableLayout::from_definition("a", &bad_fill),
        Err(LayoutIssue::InvalidFillValue("none".to_string()))
    );
}

#[test]
fn test_layout_helpers() {
    assert_eq!(split_dimensions("time, index"), ["time", "index"]);
    assert!(split_dimensions(" ").is_empty());
    assert_eq!(parse_byte_flags("0b, 1b, 2b,"), Some(vec![0, 1, 2]));
    assert_eq!(parse_byte_flags("0b,x"), None);
    assert_eq!("f8".parse::<NcType>(), Ok(NcType::Double));
    assert_eq!("i1".parse::<NcType>(), Ok(NcType::Byte));
    assert!("uint8".parse::<NcType>().is_err());
    assert!("int64".parse::<NcType>().is_err());
}

fn info_with_dimensions(product: &str, dims: &[(&str, &str)]) -> FileInfo {
    let mut info = FileInfo::new("ncas-test-1", product, DeploymentMode::Land, "v2.0.0");
    for (name, length) in dims {
        let mut fields = BTreeMap::new();
        fields.insert("Length".to_string(), length.to_string());
        info.dimensions.insert(*name, VocabEntry::from_fields(fields));
    }
    info
}

/// Answers from a fixed list and records what was asked
struct ScriptedPrompt {
    answers: Vec<usize>,
    asked: Vec<String>,
}

impl LengthPrompt for ScriptedPrompt {
    fn ask(&mut self, dim: &str) -> Result<usize> {
        self.asked.push(dim.to_string());
        Ok(self.answers.remove(0))
    }
}

#[test]
fn test_resolve_lengths_precedence() -> Result<()> {
    let first = info_with_dimensions("a", &[("time", "<i>"), ("latitude", "1")]);
    let second = info_with_dimensions("b", &[("time", "<i>"), ("altitude", "<n>"), ("index", "")]);

    let mut overrides = BTreeMap::new();
    overrides.insert("latitude".to_string(), 5);
    overrides.insert("time".to_string(), 1440);

    let mut prompt = ScriptedPrompt {
        answers: vec![770, 3],
        asked: Vec::new(),
    };
    let lengths = resolve_lengths([&first, &second], &overrides, &mut prompt)?;

    // Vocabulary integers win over overrides
    assert_eq!(lengths.get("latitude"), Some(&1));
    assert_eq!(lengths.get("time"), Some(&1440));
    assert_eq!(lengths.get("altitude"), Some(&770));
    assert_eq!(lengths.get("index"), Some(&3));
    assert_eq!(prompt.asked, ["altitude", "index"]);
    Ok(())
}

#[test]
fn test_resolve_lengths_without_prompt() {
    let info = info_with_dimensions("a", &[("time", "<i>")]);
    let result = resolve_lengths([&info], &BTreeMap::new(), &mut NoPrompt);
    assert!(matches!(
        result,
        Err(TemplateError::UnresolvedDimension { ref dim }) if dim == "time"
    ));
}

#[test]
fn test_parse_length_pairs() -> Result<()> {
    let args: Vec<String> = ["time", "86400", "altitude", "770"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let lengths = parse_length_pairs(&args)?;
    assert_eq!(lengths.get("time"), Some(&86400));
    assert_eq!(lengths.get("altitude"), Some(&770));

    assert!(matches!(
        parse_length_pairs(&args[..3]),
        Err(TemplateError::UnpairedDimensionLengths)
    ));

    let bad = vec!["time".to_string(), "lots".to_string()];
    assert!(matches!(
        parse_length_pairs(&bad),
        Err(TemplateError::InvalidDimensionLength { .. })
    ));
    Ok(())
}

fn context() -> WriteContext {
    WriteContext {
        created: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        platform: "cao".to_string(),
        user: Some("tester".to_string()),
        host: Some("sci1".to_string()),
    }
}

fn entry(description: &str, fixed: &str, compliance: &str) -> VocabEntry {
    let mut fields = BTreeMap::new();
    fields.insert("Description".to_string(), description.to_string());
    fields.insert("Fixed Value".to_string(), fixed.to_string());
    fields.insert("Compliance checking rules".to_string(), compliance.to_string());
    VocabEntry::from_fields(fields)
}

#[test]
fn test_resolve_global_attribute() {
    let mut info = FileInfo::new("ncas-test-1", "surface-met", DeploymentMode::Sea, "v2.0.0");
    info.instrument.manufacturer = "Acme".to_string();
    let ctx = context();

    let fixed = entry("Conventions", "CF-1.6", "Exact match");
    assert_eq!(resolve_global_attribute("Conventions", &fixed, &info, &ctx), "CF-1.6");

    // A fixed value beats the special cases
    let fixed_platform = entry("Platform", "ship", "");
    assert_eq!(resolve_global_attribute("platform", &fixed_platform, &info, &ctx), "ship");

    let blank = entry("Something", "", "Rules");
    assert_eq!(resolve_global_attribute("platform", &blank, &info, &ctx), "cao");
    assert_eq!(
        resolve_global_attribute("instrument_manufacturer", &blank, &info, &ctx),
        "Acme"
    );
    assert_eq!(resolve_global_attribute("deployment_mode", &blank, &info, &ctx), "sea");
    assert_eq!(
        resolve_global_attribute("history", &blank, &info, &ctx),
        "2024-03-01T12:30:00 - File created by tester on sci1"
    );
    assert_eq!(
        resolve_global_attribute("last_revised_date", &blank, &info, &ctx),
        "2024-03-01T12:30:00"
    );
    assert_eq!(
        resolve_global_attribute("amf_vocabularies_release", &blank, &info, &ctx),
        "https://github.com/ncasuk/AMF_CVs/releases/tag/v2.0.0"
    );

    let placeholder = entry("Name of the project", "", "String: min 2 characters");
    assert_eq!(
        resolve_global_attribute("project", &placeholder, &info, &ctx),
        "CHANGE: Name of the project. String: min 2 characters"
    );
}

#[test]
fn test_history_without_host() {
    let mut ctx = context();
    ctx.host = None;
    let info = FileInfo::new("ncas-test-1", "surface-met", DeploymentMode::Land, "v2.0.0");
    let blank = entry("", "", "");
    assert_eq!(
        resolve_global_attribute("history", &blank, &info, &ctx),
        "2024-03-01T12:30:00 - File created by tester"
    );
    ctx.user = None;
    assert_eq!(
        resolve_global_attribute("history", &blank, &info, &ctx),
        "2024-03-01T12:30:00 - File created"
    );
}

#[test]
fn test_template_writer_from_hand_built_info() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("template.nc");

    let mut info = FileInfo::new("ncas-test-1", "surface-met", DeploymentMode::Land, "v2.0.0");
    info.attributes.insert("Conventions", VocabEntry::fixed("CF-1.6"));
    info.attributes.insert("title", entry("Title", "", "String"));
    info.dimensions.insert("time", VocabEntry::default());
    info.variables.insert(
        "time",
        definition(&[("type", "double"), ("dimension", "time"), ("units", "s")]),
    );
    info.variables.insert(
        "height",
        definition(&[("type", "float"), ("dimension", "altitude")]),
    );
    info.variables.insert(
        "counts",
        definition(&[("type", "ubyte"), ("dimension", "time")]),
    );
    info.variables.insert("", VariableDef::new());

    let ctx = context();
    assert_eq!(global_attributes(&info, &ctx).len(), 2);

    // Write twice, the second write replaces the first file
    let mut lengths = BTreeMap::new();
    lengths.insert("time".to_string(), 4);
    TemplateWriter::new(&info, &path).write(&lengths, &ctx)?;
    let summary = TemplateWriter::new(&info, &path).write(&lengths, &ctx)?;

    assert_eq!(summary.dimensions, ["time"]);
    assert_eq!(summary.variables, ["time"]);
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(summary.skipped[0].0, "height");
    assert_eq!(summary.skipped[1].0, "counts");
    assert!(summary.skipped[1].1.contains("NETCDF4_CLASSIC"));

    let file = open(&path)?;
    assert_eq!(file.dimension("time").map(|d| d.len()), Some(4));
    assert!(file.variable("time").is_some());
    assert!(file.variable("height").is_none());
    assert!(file.variable("counts").is_none());
    assert!(file.attribute("title").is_some());
    Ok(())
}

#[test]
fn test_csv_metadata() -> Result<()> {
    let text = "site,Chilbolton, Hampshire\n\
                altitude,85,type=float\n\
                count,many,type=int\n\
                lonely\n\
                site,Cardington\n";
    let entries = read_csv_metadata(text)?;

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], MetadataEntry::new("site", "Cardington", ValueKind::Str));
    assert_eq!(entries[1].kind, ValueKind::Float);
    assert_eq!(entries[1].typed_value(), MetadataValue::Float(85.0));
    // Unconvertible values fall back to text
    assert_eq!(entries[2].typed_value(), MetadataValue::Text("many".to_string()));
    Ok(())
}

#[test]
fn test_csv_metadata_joins_commas() -> Result<()> {
    let entries = read_csv_metadata("comment,first part, second part,type=str\n")?;
    assert_eq!(entries[0].value, "first part, second part");
    assert_eq!(entries[0].kind, ValueKind::Str);
    Ok(())
}

#[test]
fn test_yaml_metadata() -> Result<()> {
    let text = "project: Test campaign\n\
                altitude:\n  value: 85\n  type: int\n\
                calibrated:\n  value: true\n  type: bool\n";
    let entries = read_yaml_metadata(text)?;

    let find = |name: &str| {
        entries
            .iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("{} missing", name))
    };
    assert_eq!(
        find("project").typed_value(),
        MetadataValue::Text("Test campaign".to_string())
    );
    assert_eq!(find("altitude").typed_value(), MetadataValue::Int(85));
    assert_eq!(find("calibrated").typed_value(), MetadataValue::Bool(true));
    Ok(())
}

#[test]
fn test_xml_metadata() -> Result<()> {
    let text = r#"<?xml version="1.0"?>
<metadata>
  <project><value>Test &amp; campaign</value></project>
  <latitude>
    <value>51.25</value>
    <type>float</type>
  </latitude>
  <calibrated><type>bool</type><value>yes</value><note>ignored</note></calibrated>
  <empty/>
  <project><value>Second campaign</value></project>
</metadata>"#;
    let entries = read_xml_metadata(text)?;

    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["project", "latitude", "calibrated", "empty"]);
    assert_eq!(entries[0], MetadataEntry::new("project", "Second campaign", ValueKind::Str));
    assert_eq!(entries[1].typed_value(), MetadataValue::Float(51.25));
    assert_eq!(entries[2].typed_value(), MetadataValue::Bool(true));
    assert_eq!(entries[3].value, "");
    Ok(())
}

#[test]
fn test_xml_metadata_unescapes_text() -> Result<()> {
    let entries = read_xml_metadata("<m><title><value>A &lt;b&gt; &amp; c</value></title></m>")?;
    assert_eq!(entries[0].value, "A <b> & c");
    Ok(())
}

#[test]
fn test_malformed_xml_metadata() {
    let result = read_xml_metadata("<metadata><project><value>x</project></metadata>");
    assert!(matches!(result, Err(TemplateError::XmlError(_))));
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, micro: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_micro_opt(h, min, s, micro))
        .expect("valid test time")
}

#[test]
fn test_get_times() -> Result<()> {
    let times = [
        at(2024, 2, 1, 0, 0, 0, 0),
        at(2024, 2, 1, 12, 30, 15, 500_000),
    ];
    let coords = get_times(&times)?;

    assert_eq!(coords.unix_times, [1_706_745_600.0, 1_706_790_615.5]);
    assert_eq!(coords.time_coverage_start, 1_706_745_600.0);
    assert_eq!(coords.time_coverage_end, 1_706_790_615.5);
    assert_eq!(coords.years, [2024, 2024]);
    assert_eq!(coords.months, [2, 2]);
    assert_eq!(coords.days, [1, 1]);
    assert_eq!(coords.hours, [0, 12]);
    assert_eq!(coords.minutes, [0, 30]);
    assert_eq!(coords.seconds, [0.0, 15.5]);
    assert_eq!(coords.day_of_year[0], 32.0);
    let expected = 32.0 + 12.0 / 24.0 + 30.0 / 1440.0 + 15.5 / 86400.0;
    assert!((coords.day_of_year[1] - expected).abs() < 1e-9);
    assert_eq!(coords.file_date, "20240201");
    Ok(())
}

#[test]
fn test_file_date_precision() -> Result<()> {
    let start = at(2024, 3, 5, 7, 8, 9, 0);
    assert_eq!(file_date(&start, &at(2024, 11, 5, 7, 8, 9, 0))?, "2024");
    assert_eq!(file_date(&start, &at(2024, 3, 6, 7, 8, 9, 0))?, "202403");
    assert_eq!(file_date(&start, &at(2024, 3, 5, 9, 0, 0, 0))?, "20240305");
    assert_eq!(file_date(&start, &at(2024, 3, 5, 7, 59, 0, 0))?, "20240305-07");
    assert_eq!(file_date(&start, &at(2024, 3, 5, 7, 8, 30, 0))?, "20240305-0708");
    assert_eq!(file_date(&start, &at(2024, 3, 5, 7, 8, 9, 900_000))?, "20240305-070809");
    Ok(())
}

#[test]
fn test_get_times_rejects_bad_input() {
    let result = get_times(&[at(2023, 12, 31, 23, 0, 0, 0), at(2024, 1, 1, 1, 0, 0, 0)]);
    match result {
        Err(TemplateError::InvalidTimes { reason }) => {
            assert_eq!(reason, "Incompatible dates - data from over 2 years")
        }
        other => panic!("Expected InvalidTimes, got {:?}", other),
    }
    assert!(matches!(get_times(&[]), Err(TemplateError::InvalidTimes { .. })));
}

#[test]
fn test_zero_pad_number() {
    assert_eq!(zero_pad_number(0), "00");
    assert_eq!(zero_pad_number(7), "07");
    assert_eq!(zero_pad_number(12), "12");
    assert_eq!(zero_pad_number(366), "366");
}

#[test]
fn test_data_helpers() {
    assert_eq!(data_range(&[3.0, f64::NAN, -1.5, 2.0]), Some((-1.5, 3.0)));
    assert_eq!(data_range(&[f64::NAN]), None);
    assert_eq!(data_range(&[]), None);

    assert_eq!(unexpected_flags(&[0.0, 1.0, 3.0, 1.0, 3.0, 5.0], &[0.0, 1.0, 2.0]), [3.0, 5.0]);
    assert!(unexpected_flags(&[2.0, 0.0], &[0.0, 1.0, 2.0]).is_empty());

    assert_eq!(
        attribute_numbers(&netcdf::AttributeValue::Schars(vec![0, 1, 2])),
        Some(vec![0.0, 1.0, 2.0])
    );
    assert_eq!(attribute_numbers(&netcdf::AttributeValue::Float(1.5)), Some(vec![1.5]));
    assert_eq!(attribute_numbers(&netcdf::AttributeValue::Str("0b".to_string())), None);
}

#[test]
fn test_cli_create_arguments() -> Result<()> {
    let args = Args::try_parse_from([
        "amof-template",
        "create",
        "ncas-ceilometer-3",
        "-l",
        "time",
        "86400",
        "altitude",
        "770",
        "-m",
        "sea",
        "-d",
        "20240229",
        "-p",
        "aerosol-backscatter",
        "cloud-base",
        "--tag",
        "v2.0.0",
        "-vv",
    ])
    .expect("arguments should parse");

    assert_eq!(args.verbose, 2);
    let Command::Create(create) = args.command else {
        panic!("Expected the create command");
    };
    assert_eq!(create.mode, DeploymentMode::Sea);

    let config = create.into_config(args.tag, args.vocab_dir)?;
    assert_eq!(config.tag, "v2.0.0");
    assert_eq!(config.date.as_deref(), Some("20240229"));
    assert_eq!(config.dimension_lengths.get("altitude"), Some(&770));
    assert_eq!(
        config.products,
        Some(vec!["aerosol-backscatter".to_string(), "cloud-base".to_string()])
    );
    assert_eq!(config.product_version, "1.0");
    Ok(())
}

#[test]
fn test_cli_rejects_bad_values() {
    assert!(Args::try_parse_from(["amof-template", "create", "inst", "-m", "space"]).is_err());
    assert!(Args::try_parse_from(["amof-template", "create", "inst", "-d", "2024-01-01"]).is_err());
    assert!(Args::try_parse_from(["amof-template", "create", "inst", "-d", "20240230"]).is_err());
    assert!(Args::try_parse_from(["amof-template", "remove-empty"]).is_err());
}

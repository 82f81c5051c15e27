//! Resolution of dimension lengths
//!
//! A dimension's length comes from, in order of preference, a literal
//! integer in the vocabulary `Length` column, a caller-supplied override, and
//! finally a [`LengthPrompt`]. Vocabulary lengths written as `<n>` or similar
//! are placeholders that must be resolved another way.

use crate::errors::{Result, TemplateError};
use crate::file_info::FileInfo;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Supplies lengths for dimensions nothing else could resolve
pub trait LengthPrompt {
    fn ask(&mut self, dim: &str) -> Result<usize>;
}

/// Asks on the terminal, blocking until a line is entered
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl LengthPrompt for StdinPrompt {
    fn ask(&mut self, dim: &str) -> Result<usize> {
        print!("Enter length for dimension {}: ", dim);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        parse_length(dim, &line)
    }
}

/// Refuses to guess, for non-interactive runs
#[derive(Debug, Default)]
pub struct NoPrompt;

impl LengthPrompt for NoPrompt {
    fn ask(&mut self, dim: &str) -> Result<usize> {
        Err(TemplateError::UnresolvedDimension {
            dim: dim.to_string(),
        })
    }
}

fn parse_length(dim: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| TemplateError::InvalidDimensionLength {
            dim: dim.to_string(),
            value: value.trim().to_string(),
        })
}

/// Turn `name length name length ...` arguments into overrides
pub fn parse_length_pairs(args: &[String]) -> Result<BTreeMap<String, usize>> {
    if args.len() % 2 != 0 {
        return Err(TemplateError::UnpairedDimensionLengths);
    }
    args.chunks(2)
        .map(|pair| {
            let (name, length) = (&pair[0], &pair[1]);
            Ok((name.clone(), parse_length(name, length)?))
        })
        .collect()
}

/// Resolve a length for every dimension used by any of the given files
pub fn resolve_lengths<'a>(
    infos: impl IntoIterator<Item = &'a FileInfo>,
    overrides: &BTreeMap<String, usize>,
    prompt: &mut dyn LengthPrompt,
) -> Result<BTreeMap<String, usize>> {
    let mut all_dimensions: Vec<String> = Vec::new();
    let mut lengths = BTreeMap::new();

    for info in infos {
        for (name, entry) in info.dimensions.iter() {
            if all_dimensions.iter().any(|d| d == name) {
                continue;
            }
            all_dimensions.push(name.to_string());
            let length = entry.length().trim();
            if !length.is_empty() && !length.contains('<') {
                lengths.insert(name.to_string(), parse_length(name, length)?);
            }
        }
    }

    for (name, length) in overrides {
        lengths.entry(name.clone()).or_insert(*length);
    }

    for dim in &all_dimensions {
        if !lengths.contains_key(dim) {
            let length = prompt.ask(dim)?;
            debug!(%dim, length, "dimension length from prompt");
            lengths.insert(dim.clone(), length);
        }
    }

    Ok(lengths)
}

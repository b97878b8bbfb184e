//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use pagefix_core::{ParamValue, Parameter};

/// Clean up and adjust a document photo or scan.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Image to load (PNG or JPEG)
    pub input: PathBuf,

    /// JSON file with a full or partial parameter set
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// Override one parameter, e.g. `--set rotation=-2.5` or `--set crop_enabled=on`
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub overrides: Vec<(Parameter, ParamValue)>,

    /// Where to save; a timestamp is added and unknown extensions become .png.
    /// Defaults to the input's name next to the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the effective parameters as JSON and exit without saving
    #[arg(long)]
    pub print_params: bool,
}

/// Parse `name=value` into a checked parameter assignment.
pub fn parse_assignment(input: &str) -> Result<(Parameter, ParamValue), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{}`", input))?;
    let parameter = name.parse::<Parameter>().map_err(|e| e.to_string())?;
    let value = parameter.parse_value(value).map_err(|e| e.to_string())?;
    parameter.check(value).map_err(|e| e.to_string())?;
    Ok((parameter, value))
}

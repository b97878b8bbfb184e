//! `pagefix` - load a page image, apply adjustments, save a timestamped copy.

mod args;
mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use pagefix_core::{Editor, ParameterSet};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::error::CliError;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "pagefix failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let params = resolve_parameters(&args)?;

    if args.print_params {
        let json = serde_json::to_string_pretty(&params).map_err(CliError::Serialize)?;
        println!("{}", json);
        return Ok(());
    }

    let mut editor = Editor::with_parameters(params)?;
    editor.load_path(&args.input)?;
    let output = editor.recompute()?;
    info!(width = output.width, height = output.height, "output ready");

    let timestamp = chrono::Local::now().naive_local();
    let target = match &args.output {
        Some(path) => path.clone(),
        None => sibling(&args.input, &editor.suggested_save_name(&timestamp)),
    };
    let written = editor.save(&target, &timestamp)?;

    println!("{}", written.display());
    Ok(())
}

/// Parameter file first, then each `--set` in command-line order.
fn resolve_parameters(args: &Args) -> Result<ParameterSet, CliError> {
    let mut params = match &args.params {
        Some(path) => read_parameter_file(path)?,
        None => ParameterSet::default(),
    };
    for &(parameter, value) in &args.overrides {
        params.set(parameter, value)?;
    }
    Ok(params)
}

fn read_parameter_file(path: &Path) -> Result<ParameterSet, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ParamsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let params: ParameterSet =
        serde_json::from_str(&text).map_err(|source| CliError::ParamsParse {
            path: path.to_path_buf(),
            source,
        })?;
    params.validate()?;
    Ok(params)
}

fn sibling(input: &Path, name: &str) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["pagefix", "in.png"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_overrides_apply_in_order() {
        let params =
            resolve_parameters(&args(&["-s", "rotation=10", "-s", "rotation=-5"])).unwrap();
        assert_eq!(params.rotation, -5.0);
    }

    #[test]
    fn test_parameter_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("params.json");
        fs::write(&file, r#"{ "contrast": 1.5, "crop_enabled": true }"#).unwrap();

        let params = resolve_parameters(&args(&[
            "--params",
            file.to_str().unwrap(),
            "--set",
            "contrast=0.5",
        ]))
        .unwrap();

        assert_eq!(params.contrast, 0.5);
        assert!(params.crop_enabled);
        assert_eq!(params.brightness, 0.0);
    }

    #[test]
    fn test_parameter_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let bad = dir.path().join("bad.json");
        let out_of_range = dir.path().join("range.json");
        fs::write(&bad, "{ not json").unwrap();
        fs::write(&out_of_range, r#"{ "sharpness": 4.0 }"#).unwrap();

        assert!(matches!(
            read_parameter_file(&missing),
            Err(CliError::ParamsRead { .. })
        ));
        assert!(matches!(
            read_parameter_file(&bad),
            Err(CliError::ParamsParse { .. })
        ));
        assert!(matches!(
            read_parameter_file(&out_of_range),
            Err(CliError::Validation(_))
        ));
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(
            sibling(Path::new("scans/page.jpg"), "page_20240101_120000.jpg"),
            PathBuf::from("scans/page_20240101_120000.jpg")
        );
        assert_eq!(
            sibling(Path::new("page.jpg"), "page_20240101_120000.jpg"),
            PathBuf::from("page_20240101_120000.jpg")
        );
    }
}

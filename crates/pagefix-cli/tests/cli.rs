//! Runs the `pagefix` binary against images on disk.

use std::path::Path;
use std::process::Command;

use pagefix_core::{encode_image, ColorLayout, OutputFormat, PixelBuffer};

fn write_page(path: &Path) {
    let pixels = (0..40u32 * 30)
        .flat_map(|i| if (i / 40) % 6 == 0 { [30, 30, 30] } else { [230, 225, 220] })
        .collect();
    let page = PixelBuffer::new(40, 30, ColorLayout::Rgb, pixels);
    std::fs::write(path, encode_image(&page, OutputFormat::default()).unwrap()).unwrap();
}

fn pagefix() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pagefix"))
}

#[test]
fn saves_timestamped_copy_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.png");
    write_page(&input);

    let out = pagefix()
        .arg(&input)
        .args(["--set", "rotation=90", "--set", "contrast=1.2"])
        .output()
        .unwrap();

    assert!(out.status.success());
    let written = String::from_utf8(out.stdout).unwrap();
    let written = Path::new(written.trim());
    assert_eq!(written.parent(), Some(dir.path()));

    let name = written.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("page_") && name.ends_with(".png"));
    assert_eq!(name.len(), "page_YYYYMMDD_HHMMSS.png".len());

    let saved = image::open(written).unwrap();
    assert_eq!((saved.width(), saved.height()), (30, 40));
}

#[test]
fn explicit_output_picks_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.png");
    write_page(&input);

    let out = pagefix()
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("result.jpg"))
        .output()
        .unwrap();

    assert!(out.status.success());
    let written = String::from_utf8(out.stdout).unwrap();
    let bytes = std::fs::read(written.trim()).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn print_params_merges_overrides() {
    let out = pagefix()
        .args(["unused.png", "--print-params", "-s", "crop_enabled=on"])
        .output()
        .unwrap();

    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["crop_enabled"], true);
    assert_eq!(json["contrast"], 1.0);
}

#[test]
fn rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, b"not an image").unwrap();

    assert!(!pagefix().arg(&input).output().unwrap().status.success());
    assert!(!pagefix()
        .args(["page.png", "--set", "sharpness=2"])
        .output()
        .unwrap()
        .status
        .success());
}

use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;

fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    let file = fs::File::create(path).expect("create png");
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().expect("png header");
    let data: Vec<u8> = rgba
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    writer.write_image_data(&data).expect("png data");
}

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let images = dir.join("images");
    fs::create_dir_all(&images).expect("images dir");
    write_png(&images.join("info.png"), 40, 20, [0, 0, 0, 255]);
    write_png(&images.join("logo_red.png"), 54, 54, [214, 8, 59, 255]);

    let doc = serde_json::json!({
        "image_resolution": [200, 400],
        "info_filename": "info.png",
        "font_filename": "map.ttf",
        "lines": [
            {
                "name": "Red",
                "line_color": "#d6083b",
                "logo_filename": "logo_red.png",
                "type": "metro",
                "priority": 1,
                "start": [40, 100],
                "direction": "right",
                "elements": [
                    { "type": "station", "name": "Alpha" },
                    { "type": "line_segment", "length": 120 },
                    { "type": "station", "name": "Beta" },
                    { "type": "line_segment", "length": 100 },
                    { "type": "station", "name": "Gamma" }
                ]
            }
        ],
        "transfers": []
    });
    let input = dir.join("map_data.json");
    fs::write(&input, serde_json::to_string_pretty(&doc).unwrap()).expect("write map data");
    input
}

#[test]
fn cli_renders_the_full_map_as_png() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(tmp.path());
    let out = tmp.path().join("output");

    let exe = assert_cmd::cargo_bin!("metromap-cli");
    Command::new(exe)
        .args([
            "map",
            "--input",
            input.to_string_lossy().as_ref(),
            "--assets",
            tmp.path().join("images").to_string_lossy().as_ref(),
            "--out",
            out.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let bytes = fs::read(out.join("metro_map.png")).expect("read png");
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "output is not a PNG"
    );
}

#[test]
fn cli_renders_both_directions_for_a_mid_line_station() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(tmp.path());
    let out = tmp.path().join("output");

    let exe = assert_cmd::cargo_bin!("metromap-cli");
    Command::new(exe)
        .args([
            "linear",
            "--input",
            input.to_string_lossy().as_ref(),
            "--assets",
            tmp.path().join("images").to_string_lossy().as_ref(),
            "--out",
            out.to_string_lossy().as_ref(),
            "--line",
            "Red",
            "--station",
            "Beta",
        ])
        .assert()
        .success();

    for name in ["linear_Red_Beta_0.png", "linear_Red_Beta_1.png"] {
        let bytes = fs::read(out.join(name)).expect(name);
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "{name} is not a PNG");
    }
}

#[test]
fn cli_renders_an_entrance_sign_as_svg() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(tmp.path());
    let out = tmp.path().join("output");

    let exe = assert_cmd::cargo_bin!("metromap-cli");
    Command::new(exe)
        .args([
            "signs",
            "--input",
            input.to_string_lossy().as_ref(),
            "--assets",
            tmp.path().join("images").to_string_lossy().as_ref(),
            "--out",
            out.to_string_lossy().as_ref(),
            "--format",
            "svg",
            "--line",
            "Red",
            "--station",
            "Alpha",
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(out.join("sign_Red_Alpha.svg")).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Alpha"));
}

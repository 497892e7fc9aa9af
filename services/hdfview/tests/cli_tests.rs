//! End-to-end tests: write a MOHID file and a config, run the binary and
//! inspect the manifests it writes.

use std::path::Path;
use std::process::Command;

use serde_json::{json, Value};
use test_utils::{MohidFileBuilder, MohidFixture};

fn hdfview(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hdfview"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("Failed to run hdfview")
}

fn fixture() -> MohidFixture {
    MohidFileBuilder::new()
        .hourly_times(2)
        .land_cell(1, 0)
        .field_2d("temperature")
        .field_2d("velocity U")
        .field_2d("velocity V")
        .origin(
            "Outfall",
            "concentration",
            vec![
                vec![(-8.9, 37.1, 5.0), (-8.8, 37.2, 0.5)],
                vec![(-8.7, 37.3, 20.0)],
            ],
        )
        .build()
        .expect("Failed to write MOHID file")
}

fn write_config(dir: &Path, value: Value) -> std::path::PathBuf {
    let path = dir.join("init_HDFView.json");
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_field_manifest() {
    let fixture = fixture();
    let outdir = fixture.dir.path();
    let config = write_config(
        outdir,
        json!({
            "HDF": {
                "hdf": fixture.path(),
                "outdir": outdir,
                "prefix": "temp_",
                "field": "temperature",
                "layer": 0,
                "vectors": true,
                "vec_zoom": 1,
                "cmap": "viridis",
                "label": "Temperature",
                "levels": 5,
                "timestr": "%Y-%m-%d %H:%M"
            }
        }),
    );

    let output = hdfview(&config, &["field"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let manifest = read_json(&outdir.join("temp_frames.json"));
    let frames = manifest["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["file"], "temp_20250425T1200.png");
    assert_eq!(frames[1]["title"], "2025-04-25 13:00");
    // 2x2 cells, one of them land
    assert_eq!(frames[0]["valid_cells"], 3);
    assert_eq!(frames[0]["vectors"]["sampled"], 3);
    assert_eq!(manifest["levels"].as_array().unwrap().len(), 5);
    assert_eq!(manifest["animation"], "temp_animation.gif");
}

#[test]
fn test_particle_manifest() {
    let fixture = fixture();
    let outdir = fixture.dir.path();
    let config = write_config(
        outdir,
        json!({
            "LAGR": {
                "hdf": fixture.path(),
                "outdir": outdir,
                "origin_name": "Outfall",
                "propertie_name": "concentration",
                "cmap": "jet",
                "label": "Concentration",
                "levels": 10,
                "vmax": 100.0,
                "vmin": 1.0,
                "timestr": "%H:%M"
            }
        }),
    );

    let output = hdfview(&config, &["particles"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let manifest = read_json(&outdir.join("Outfall-frames.json"));
    let frames = manifest["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["file"], "Outfall-20250425T1200.png");
    assert_eq!(frames[0]["particles"], 1);
    assert_eq!(frames[1]["particles"], 1);
    assert_eq!(manifest["water_cells"], 3);
}

#[test]
fn test_missing_section_fails() {
    let fixture = fixture();
    let config = write_config(fixture.dir.path(), json!({ "TS": { "tsfile": "missing.srh" } }));

    let output = hdfview(&config, &["field"]);
    assert!(!output.status.success());
}

#[test]
fn test_info() {
    let fixture = fixture();
    let config = fixture.dir.path().join("unused.json");

    let output = hdfview(&config, &["info", fixture.path().to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["steps"], 2);
    assert_eq!(summary["grid"]["n_lat_bounds"], 3);
    assert_eq!(summary["grid"]["cell_latitudes"], json!([37.0, 37.5]));
    assert_eq!(summary["grid"]["cell_longitudes"], json!([-9.0, -8.5]));
    let results: Vec<&str> = summary["results"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(results.contains(&"temperature"));
    assert!(results.contains(&"Outfall"));
}

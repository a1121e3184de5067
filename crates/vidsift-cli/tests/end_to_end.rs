//! Index a directory of frame folders, then query the table.

use image::{Rgb, RgbImage};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

use vidsift_cli::commands::search::SearchArgs;
use vidsift_cli::commands::{index, search, signature};
use vidsift_cli::settings::CommonOptions;
use vidsift_core::ReferenceCorpus;

fn write_video(root: &Path, name: &str, colors: &[[u8; 3]]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (i, rgb) in colors.iter().enumerate() {
        RgbImage::from_pixel(16, 16, Rgb(*rgb))
            .save(dir.join(format!("frame_{:03}.png", i)))
            .unwrap();
    }
}

fn small_grid_config(dir: &Path) -> CommonOptions {
    let path = dir.join("vidsift.json");
    fs::write(&path, r#"{"grid_size": 2, "color_bins": 4}"#).unwrap();
    CommonOptions {
        config: Some(path.to_string_lossy().into_owned()),
        ..CommonOptions::default()
    }
}

#[test]
fn test_index_then_search_color_intersection() {
    let work = tempfile::tempdir().unwrap();
    let videos = work.path().join("videos");
    write_video(&videos, "dark", &[[0, 0, 0], [10, 10, 10], [20, 20, 20]]);
    write_video(&videos, "dark_copy", &[[0, 0, 0], [10, 10, 10], [20, 20, 20]]);
    write_video(&videos, "bright", &[[250, 250, 250]; 3]);
    write_video(&videos, "empty", &[]);
    let options = small_grid_config(work.path());
    let table = work.path().join("refs.csv");

    let indexed = index::build(
        "COL-HIST-INTERSECTION",
        &videos.to_string_lossy(),
        &table.to_string_lossy(),
        &options,
    )
    .unwrap();
    assert_eq!(indexed.inputs, 4);
    assert_eq!(indexed.entries, 3);
    assert_eq!(indexed.failures.len(), 1);
    assert!(indexed.failures[0].path.ends_with("empty"));

    let corpus = ReferenceCorpus::load(&table).unwrap();
    assert_eq!(corpus.signature_len(), Some(3 * 2 * 2 * 3 * 4));

    let args = SearchArgs {
        model: "COL-HIST-INTERSECTION".to_string(),
        table: table.to_string_lossy().into_owned(),
        query_id: Some("dark".to_string()),
        k: 3,
        ..SearchArgs::default()
    };
    let by_id = search::search(&args, &options).unwrap();
    let ids: Vec<&str> = by_id.neighbors.iter().map(|n| n.identifier.as_str()).collect();
    assert_eq!(ids, vec!["dark", "dark_copy", "bright"]);
    assert!(by_id.neighbors[1].distance.abs() < 1e-12);
    assert!(by_id.neighbors[2].distance > 0.99);

    let query = work.path().join("query");
    write_video(&query, "clip", &[[245, 245, 245], [255, 255, 255]]);
    let args = SearchArgs {
        input: Some(query.join("clip").to_string_lossy().into_owned()),
        query_id: None,
        k: 1,
        ..args
    };
    let by_input = search::search(&args, &options).unwrap();
    assert_eq!(by_input.neighbors.len(), 1);
    assert_eq!(by_input.neighbors[0].identifier, "bright");
    assert_eq!(by_input.neighbors[0].rank, 1);
}

#[test]
fn test_query_with_mismatched_grid_is_rejected() {
    let work = tempfile::tempdir().unwrap();
    let videos = work.path().join("videos");
    write_video(&videos, "a", &[[0, 0, 0]]);
    let options = small_grid_config(work.path());
    let table = work.path().join("refs.csv");
    index::build(
        "COL-HIST",
        &videos.to_string_lossy(),
        &table.to_string_lossy(),
        &options,
    )
    .unwrap();

    // Default 4x4x12 signatures cannot be compared with a 2x2x4 table.
    let args = SearchArgs {
        model: "COL-HIST".to_string(),
        table: table.to_string_lossy().into_owned(),
        input: Some(videos.join("a").to_string_lossy().into_owned()),
        k: 1,
        ..SearchArgs::default()
    };
    let err = search::search(&args, &CommonOptions::default()).unwrap_err();
    assert_eq!(err.code, "CORE_003");
}

#[test]
fn test_signature_of_frame_directory_has_no_hash() {
    let work = tempfile::tempdir().unwrap();
    write_video(work.path(), "clip", &[[1, 2, 3], [4, 5, 6]]);
    let input = work.path().join("clip").to_string_lossy().into_owned();

    let result = signature::compute("COL-HIST", &input, &CommonOptions::default()).unwrap();
    assert_eq!(result.length, 1728);
    assert_eq!(result.input_hash, None);

    let err = index::build(
        "BOF-960",
        &work.path().to_string_lossy(),
        &work.path().join("refs.csv").to_string_lossy(),
        &CommonOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.code, "BOF_004");
}

use gridquery::export;
use gridquery::prelude::*;
use gridquery::reader::read_path;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

#[test]
fn test_generated_file_round_trip() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("a.csv");

    let generator = Generator::new(Bounds::new(-5.0, -5.0, 5.0, 5.0))
        .expect("valid domain")
        .with_seed(31);
    let written = generator
        .generate_to_path(&path, 75, Some("A"))
        .expect("Failed to write dataset");

    let parsed = read_path(&path, None, LoadPolicy::Strict).expect("Failed to read dataset");
    assert_eq!(parsed.report.loaded, 75);
    let ids: Vec<&str> = parsed.rects.iter().map(|r| r.id()).collect();
    let expected: Vec<&str> = written.iter().map(|r| r.id()).collect();
    assert_eq!(ids, expected);
    for (read, orig) in parsed.rects.iter().zip(&written) {
        assert_eq!(read.xmin(), orig.xmin());
        assert_eq!(read.ymax(), orig.ymax());
    }
}

#[test]
fn test_tab_delimited_with_reordered_columns() {
    let file = write_file("ymax\tID\txmin\textra\tymin\txmax\n10\tR1\t0\tfoo\t0\t10\n60\tR2\t50\tbar\t50\t60\n");

    let mut grid = Grid::new(Bounds::default(), 10).expect("Failed to create grid");
    let report = grid.load_path(file.path(), "default").expect("Failed to load");
    assert_eq!(report.loaded, 2);

    let r2 = &grid.get_dataset("default")[1];
    assert_eq!(r2.id(), "R2");
    assert_eq!((r2.xmin(), r2.ymin(), r2.xmax(), r2.ymax()), (50.0, 50.0, 60.0, 60.0));
}

#[test]
fn test_strict_and_lenient_loads() {
    let file = write_file(
        "ID,xmin,ymin,xmax,ymax\n\
         R1,0,0,10,10\n\
         R2,abc,0,1,1\n\
         R3,5,5,4,6\n\
         R1,1,1,2,2\n\
         R4,1,2\n\
         R5,20,20,30,30\n",
    );

    let mut strict = Grid::new(Bounds::default(), 10).expect("Failed to create grid");
    let err = strict
        .load_path(file.path(), "default")
        .expect_err("strict load should fail");
    assert!(matches!(err, GridQueryError::MalformedRecord { .. }));
    assert_eq!(err.line(), Some(3));
    assert!(!strict.contains_label("default"));

    let mut lenient = Grid::new(Bounds::default(), 10)
        .expect("Failed to create grid")
        .with_load_policy(LoadPolicy::Lenient);
    let report = lenient
        .load_path(file.path(), "default")
        .expect("lenient load");
    assert_eq!(report.loaded, 2);
    assert_eq!(report.malformed, 3);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.skipped(), 4);

    let ids: Vec<&str> = lenient
        .get_dataset("default")
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(ids, vec!["R1", "R5"]);
    assert_eq!(lenient.get_dataset("default")[0].xmax(), 10.0);
}

#[test]
fn test_missing_header_column() {
    let file = write_file("ID,xmin,ymin,xmax\nR1,0,0,1\n");
    let result = read_path(file.path(), None, LoadPolicy::Lenient);
    assert!(matches!(result, Err(GridQueryError::InvalidHeader(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut grid = Grid::new(Bounds::default(), 4).expect("Failed to create grid");
    let result = grid.load_path(dir.path().join("nope.csv"), "A");
    assert!(matches!(result, Err(GridQueryError::Io(_))));
}

#[test]
fn test_exports_to_files() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut grid = Grid::new(Bounds::default(), 10).expect("Failed to create grid");
    grid.load_rectangles(
        vec![
            Rectangle::new("R1", 0.0, 0.0, 10.0, 10.0),
            Rectangle::new("R2", 50.0, 50.0, 60.0, 60.0),
        ],
        "default",
    )
    .expect("Failed to load");

    let (neighbors, stats) = GridKnn::new(&grid, "default")
        .knn(13.0, 14.0, 2)
        .expect("k-NN failed");
    let knn_path = dir.path().join(export::default_file_name(Algorithm::GridKnn));
    export::export_neighbors_to_path(&knn_path, &neighbors, Some(&stats)).expect("export");
    let text = fs::read_to_string(&knn_path).expect("read export");
    assert!(text.starts_with("k-NN statistics:\n"));
    assert!(text.ends_with("Dataset_ID\tDistance\nR1\t5.0000\nR2\t51.6236\n"));

    let (skyline, _) = SkylineQuery::new(&grid, "default").run();
    let sky_path = dir.path().join("skyline.txt");
    export::export_skyline_to_path(&sky_path, &skyline, None).expect("export");
    assert_eq!(
        fs::read_to_string(&sky_path).expect("read export"),
        "Skyline Points (ID, xmin, ymin, xmax, ymax):\nR1, 0.0, 0.0, 10.0, 10.0\n"
    );

    let (pairs, _) = PbsmJoin::new(&grid).execute();
    let pairs_path = dir.path().join("pairs.txt");
    export::export_pairs_to_path(&pairs_path, &pairs, None).expect("export");
    assert_eq!(
        fs::read_to_string(&pairs_path).expect("read export"),
        "Dataset_A_ID\tDataset_B_ID\n"
    );
}

#[test]
fn test_config_file_drives_session() {
    let file = write_file(
        r#"{
            "bounds": { "xl": 0.0, "yl": 0.0, "xu": 40.0, "yu": 40.0 },
            "partitions": 4,
            "load_policy": "lenient",
            "seed": 12
        }"#,
    );
    let text = fs::read_to_string(file.path()).expect("read config");
    let config = Config::from_json(&text).expect("parse config");

    let session = Session::new(config).expect("Failed to create session");
    assert_eq!(session.grid().cell_width(), 10.0);
    assert_eq!(session.grid().load_policy(), LoadPolicy::Lenient);
    assert!(session.config().include_stats);

    let rects = session
        .generator()
        .expect("generator")
        .generate(30, None)
        .expect("generate");
    assert!(rects.iter().all(|r| r.xmax() <= 40.0 && r.ymax() <= 40.0));
}

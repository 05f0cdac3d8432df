// Load behavior: the count invariant, strategy fallback, degradation, and
// fatal error surface.

mod common;

use common::*;
use geo::{Coord, Point};
use shapeseek::{AttributeValue, LoadError, ShapeDataset};

#[test]
fn counts_always_agree_and_base_name_sticks() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = ShapeDataset::load(two_squares(dir.path())).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records().count(), dataset.shapes().count());
    assert_eq!(dataset.base_name(), "squares");
    assert_eq!(dataset.fields().len(), 1);
    assert_eq!(dataset.fields()[0].name, "NAME");
    assert_eq!(dataset.last_error_message(), None);
}

#[test]
fn bounding_boxes_are_tight() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![polygon_record(&[square(1.0, 2.0, 3.0), square(-1.0, 0.0, 1.0)])];
    let base = write_dataset(
        dir.path(),
        "boxes",
        &build_shp(&contents),
        Some(&build_shx(&contents)),
        &name_dbf(&["multi"]),
    );
    let dataset = ShapeDataset::load(base).unwrap();

    let (record, _) = dataset.records().next().unwrap();
    let bbox = record.bbox().unwrap();
    assert_eq!(bbox.min(), Coord { x: -1.0, y: 0.0 });
    assert_eq!(bbox.max(), Coord { x: 4.0, y: 5.0 });
}

#[test]
fn loading_twice_yields_identical_datasets() {
    let dir = tempfile::tempdir().unwrap();
    let base = two_squares(dir.path());
    let first = ShapeDataset::load(&base).unwrap();
    let second = ShapeDataset::load(&base).unwrap();

    let geometries = |ds: &ShapeDataset| {
        ds.records().map(|(record, _)| record.clone()).collect::<Vec<_>>()
    };
    let attributes = |ds: &ShapeDataset| {
        ds.shapes()
            .map(|record| {
                record
                    .iter()
                    .map(|(name, value)| (name.to_owned(), value.clone()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(geometries(&first), geometries(&second));
    assert_eq!(attributes(&first), attributes(&second));

    for point in [Point::new(0.5, 0.5), Point::new(2.0, 0.5), Point::new(9.0, 9.0)] {
        assert_eq!(first.containing(point), second.containing(point));
        assert_eq!(first.containing_or_closest(point), second.containing_or_closest(point));
    }
}

#[test]
fn sequential_scan_matches_indexed_load() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![
        polygon_record(&[square(0.0, 0.0, 1.0)]),
        null_record(),
        polygon_record(&[square(3.0, 0.0, 1.0), hole(3.25, 0.25, 0.5)]),
    ];
    let shp = build_shp(&contents);
    let dbf = name_dbf(&["a", "b", "c"]);

    let indexed = ShapeDataset::load(write_dataset(
        dir.path(),
        "indexed",
        &shp,
        Some(&build_shx(&contents)),
        &dbf,
    ))
    .unwrap();
    let scanned =
        ShapeDataset::load(write_dataset(dir.path(), "scanned", &shp, None, &dbf)).unwrap();

    assert_eq!(indexed.len(), scanned.len());
    let shapes = |ds: &ShapeDataset| {
        ds.records().map(|(record, _)| record.clone()).collect::<Vec<_>>()
    };
    assert_eq!(shapes(&indexed), shapes(&scanned));
    for point in [Point::new(0.5, 0.5), Point::new(3.5, 0.5), Point::new(2.0, 0.0)] {
        assert_eq!(indexed.containing(point), scanned.containing(point));
        assert_eq!(indexed.containing_or_closest(point), scanned.containing_or_closest(point));
    }
}

#[test]
fn index_covering_a_prefix_degrades_to_scan() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![
        polygon_record(&[square(0.0, 0.0, 1.0)]),
        polygon_record(&[square(3.0, 0.0, 1.0)]),
    ];
    // An index built for only the first record parses cleanly but covers a
    // prefix of the stream; the load must scan instead, not drop the rest.
    let base = write_dataset(
        dir.path(),
        "shortshx",
        &build_shp(&contents),
        Some(&build_shx(&contents[..1])),
        &name_dbf(&["alpha", "beta"]),
    );
    let dataset = ShapeDataset::load(base).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.containing(Point::new(3.5, 0.5)).len(), 1);
    assert!(dataset.last_error_message().unwrap().contains("fell back"));
}

#[test]
fn garbage_index_file_degrades_to_scan() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![polygon_record(&[square(0.0, 0.0, 1.0)])];
    let base = write_dataset(
        dir.path(),
        "badshx",
        &build_shp(&contents),
        Some(b"not an index"),
        &name_dbf(&["a"]),
    );
    let dataset = ShapeDataset::load(base).unwrap();

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.containing(Point::new(0.5, 0.5)).len(), 1);
    assert!(dataset.last_error_message().unwrap().contains("shape index"));
}

#[test]
fn missing_geometry_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("nothing");
    std::fs::write(base.with_extension("dbf"), name_dbf(&[])).unwrap();

    match ShapeDataset::load(&base) {
        Err(LoadError::MissingFile { path }) => {
            assert_eq!(path.extension().unwrap(), "shp");
        }
        other => panic!("expected MissingFile, got {other:?}"),
    }
}

#[test]
fn missing_attribute_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![polygon_record(&[square(0.0, 0.0, 1.0)])];
    let base = dir.path().join("lonely");
    std::fs::write(base.with_extension("shp"), build_shp(&contents)).unwrap();

    assert!(matches!(
        ShapeDataset::load(&base),
        Err(LoadError::MissingFile { .. })
    ));
}

#[test]
fn record_count_mismatch_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![
        polygon_record(&[square(0.0, 0.0, 1.0)]),
        polygon_record(&[square(3.0, 0.0, 1.0)]),
    ];
    let base = write_dataset(
        dir.path(),
        "mismatch",
        &build_shp(&contents),
        None,
        &name_dbf(&["only one"]),
    );

    assert!(matches!(
        ShapeDataset::load(base),
        Err(LoadError::CountMismatch { shapes: 2, rows: 1 })
    ));
}

#[test]
fn malformed_record_degrades_without_failing_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut broken = polygon_record(&[square(0.0, 0.0, 1.0)]);
    broken[40..44].copy_from_slice(&1_000_000i32.to_le_bytes()); // absurd point count
    let contents = vec![broken, polygon_record(&[square(3.0, 0.0, 1.0)])];
    let base = write_dataset(
        dir.path(),
        "degraded",
        &build_shp(&contents),
        None,
        &name_dbf(&["bad", "good"]),
    );
    let dataset = ShapeDataset::load(base).unwrap();

    assert_eq!(dataset.len(), 2);
    let records: Vec<_> = dataset.records().map(|(record, _)| record.clone()).collect();
    assert!(records[0].is_empty());
    assert!(!records[1].is_empty());
    assert!(dataset.last_error_message().is_some());
    // The degraded record still answers queries as an empty shape.
    assert!(dataset.containing(Point::new(0.5, 0.5)).is_empty());
    assert_eq!(dataset.containing(Point::new(3.5, 0.5)).len(), 1);
}

#[test]
fn deleted_rows_stay_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![
        polygon_record(&[square(0.0, 0.0, 1.0)]),
        polygon_record(&[square(3.0, 0.0, 1.0)]),
    ];
    let dbf = build_dbf(
        &[("NAME", b'C', 10, 0)],
        &[
            (0x20, vec![b"alive".to_vec()]),
            (b'*', vec![b"gone".to_vec()]),
        ],
        0x57,
    );
    let base = write_dataset(dir.path(), "deleted", &build_shp(&contents), None, &dbf);
    let dataset = ShapeDataset::load(base).unwrap();

    assert_eq!(dataset.len(), 2);
    let live = dataset.matching(|record| !record.is_deleted());
    assert_eq!(live.into_iter().collect::<Vec<_>>(), vec![0]);
    // Geometry of the soft-deleted row is still index-aligned.
    assert_eq!(
        dataset.containing(Point::new(3.5, 0.5)).into_iter().collect::<Vec<_>>(),
        vec![1]
    );
}

#[test]
fn undecodable_attribute_text_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![polygon_record(&[square(0.0, 0.0, 1.0)])];
    // 0xFF is not a valid Shift-JIS (language driver 0x13) lead byte.
    let dbf = build_dbf(
        &[("NAME", b'C', 4, 0)],
        &[(0x20, vec![vec![0xFF, 0xFF]])],
        0x13,
    );
    let base = write_dataset(dir.path(), "mojibake", &build_shp(&contents), None, &dbf);

    assert!(matches!(
        ShapeDataset::load(base),
        Err(LoadError::Encoding(_))
    ));
}

#[test]
fn typed_attribute_values_survive_load() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![polygon_record(&[square(0.0, 0.0, 1.0)])];
    let dbf = build_dbf(
        &[("NAME", b'C', 8, 0), ("POP", b'N', 6, 0), ("DENSITY", b'N', 8, 2)],
        &[(0x20, vec![b"alpha".to_vec(), b"  1234".to_vec(), b"   12.50".to_vec()])],
        0x57,
    );
    let base = write_dataset(dir.path(), "typed", &build_shp(&contents), None, &dbf);
    let dataset = ShapeDataset::load(base).unwrap();

    let record = dataset.shapes().next().unwrap();
    assert_eq!(record.get("POP"), Some(&AttributeValue::Integer(1234)));
    assert_eq!(record.get("DENSITY"), Some(&AttributeValue::Numeric(12.5)));
    let populous = dataset.matching(|r| {
        r.get("POP").and_then(AttributeValue::as_i64).is_some_and(|n| n > 1000)
    });
    assert_eq!(populous.len(), 1);
}

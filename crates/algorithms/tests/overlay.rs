//! End-to-end overlay tests exercising both engines through the public API.

use geo::{Area, Geometry, LineString, Polygon};
use stratagis_algorithms::prelude::*;
use stratagis_core::crs::wgs84_to_web_mercator;

fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Geometry<f64> {
    Geometry::Polygon(Polygon::new(
        LineString::from(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
        ]),
        vec![],
    ))
}

fn collection(columns: &[&str], features: Vec<Feature>) -> FeatureCollection {
    let mut fc = FeatureCollection::with_columns(
        CRS::wgs84(),
        columns.iter().map(|c| c.to_string()).collect(),
    );
    for feature in features {
        fc.push(feature);
    }
    fc
}

/// A = unit-attributed square (0,0)-(2,2), B = square (1,1)-(3,3); they
/// overlap in the unit square (1,1)-(2,2).
fn overlapping_inputs() -> (FeatureCollection, FeatureCollection) {
    let a = collection(&["v"], vec![Feature::new(square(0.0, 0.0, 2.0, 2.0)).with("v", 1i64)]);
    let b = collection(&["v"], vec![Feature::new(square(1.0, 1.0, 3.0, 3.0)).with("v", 2i64)]);
    (a, b)
}

fn total_area(fc: &FeatureCollection) -> f64 {
    fc.iter().map(|f| f.geometry.unsigned_area()).sum()
}

fn with_engine(mode: OverlayMode, engine: OverlayEngine) -> OverlayParams {
    OverlayParams {
        mode,
        engine,
        ..OverlayParams::default()
    }
}

#[test]
fn test_intersection_of_overlapping_squares() {
    let (a, b) = overlapping_inputs();
    let out = overlay(&a, &b, OverlayMode::Intersection).unwrap();

    assert_eq!(out.columns, vec!["v_1".to_string(), "v_2".to_string()]);
    assert_eq!(out.len(), 1);
    assert!((total_area(&out) - 1.0).abs() < 1e-9);
    assert_eq!(out.features[0].get("v_1"), Some(&AttributeValue::Int(1)));
    assert_eq!(out.features[0].get("v_2"), Some(&AttributeValue::Int(2)));
}

#[test]
fn test_union_of_overlapping_squares() {
    let (a, b) = overlapping_inputs();
    let out = overlay(&a, &b, OverlayMode::Union).unwrap();

    assert_eq!(out.len(), 3);
    assert!((total_area(&out) - 7.0).abs() < 1e-9);

    let both = out
        .iter()
        .filter(|f| !f.is_null("v_1") && !f.is_null("v_2"))
        .count();
    let a_only = out
        .iter()
        .filter(|f| !f.is_null("v_1") && f.is_null("v_2"))
        .count();
    let b_only = out
        .iter()
        .filter(|f| f.is_null("v_1") && !f.is_null("v_2"))
        .count();
    assert_eq!((both, a_only, b_only), (1, 1, 1));
}

#[test]
fn test_symmetric_difference_of_overlapping_squares() {
    let (a, b) = overlapping_inputs();
    let out = overlay(&a, &b, OverlayMode::SymmetricDifference).unwrap();

    assert_eq!(out.len(), 2);
    assert!((total_area(&out) - 6.0).abs() < 1e-9);
    for feature in out.iter() {
        // Exactly one side contributes attributes to each remainder
        assert_ne!(feature.is_null("v_1"), feature.is_null("v_2"));
    }
}

#[test]
fn test_difference_keeps_only_left_schema() {
    let (a, b) = overlapping_inputs();
    let out = overlay(&a, &b, OverlayMode::Difference).unwrap();

    assert_eq!(out.columns, vec!["v".to_string()]);
    assert_eq!(out.len(), 1);
    assert!((total_area(&out) - 3.0).abs() < 1e-9);
    assert_eq!(out.features[0].get("v"), Some(&AttributeValue::Int(1)));
}

#[test]
fn test_identity_covers_left_input_exactly() {
    let a = collection(&["v"], vec![Feature::new(square(0.0, 0.0, 2.0, 2.0)).with("v", 1i64)]);
    let b = collection(&["w"], vec![Feature::new(square(1.0, 1.0, 3.0, 3.0)).with("w", 2i64)]);
    let out = overlay(&a, &b, OverlayMode::Identity).unwrap();

    // Intersection piece plus the A-only remainder; B-only remainder dropped
    assert_eq!(out.len(), 2);
    assert!((total_area(&out) - 4.0).abs() < 1e-9);
    for feature in out.iter() {
        assert!(!feature.is_null("v"));
    }
}

#[test]
fn test_union_rows_split_into_intersection_and_remainders() {
    let (a, b) = overlapping_inputs();
    let union = overlay(&a, &b, OverlayMode::Union).unwrap();
    let inter = overlay(&a, &b, OverlayMode::Intersection).unwrap();
    let sym = overlay(&a, &b, OverlayMode::SymmetricDifference).unwrap();

    assert_eq!(union.len(), inter.len() + sym.len());
    assert!((total_area(&union) - total_area(&inter) - total_area(&sym)).abs() < 1e-9);
}

#[test]
fn test_polygonize_engine_matches_clip_engine() {
    let (a, b) = overlapping_inputs();
    for mode in [
        OverlayMode::Intersection,
        OverlayMode::Union,
        OverlayMode::Difference,
        OverlayMode::SymmetricDifference,
        OverlayMode::Identity,
    ] {
        let clip = overlay_with(&a, &b, with_engine(mode, OverlayEngine::Clip)).unwrap();
        let poly = overlay_with(&a, &b, with_engine(mode, OverlayEngine::Polygonize)).unwrap();
        assert!(
            (total_area(&clip) - total_area(&poly)).abs() < 1e-9,
            "area mismatch for {mode}"
        );
    }
}

#[test]
fn test_polygonize_intersection_attributes() {
    let (a, b) = overlapping_inputs();
    let out = overlay_with(
        &a,
        &b,
        with_engine(OverlayMode::Intersection, OverlayEngine::Polygonize),
    )
    .unwrap();

    assert_eq!(out.columns, vec!["v_1".to_string(), "v_2".to_string()]);
    assert_eq!(out.len(), 1);
    assert!((total_area(&out) - 1.0).abs() < 1e-9);
    assert_eq!(out.features[0].get("v_1"), Some(&AttributeValue::Int(1)));
    assert_eq!(out.features[0].get("v_2"), Some(&AttributeValue::Int(2)));
}

#[test]
fn test_disjoint_inputs() {
    let a = collection(&["v"], vec![Feature::new(square(0.0, 0.0, 1.0, 1.0)).with("v", 1i64)]);
    let b = collection(&["w"], vec![Feature::new(square(5.0, 5.0, 6.0, 6.0)).with("w", 2i64)]);

    let inter = overlay(&a, &b, OverlayMode::Intersection).unwrap();
    assert_eq!(inter.len(), 0);
    assert_eq!(inter.columns, vec!["v".to_string(), "w".to_string()]);

    let union = overlay(&a, &b, OverlayMode::Union).unwrap();
    assert_eq!(union.len(), a.len() + b.len());
    assert!((total_area(&union) - 2.0).abs() < 1e-9);
}

#[test]
fn test_multiple_left_features_fan_out() {
    let a = collection(
        &["v"],
        vec![
            Feature::new(square(0.0, 0.0, 2.0, 2.0)).with("v", 1i64),
            Feature::new(square(3.0, 0.0, 5.0, 2.0)).with("v", 2i64),
        ],
    );
    let b = collection(&["w"], vec![Feature::new(square(1.0, 0.0, 4.0, 2.0)).with("w", 9i64)]);

    let out = overlay(&a, &b, OverlayMode::Intersection).unwrap();
    assert_eq!(out.len(), 2);
    assert!((total_area(&out) - 2.0).abs() < 1e-9);
    // Row order follows left-feature order
    assert_eq!(out.features[0].get("v"), Some(&AttributeValue::Int(1)));
    assert_eq!(out.features[1].get("v"), Some(&AttributeValue::Int(2)));
}

#[test]
fn test_self_intersecting_input_is_repaired() {
    // Bowtie ring crossing itself at (1,1); both lobes survive repair
    let bowtie = Geometry::Polygon(Polygon::new(
        LineString::from(vec![(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0), (0.0, 0.0)]),
        vec![],
    ));
    let a = collection(&["v"], vec![Feature::new(bowtie).with("v", 1i64)]);
    let b = collection(&["w"], vec![Feature::new(square(-1.0, -1.0, 3.0, 3.0)).with("w", 2i64)]);

    let clip = overlay_with(
        &a,
        &b,
        with_engine(OverlayMode::Intersection, OverlayEngine::Clip),
    )
    .unwrap();
    let poly = overlay_with(
        &a,
        &b,
        with_engine(OverlayMode::Intersection, OverlayEngine::Polygonize),
    )
    .unwrap();

    assert!((total_area(&clip) - 2.0).abs() < 1e-9);
    assert!((total_area(&clip) - total_area(&poly)).abs() < 1e-9);
}

#[test]
fn test_self_overlay_intersection_preserves_areas() {
    let a = collection(
        &["v"],
        vec![
            Feature::new(square(0.0, 0.0, 2.0, 2.0)).with("v", 1i64),
            Feature::new(square(5.0, 5.0, 7.0, 7.0)).with("v", 2i64),
        ],
    );
    let out = overlay(&a, &a, OverlayMode::Intersection).unwrap();

    assert_eq!(out.len(), a.len());
    for (original, row) in a.iter().zip(out.iter()) {
        assert!(
            (row.geometry.unsigned_area() - original.geometry.unsigned_area()).abs() < 1e-9
        );
    }
    assert!((total_area(&out) - total_area(&a)).abs() < 1e-9);
}

#[test]
fn test_difference_rejects_non_polygonal_even_when_disjoint() {
    // A point feature far from B never pairs, but must not pass through
    let a = collection(
        &["v"],
        vec![Feature::new(Geometry::Point(geo::Point::new(50.0, 50.0))).with("v", 1i64)],
    );
    let b = collection(&["w"], vec![Feature::new(square(0.0, 0.0, 1.0, 1.0)).with("w", 2i64)]);

    let diff = overlay(&a, &b, OverlayMode::Difference);
    assert!(matches!(
        diff,
        Err(Error::UnsupportedGeometryType { found: "Point" })
    ));

    let sym = overlay(&a, &b, OverlayMode::SymmetricDifference);
    assert!(matches!(
        sym,
        Err(Error::UnsupportedGeometryType { found: "Point" })
    ));
}

#[test]
fn test_colliding_column_names_are_suffixed() {
    let (a, b) = overlapping_inputs();
    let out = overlay(&a, &b, OverlayMode::Union).unwrap();
    assert_eq!(out.columns, vec!["v_1".to_string(), "v_2".to_string()]);
}

#[test]
fn test_invalid_mode_string() {
    let err = "bogus".parse::<OverlayMode>();
    assert!(matches!(err, Err(Error::InvalidMode(ref m)) if m == "bogus"));
}

#[test]
fn test_polygonize_engine_rejects_non_polygonal() {
    let a = collection(&["v"], vec![Feature::new(square(0.0, 0.0, 1.0, 1.0)).with("v", 1i64)]);
    let b = collection(
        &["w"],
        vec![Feature::new(Geometry::Point(geo::Point::new(0.5, 0.5))).with("w", 2i64)],
    );

    let err = overlay_with(
        &a,
        &b,
        with_engine(OverlayMode::Intersection, OverlayEngine::Polygonize),
    );
    assert!(matches!(
        err,
        Err(Error::UnsupportedGeometryType { found: "Point" })
    ));
}

#[test]
fn test_reprojects_right_input() {
    let a = collection(&["v"], vec![Feature::new(square(0.0, 0.0, 1.0, 1.0)).with("v", 1i64)]);

    // Same half-overlapping square, expressed in Web Mercator metres
    let corners: Vec<(f64, f64)> = [(0.5, 0.5), (1.5, 0.5), (1.5, 1.5), (0.5, 1.5), (0.5, 0.5)]
        .iter()
        .map(|&(x, y)| {
            let c = wgs84_to_web_mercator(geo::Coord { x, y });
            (c.x, c.y)
        })
        .collect();
    let mut b = FeatureCollection::with_columns(CRS::web_mercator(), vec!["w".to_string()]);
    b.push(
        Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(corners),
            vec![],
        )))
        .with("w", 2i64),
    );

    let out = overlay(&a, &b, OverlayMode::Intersection).unwrap();
    assert!(out.crs.is_equivalent(&CRS::wgs84()));
    assert_eq!(out.len(), 1);
    assert!((total_area(&out) - 0.25).abs() < 1e-6);
}

#[test]
fn test_reproject_disabled_compares_raw_coordinates() {
    let a = collection(&["v"], vec![Feature::new(square(0.0, 0.0, 1.0, 1.0)).with("v", 1i64)]);
    let mut b = FeatureCollection::with_columns(CRS::web_mercator(), vec!["w".to_string()]);
    b.push(Feature::new(square(100_000.0, 100_000.0, 200_000.0, 200_000.0)).with("w", 2i64));

    let params = OverlayParams {
        mode: OverlayMode::Intersection,
        reproject: false,
        ..OverlayParams::default()
    };
    let out = overlay_with(&a, &b, params).unwrap();
    assert_eq!(out.len(), 0);
}

#[test]
fn test_unsupported_reprojection_pair() {
    let a = collection(&["v"], vec![Feature::new(square(0.0, 0.0, 1.0, 1.0)).with("v", 1i64)]);
    let mut b = FeatureCollection::with_columns(CRS::from_epsg(32633), vec!["w".to_string()]);
    b.push(Feature::new(square(0.0, 0.0, 1.0, 1.0)).with("w", 2i64));

    let err = overlay(&a, &b, OverlayMode::Intersection);
    assert!(matches!(err, Err(Error::CrsMismatch(_, _))));
}

#[test]
fn test_empty_left_input() {
    let a = collection(&["v"], vec![]);
    let b = collection(&["w"], vec![Feature::new(square(0.0, 0.0, 1.0, 1.0)).with("w", 2i64)]);

    let inter = overlay(&a, &b, OverlayMode::Intersection).unwrap();
    assert!(inter.is_empty());
    assert_eq!(inter.columns, vec!["v".to_string(), "w".to_string()]);

    let union = overlay(&a, &b, OverlayMode::Union).unwrap();
    assert_eq!(union.len(), 1);
    assert!((total_area(&union) - 1.0).abs() < 1e-9);

    let diff = overlay(&a, &b, OverlayMode::Difference).unwrap();
    assert!(diff.is_empty());
}

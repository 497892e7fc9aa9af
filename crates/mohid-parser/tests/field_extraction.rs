//! Integration tests: write synthetic MOHID files and extract time, grid,
//! bathymetry and fields from them.

use mohid_parser::{MohidDataset, MohidError};
use ndarray::{arr2, ArrayD, IxDyn};
use test_utils::{
    assert_all_approx_eq, boundary_axis, cell_value, create_constant_field, create_test_field_2d,
    grid, MohidFileBuilder,
};

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_land_cell_masked_everywhere() {
    // 2 steps, 3x3 bounds (2x2 cells), land at lon=1, lat=0
    let fixture = MohidFileBuilder::new()
        .hourly_times(2)
        .land_cell(1, 0)
        .field_2d("temperature")
        .build()
        .expect("Failed to write MOHID file");
    let dataset = MohidDataset::open(fixture.path()).expect("Failed to open dataset");

    let bathymetry = dataset.bathymetry().unwrap();
    assert_eq!(bathymetry.shape(), &[2, 2]);
    assert_eq!(bathymetry.count_masked(), 1);
    assert!(bathymetry.is_masked([0, 1]));
    assert_eq!(bathymetry.get([1, 0]), Some(grid::WATER_DEPTH));

    let field = dataset.results_field("temperature", 0).unwrap();
    assert_eq!(field.shape(), &[2, 2, 2]);
    assert_eq!(field.count_masked(), 2);
    for step in 0..2 {
        assert!(field.is_masked([step, 0, 1]), "land cell open at step {}", step);
        assert!(!field.is_masked([step, 1, 0]));
    }
}

// ============================================================================
// Time
// ============================================================================

#[test]
fn test_time_matches_member_count() {
    let fixture = MohidFileBuilder::new().hourly_times(3).build().unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let times = dataset.time().unwrap();
    assert_eq!(times.len(), dataset.members("/Time").unwrap().len());
    assert_eq!(times[0].to_string(), "2025-04-25 12:00:00");
    assert_eq!(times[2].to_string(), "2025-04-25 14:00:00");
    assert!(mohid_common::is_chronological(&times));
}

#[test]
fn test_time_unpadded_counters_stay_chronological() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(12)
        .counter_digits(0)
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let members = dataset.members("/Time").unwrap();
    assert_eq!(members[1], "Time_2");
    assert_eq!(members[11], "Time_12");

    let times = dataset.time().unwrap();
    assert_eq!(times.len(), 12);
    assert!(mohid_common::is_chronological(&times));
    assert_eq!(times[11].to_string(), "2025-04-25 23:00:00");
}

#[test]
fn test_time_empty_group() {
    let fixture = MohidFileBuilder::new().hourly_times(0).build().unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(dataset.time().unwrap().is_empty());
}

#[test]
fn test_time_missing_group() {
    let fixture = MohidFileBuilder::new().omit("/Time").build().unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(matches!(
        dataset.time().unwrap_err(),
        MohidError::FieldNotFound { .. }
    ));
}

#[test]
fn test_time_wrong_length_record() {
    let fixture = MohidFileBuilder::new()
        .times(vec![vec![2025.0, 4.0, 25.0, 12.0, 0.0]])
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    match dataset.time().unwrap_err() {
        MohidError::MalformedTimeRecord { member, .. } => assert_eq!(member, "Time_00001"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_time_non_integral_record() {
    let fixture = MohidFileBuilder::new()
        .times(vec![vec![2025.0, 4.0, 25.0, 12.5, 0.0, 0.0]])
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(matches!(
        dataset.time().unwrap_err(),
        MohidError::MalformedTimeRecord { .. }
    ));
}

// ============================================================================
// Grid and bathymetry
// ============================================================================

#[test]
fn test_grid_bounds_from_meshes() {
    let latitude = boundary_axis(37.0, 0.25, 4);
    let longitude = boundary_axis(-9.0, 0.5, 3);
    let fixture = MohidFileBuilder::new()
        .grid(latitude.clone(), longitude.clone())
        .hourly_times(1)
        .field_2d("salinity")
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let bounds = dataset.grid().unwrap();
    assert_all_approx_eq!(bounds.latitude, latitude, 1e-12);
    assert_all_approx_eq!(bounds.longitude, longitude, 1e-12);

    // Cell-centred fields are one shorter than the bounds on each axis
    let field = dataset.results_field("salinity", 0).unwrap();
    assert_eq!(field.spatial_shape(), (3, 2));
    assert_eq!(field.spatial_shape(), bounds.cell_shape());
}

#[test]
fn test_grid_missing_latitude() {
    let fixture = MohidFileBuilder::new().omit("/Grid/Latitude").build().unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    match dataset.grid().unwrap_err() {
        MohidError::MissingGrid { member, .. } => assert_eq!(member, "/Grid/Latitude"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_bathymetry_missing() {
    let fixture = MohidFileBuilder::new().omit("/Grid/Bathymetry").build().unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(matches!(
        dataset.bathymetry().unwrap_err(),
        MohidError::MissingGrid { .. }
    ));
}

#[test]
fn test_bathymetry_sentinel_is_inclusive() {
    // stored (lon, lat)
    let stored = arr2(&[[-98.0, -97.9], [-150.0, 12.0]]);
    let fixture = MohidFileBuilder::new().bathymetry(stored).build().unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let bathymetry = dataset.bathymetry().unwrap();
    // (lat, lon) after transposition
    assert!(bathymetry.is_masked([0, 0]));
    assert!(bathymetry.is_masked([0, 1]));
    assert_eq!(bathymetry.get([1, 0]), Some(-97.9));
    assert_eq!(bathymetry.get([1, 1]), Some(12.0));
}

// ============================================================================
// Field orientation and layers
// ============================================================================

#[test]
fn test_field_2d_is_time_lat_lon() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(2)
        .field_2d("temperature")
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let field = dataset.results_field("temperature", 0).unwrap();
    assert!(field.data().is_standard_layout());
    for step in 0..2 {
        for lat in 0..2 {
            for lon in 0..2 {
                assert_eq!(
                    field.get([step, lat, lon]),
                    Some(cell_value(step, 0, lon, lat)),
                    "Mismatch at step {}, lat {}, lon {}",
                    step,
                    lat,
                    lon
                );
            }
        }
    }
}

#[test]
fn test_field_3d_surface_is_last_stored_layer() {
    let depth = 3;
    let fixture = MohidFileBuilder::new()
        .hourly_times(2)
        .open_points_3d(depth)
        .field_3d("temperature", depth)
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let surface = dataset.results_field("temperature", 0).unwrap();
    let bottom = dataset.results_field("temperature", depth - 1).unwrap();
    assert_eq!(surface.shape(), &[2, 2, 2]);
    for step in 0..2 {
        assert_eq!(surface.get([step, 1, 0]), Some(cell_value(step, depth - 1, 0, 1)));
        assert_eq!(bottom.get([step, 1, 0]), Some(cell_value(step, 0, 0, 1)));
    }
}

#[test]
fn test_field_3d_layer_out_of_range() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .open_points_3d(3)
        .field_3d("temperature", 3)
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    match dataset.results_field("temperature", 3).unwrap_err() {
        MohidError::LayerOutOfRange { layer, depth, .. } => {
            assert_eq!(layer, 3);
            assert_eq!(depth, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_field_2d_ignores_layer() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(2)
        .field_2d("temperature")
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let surface = dataset.results_field("temperature", 0).unwrap();
    let deep = dataset.results_field("temperature", 7).unwrap();
    assert_eq!(surface, deep);
}

#[test]
fn test_field_2d_on_3d_open_points_uses_surface_mask() {
    let depth = 2;
    // Bottom layer closes every cell; the surface closes only lon=0, lat=0
    let step = ArrayD::from_shape_vec(IxDyn(&[depth, 2, 2]), vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0])
        .unwrap();
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .open_points(vec![step])
        .field_2d("temperature")
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let field = dataset.results_field("temperature", 0).unwrap();
    assert_eq!(field.count_masked(), 1);
    assert!(field.is_masked([0, 0, 0]));
}

#[test]
fn test_field_3d_mask_follows_selected_layer() {
    let depth = 3;
    // Stored (depth, lon, lat), bottom first. The bottom closes lon=1, lat=0;
    // the top closes lon=0, lat=1; the middle is all water.
    let mut values = vec![1.0; depth * 4];
    values[2] = 0.0;
    values[2 * 4 + 1] = 0.0;
    let step = ArrayD::from_shape_vec(IxDyn(&[depth, 2, 2]), values).unwrap();
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .open_points(vec![step])
        .field_3d("temperature", depth)
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    // output is (time, lat, lon)
    let surface = dataset.results_field("temperature", 0).unwrap();
    assert_eq!(surface.count_masked(), 1);
    assert!(surface.is_masked([0, 1, 0]));
    assert!(!surface.is_masked([0, 0, 1]));

    let middle = dataset.results_field("temperature", 1).unwrap();
    assert_eq!(middle.count_masked(), 0);

    let bottom = dataset.results_field("temperature", depth - 1).unwrap();
    assert_eq!(bottom.count_masked(), 1);
    assert!(bottom.is_masked([0, 0, 1]));
    assert!(!bottom.is_masked([0, 1, 0]));
}

#[test]
fn test_field_3d_open_points_depth_mismatch() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .open_points_3d(2)
        .field_3d("temperature", 3)
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    match dataset.results_field("temperature", 0) {
        Err(MohidError::ShapeMismatch { expected, found, .. }) => {
            assert_eq!(expected, vec![3]);
            assert_eq!(found, vec![2]);
        }
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }
}

#[test]
fn test_field_extraction_is_idempotent() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(2)
        .land_cell(0, 1)
        .open_points_3d(2)
        .field_3d("velocity U", 2)
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let first = dataset.results_field("velocity U", 1).unwrap();
    let second = dataset.results_field("velocity U", 1).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.count_masked(), 2);
}

#[test]
fn test_field_by_full_group_path() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .field_2d("temperature")
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let by_name = dataset.results_field("temperature", 0).unwrap();
    let by_path = dataset.field("/Results/temperature", 0).unwrap();
    assert_eq!(by_name, by_path);
}

#[test]
fn test_list_results() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .field_2d("salinity")
        .field_2d("temperature")
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let mut results = dataset.list_results().unwrap();
    results.sort();
    assert_eq!(results, vec!["salinity".to_string(), "temperature".to_string()]);
}

// ============================================================================
// OpenPoints tolerance
// ============================================================================

#[test]
fn test_non_binary_open_points_below_one_are_masked() {
    let step = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, 0.5, 2.0, -1.0]).unwrap();
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .open_points(vec![step])
        .field_2d("temperature")
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    let field = dataset.results_field("temperature", 0).unwrap();
    // stored (lon, lat) -> output (lat, lon)
    assert!(!field.is_masked([0, 0, 0]));
    assert!(field.is_masked([0, 1, 0]));
    assert!(!field.is_masked([0, 0, 1]));
    assert!(field.is_masked([0, 1, 1]));
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_missing_field() {
    let fixture = MohidFileBuilder::new().hourly_times(1).build().unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();

    match dataset.results_field("oxygen", 0).unwrap_err() {
        MohidError::FieldNotFound { group, .. } => assert_eq!(group, "/Results/oxygen"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dataset_is_not_a_field_group() {
    let fixture = MohidFileBuilder::new().hourly_times(1).build().unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(matches!(
        dataset.field("/Grid/Bathymetry", 0).unwrap_err(),
        MohidError::FieldNotFound { .. }
    ));
}

#[test]
fn test_empty_field_group() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .field("temperature", Vec::new())
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(matches!(
        dataset.results_field("temperature", 0).unwrap_err(),
        MohidError::EmptyField { .. }
    ));
}

#[test]
fn test_missing_open_points() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(1)
        .field_2d("temperature")
        .omit("/Grid/OpenPoints")
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(matches!(
        dataset.results_field("temperature", 0).unwrap_err(),
        MohidError::MissingGrid { .. }
    ));
}

#[test]
fn test_open_points_step_count_mismatch() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(2)
        .field(
            "temperature",
            (0..3).map(|step| create_test_field_2d(step, 2, 2)).collect(),
        )
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(matches!(
        dataset.results_field("temperature", 0).unwrap_err(),
        MohidError::ShapeMismatch { .. }
    ));
}

#[test]
fn test_ragged_steps() {
    let fixture = MohidFileBuilder::new()
        .hourly_times(2)
        .field(
            "temperature",
            vec![create_constant_field(&[2, 2], 1.0), create_constant_field(&[2, 3], 1.0)],
        )
        .build()
        .unwrap();
    let dataset = MohidDataset::open(fixture.path()).unwrap();
    assert!(matches!(
        dataset.results_field("temperature", 0).unwrap_err(),
        MohidError::ShapeMismatch { .. }
    ));
}

#[test]
fn test_open_missing_file() {
    assert!(matches!(
        MohidDataset::open("/nonexistent/MOHID.hdf5").unwrap_err(),
        MohidError::DatasetNotFound { .. }
    ));
}

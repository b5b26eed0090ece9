//! Unit ↔ voxel mapping on a realistic confocal geometry.
//!
//! Extents and sizes come from a 255×254×69 neuron stack; the positions are
//! spot centers picked inside it.

use approx::assert_abs_diff_eq;
use imaris_kit::{
    CoordinateMapper, ElementKind, Error, Extents, MemoryDataset, Sizes, VolumeAccessor,
};
use ndarray::{array, Array2};

fn neuron_extents() -> Extents {
    Extents::new(-0.1140, 57.8398, -0.1140, 57.8398, -0.1510, 20.6310)
}

fn neuron_sizes() -> Sizes {
    Sizes::new(255, 254, 69, 1, 1)
}

fn spot_positions() -> Array2<f32> {
    array![
        [18.5396, 1.4178, 8.7341],
        [39.6139, 14.8819, 9.0352],
        [35.1155, 9.4574, 9.0352],
        [12.3907, 21.6221, 11.7459],
    ]
}

fn neuron_accessor() -> VolumeAccessor<MemoryDataset> {
    let dataset =
        MemoryDataset::with_geometry(ElementKind::UInt8, neuron_sizes(), neuron_extents())
            .expect("dataset");
    VolumeAccessor::new(dataset)
}

#[test]
fn test_voxel_sizes() {
    let accessor = neuron_accessor();
    let v = accessor.voxel_sizes().unwrap();
    assert_abs_diff_eq!(v.x, 0.2273, epsilon = 1e-4);
    assert_abs_diff_eq!(v.y, 0.2282, epsilon = 1e-4);
    assert_abs_diff_eq!(v.z, 0.3012, epsilon = 1e-4);
    assert_eq!(accessor.extents().unwrap(), neuron_extents());
    assert_eq!(accessor.coordinate_mapper().unwrap().voxel_size(), v);
}

#[test]
fn test_units_voxels_round_trip() {
    let accessor = neuron_accessor();
    let positions = spot_positions();

    let voxels = accessor.units_to_voxels(positions.view()).unwrap();
    assert_eq!(voxels.dim(), (4, 3));
    let units = accessor.voxels_to_units(voxels.view()).unwrap();

    assert_abs_diff_eq!(units, positions, epsilon = 1e-4);
}

#[test]
fn test_units_to_voxels_values() {
    let mapper = CoordinateMapper::new(&neuron_extents(), &neuron_sizes()).unwrap();
    let voxels = mapper.units_to_voxels(spot_positions().view()).unwrap();
    let v = mapper.voxel_size();

    // first spot, by hand
    assert_abs_diff_eq!(voxels[[0, 0]], (18.5396 + 0.1140) / v.x + 0.5, epsilon = 1e-3);
    assert_abs_diff_eq!(voxels[[0, 1]], (1.4178 + 0.1140) / v.y + 0.5, epsilon = 1e-3);
    assert_abs_diff_eq!(voxels[[0, 2]], (8.7341 + 0.1510) / v.z + 0.5, epsilon = 1e-3);
}

#[test]
fn test_round_trip_on_arbitrary_grid() {
    let extents = Extents::new(-3.0, 5.0, 10.0, 11.0, 0.0, 100.0);
    let mapper = CoordinateMapper::new(&extents, &Sizes::new(7, 13, 3, 2, 5)).unwrap();
    let voxels = array![[0.0f32, 0.0, 0.0], [6.5, 12.5, 2.5], [-1.0, 100.0, 0.25]];
    let back = mapper
        .units_to_voxels(mapper.voxels_to_units(voxels.view()).unwrap().view())
        .unwrap();
    assert_abs_diff_eq!(back, voxels, epsilon = 1e-4);
}

#[test]
fn test_requires_dataset() {
    let accessor = VolumeAccessor::new(MemoryDataset::new());
    let err = accessor.units_to_voxels(spot_positions().view()).unwrap_err();
    assert_eq!(err, Error::NoDataset);
    assert_eq!(
        accessor.voxels_to_units(spot_positions().view()).unwrap_err(),
        Error::NoDataset
    );
}

#[test]
fn test_rejects_wrong_width() {
    let accessor = neuron_accessor();
    let four_wide = Array2::<f32>::zeros((2, 4));
    assert!(matches!(
        accessor.units_to_voxels(four_wide.view()),
        Err(Error::InvalidArgument(_))
    ));
}

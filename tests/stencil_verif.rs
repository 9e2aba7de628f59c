use vfrom_rs::discretization::generator::{create_cartesian_mesh, create_flat_mesh};
use vfrom_rs::discretization::MeshTopology;
use vfrom_rs::fields::assign::assign_one;
use vfrom_rs::fields::ScalarField;
use vfrom_rs::numerics::{stencil, stencil_pair};
use vfrom_rs::RomError;

#[test]
fn corner_cell_two_layers() {
    let mesh = create_flat_mesh([5.0, 5.0], 5, 5, 1.0);
    let cells = stencil(&mesh, 0, 2).unwrap();
    assert_eq!(cells, vec![0, 1, 5, 2, 6, 10]);
}

#[test]
fn stencil_grows_with_layers_until_the_mesh_is_covered() {
    let mesh = create_cartesian_mesh([1.0, 1.0, 1.0], [4, 4, 4]);
    let centre = 1 + 4 + 16;

    let mut previous = stencil(&mesh, centre, 0).unwrap();
    assert_eq!(previous, vec![centre]);
    for layers in 1..=8 {
        let cells = stencil(&mesh, centre, layers).unwrap();
        assert!(cells.starts_with(&previous), "layer {layers} reordered earlier cells");
        assert!(cells.len() >= previous.len());
        previous = cells;
    }

    let mut sorted = previous.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), previous.len(), "duplicate cells in stencil");
    assert_eq!(sorted.len(), mesh.num_cells());
}

#[test]
fn pair_of_opposite_corners() {
    let mesh = create_flat_mesh([3.0, 3.0], 3, 3, 1.0);
    let cells = stencil_pair(&mesh, 0, 8, 1).unwrap();
    assert_eq!(cells, vec![0, 1, 3, 8, 5, 7]);

    // overlapping neighbourhoods are merged without repeats
    let cells = stencil_pair(&mesh, 3, 5, 1).unwrap();
    assert_eq!(cells, vec![3, 0, 4, 6, 5, 2, 8]);
}

#[test]
fn indicator_field_marks_the_stencil() {
    let mesh = create_flat_mesh([3.0, 3.0], 3, 3, 1.0);
    let cells = stencil(&mesh, 4, 1).unwrap();

    let mut indicator = ScalarField::zeros("stencil", &mesh);
    assign_one(&mut indicator, &cells).unwrap();
    let marked: Vec<usize> = (0..mesh.num_cells())
        .filter(|&c| indicator.value(c) == 1.0)
        .collect();
    assert_eq!(marked, vec![1, 3, 4, 5, 7]);
}

#[test]
fn invalid_requests() {
    let mesh = create_flat_mesh([3.0, 3.0], 3, 3, 1.0);
    assert!(matches!(stencil(&mesh, 0, -1), Err(RomError::InvalidArgument(_))));
    assert!(matches!(
        stencil(&mesh, 9, 1),
        Err(RomError::IndexOutOfRange { index: 9, len: 9 })
    ));
    assert!(matches!(
        stencil_pair(&mesh, 0, 12, 1),
        Err(RomError::IndexOutOfRange { .. })
    ));
}

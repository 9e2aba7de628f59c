use nalgebra::DMatrix;

use vfrom_rs::discretization::generator::create_flat_mesh;
use vfrom_rs::fields::{FieldSet, ScalarField};
use vfrom_rs::numerics::{
    h1_seminorm, list_errors, mass_matrix, orthonormalize, project_orthogonal, relative_error,
    unvectorize_columns, vectorize_fields, GalerkinProjector, RandomSampler, Tolerances,
};
use vfrom_rs::RomError;

// Affine fields a + b*x + c*y on a 12x8 plate, with (a, b, c) drawn from a
// seeded sampler. The basis {1, x, y} spans every snapshot exactly.
fn affine_case(
    num_snapshots: usize,
) -> (vfrom_rs::discretization::Mesh, FieldSet<f64>, FieldSet<f64>, DMatrix<f64>) {
    let mesh = create_flat_mesh([3.0, 2.0], 12, 8, 0.1);

    let modes: FieldSet<f64> = vec![
        ScalarField::uniform("one", &mesh, 1.0),
        ScalarField::from_fn("x", &mesh, |_, c| c.x),
        ScalarField::from_fn("y", &mesh, |_, c| c.y),
    ]
    .into();

    let bounds = DMatrix::from_row_slice(2, 3, &[0.5, -1.0, 0.0, 2.0, 1.0, 3.0]);
    let params = RandomSampler::seeded(42)
        .uniform_columns(num_snapshots, &bounds)
        .unwrap();
    let snapshots: FieldSet<f64> = params
        .row_iter()
        .enumerate()
        .map(|(i, p)| ScalarField::from_fn(format!("s{i}"), &mesh, |_, c| p[0] + p[1] * c.x + p[2] * c.y))
        .collect();

    (mesh, modes, snapshots, params)
}

#[test]
fn galerkin_recovers_affine_snapshots() {
    let (mesh, modes, snapshots, params) = affine_case(8);

    let projector = GalerkinProjector::new(&modes, &mesh).unwrap();
    let coeffs = projector.coefficients(&snapshots).unwrap();
    assert_eq!(coeffs.shape(), (3, 8));

    // coefficients are the sampled parameters themselves
    let max_err = (&coeffs - params.transpose()).amax();
    println!("Max coefficient error: {:.2e}", max_err);
    assert!(max_err < 1e-9, "coefficients drifted: {max_err:.2e}");

    let rec = projector.reconstruct_fields("rec", &mesh, &coeffs).unwrap();
    let errors = list_errors(&snapshots, &rec, &mesh).unwrap();
    println!("Max relative L2 error: {:.2e}", errors.max());
    assert!(errors.max() < 1e-9);
}

#[test]
fn orthonormal_basis_gives_the_same_reconstruction() {
    let (mesh, modes, snapshots, _) = affine_case(6);

    let ortho = orthonormalize(&modes, &mesh, &Tolerances::default()).unwrap();
    let mass = mass_matrix(&ortho, &mesh).unwrap();
    let identity_defect = (&mass - DMatrix::identity(3, 3)).amax();
    assert!(identity_defect < 1e-10, "orthonormal mass defect {identity_defect:.2e}");

    let coeffs = project_orthogonal(&snapshots, &ortho, &mesh).unwrap();
    let rec: FieldSet<f64> =
        unvectorize_columns("rec", &mesh, &(vectorize_fields(&ortho).unwrap() * &coeffs)).unwrap();
    let errors = list_errors(&snapshots, &rec, &mesh).unwrap();
    assert!(errors.max() < 1e-9);

    let galerkin = GalerkinProjector::new(&ortho, &mesh)
        .unwrap()
        .coefficients(&snapshots)
        .unwrap();
    assert!((&galerkin - &coeffs).amax() < 1e-9);
}

#[test]
fn truncated_basis_leaves_a_residual() {
    let (mesh, modes, _, _) = affine_case(1);

    let bump = ScalarField::from_fn("bump", &mesh, |_, c| {
        (-((c.x - 1.5).powi(2) + (c.y - 1.0).powi(2)) * 4.0).exp()
    });
    let projector = GalerkinProjector::new(&modes.truncated(2), &mesh).unwrap();
    let coeffs = projector.coefficients_single(&bump).unwrap();
    let rec = projector
        .reconstruct_fields("bump_rec", &mesh, &DMatrix::from_column_slice(2, 1, coeffs.as_slice()))
        .unwrap();

    let err = relative_error(&bump, &rec[0], &mesh).unwrap();
    println!("Relative L2 error of a bump in span{{1, x}}: {:.3}", err);
    assert!(err > 0.1 && err < 1.0);
}

#[test]
fn mass_matrix_is_symmetric_and_volume_weighted() {
    let (mesh, modes, _, _) = affine_case(1);
    let mass = mass_matrix(&modes, &mesh).unwrap();

    assert_eq!(mass, mass.transpose());
    // (1, 1) is the plate volume 3 * 2 * 0.1
    assert!((mass[(0, 0)] - 0.6).abs() < 1e-12);
    // (1, x) is the first moment volume * 1.5
    assert!((mass[(0, 1)] - 0.9).abs() < 1e-12);
}

#[test]
fn constant_snapshot_has_zero_seminorm() {
    let (mesh, modes, snapshots, _) = affine_case(3);
    assert!(h1_seminorm(&modes[0], &mesh).unwrap() < 1e-12);
    for s in &snapshots {
        assert!(h1_seminorm(s, &mesh).unwrap() > 0.0);
    }
}

#[test]
fn dependent_basis_is_rejected() {
    let (mesh, modes, _, _) = affine_case(1);
    let doubled = ScalarField::from_fn("2x", &mesh, |_, c| 2.0 * c.x);
    let basis: FieldSet<f64> = vec![modes[0].clone(), modes[1].clone(), doubled].into();

    match GalerkinProjector::new(&basis, &mesh) {
        Err(RomError::NumericalError(msg)) => println!("rejected: {msg}"),
        other => panic!("expected a singular mass matrix, got {:?}", other.map(|p| p.num_modes())),
    }
}

#[test]
fn fields_from_another_mesh_are_rejected() {
    let (mesh, modes, _, _) = affine_case(1);
    let other = create_flat_mesh([3.0, 2.0], 12, 8, 0.1);
    let foreign = ScalarField::uniform("foreign", &other, 1.0);

    let projector = GalerkinProjector::new(&modes, &mesh).unwrap();
    assert!(matches!(
        projector.coefficients_single(&foreign),
        Err(RomError::ShapeMismatch(_))
    ));
}

use super::timing::record_assembly;
use super::vectorize::{dof_weights, vectorize_field, vectorize_fields};
use super::Tolerances;
use crate::discretization::MeshTopology;
use crate::error::{Result, RomError};
use crate::fields::{Field, FieldName, FieldSet, FieldValue};
use nalgebra::{DMatrix, DVector};

/// Volume-weighted Gram matrix of a set of modes:
/// `M(i, j) = sum_cells V * mode_i . mode_j`.
pub fn mass_matrix<V: FieldValue, M: MeshTopology>(
    modes: &[Field<V>],
    mesh: &M,
) -> Result<DMatrix<f64>> {
    if modes.is_empty() {
        return Err(RomError::EmptyInput("no modes for mass matrix"));
    }
    modes.iter().try_for_each(|m| m.ensure_on(mesh))?;
    let phi = vectorize_fields(modes)?;
    weighted_gram(&phi, &dof_weights(mesh, V::COMPONENTS))
}

/// `Phi^T diag(w) Phi` for pre-vectorised modes. The result is symmetrised
/// so that `M(i, j) == M(j, i)` holds exactly.
pub fn weighted_gram(phi: &DMatrix<f64>, weights: &DVector<f64>) -> Result<DMatrix<f64>> {
    if phi.ncols() == 0 {
        return Err(RomError::EmptyInput("no modes for mass matrix"));
    }
    if phi.nrows() != weights.len() {
        return Err(RomError::ShapeMismatch(format!(
            "{} mode dofs but {} weights",
            phi.nrows(),
            weights.len()
        )));
    }

    let mass = record_assembly(|| {
        let mut weighted = phi.clone();
        for (mut row, w) in weighted.row_iter_mut().zip(weights.iter()) {
            row *= *w;
        }
        let gram = phi.tr_mul(&weighted);
        (&gram + gram.transpose()) * 0.5
    });

    log::debug!(
        "assembled {}x{} mass matrix from {} dofs",
        mass.nrows(),
        mass.ncols(),
        phi.nrows()
    );
    Ok(mass)
}

/// Modified Gram-Schmidt under the volume-weighted inner product.
/// The returned modes satisfy `mass_matrix(result) ≈ I`.
pub fn orthonormalize<V: FieldValue, M: MeshTopology>(
    modes: &[Field<V>],
    mesh: &M,
    tolerances: &Tolerances,
) -> Result<FieldSet<V>> {
    if modes.is_empty() {
        return Err(RomError::EmptyInput("no modes to orthonormalize"));
    }
    modes.iter().try_for_each(|m| m.ensure_on(mesh))?;

    let weights = dof_weights(mesh, V::COMPONENTS);
    let inner = |a: &DVector<f64>, b: &DVector<f64>| a.component_mul(&weights).dot(b);

    let mut basis: Vec<DVector<f64>> = Vec::with_capacity(modes.len());
    for (i, mode) in modes.iter().enumerate() {
        let mut v = vectorize_field(mode);
        let original = inner(&v, &v).sqrt();
        // two sweeps keep the basis orthogonal for badly conditioned inputs
        for _ in 0..2 {
            for q in &basis {
                let r = inner(q, &v);
                v.axpy(-r, q, 1.0);
            }
        }
        let norm = inner(&v, &v).sqrt();
        if original == 0.0 || norm <= tolerances.dependent_mode * original {
            return Err(RomError::NumericalError(format!(
                "mode {i} is linearly dependent on the previous modes"
            )));
        }
        v /= norm;
        basis.push(v);
    }

    basis
        .iter()
        .zip(modes)
        .map(|(v, mode)| {
            Field::from_dvector(
                FieldName::new(format!("{}_ortho", mode.name().as_str())),
                mesh,
                v,
            )
        })
        .collect()
}

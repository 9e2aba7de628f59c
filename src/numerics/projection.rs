use super::mass::weighted_gram;
use super::timing::record_solve;
use super::vectorize::{dof_weights, unvectorize_columns, vectorize_field, vectorize_fields};
use super::Tolerances;
use crate::discretization::{MeshTag, MeshTopology};
use crate::error::{Result, RomError};
use crate::fields::{Field, FieldSet, FieldValue};
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use std::marker::PhantomData;

/// Galerkin (weighted least-squares) projection onto a possibly
/// non-orthogonal basis.
///
/// The mass matrix `Phi^T diag(V) Phi` is assembled and factorised once;
/// every call then only forms the right-hand side `Phi^T diag(V) S` and back
/// substitutes. The factorisation works on the unit-diagonal matrix
/// `D^-1/2 M D^-1/2`, so rescaling a mode never changes whether the basis is
/// accepted.
pub struct GalerkinProjector<V: FieldValue> {
    mesh: Option<MeshTag>,
    phi: DMatrix<f64>,
    weights: DVector<f64>,
    mass: DMatrix<f64>,
    /// `1 / sqrt(M(i, i))`
    scale: DVector<f64>,
    factor: Cholesky<f64, Dyn>,
    _value: PhantomData<V>,
}

impl<V: FieldValue> GalerkinProjector<V> {
    pub fn new<M: MeshTopology>(modes: &[Field<V>], mesh: &M) -> Result<Self> {
        Self::with_tolerances(modes, mesh, &Tolerances::default())
    }

    pub fn with_tolerances<M: MeshTopology>(
        modes: &[Field<V>],
        mesh: &M,
        tolerances: &Tolerances,
    ) -> Result<Self> {
        if modes.is_empty() {
            return Err(RomError::EmptyInput("no modes to project on"));
        }
        modes.iter().try_for_each(|m| m.ensure_on(mesh))?;
        let phi = vectorize_fields(modes)?;
        let weights = dof_weights(mesh, V::COMPONENTS);
        let mut projector = Self::from_matrix(phi, weights, tolerances)?;
        projector.mesh = Some(mesh.tag());
        Ok(projector)
    }

    /// Build from pre-vectorised modes (one per column) and per-dof weights.
    pub fn from_matrix(
        phi: DMatrix<f64>,
        weights: DVector<f64>,
        tolerances: &Tolerances,
    ) -> Result<Self> {
        if phi.nrows() % V::COMPONENTS != 0 {
            return Err(RomError::ShapeMismatch(format!(
                "{} dofs is not a multiple of {} components",
                phi.nrows(),
                V::COMPONENTS
            )));
        }
        let mass = weighted_gram(&phi, &weights)?;
        let (scale, factor) = factorize(&mass, tolerances)?;
        Ok(Self {
            mesh: None,
            phi,
            weights,
            mass,
            scale,
            factor,
            _value: PhantomData,
        })
    }

    pub fn num_modes(&self) -> usize {
        self.phi.ncols()
    }

    pub fn dofs(&self) -> usize {
        self.phi.nrows()
    }

    pub fn mass(&self) -> &DMatrix<f64> {
        &self.mass
    }

    /// The vectorised modes, one per column.
    pub fn basis(&self) -> &DMatrix<f64> {
        &self.phi
    }

    /// Coefficients of every snapshot, one column per snapshot.
    pub fn coefficients(&self, snapshots: &[Field<V>]) -> Result<DMatrix<f64>> {
        snapshots.iter().try_for_each(|s| self.check_field(s))?;
        let s = vectorize_fields(snapshots)?;
        self.coefficients_matrix(&s)
    }

    pub fn coefficients_single(&self, snapshot: &Field<V>) -> Result<DVector<f64>> {
        self.check_field(snapshot)?;
        let s = vectorize_field(snapshot);
        let rhs = self.phi.tr_mul(&s.component_mul(&self.weights));
        let c = self.solve(DMatrix::from_column_slice(rhs.len(), 1, rhs.as_slice()));
        Ok(c.column(0).into_owned())
    }

    /// Coefficients of pre-vectorised snapshots (one per column).
    pub fn coefficients_matrix(&self, snapshots: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if snapshots.nrows() != self.dofs() {
            return Err(RomError::ShapeMismatch(format!(
                "snapshots have {} dofs, modes have {}",
                snapshots.nrows(),
                self.dofs()
            )));
        }
        let rhs = weighted_rhs(&self.phi, &self.weights, snapshots);
        Ok(self.solve(rhs))
    }

    /// `M^-1 rhs = D^-1/2 (D^-1/2 M D^-1/2)^-1 D^-1/2 rhs`
    fn solve(&self, mut rhs: DMatrix<f64>) -> DMatrix<f64> {
        scale_rows(&mut rhs, &self.scale);
        let mut c = record_solve(|| self.factor.solve(&rhs));
        scale_rows(&mut c, &self.scale);
        c
    }

    /// `Phi * C`: the snapshots represented by the given coefficients.
    pub fn reconstruct(&self, coefficients: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if coefficients.nrows() != self.num_modes() {
            return Err(RomError::ShapeMismatch(format!(
                "{} coefficient rows for {} modes",
                coefficients.nrows(),
                self.num_modes()
            )));
        }
        Ok(&self.phi * coefficients)
    }

    pub fn reconstruct_fields<M: MeshTopology>(
        &self,
        name: &str,
        mesh: &M,
        coefficients: &DMatrix<f64>,
    ) -> Result<FieldSet<V>> {
        if self.mesh.is_some_and(|tag| tag != mesh.tag()) {
            return Err(RomError::ShapeMismatch(
                "reconstruction requested on a different mesh".into(),
            ));
        }
        let s = self.reconstruct(coefficients)?;
        unvectorize_columns(name, mesh, &s)
    }

    fn check_field(&self, field: &Field<V>) -> Result<()> {
        if let Some(tag) = self.mesh {
            if field.mesh_tag() != tag {
                return Err(RomError::ShapeMismatch(format!(
                    "snapshot '{}' and the modes live on different meshes",
                    field.name().as_str()
                )));
            }
        }
        if field.dofs() != self.dofs() {
            return Err(RomError::ShapeMismatch(format!(
                "snapshot '{}' has {} dofs, modes have {}",
                field.name().as_str(),
                field.dofs(),
                self.dofs()
            )));
        }
        Ok(())
    }
}

fn scale_rows(m: &mut DMatrix<f64>, scale: &DVector<f64>) {
    for (mut row, w) in m.row_iter_mut().zip(scale.iter()) {
        row *= *w;
    }
}

fn weighted_rhs(phi: &DMatrix<f64>, weights: &DVector<f64>, s: &DMatrix<f64>) -> DMatrix<f64> {
    let mut weighted = s.clone();
    scale_rows(&mut weighted, weights);
    phi.tr_mul(&weighted)
}

/// Jacobi-scale the mass matrix to unit diagonal and factorise it.
/// Returns the scaling `1 / sqrt(M(i, i))` and the factor of the scaled matrix.
fn factorize(
    mass: &DMatrix<f64>,
    tolerances: &Tolerances,
) -> Result<(DVector<f64>, Cholesky<f64, Dyn>)> {
    let diagonal = mass.diagonal();
    if let Some(i) = diagonal.iter().position(|d| !(d.is_finite() && *d > 0.0)) {
        return Err(RomError::NumericalError(format!(
            "mode {i} has no mass ({:.3e})",
            diagonal[i]
        )));
    }
    let scale = diagonal.map(|d| 1.0 / d.sqrt());
    let mut scaled = mass.clone();
    scale_rows(&mut scaled, &scale);
    for (mut col, w) in scaled.column_iter_mut().zip(scale.iter()) {
        col *= *w;
    }

    let factor = record_solve(|| scaled.cholesky()).ok_or_else(|| {
        RomError::NumericalError("mass matrix is not positive definite".into())
    })?;

    let pivots = factor.l_dirty().diagonal();
    let max = pivots.max();
    let min = pivots.min();
    let ratio = (min * min) / (max * max);
    log::debug!("mass matrix pivot ratio {ratio:.3e}");
    if !ratio.is_finite() || ratio < tolerances.singular_pivot {
        return Err(RomError::NumericalError(format!(
            "mass matrix is numerically singular (pivot ratio {ratio:.3e})"
        )));
    }
    if ratio < tolerances.singular_pivot.sqrt() {
        log::warn!("mass matrix is poorly conditioned (pivot ratio {ratio:.3e})");
    }
    Ok((scale, factor))
}

/// Coefficients of `snapshots` on a possibly non-orthogonal basis.
pub fn project<V: FieldValue, M: MeshTopology>(
    snapshots: &[Field<V>],
    modes: &[Field<V>],
    mesh: &M,
) -> Result<DMatrix<f64>> {
    GalerkinProjector::new(modes, mesh)?.coefficients(snapshots)
}

pub fn project_single<V: FieldValue, M: MeshTopology>(
    snapshot: &Field<V>,
    modes: &[Field<V>],
    mesh: &M,
) -> Result<DVector<f64>> {
    GalerkinProjector::new(modes, mesh)?.coefficients_single(snapshot)
}

/// Coefficients on a basis assumed orthogonal: `Phi^T diag(V) S` with row `i`
/// divided by the recomputed mass diagonal `M(i, i)`. Off-diagonal mass
/// entries are ignored.
pub fn project_orthogonal<V: FieldValue, M: MeshTopology>(
    snapshots: &[Field<V>],
    modes: &[Field<V>],
    mesh: &M,
) -> Result<DMatrix<f64>> {
    project_orthogonal_with(snapshots, modes, mesh, &Tolerances::default())
}

pub fn project_orthogonal_with<V: FieldValue, M: MeshTopology>(
    snapshots: &[Field<V>],
    modes: &[Field<V>],
    mesh: &M,
    tolerances: &Tolerances,
) -> Result<DMatrix<f64>> {
    let (phi, weights, diagonal) = orthogonal_setup(modes, mesh, tolerances)?;
    snapshots.iter().try_for_each(|s| s.ensure_on(mesh))?;
    let s = vectorize_fields(snapshots)?;
    let mut coefficients = weighted_rhs(&phi, &weights, &s);
    for (mut row, d) in coefficients.row_iter_mut().zip(diagonal.iter()) {
        row /= *d;
    }
    Ok(coefficients)
}

pub fn project_orthogonal_single<V: FieldValue, M: MeshTopology>(
    snapshot: &Field<V>,
    modes: &[Field<V>],
    mesh: &M,
) -> Result<DVector<f64>> {
    project_orthogonal_single_with(snapshot, modes, mesh, &Tolerances::default())
}

pub fn project_orthogonal_single_with<V: FieldValue, M: MeshTopology>(
    snapshot: &Field<V>,
    modes: &[Field<V>],
    mesh: &M,
    tolerances: &Tolerances,
) -> Result<DVector<f64>> {
    let (phi, weights, diagonal) = orthogonal_setup(modes, mesh, tolerances)?;
    snapshot.ensure_on(mesh)?;
    let s = vectorize_field(snapshot);
    let rhs = phi.tr_mul(&s.component_mul(&weights));
    Ok(rhs.component_div(&diagonal))
}

/// A mode is rejected when its weighted mass is negligible against its
/// unweighted norm, which does not depend on the mode's amplitude.
fn orthogonal_setup<V: FieldValue, M: MeshTopology>(
    modes: &[Field<V>],
    mesh: &M,
    tolerances: &Tolerances,
) -> Result<(DMatrix<f64>, DVector<f64>, DVector<f64>)> {
    if modes.is_empty() {
        return Err(RomError::EmptyInput("no modes to project on"));
    }
    modes.iter().try_for_each(|m| m.ensure_on(mesh))?;
    let phi = vectorize_fields(modes)?;
    let weights = dof_weights(mesh, V::COMPONENTS);
    let max_weight = weights.max();

    let diagonal = DVector::from_iterator(
        phi.ncols(),
        phi.column_iter()
            .map(|col| col.component_mul(&weights).dot(&col)),
    );
    for (i, (d, col)) in diagonal.iter().zip(phi.column_iter()).enumerate() {
        let reference = max_weight * col.norm_squared();
        if reference == 0.0 || !d.is_finite() || *d <= tolerances.min_mass_diagonal * reference {
            return Err(RomError::NumericalError(format!(
                "mode {i} has vanishing mass ({d:.3e})"
            )));
        }
    }
    let unit_defect = diagonal.iter().map(|d| (d - 1.0).abs()).fold(0.0, f64::max);
    if unit_defect > 1e-6 {
        log::debug!("orthogonal basis is not normalised (max |M_ii - 1| = {unit_defect:.3e})");
    }
    Ok((phi, weights, diagonal))
}

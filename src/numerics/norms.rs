use super::Tolerances;
use crate::discretization::MeshTopology;
use crate::error::{Result, RomError};
use crate::fields::{Field, FieldValue};
use nalgebra::DVector;

/// Norm and error evaluation against one mesh.
pub struct ErrorEvaluator<'m, M: MeshTopology> {
    mesh: &'m M,
    pub tolerances: Tolerances,
}

impl<'m, M: MeshTopology> ErrorEvaluator<'m, M> {
    pub fn new(mesh: &'m M) -> Self {
        Self {
            mesh,
            tolerances: Tolerances::default(),
        }
    }

    pub fn with_tolerances(mut self, tol: Tolerances) -> Self {
        self.tolerances = tol;
        self
    }

    /// `sqrt(sum_cells V * |f|^2)`
    pub fn l2_norm<V: FieldValue>(&self, field: &Field<V>) -> Result<f64> {
        field.ensure_on(self.mesh)?;
        let sum: f64 = field
            .values()
            .iter()
            .enumerate()
            .map(|(c, v)| self.mesh.cell_volume(c) * v.norm_squared())
            .sum();
        Ok(sum.sqrt())
    }

    /// `sqrt(sum_cells V * |grad f|^2)`, the gradient taken component by component.
    pub fn h1_seminorm<V: FieldValue>(&self, field: &Field<V>) -> Result<f64> {
        field.ensure_on(self.mesh)?;
        let mut sum = 0.0;
        let mut component = vec![0.0; field.num_cells()];
        for k in 0..V::COMPONENTS {
            for (dst, v) in component.iter_mut().zip(field.values()) {
                *dst = v.component(k);
            }
            let grad = self.mesh.scalar_gradient(&component);
            sum += grad
                .iter()
                .enumerate()
                .map(|(c, g)| self.mesh.cell_volume(c) * g.length_squared())
                .sum::<f64>();
        }
        Ok(sum.sqrt())
    }

    /// `|f1 - f2| / |f1|` in the L2 norm, `reference` being `f1`.
    pub fn relative_error<V: FieldValue>(&self, reference: &Field<V>, other: &Field<V>) -> Result<f64> {
        let denominator = self.l2_norm(reference)?;
        let diff = reference.difference(other)?;
        if denominator < self.tolerances.zero_norm {
            return Err(RomError::DivideByZero {
                norm: denominator,
                tolerance: self.tolerances.zero_norm,
            });
        }
        Ok(self.l2_norm(&diff)? / denominator)
    }

    /// Pairwise relative errors, in input order.
    pub fn list_errors<V: FieldValue>(
        &self,
        references: &[Field<V>],
        others: &[Field<V>],
    ) -> Result<DVector<f64>> {
        if references.len() != others.len() {
            return Err(RomError::LengthMismatch {
                left: references.len(),
                right: others.len(),
            });
        }
        let errors = references
            .iter()
            .zip(others)
            .map(|(a, b)| self.relative_error(a, b))
            .collect::<Result<Vec<f64>>>()?;
        Ok(DVector::from_vec(errors))
    }
}

pub fn l2_norm<V: FieldValue, M: MeshTopology>(field: &Field<V>, mesh: &M) -> Result<f64> {
    ErrorEvaluator::new(mesh).l2_norm(field)
}

pub fn h1_seminorm<V: FieldValue, M: MeshTopology>(field: &Field<V>, mesh: &M) -> Result<f64> {
    ErrorEvaluator::new(mesh).h1_seminorm(field)
}

pub fn relative_error<V: FieldValue, M: MeshTopology>(
    reference: &Field<V>,
    other: &Field<V>,
    mesh: &M,
) -> Result<f64> {
    ErrorEvaluator::new(mesh).relative_error(reference, other)
}

pub fn list_errors<V: FieldValue, M: MeshTopology>(
    references: &[Field<V>],
    others: &[Field<V>],
    mesh: &M,
) -> Result<DVector<f64>> {
    ErrorEvaluator::new(mesh).list_errors(references, others)
}
